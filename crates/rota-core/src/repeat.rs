//! Repeat deltas — the atomic repeat unit of a schedule.
//!
//! A delta is a calendar-aware additive offset: years and months move by
//! calendar arithmetic (Jan 31 + 1 month lands on the last day of February),
//! days and below are fixed durations. An all-zero delta means "no repeat"
//! and degenerates to a single occurrence everywhere it is used.

use chrono::{DateTime, Months, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Default forward window, in days, for batch occurrence generation.
pub const DEFAULT_HORIZON_DAYS: u32 = 30;

// ─── RepeatDelta ─────────────────────────────────────────────────────────────

/// A calendar-aware additive offset. Serialises as the 7-key integer
/// mapping stored on the owning schedule; missing keys default to 0 and
/// unknown keys are ignored on input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepeatDelta {
  pub years:        i64,
  pub months:       i64,
  pub days:         i64,
  pub hours:        i64,
  pub minutes:      i64,
  pub seconds:      i64,
  pub microseconds: i64,
}

impl RepeatDelta {
  /// True iff every one of the seven fields is 0 — the repeat-termination
  /// sentinel used throughout occurrence generation.
  pub fn is_zero(&self) -> bool {
    self.years == 0
      && self.months == 0
      && self.days == 0
      && self.hours == 0
      && self.minutes == 0
      && self.seconds == 0
      && self.microseconds == 0
  }

  /// Return the preset this delta matches, if any. Matching compares only
  /// years/months/days/hours/minutes; seconds and microseconds are an
  /// intentional granularity cutoff. Earlier presets win ties.
  pub fn matches_preset(&self) -> Option<RepeatPreset> {
    RepeatPreset::ALL.into_iter().find(|preset| {
      let d = preset.delta();
      self.years == d.years
        && self.months == d.months
        && self.days == d.days
        && self.hours == d.hours
        && self.minutes == d.minutes
    })
  }

  /// Human-readable label: the preset label when one matches, otherwise a
  /// composite built from the non-zero fields in years → minutes order.
  pub fn label(&self) -> String {
    if let Some(preset) = self.matches_preset() {
      return preset.label().to_owned();
    }

    let units = [
      (self.years, "year"),
      (self.months, "month"),
      (self.days, "day"),
      (self.hours, "hour"),
      (self.minutes, "minute"),
    ];
    let parts: Vec<String> = units
      .into_iter()
      .filter(|(value, _)| *value != 0)
      .map(|(value, unit)| format!("{value} {unit}(s)"))
      .collect();

    if parts.is_empty() {
      "No repeat".to_owned()
    } else {
      format!("Every {}", parts.join(", "))
    }
  }

  /// Add this delta to an instant. Years and months use calendar month
  /// arithmetic (day-of-month clamps to the end of a shorter month); days
  /// and below are fixed durations. Total: degrades to the unshifted input
  /// on arithmetic overflow rather than erroring.
  pub fn add_to(&self, dt: DateTime<Utc>) -> DateTime<Utc> {
    let months = self.years * 12 + self.months;
    let shifted = if months > 0 {
      u32::try_from(months)
        .ok()
        .and_then(|m| dt.checked_add_months(Months::new(m)))
    } else if months < 0 {
      u32::try_from(-months)
        .ok()
        .and_then(|m| dt.checked_sub_months(Months::new(m)))
    } else {
      Some(dt)
    }
    .unwrap_or(dt);

    let fixed = TimeDelta::try_days(self.days).unwrap_or_else(TimeDelta::zero)
      + TimeDelta::try_hours(self.hours).unwrap_or_else(TimeDelta::zero)
      + TimeDelta::try_minutes(self.minutes).unwrap_or_else(TimeDelta::zero)
      + TimeDelta::try_seconds(self.seconds).unwrap_or_else(TimeDelta::zero)
      + TimeDelta::microseconds(self.microseconds);

    shifted.checked_add_signed(fixed).unwrap_or(shifted)
  }
}

// ─── Presets ─────────────────────────────────────────────────────────────────

/// The fixed preset table clients pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatPreset {
  NoRepeat,
  EveryDay,
  EveryWeek,
  EveryTwoWeeks,
  EveryMonth,
  EveryYear,
}

impl RepeatPreset {
  /// Preset table in match order; earlier entries win ties.
  pub const ALL: [Self; 6] = [
    Self::NoRepeat,
    Self::EveryDay,
    Self::EveryWeek,
    Self::EveryTwoWeeks,
    Self::EveryMonth,
    Self::EveryYear,
  ];

  pub fn delta(self) -> RepeatDelta {
    match self {
      Self::NoRepeat => RepeatDelta::default(),
      Self::EveryDay => RepeatDelta { days: 1, ..RepeatDelta::default() },
      Self::EveryWeek => RepeatDelta { days: 7, ..RepeatDelta::default() },
      Self::EveryTwoWeeks => {
        RepeatDelta { days: 14, ..RepeatDelta::default() }
      }
      Self::EveryMonth => RepeatDelta { months: 1, ..RepeatDelta::default() },
      Self::EveryYear => RepeatDelta { years: 1, ..RepeatDelta::default() },
    }
  }

  /// Stable identifier exchanged with clients.
  pub fn key(self) -> &'static str {
    match self {
      Self::NoRepeat => "no_repeat",
      Self::EveryDay => "every_day",
      Self::EveryWeek => "every_week",
      Self::EveryTwoWeeks => "every_2_weeks",
      Self::EveryMonth => "every_month",
      Self::EveryYear => "every_year",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::NoRepeat => "No repeat",
      Self::EveryDay => "Every day",
      Self::EveryWeek => "Every week",
      Self::EveryTwoWeeks => "Every 2 weeks",
      Self::EveryMonth => "Every month",
      Self::EveryYear => "Every year",
    }
  }
}

// ─── Due-date sequence ───────────────────────────────────────────────────────

/// Drop the sub-second component; occurrence due dates are stored and
/// compared at whole-second precision.
pub fn truncate_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
  dt.with_nanosecond(0).unwrap_or(dt)
}

/// Candidate due dates for batch generation.
///
/// Starts at a seed instant and emits each candidate (truncated to whole
/// seconds) while it lies on or before the horizon, advancing the
/// untruncated cursor by the delta between emissions. A zero delta yields
/// at most one candidate, which is what makes a "no repeat" schedule a
/// single one-off occurrence and bounds the loop unconditionally.
#[derive(Debug, Clone)]
pub struct DueDates {
  cursor:  DateTime<Utc>,
  delta:   RepeatDelta,
  horizon: DateTime<Utc>,
  emitted: bool,
}

impl DueDates {
  pub fn new(
    seed: DateTime<Utc>,
    delta: RepeatDelta,
    horizon: DateTime<Utc>,
  ) -> Self {
    Self { cursor: seed, delta, horizon, emitted: false }
  }
}

impl Iterator for DueDates {
  type Item = DateTime<Utc>;

  fn next(&mut self) -> Option<DateTime<Utc>> {
    if self.cursor > self.horizon {
      return None;
    }
    if self.delta.is_zero() && self.emitted {
      return None;
    }
    let due = truncate_seconds(self.cursor);
    self.cursor = self.delta.add_to(self.cursor);
    self.emitted = true;
    Some(due)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
