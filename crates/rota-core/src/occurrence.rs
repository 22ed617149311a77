//! Chore occurrences — one concrete due instant of a schedule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chore::Chore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoreOccurrence {
  pub occurrence_id:        Uuid,
  pub schedule_id:          Uuid,
  /// Whole-second precision; unique per schedule among all rows, deleted
  /// included.
  pub due_date:             DateTime<Utc>,
  pub completed:            bool,
  /// Non-null iff `completed`; maintained by [`Self::apply`], never stale.
  pub completed_at:         Option<DateTime<Utc>>,
  pub notification_sent:    bool,
  /// Non-null iff `notification_sent`, same rule as `completed_at`.
  pub notification_sent_at: Option<DateTime<Utc>>,
  pub version:              i64,
  pub created_at:           DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub deleted_at:           Option<DateTime<Utc>>,
}

impl ChoreOccurrence {
  /// Apply a changeset in place. Returns true iff this edit flipped
  /// `completed` from false to true, the edge that triggers chaining the
  /// next occurrence. Re-completing an already-complete occurrence is not
  /// an edge.
  ///
  /// The timestamp fields track their flags: flipping a flag on stamps it
  /// with `now`, flipping it off clears the stamp, and writing the value
  /// already held leaves the original stamp alone.
  pub fn apply(
    &mut self,
    changes: &OccurrenceChanges,
    now: DateTime<Utc>,
  ) -> bool {
    let was_completed = self.completed;
    if let Some(due_date) = changes.due_date {
      self.due_date = crate::repeat::truncate_seconds(due_date);
    }
    if let Some(completed) = changes.completed {
      if completed && !self.completed {
        self.completed_at = Some(now);
      } else if !completed {
        self.completed_at = None;
      }
      self.completed = completed;
    }
    if let Some(sent) = changes.notification_sent {
      if sent && !self.notification_sent {
        self.notification_sent_at = Some(now);
      } else if !sent {
        self.notification_sent_at = None;
      }
      self.notification_sent = sent;
    }
    !was_completed && self.completed
  }
}

/// Partial update to an occurrence. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OccurrenceChanges {
  pub due_date:          Option<DateTime<Utc>>,
  pub completed:         Option<bool>,
  pub notification_sent: Option<bool>,
}

impl OccurrenceChanges {
  pub fn is_empty(&self) -> bool {
    self.due_date.is_none()
      && self.completed.is_none()
      && self.notification_sent.is_none()
  }
}

/// An occurrence joined with its chore context, as listed on dashboards and
/// handed to notification dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct OccurrenceView {
  #[serde(flatten)]
  pub occurrence:       ChoreOccurrence,
  pub chore:            Chore,
  pub assignee_user_id: Uuid,
  pub repeat_label:     String,
}

/// Result of a direct occurrence update: the new state plus the chained
/// follow-up occurrence, when the edit completed a repeating schedule's
/// occurrence for the first time.
#[derive(Debug, Clone, Serialize)]
pub struct OccurrenceUpdate {
  pub occurrence: ChoreOccurrence,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub chained:    Option<ChoreOccurrence>,
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn base_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
  }

  fn occurrence(completed: bool) -> ChoreOccurrence {
    let now = base_instant();
    ChoreOccurrence {
      occurrence_id: Uuid::new_v4(),
      schedule_id: Uuid::new_v4(),
      due_date: now,
      completed,
      completed_at: completed.then_some(now),
      notification_sent: false,
      notification_sent_at: None,
      version: 1,
      created_at: now,
      deleted_at: None,
    }
  }

  #[test]
  fn completing_fires_the_edge_once() {
    let mut occ = occurrence(false);
    let changes =
      OccurrenceChanges { completed: Some(true), ..Default::default() };
    assert!(occ.apply(&changes, base_instant()));
    assert!(!occ.apply(&changes, base_instant()));
  }

  #[test]
  fn uncompleting_is_not_an_edge() {
    let mut occ = occurrence(true);
    assert!(!occ.apply(
      &OccurrenceChanges { completed: Some(false), ..Default::default() },
      base_instant(),
    ));
    assert!(!occ.completed);
  }

  #[test]
  fn completing_stamps_and_uncompleting_clears() {
    let now = base_instant();
    let later = now + chrono::TimeDelta::hours(2);
    let mut occ = occurrence(false);
    assert_eq!(occ.completed_at, None);

    occ.apply(
      &OccurrenceChanges { completed: Some(true), ..Default::default() },
      now,
    );
    assert_eq!(occ.completed_at, Some(now));

    occ.apply(
      &OccurrenceChanges { completed: Some(false), ..Default::default() },
      later,
    );
    assert!(!occ.completed);
    assert_eq!(occ.completed_at, None);
  }

  #[test]
  fn recompleting_keeps_the_original_stamp() {
    let now = base_instant();
    let later = now + chrono::TimeDelta::hours(2);
    let mut occ = occurrence(false);

    occ.apply(
      &OccurrenceChanges { completed: Some(true), ..Default::default() },
      now,
    );
    occ.apply(
      &OccurrenceChanges { completed: Some(true), ..Default::default() },
      later,
    );
    assert_eq!(occ.completed_at, Some(now));
  }

  #[test]
  fn notification_stamp_mirrors_its_flag() {
    let now = base_instant();
    let mut occ = occurrence(false);

    occ.apply(
      &OccurrenceChanges {
        notification_sent: Some(true),
        ..Default::default()
      },
      now,
    );
    assert!(occ.notification_sent);
    assert_eq!(occ.notification_sent_at, Some(now));

    occ.apply(
      &OccurrenceChanges {
        notification_sent: Some(false),
        ..Default::default()
      },
      now,
    );
    assert_eq!(occ.notification_sent_at, None);
  }

  #[test]
  fn due_date_edits_are_second_truncated() {
    let mut occ = occurrence(false);
    let precise = Utc
      .with_ymd_and_hms(2025, 7, 1, 9, 30, 15)
      .unwrap()
      .checked_add_signed(chrono::TimeDelta::milliseconds(250))
      .unwrap();
    occ.apply(
      &OccurrenceChanges { due_date: Some(precise), ..Default::default() },
      base_instant(),
    );
    assert_eq!(
      occ.due_date,
      Utc.with_ymd_and_hms(2025, 7, 1, 9, 30, 15).unwrap()
    );
  }
}
