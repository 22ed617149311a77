//! Chore schedules — the identity (chore, assignee, rhythm) that occurrences
//! hang off.
//!
//! A schedule's assignee is part of its identity: reassigning a chore never
//! edits the existing row, it retires it and creates a fresh one. That keeps
//! every occurrence permanently attached to the person it was generated for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repeat::RepeatDelta;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoreSchedule {
  pub schedule_id:          Uuid,
  pub chore_id:             Uuid,
  pub assignee_user_id:     Uuid,
  pub start_date:           DateTime<Utc>,
  pub repeat_delta:         RepeatDelta,
  /// When false the schedule is dormant: it keeps its history but the
  /// generator skips it.
  pub generate_occurrences: bool,
  pub version:              i64,
  pub created_at:           DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub deleted_at:           Option<DateTime<Utc>>,
}

impl ChoreSchedule {
  pub fn repeat_label(&self) -> String { self.repeat_delta.label() }
}

/// A schedule as served to clients, with the derived repeat label attached.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleView {
  #[serde(flatten)]
  pub schedule:     ChoreSchedule,
  pub repeat_label: String,
}

impl From<ChoreSchedule> for ScheduleView {
  fn from(schedule: ChoreSchedule) -> Self {
    let repeat_label = schedule.repeat_label();
    Self { schedule, repeat_label }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSchedule {
  pub assignee_user_id:     Uuid,
  pub start_date:           DateTime<Utc>,
  #[serde(default)]
  pub repeat_delta:         RepeatDelta,
  #[serde(default = "default_generate")]
  pub generate_occurrences: bool,
}

fn default_generate() -> bool { true }
