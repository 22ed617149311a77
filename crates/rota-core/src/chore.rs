//! Chores — the named tasks a house tracks.
//!
//! A chore carries no timing of its own; when and for whom it recurs lives
//! on its schedules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chore {
  pub chore_id:    Uuid,
  pub house_id:    Uuid,
  pub name:        String,
  pub description: Option<String>,
  pub color:       Option<String>,
  pub version:     i64,
  pub created_at:  DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub deleted_at:  Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewChore {
  pub name:        String,
  pub description: Option<String>,
  pub color:       Option<String>,
}

/// Partial update to a chore's descriptive fields. `None` leaves a field
/// untouched; an all-`None` changeset writes nothing and does not bump the
/// version.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChoreChanges {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub color:       Option<String>,
}

impl ChoreChanges {
  pub fn is_empty(&self) -> bool {
    self.name.is_none() && self.description.is_none() && self.color.is_none()
  }
}
