//! Houses and their memberships.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct House {
  pub house_id:    Uuid,
  pub name:        String,
  pub address:     Option<String>,
  pub max_members: i64,
  pub version:     i64,
  pub created_at:  DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub deleted_at:  Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HouseRole {
  Owner,
  Member,
}

impl HouseRole {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Owner => "owner",
      Self::Member => "member",
    }
  }
}

/// A user's membership in a house. One row per (house, user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseMember {
  pub member_id: Uuid,
  pub house_id:  Uuid,
  pub user_id:   Uuid,
  pub role:      HouseRole,
  pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewHouse {
  pub name:        String,
  pub address:     Option<String>,
  pub max_members: i64,
}

pub const DEFAULT_MAX_MEMBERS: i64 = 6;
