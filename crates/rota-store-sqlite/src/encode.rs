//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Due dates are encoded at
//! whole-second precision with a `Z` suffix so string comparison in SQL
//! matches chronological order. Repeat deltas are stored as compact JSON.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use rota_core::{
  chore::Chore,
  house::{House, HouseMember, HouseRole},
  occurrence::{ChoreOccurrence, OccurrenceView},
  repeat::RepeatDelta,
  schedule::ChoreSchedule,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

/// Due-date encoding: whole seconds, `Z` offset. Lexicographic order on the
/// column equals chronological order, which the range queries rely on.
pub fn encode_due(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

pub fn decode_dt_opt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── HouseRole ───────────────────────────────────────────────────────────────

pub fn encode_role(role: HouseRole) -> &'static str { role.as_str() }

pub fn decode_role(s: &str) -> Result<HouseRole> {
  match s {
    "owner" => Ok(HouseRole::Owner),
    "member" => Ok(HouseRole::Member),
    other => Err(Error::Decode(format!("unknown house role: {other:?}"))),
  }
}

// ─── RepeatDelta ─────────────────────────────────────────────────────────────

pub fn encode_delta(delta: &RepeatDelta) -> Result<String> {
  Ok(serde_json::to_string(delta)?)
}

pub fn decode_delta(s: &str) -> Result<RepeatDelta> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `houses` row.
pub struct RawHouse {
  pub house_id:    String,
  pub name:        String,
  pub address:     Option<String>,
  pub max_members: i64,
  pub version:     i64,
  pub created_at:  String,
  pub deleted_at:  Option<String>,
}

impl RawHouse {
  pub const COLUMNS: &'static str =
    "house_id, name, address, max_members, version, created_at, deleted_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      house_id:    row.get(0)?,
      name:        row.get(1)?,
      address:     row.get(2)?,
      max_members: row.get(3)?,
      version:     row.get(4)?,
      created_at:  row.get(5)?,
      deleted_at:  row.get(6)?,
    })
  }

  pub fn into_house(self) -> Result<House> {
    Ok(House {
      house_id:    decode_uuid(&self.house_id)?,
      name:        self.name,
      address:     self.address,
      max_members: self.max_members,
      version:     self.version,
      created_at:  decode_dt(&self.created_at)?,
      deleted_at:  decode_dt_opt(self.deleted_at.as_deref())?,
    })
  }
}

/// Raw strings read directly from a `house_members` row.
pub struct RawMember {
  pub member_id: String,
  pub house_id:  String,
  pub user_id:   String,
  pub role:      String,
  pub joined_at: String,
}

impl RawMember {
  pub const COLUMNS: &'static str =
    "member_id, house_id, user_id, role, joined_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      member_id: row.get(0)?,
      house_id:  row.get(1)?,
      user_id:   row.get(2)?,
      role:      row.get(3)?,
      joined_at: row.get(4)?,
    })
  }

  pub fn into_member(self) -> Result<HouseMember> {
    Ok(HouseMember {
      member_id: decode_uuid(&self.member_id)?,
      house_id:  decode_uuid(&self.house_id)?,
      user_id:   decode_uuid(&self.user_id)?,
      role:      decode_role(&self.role)?,
      joined_at: decode_dt(&self.joined_at)?,
    })
  }
}

/// Raw strings read directly from a `chores` row.
pub struct RawChore {
  pub chore_id:    String,
  pub house_id:    String,
  pub name:        String,
  pub description: Option<String>,
  pub color:       Option<String>,
  pub version:     i64,
  pub created_at:  String,
  pub deleted_at:  Option<String>,
}

impl RawChore {
  pub const COLUMNS: &'static str =
    "chore_id, house_id, name, description, color, version, created_at, \
     deleted_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      chore_id:    row.get(0)?,
      house_id:    row.get(1)?,
      name:        row.get(2)?,
      description: row.get(3)?,
      color:       row.get(4)?,
      version:     row.get(5)?,
      created_at:  row.get(6)?,
      deleted_at:  row.get(7)?,
    })
  }

  pub fn into_chore(self) -> Result<Chore> {
    Ok(Chore {
      chore_id:    decode_uuid(&self.chore_id)?,
      house_id:    decode_uuid(&self.house_id)?,
      name:        self.name,
      description: self.description,
      color:       self.color,
      version:     self.version,
      created_at:  decode_dt(&self.created_at)?,
      deleted_at:  decode_dt_opt(self.deleted_at.as_deref())?,
    })
  }
}

/// Raw strings read directly from a `chore_schedules` row.
pub struct RawSchedule {
  pub schedule_id:          String,
  pub chore_id:             String,
  pub assignee_user_id:     String,
  pub start_date:           String,
  pub repeat_delta:         String,
  pub generate_occurrences: bool,
  pub version:              i64,
  pub created_at:           String,
  pub deleted_at:           Option<String>,
}

impl RawSchedule {
  pub const COLUMNS: &'static str =
    "schedule_id, chore_id, assignee_user_id, start_date, repeat_delta, \
     generate_occurrences, version, created_at, deleted_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      schedule_id:          row.get(0)?,
      chore_id:             row.get(1)?,
      assignee_user_id:     row.get(2)?,
      start_date:           row.get(3)?,
      repeat_delta:         row.get(4)?,
      generate_occurrences: row.get(5)?,
      version:              row.get(6)?,
      created_at:           row.get(7)?,
      deleted_at:           row.get(8)?,
    })
  }

  pub fn into_schedule(self) -> Result<ChoreSchedule> {
    Ok(ChoreSchedule {
      schedule_id:          decode_uuid(&self.schedule_id)?,
      chore_id:             decode_uuid(&self.chore_id)?,
      assignee_user_id:     decode_uuid(&self.assignee_user_id)?,
      start_date:           decode_dt(&self.start_date)?,
      repeat_delta:         decode_delta(&self.repeat_delta)?,
      generate_occurrences: self.generate_occurrences,
      version:              self.version,
      created_at:           decode_dt(&self.created_at)?,
      deleted_at:           decode_dt_opt(self.deleted_at.as_deref())?,
    })
  }
}

/// Raw strings read directly from a `chore_occurrences` row.
pub struct RawOccurrence {
  pub occurrence_id:        String,
  pub schedule_id:          String,
  pub due_date:             String,
  pub completed:            bool,
  pub completed_at:         Option<String>,
  pub notification_sent:    bool,
  pub notification_sent_at: Option<String>,
  pub version:              i64,
  pub created_at:           String,
  pub deleted_at:           Option<String>,
}

impl RawOccurrence {
  pub const COLUMNS: &'static str =
    "occurrence_id, schedule_id, due_date, completed, completed_at, \
     notification_sent, notification_sent_at, version, created_at, \
     deleted_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      occurrence_id:        row.get(0)?,
      schedule_id:          row.get(1)?,
      due_date:             row.get(2)?,
      completed:            row.get(3)?,
      completed_at:         row.get(4)?,
      notification_sent:    row.get(5)?,
      notification_sent_at: row.get(6)?,
      version:              row.get(7)?,
      created_at:           row.get(8)?,
      deleted_at:           row.get(9)?,
    })
  }

  pub fn into_occurrence(self) -> Result<ChoreOccurrence> {
    Ok(ChoreOccurrence {
      occurrence_id:        decode_uuid(&self.occurrence_id)?,
      schedule_id:          decode_uuid(&self.schedule_id)?,
      due_date:             decode_dt(&self.due_date)?,
      completed:            self.completed,
      completed_at:         decode_dt_opt(self.completed_at.as_deref())?,
      notification_sent:    self.notification_sent,
      notification_sent_at: decode_dt_opt(
        self.notification_sent_at.as_deref(),
      )?,
      version:              self.version,
      created_at:           decode_dt(&self.created_at)?,
      deleted_at:           decode_dt_opt(self.deleted_at.as_deref())?,
    })
  }
}

/// An occurrence row joined with its schedule and chore, as selected by the
/// dashboard listing and the reminder scan.
pub struct RawOccurrenceView {
  pub occurrence:       RawOccurrence,
  pub chore:            RawChore,
  pub assignee_user_id: String,
  pub repeat_delta:     String,
}

impl RawOccurrenceView {
  pub fn into_view(self) -> Result<OccurrenceView> {
    let repeat_label = decode_delta(&self.repeat_delta)?.label();
    Ok(OccurrenceView {
      occurrence: self.occurrence.into_occurrence()?,
      chore: self.chore.into_chore()?,
      assignee_user_id: decode_uuid(&self.assignee_user_id)?,
      repeat_label,
    })
  }
}
