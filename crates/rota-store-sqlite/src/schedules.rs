//! Connection-level operations on schedules, plus the occurrence generator.
//!
//! Generation is idempotent by construction: candidates that already have a
//! row (deleted rows included) are skipped, and the `UNIQUE (schedule_id,
//! due_date)` constraint backs that check at the SQL level.

use chrono::{DateTime, Utc};
use rota_core::{
  Error as CoreError,
  house::HouseRole,
  occurrence::ChoreOccurrence,
  repeat::{DueDates, truncate_seconds},
  schedule::ChoreSchedule,
  store::Scope,
};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use crate::{
  Result,
  encode::{RawSchedule, encode_delta, encode_dt, encode_due, encode_uuid},
  occurrences,
};

pub fn insert_schedule(
  conn: &Connection,
  schedule: &ChoreSchedule,
) -> Result<()> {
  conn.execute(
    "INSERT INTO chore_schedules (
       schedule_id, chore_id, assignee_user_id, start_date, repeat_delta,
       generate_occurrences, version, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    params![
      encode_uuid(schedule.schedule_id),
      encode_uuid(schedule.chore_id),
      encode_uuid(schedule.assignee_user_id),
      encode_dt(schedule.start_date),
      encode_delta(&schedule.repeat_delta)?,
      schedule.generate_occurrences,
      schedule.version,
      encode_dt(schedule.created_at),
    ],
  )?;
  Ok(())
}

pub fn get_schedule(
  conn: &Connection,
  house_id: Uuid,
  schedule_id: Uuid,
  scope: Scope,
) -> Result<Option<ChoreSchedule>> {
  let columns = RawSchedule::COLUMNS
    .split(", ")
    .map(|c| format!("s.{c}"))
    .collect::<Vec<_>>()
    .join(", ");

  let raw = conn
    .query_row(
      &format!(
        "SELECT {columns} FROM chore_schedules s
         JOIN chores c ON c.chore_id = s.chore_id
         WHERE s.schedule_id = ?1 AND c.house_id = ?2"
      ),
      params![encode_uuid(schedule_id), encode_uuid(house_id)],
      RawSchedule::from_row,
    )
    .optional()?;

  match raw {
    Some(raw) => {
      let schedule = raw.into_schedule()?;
      if scope == Scope::ActiveOnly && schedule.deleted_at.is_some() {
        return Ok(None);
      }
      Ok(Some(schedule))
    }
    None => Ok(None),
  }
}

/// Fetch a schedule by id alone, without house scoping. Used by the
/// generator, which is keyed on schedule id.
pub fn get_schedule_by_id(
  conn: &Connection,
  schedule_id: Uuid,
  scope: Scope,
) -> Result<Option<ChoreSchedule>> {
  let raw = conn
    .query_row(
      &format!(
        "SELECT {} FROM chore_schedules WHERE schedule_id = ?1",
        RawSchedule::COLUMNS
      ),
      params![encode_uuid(schedule_id)],
      RawSchedule::from_row,
    )
    .optional()?;

  match raw {
    Some(raw) => {
      let schedule = raw.into_schedule()?;
      if scope == Scope::ActiveOnly && schedule.deleted_at.is_some() {
        return Ok(None);
      }
      Ok(Some(schedule))
    }
    None => Ok(None),
  }
}

/// Reject edits to a schedule assigned to someone else unless the acting
/// user holds the owner role. The assignee themself always passes.
pub fn require_editor(
  schedule: &ChoreSchedule,
  acting_user_id: Uuid,
  role: HouseRole,
) -> Result<()> {
  if schedule.assignee_user_id != acting_user_id && role != HouseRole::Owner {
    return Err(
      CoreError::Forbidden(
        "Only the owner can edit chores assigned to others.".to_owned(),
      )
      .into(),
    );
  }
  Ok(())
}

/// Fetch an active schedule under the given house or fail with NotFound.
pub fn require_schedule(
  conn: &Connection,
  house_id: Uuid,
  schedule_id: Uuid,
) -> Result<ChoreSchedule> {
  get_schedule(conn, house_id, schedule_id, Scope::ActiveOnly)?
    .ok_or_else(|| CoreError::not_found("schedule", schedule_id).into())
}

pub fn list_schedules(
  conn: &Connection,
  house_id: Uuid,
  chore_id: Uuid,
) -> Result<Vec<ChoreSchedule>> {
  let columns = RawSchedule::COLUMNS
    .split(", ")
    .map(|c| format!("s.{c}"))
    .collect::<Vec<_>>()
    .join(", ");

  let mut stmt = conn.prepare(&format!(
    "SELECT {columns} FROM chore_schedules s
     JOIN chores c ON c.chore_id = s.chore_id
     WHERE s.chore_id = ?1 AND c.house_id = ?2 AND s.deleted_at IS NULL
     ORDER BY s.created_at"
  ))?;
  let raws = stmt
    .query_map(
      params![encode_uuid(chore_id), encode_uuid(house_id)],
      RawSchedule::from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawSchedule::into_schedule).collect()
}

/// Rewrite a schedule's parameters in place, bumping its version.
pub fn update_schedule_row(
  conn: &Connection,
  schedule: &ChoreSchedule,
) -> Result<()> {
  conn.execute(
    "UPDATE chore_schedules
     SET assignee_user_id = ?2, start_date = ?3, repeat_delta = ?4,
         generate_occurrences = ?5, version = version + 1
     WHERE schedule_id = ?1",
    params![
      encode_uuid(schedule.schedule_id),
      encode_uuid(schedule.assignee_user_id),
      encode_dt(schedule.start_date),
      encode_delta(&schedule.repeat_delta)?,
      schedule.generate_occurrences,
    ],
  )?;
  Ok(())
}

/// Soft-delete a schedule and all its remaining occurrences.
pub fn soft_delete_schedule(
  conn: &Connection,
  schedule_id: Uuid,
  now: DateTime<Utc>,
) -> Result<()> {
  let id = encode_uuid(schedule_id);
  let at = encode_dt(now);

  conn.execute(
    "UPDATE chore_occurrences SET deleted_at = ?2, version = version + 1
     WHERE deleted_at IS NULL AND schedule_id = ?1",
    params![id, at],
  )?;
  conn.execute(
    "UPDATE chore_schedules SET deleted_at = ?2, version = version + 1
     WHERE deleted_at IS NULL AND schedule_id = ?1",
    params![id, at],
  )?;
  Ok(())
}

/// Soft-delete a schedule's incomplete occurrences due on or after `cutoff`,
/// optionally sparing one row. Run before regeneration when a schedule's
/// timing changes; completed history is never discarded.
pub fn discard_pending(
  conn: &Connection,
  schedule_id: Uuid,
  cutoff: DateTime<Utc>,
  spare: Option<Uuid>,
  now: DateTime<Utc>,
) -> Result<()> {
  conn.execute(
    "UPDATE chore_occurrences SET deleted_at = ?4, version = version + 1
     WHERE deleted_at IS NULL AND completed = 0
       AND schedule_id = ?1 AND due_date >= ?2
       AND (?3 IS NULL OR occurrence_id <> ?3)",
    params![
      encode_uuid(schedule_id),
      encode_due(cutoff),
      spare.map(encode_uuid),
      encode_dt(now),
    ],
  )?;
  Ok(())
}

// ─── Generation ──────────────────────────────────────────────────────────────

/// Latest live due date for a schedule. Discarded rows do not anchor the
/// seed, but they still block their slot via [`occurrences::exists_at`].
fn latest_due(
  conn: &Connection,
  schedule_id: Uuid,
) -> Result<Option<DateTime<Utc>>> {
  let due: Option<String> = conn
    .query_row(
      "SELECT due_date FROM chore_occurrences
       WHERE schedule_id = ?1 AND deleted_at IS NULL
       ORDER BY due_date DESC LIMIT 1",
      params![encode_uuid(schedule_id)],
      |row| row.get(0),
    )
    .optional()?;
  crate::encode::decode_dt_opt(due.as_deref())
}

/// Fill a schedule's occurrences forward to `horizon`, returning only the
/// newly created rows.
///
/// Seeds from the latest live occurrence plus one delta when history
/// exists, otherwise from the start date. Candidates whose slot already has
/// a row (deleted or not) are skipped, so re-running with any horizon never
/// duplicates, discarded slots stay empty, and a zero-delta schedule tops
/// out at one occurrence.
pub fn fill_horizon(
  conn: &Connection,
  schedule: &ChoreSchedule,
  horizon: DateTime<Utc>,
  now: DateTime<Utc>,
) -> Result<Vec<ChoreOccurrence>> {
  if !schedule.generate_occurrences || schedule.deleted_at.is_some() {
    return Ok(vec![]);
  }

  let seed = match latest_due(conn, schedule.schedule_id)? {
    Some(due) => schedule.repeat_delta.add_to(due),
    None => schedule.start_date,
  };

  let mut created = vec![];
  for due in DueDates::new(seed, schedule.repeat_delta.clone(), horizon) {
    if occurrences::exists_at(conn, schedule.schedule_id, due)? {
      continue;
    }
    let occurrence = ChoreOccurrence {
      occurrence_id: Uuid::new_v4(),
      schedule_id: schedule.schedule_id,
      due_date: due,
      completed: false,
      completed_at: None,
      notification_sent: false,
      notification_sent_at: None,
      version: 1,
      created_at: now,
      deleted_at: None,
    };
    occurrences::insert_occurrence(conn, &occurrence)?;
    created.push(occurrence);
  }
  Ok(created)
}

/// Create the single follow-up occurrence after a completion, one delta past
/// the completed due date. Returns None when the schedule does not repeat,
/// is dormant or deleted, or the slot already exists.
pub fn chain_next(
  conn: &Connection,
  schedule: &ChoreSchedule,
  after: DateTime<Utc>,
  now: DateTime<Utc>,
) -> Result<Option<ChoreOccurrence>> {
  if schedule.repeat_delta.is_zero()
    || !schedule.generate_occurrences
    || schedule.deleted_at.is_some()
  {
    return Ok(None);
  }

  let due = truncate_seconds(schedule.repeat_delta.add_to(after));
  if occurrences::exists_at(conn, schedule.schedule_id, due)? {
    return Ok(None);
  }

  let occurrence = ChoreOccurrence {
    occurrence_id: Uuid::new_v4(),
    schedule_id: schedule.schedule_id,
    due_date: due,
    completed: false,
    completed_at: None,
    notification_sent: false,
    notification_sent_at: None,
    version: 1,
    created_at: now,
    deleted_at: None,
  };
  occurrences::insert_occurrence(conn, &occurrence)?;
  Ok(Some(occurrence))
}
