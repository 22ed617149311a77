//! Connection-level operations on chores.

use chrono::{DateTime, Utc};
use rota_core::{
  Error as CoreError,
  chore::{Chore, ChoreChanges},
  store::Scope,
};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use crate::{
  Result,
  encode::{RawChore, encode_dt, encode_uuid},
};

pub fn insert_chore(conn: &Connection, chore: &Chore) -> Result<()> {
  conn.execute(
    "INSERT INTO chores (chore_id, house_id, name, description, color, version, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    params![
      encode_uuid(chore.chore_id),
      encode_uuid(chore.house_id),
      chore.name,
      chore.description,
      chore.color,
      chore.version,
      encode_dt(chore.created_at),
    ],
  )?;
  Ok(())
}

pub fn get_chore(
  conn: &Connection,
  house_id: Uuid,
  chore_id: Uuid,
  scope: Scope,
) -> Result<Option<Chore>> {
  let raw = conn
    .query_row(
      &format!(
        "SELECT {} FROM chores WHERE chore_id = ?1 AND house_id = ?2",
        RawChore::COLUMNS
      ),
      params![encode_uuid(chore_id), encode_uuid(house_id)],
      RawChore::from_row,
    )
    .optional()?;

  match raw {
    Some(raw) => {
      let chore = raw.into_chore()?;
      if scope == Scope::ActiveOnly && chore.deleted_at.is_some() {
        return Ok(None);
      }
      Ok(Some(chore))
    }
    None => Ok(None),
  }
}

/// Fetch an active chore under the given house or fail with NotFound.
pub fn require_chore(
  conn: &Connection,
  house_id: Uuid,
  chore_id: Uuid,
) -> Result<Chore> {
  get_chore(conn, house_id, chore_id, Scope::ActiveOnly)?
    .ok_or_else(|| CoreError::not_found("chore", chore_id).into())
}

pub fn list_chores(conn: &Connection, house_id: Uuid) -> Result<Vec<Chore>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM chores
     WHERE house_id = ?1 AND deleted_at IS NULL
     ORDER BY created_at",
    RawChore::COLUMNS
  ))?;
  let raws = stmt
    .query_map(params![encode_uuid(house_id)], RawChore::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawChore::into_chore).collect()
}

/// Apply a non-empty changeset to a chore row, bumping its version. The
/// caller has already version-checked; an empty changeset is a no-op and
/// leaves the version alone.
pub fn apply_chore_changes(
  conn: &Connection,
  chore: &mut Chore,
  changes: &ChoreChanges,
) -> Result<()> {
  if changes.is_empty() {
    return Ok(());
  }

  if let Some(name) = &changes.name {
    chore.name = name.clone();
  }
  if let Some(description) = &changes.description {
    chore.description = Some(description.clone());
  }
  if let Some(color) = &changes.color {
    chore.color = Some(color.clone());
  }

  conn.execute(
    "UPDATE chores
     SET name = ?2, description = ?3, color = ?4, version = version + 1
     WHERE chore_id = ?1",
    params![
      encode_uuid(chore.chore_id),
      chore.name,
      chore.description,
      chore.color,
    ],
  )?;
  chore.version += 1;
  Ok(())
}

/// Soft-delete a chore, its schedules, and their occurrences.
pub fn soft_delete_chore(
  conn: &Connection,
  chore_id: Uuid,
  now: DateTime<Utc>,
) -> Result<()> {
  let id = encode_uuid(chore_id);
  let at = encode_dt(now);

  conn.execute(
    "UPDATE chore_occurrences SET deleted_at = ?2, version = version + 1
     WHERE deleted_at IS NULL AND schedule_id IN (
       SELECT schedule_id FROM chore_schedules WHERE chore_id = ?1)",
    params![id, at],
  )?;
  conn.execute(
    "UPDATE chore_schedules SET deleted_at = ?2, version = version + 1
     WHERE deleted_at IS NULL AND chore_id = ?1",
    params![id, at],
  )?;
  conn.execute(
    "UPDATE chores SET deleted_at = ?2, version = version + 1
     WHERE deleted_at IS NULL AND chore_id = ?1",
    params![id, at],
  )?;
  Ok(())
}
