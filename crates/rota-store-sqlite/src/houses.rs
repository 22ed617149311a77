//! Connection-level operations on houses and memberships.
//!
//! Functions here run inside a `tokio_rusqlite` call, either on a bare
//! connection or within a transaction (a [`rusqlite::Transaction`] derefs to
//! [`rusqlite::Connection`], so both work).

use chrono::{DateTime, Utc};
use rota_core::{
  Error as CoreError,
  house::{House, HouseMember, HouseRole},
  store::Scope,
};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use crate::{
  Result,
  encode::{RawHouse, RawMember, decode_role, encode_dt, encode_role, encode_uuid},
};

pub fn insert_house(conn: &Connection, house: &House) -> Result<()> {
  conn.execute(
    "INSERT INTO houses (house_id, name, address, max_members, version, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      encode_uuid(house.house_id),
      house.name,
      house.address,
      house.max_members,
      house.version,
      encode_dt(house.created_at),
    ],
  )?;
  Ok(())
}

pub fn get_house(
  conn: &Connection,
  house_id: Uuid,
  scope: Scope,
) -> Result<Option<House>> {
  let raw = conn
    .query_row(
      &format!("SELECT {} FROM houses WHERE house_id = ?1", RawHouse::COLUMNS),
      params![encode_uuid(house_id)],
      RawHouse::from_row,
    )
    .optional()?;

  match raw {
    Some(raw) => {
      let house = raw.into_house()?;
      if scope == Scope::ActiveOnly && house.deleted_at.is_some() {
        return Ok(None);
      }
      Ok(Some(house))
    }
    None => Ok(None),
  }
}

/// Fetch an active house or fail with NotFound.
pub fn require_house(conn: &Connection, house_id: Uuid) -> Result<House> {
  get_house(conn, house_id, Scope::ActiveOnly)?
    .ok_or_else(|| CoreError::not_found("house", house_id).into())
}

pub fn insert_member(conn: &Connection, member: &HouseMember) -> Result<()> {
  conn.execute(
    "INSERT INTO house_members (member_id, house_id, user_id, role, joined_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      encode_uuid(member.member_id),
      encode_uuid(member.house_id),
      encode_uuid(member.user_id),
      encode_role(member.role),
      encode_dt(member.joined_at),
    ],
  )?;
  Ok(())
}

pub fn member_count(conn: &Connection, house_id: Uuid) -> Result<i64> {
  Ok(conn.query_row(
    "SELECT COUNT(*) FROM house_members WHERE house_id = ?1",
    params![encode_uuid(house_id)],
    |row| row.get(0),
  )?)
}

pub fn list_members(
  conn: &Connection,
  house_id: Uuid,
) -> Result<Vec<HouseMember>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM house_members WHERE house_id = ?1 ORDER BY joined_at",
    RawMember::COLUMNS
  ))?;
  let raws = stmt
    .query_map(params![encode_uuid(house_id)], RawMember::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawMember::into_member).collect()
}

pub fn role_of(
  conn: &Connection,
  house_id: Uuid,
  user_id: Uuid,
) -> Result<Option<HouseRole>> {
  let role: Option<String> = conn
    .query_row(
      "SELECT role FROM house_members WHERE house_id = ?1 AND user_id = ?2",
      params![encode_uuid(house_id), encode_uuid(user_id)],
      |row| row.get(0),
    )
    .optional()?;
  role.as_deref().map(decode_role).transpose()
}

/// Fail with Forbidden unless the user belongs to the house.
pub fn require_member(
  conn: &Connection,
  house_id: Uuid,
  user_id: Uuid,
) -> Result<HouseRole> {
  role_of(conn, house_id, user_id)?.ok_or_else(|| {
    CoreError::Forbidden("You do not belong to this house.".to_owned()).into()
  })
}

/// Soft-delete a house and everything underneath it. Each statement only
/// touches rows not already deleted, so earlier deletions keep their
/// original timestamps.
pub fn soft_delete_house(
  conn: &Connection,
  house_id: Uuid,
  now: DateTime<Utc>,
) -> Result<()> {
  let id = encode_uuid(house_id);
  let at = encode_dt(now);

  conn.execute(
    "UPDATE chore_occurrences SET deleted_at = ?2, version = version + 1
     WHERE deleted_at IS NULL AND schedule_id IN (
       SELECT s.schedule_id FROM chore_schedules s
       JOIN chores c ON c.chore_id = s.chore_id
       WHERE c.house_id = ?1)",
    params![id, at],
  )?;
  conn.execute(
    "UPDATE chore_schedules SET deleted_at = ?2, version = version + 1
     WHERE deleted_at IS NULL AND chore_id IN (
       SELECT chore_id FROM chores WHERE house_id = ?1)",
    params![id, at],
  )?;
  conn.execute(
    "UPDATE chores SET deleted_at = ?2, version = version + 1
     WHERE deleted_at IS NULL AND house_id = ?1",
    params![id, at],
  )?;
  conn.execute(
    "UPDATE houses SET deleted_at = ?2, version = version + 1
     WHERE deleted_at IS NULL AND house_id = ?1",
    params![id, at],
  )?;
  Ok(())
}
