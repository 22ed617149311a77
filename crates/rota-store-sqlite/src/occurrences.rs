//! Connection-level operations on occurrences.

use chrono::{DateTime, Utc};
use rota_core::{
  Error as CoreError,
  occurrence::{ChoreOccurrence, OccurrenceView},
  store::Scope,
};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    RawChore, RawOccurrence, RawOccurrenceView, encode_dt, encode_due,
    encode_uuid,
  },
};

pub fn insert_occurrence(
  conn: &Connection,
  occurrence: &ChoreOccurrence,
) -> Result<()> {
  conn.execute(
    "INSERT INTO chore_occurrences (
       occurrence_id, schedule_id, due_date, completed, completed_at,
       notification_sent, notification_sent_at, version, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    params![
      encode_uuid(occurrence.occurrence_id),
      encode_uuid(occurrence.schedule_id),
      encode_due(occurrence.due_date),
      occurrence.completed,
      occurrence.completed_at.map(encode_dt),
      occurrence.notification_sent,
      occurrence.notification_sent_at.map(encode_dt),
      occurrence.version,
      encode_dt(occurrence.created_at),
    ],
  )?;
  Ok(())
}

/// True when a row (deleted or not) already occupies the slot. This is the
/// duplicate check behind idempotent generation.
pub fn exists_at(
  conn: &Connection,
  schedule_id: Uuid,
  due: DateTime<Utc>,
) -> Result<bool> {
  let hit: Option<i64> = conn
    .query_row(
      "SELECT 1 FROM chore_occurrences
       WHERE schedule_id = ?1 AND due_date = ?2",
      params![encode_uuid(schedule_id), encode_due(due)],
      |row| row.get(0),
    )
    .optional()?;
  Ok(hit.is_some())
}

pub fn get_occurrence(
  conn: &Connection,
  house_id: Uuid,
  occurrence_id: Uuid,
  scope: Scope,
) -> Result<Option<ChoreOccurrence>> {
  let columns = RawOccurrence::COLUMNS
    .split(", ")
    .map(|c| format!("o.{c}"))
    .collect::<Vec<_>>()
    .join(", ");

  let raw = conn
    .query_row(
      &format!(
        "SELECT {columns} FROM chore_occurrences o
         JOIN chore_schedules s ON s.schedule_id = o.schedule_id
         JOIN chores c ON c.chore_id = s.chore_id
         WHERE o.occurrence_id = ?1 AND c.house_id = ?2"
      ),
      params![encode_uuid(occurrence_id), encode_uuid(house_id)],
      RawOccurrence::from_row,
    )
    .optional()?;

  match raw {
    Some(raw) => {
      let occurrence = raw.into_occurrence()?;
      if scope == Scope::ActiveOnly && occurrence.deleted_at.is_some() {
        return Ok(None);
      }
      Ok(Some(occurrence))
    }
    None => Ok(None),
  }
}

/// Fetch an active occurrence under the given house or fail with NotFound.
pub fn require_occurrence(
  conn: &Connection,
  house_id: Uuid,
  occurrence_id: Uuid,
) -> Result<ChoreOccurrence> {
  get_occurrence(conn, house_id, occurrence_id, Scope::ActiveOnly)?
    .ok_or_else(|| CoreError::not_found("occurrence", occurrence_id).into())
}

/// Rewrite an occurrence row from its in-memory state, bumping its version.
pub fn update_occurrence_row(
  conn: &Connection,
  occurrence: &ChoreOccurrence,
) -> Result<()> {
  conn.execute(
    "UPDATE chore_occurrences
     SET schedule_id = ?2, due_date = ?3, completed = ?4, completed_at = ?5,
         notification_sent = ?6, notification_sent_at = ?7,
         version = version + 1
     WHERE occurrence_id = ?1",
    params![
      encode_uuid(occurrence.occurrence_id),
      encode_uuid(occurrence.schedule_id),
      encode_due(occurrence.due_date),
      occurrence.completed,
      occurrence.completed_at.map(encode_dt),
      occurrence.notification_sent,
      occurrence.notification_sent_at.map(encode_dt),
    ],
  )?;
  Ok(())
}

const VIEW_SELECT: &str = "SELECT
    o.occurrence_id, o.schedule_id, o.due_date, o.completed, o.completed_at,
    o.notification_sent, o.notification_sent_at, o.version, o.created_at,
    o.deleted_at,
    c.chore_id, c.house_id, c.name, c.description, c.color,
    c.version, c.created_at, c.deleted_at,
    s.assignee_user_id, s.repeat_delta
  FROM chore_occurrences o
  JOIN chore_schedules s ON s.schedule_id = o.schedule_id
  JOIN chores c ON c.chore_id = s.chore_id";

fn view_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawOccurrenceView> {
  Ok(RawOccurrenceView {
    occurrence:       RawOccurrence {
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
    },
    chore:            RawChore {
      chore_id:    row.get(10)?,
      house_id:    row.get(11)?,
      name:        row.get(12)?,
      description: row.get(13)?,
      color:       row.get(14)?,
      version:     row.get(15)?,
      created_at:  row.get(16)?,
      deleted_at:  row.get(17)?,
    },
    assignee_user_id: row.get(18)?,
    repeat_delta:     row.get(19)?,
  })
}

/// A house's occurrences joined with chore context, due in `[from, to)`,
/// ordered by due date. Only active rows at every level.
pub fn list_views(
  conn: &Connection,
  house_id: Uuid,
  from: Option<DateTime<Utc>>,
  to: Option<DateTime<Utc>>,
) -> Result<Vec<OccurrenceView>> {
  let mut stmt = conn.prepare(&format!(
    "{VIEW_SELECT}
     WHERE c.house_id = ?1
       AND o.deleted_at IS NULL
       AND s.deleted_at IS NULL
       AND c.deleted_at IS NULL
       AND (?2 IS NULL OR o.due_date >= ?2)
       AND (?3 IS NULL OR o.due_date < ?3)
     ORDER BY o.due_date"
  ))?;
  let raws = stmt
    .query_map(
      params![
        encode_uuid(house_id),
        from.map(encode_due),
        to.map(encode_due),
      ],
      view_from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawOccurrenceView::into_view).collect()
}

/// Incomplete, un-notified occurrences due within `[lower, upper]`, across
/// all houses. Feeds the reminder scan.
pub fn due_for_reminder(
  conn: &Connection,
  lower: DateTime<Utc>,
  upper: DateTime<Utc>,
) -> Result<Vec<OccurrenceView>> {
  let mut stmt = conn.prepare(&format!(
    "{VIEW_SELECT}
     WHERE o.completed = 0
       AND o.notification_sent = 0
       AND o.due_date >= ?1 AND o.due_date <= ?2
       AND o.deleted_at IS NULL
       AND s.deleted_at IS NULL
       AND c.deleted_at IS NULL
     ORDER BY o.due_date"
  ))?;
  let raws = stmt
    .query_map(params![encode_due(lower), encode_due(upper)], view_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawOccurrenceView::into_view).collect()
}

/// Flag an occurrence as notified. Deliberately version-check-free: the
/// reminder scan is a system actor and must not turn user edits into
/// conflicts. The version still bumps so clients see the write.
pub fn mark_notification_sent(
  conn: &Connection,
  occurrence_id: Uuid,
  now: DateTime<Utc>,
) -> Result<()> {
  conn.execute(
    "UPDATE chore_occurrences
     SET notification_sent = 1, notification_sent_at = ?2,
         version = version + 1
     WHERE occurrence_id = ?1 AND deleted_at IS NULL
       AND notification_sent = 0",
    params![encode_uuid(occurrence_id), encode_dt(now)],
  )?;
  Ok(())
}
