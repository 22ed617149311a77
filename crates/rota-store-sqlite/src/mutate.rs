//! Transaction bodies for the guarded mutations: the direct occurrence
//! update and the composite chore/schedule/occurrence edit.
//!
//! Everything here runs inside a single transaction. Version checks happen
//! in the fixed house → chore → schedule → occurrence order, before any
//! write, so a rejected edit leaves no partial state behind.

use chrono::{DateTime, Utc};
use rota_core::{
  Error as CoreError,
  occurrence::{OccurrenceChanges, OccurrenceUpdate},
  schedule::ChoreSchedule,
  store::{EditBundle, EditOutcome, Scope},
  version::check_version,
};
use rusqlite::Connection;
use uuid::Uuid;

use crate::{Result, chores, houses, occurrences, schedules};

/// Apply a direct occurrence edit: authorization, version check, field
/// update, and the completion chain when the edit flips `completed`
/// false → true.
pub fn update_occurrence_tx(
  conn: &Connection,
  acting_user_id: Uuid,
  house_id: Uuid,
  occurrence_id: Uuid,
  changes: &OccurrenceChanges,
  client_version: Option<&rota_core::version::ClientVersion>,
  now: DateTime<Utc>,
) -> Result<OccurrenceUpdate> {
  houses::require_house(conn, house_id)?;
  let role = houses::require_member(conn, house_id, acting_user_id)?;

  let mut occurrence =
    occurrences::require_occurrence(conn, house_id, occurrence_id)?;
  let schedule = schedules::get_schedule(
    conn,
    house_id,
    occurrence.schedule_id,
    Scope::IncludingDeleted,
  )?;
  if let Some(schedule) = &schedule {
    schedules::require_editor(schedule, acting_user_id, role)?;
  }
  check_version(occurrence.version, client_version, "Chore occurrence")?;

  if changes.is_empty() {
    return Ok(OccurrenceUpdate { occurrence, chained: None });
  }

  let edge = occurrence.apply(changes, now);
  occurrences::update_occurrence_row(conn, &occurrence)?;
  occurrence.version += 1;

  let chained = match (edge, &schedule) {
    (true, Some(schedule)) => {
      schedules::chain_next(conn, schedule, occurrence.due_date, now)?
    }
    _ => None,
  };

  Ok(OccurrenceUpdate { occurrence, chained })
}

/// Apply a composite edit across a chore, one of its schedules, and one of
/// that schedule's occurrences.
///
/// Supplying an assignee other than the schedule's current one reassigns the
/// chore: the old schedule (and its remaining occurrences) is retired and a
/// fresh schedule takes over, carrying the edited occurrence with it. Timing
/// edits on the current assignee reconcile in place: pending occurrences
/// from the edited one onward are discarded and regenerated.
pub fn edit_bundle_tx(
  conn: &Connection,
  bundle: &EditBundle,
  horizon: DateTime<Utc>,
  now: DateTime<Utc>,
) -> Result<EditOutcome> {
  // Resolve the full chain; any miss is a NotFound before any version talk.
  let house = houses::require_house(conn, bundle.house_id)?;
  let role = houses::require_member(conn, bundle.house_id, bundle.acting_user_id)?;

  let mut chore = chores::require_chore(conn, bundle.house_id, bundle.chore_id)?;
  let mut schedule =
    schedules::require_schedule(conn, bundle.house_id, bundle.schedule_id)?;
  if schedule.chore_id != chore.chore_id {
    return Err(CoreError::not_found("schedule", bundle.schedule_id).into());
  }
  let mut occurrence =
    occurrences::require_occurrence(conn, bundle.house_id, bundle.occurrence_id)?;
  if occurrence.schedule_id != schedule.schedule_id {
    return Err(CoreError::not_found("occurrence", bundle.occurrence_id).into());
  }

  schedules::require_editor(&schedule, bundle.acting_user_id, role)?;

  check_version(house.version, bundle.versions.house.as_ref(), "House")?;
  check_version(chore.version, bundle.versions.chore.as_ref(), "Chore")?;
  check_version(
    schedule.version,
    bundle.versions.schedule.as_ref(),
    "Chore schedule",
  )?;
  check_version(
    occurrence.version,
    bundle.versions.occurrence.as_ref(),
    "Chore occurrence",
  )?;

  chores::apply_chore_changes(conn, &mut chore, &bundle.chore)?;

  let occ_changes = OccurrenceChanges {
    due_date:          bundle.due_date,
    completed:         bundle.completed,
    notification_sent: None,
  };

  let reassign_to = bundle
    .assignee_id
    .filter(|target| *target != schedule.assignee_user_id);

  let (schedule, occurrence, chained) = match reassign_to {
    Some(target) => {
      if houses::role_of(conn, bundle.house_id, target)?.is_none() {
        return Err(
          CoreError::Validation(
            "Assignee is not a member of this house.".to_owned(),
          )
          .into(),
        );
      }

      let new_schedule = ChoreSchedule {
        schedule_id:          Uuid::new_v4(),
        chore_id:             chore.chore_id,
        assignee_user_id:     target,
        start_date:           bundle.start_date.unwrap_or(schedule.start_date),
        repeat_delta:         bundle
          .repeat_delta
          .clone()
          .unwrap_or_else(|| schedule.repeat_delta.clone()),
        generate_occurrences: schedule.generate_occurrences,
        version:              1,
        created_at:           now,
        deleted_at:           None,
      };
      schedules::insert_schedule(conn, &new_schedule)?;

      // Move the edited occurrence onto the new schedule, then retire the
      // old one; the cascade only reaches rows still pointing at it.
      let edge = occurrence.apply(&occ_changes, now);
      occurrence.schedule_id = new_schedule.schedule_id;
      occurrences::update_occurrence_row(conn, &occurrence)?;
      occurrence.version += 1;

      schedules::soft_delete_schedule(conn, schedule.schedule_id, now)?;

      let chained = if edge {
        schedules::chain_next(conn, &new_schedule, occurrence.due_date, now)?
      } else {
        None
      };
      schedules::fill_horizon(conn, &new_schedule, horizon, now)?;

      (new_schedule, occurrence, chained)
    }
    None => {
      let timing_changed =
        bundle.start_date.is_some() || bundle.repeat_delta.is_some();
      let pre_edit_due = occurrence.due_date;

      let edge = occurrence.apply(&occ_changes, now);
      if !occ_changes.is_empty() {
        occurrences::update_occurrence_row(conn, &occurrence)?;
        occurrence.version += 1;
      }

      if timing_changed {
        schedules::discard_pending(
          conn,
          schedule.schedule_id,
          pre_edit_due,
          Some(occurrence.occurrence_id),
          now,
        )?;
        if let Some(start_date) = bundle.start_date {
          schedule.start_date = start_date;
        }
        if let Some(delta) = &bundle.repeat_delta {
          schedule.repeat_delta = delta.clone();
        }
        schedules::update_schedule_row(conn, &schedule)?;
        schedule.version += 1;
      }

      let chained = if edge {
        schedules::chain_next(conn, &schedule, occurrence.due_date, now)?
      } else {
        None
      };
      if timing_changed {
        schedules::fill_horizon(conn, &schedule, horizon, now)?;
      }

      (schedule, occurrence, chained)
    }
  };

  Ok(EditOutcome { chore, schedule, occurrence, chained })
}
