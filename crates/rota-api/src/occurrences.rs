//! Handlers for occurrence endpoints, including the composite edit.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use rota_core::{
  chore::ChoreChanges,
  datetime::parse_client_datetime,
  occurrence::{OccurrenceChanges, OccurrenceUpdate, OccurrenceView},
  repeat::RepeatDelta,
  store::{BundleVersions, ChoreStore, EditBundle, EditOutcome},
  version::ClientVersion,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError, extract::ActingUser, houses::require_membership,
};

// ─── Dashboard listing ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Inclusive lower bound on due date.
  pub from: Option<String>,
  /// Exclusive upper bound on due date.
  pub to:   Option<String>,
}

/// `GET /houses/:house_id/occurrences?from=...&to=...`
pub async fn list<S: ChoreStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
  Path(house_id): Path<Uuid>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<OccurrenceView>>, ApiError> {
  require_membership(store.as_ref(), house_id, user_id).await?;

  let from = params.from.as_deref().map(parse_client_datetime).transpose()?;
  let to = params.to.as_deref().map(parse_client_datetime).transpose()?;
  Ok(Json(store.list_occurrences(house_id, from, to).await?))
}

// ─── Direct update ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateOccurrenceBody {
  pub due_date:          Option<String>,
  pub completed:         Option<bool>,
  pub notification_sent: Option<bool>,
  pub version:           Option<ClientVersion>,
}

/// `PATCH /houses/:house_id/occurrences/:occurrence_id` — completing an
/// occurrence chains the next one on a repeating schedule.
pub async fn update<S: ChoreStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
  Path((house_id, occurrence_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<UpdateOccurrenceBody>,
) -> Result<Json<OccurrenceUpdate>, ApiError> {
  let due_date = body
    .due_date
    .as_deref()
    .map(parse_client_datetime)
    .transpose()?;
  let update = store
    .update_occurrence(
      user_id,
      house_id,
      occurrence_id,
      OccurrenceChanges {
        due_date,
        completed: body.completed,
        notification_sent: body.notification_sent,
      },
      body.version,
    )
    .await?;
  Ok(Json(update))
}

// ─── Composite edit ──────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct BundleVersionsBody {
  pub house:      Option<ClientVersion>,
  pub chore:      Option<ClientVersion>,
  pub schedule:   Option<ClientVersion>,
  pub occurrence: Option<ClientVersion>,
}

/// JSON body for the composite edit. Every section is optional; versions
/// are required for each entity the edit touches.
#[derive(Debug, Deserialize)]
pub struct EditBundleBody {
  #[serde(default)]
  pub versions:     BundleVersionsBody,
  #[serde(default)]
  pub chore:        ChoreChanges,
  /// Assigning a different user reassigns the chore: the schedule is
  /// retired and a fresh one is created for the new assignee.
  pub assignee_id:  Option<Uuid>,
  pub start_date:   Option<String>,
  pub repeat_delta: Option<RepeatDelta>,
  pub due_date:     Option<String>,
  pub completed:    Option<bool>,
}

/// `PUT /houses/:house_id/chores/:chore_id/schedules/:schedule_id/occurrences/:occurrence_id`
///
/// Applies chore, schedule, and occurrence edits in one transaction under a
/// single set of version checks.
pub async fn edit<S: ChoreStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
  Path((house_id, chore_id, schedule_id, occurrence_id)): Path<(
    Uuid,
    Uuid,
    Uuid,
    Uuid,
  )>,
  Json(body): Json<EditBundleBody>,
) -> Result<Json<EditOutcome>, ApiError> {
  let start_date = body
    .start_date
    .as_deref()
    .map(parse_client_datetime)
    .transpose()?;
  let due_date = body
    .due_date
    .as_deref()
    .map(parse_client_datetime)
    .transpose()?;

  let outcome = store
    .edit_bundle(EditBundle {
      acting_user_id: user_id,
      house_id,
      chore_id,
      schedule_id,
      occurrence_id,
      versions: BundleVersions {
        house:      body.versions.house,
        chore:      body.versions.chore,
        schedule:   body.versions.schedule,
        occurrence: body.versions.occurrence,
      },
      chore: body.chore,
      assignee_id: body.assignee_id,
      start_date,
      repeat_delta: body.repeat_delta,
      due_date,
      completed: body.completed,
    })
    .await?;
  Ok(Json(outcome))
}
