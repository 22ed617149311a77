//! Handlers for schedule endpoints.
//!
//! Client-facing datetimes arrive as strings: RFC 3339, or a naive ISO form
//! taken as UTC. Responses carry the derived `repeat_label` alongside the
//! raw delta.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use rota_core::{
  datetime::parse_client_datetime,
  occurrence::ChoreOccurrence,
  repeat::RepeatDelta,
  schedule::{NewSchedule, ScheduleView},
  store::ChoreStore,
  version::ClientVersion,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::ActingUser,
  houses::{VersionParams, require_membership},
};

/// `GET /houses/:house_id/chores/:chore_id/schedules`
pub async fn list<S: ChoreStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
  Path((house_id, chore_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<ScheduleView>>, ApiError> {
  require_membership(store.as_ref(), house_id, user_id).await?;
  let schedules = store.list_schedules(house_id, chore_id).await?;
  Ok(Json(schedules.into_iter().map(ScheduleView::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct NewScheduleBody {
  pub assignee_user_id:     Uuid,
  pub start_date:           String,
  #[serde(default)]
  pub repeat_delta:         RepeatDelta,
  pub generate_occurrences: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CreatedSchedule {
  pub schedule:  ScheduleView,
  pub generated: Vec<ChoreOccurrence>,
}

/// `POST /houses/:house_id/chores/:chore_id/schedules` — returns 201 + the
/// schedule and its freshly generated occurrences.
pub async fn create<S: ChoreStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
  Path((house_id, chore_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<NewScheduleBody>,
) -> Result<impl IntoResponse, ApiError> {
  require_membership(store.as_ref(), house_id, user_id).await?;

  let start_date = parse_client_datetime(&body.start_date)?;
  let (schedule, generated) = store
    .create_schedule(house_id, chore_id, NewSchedule {
      assignee_user_id: body.assignee_user_id,
      start_date,
      repeat_delta: body.repeat_delta,
      generate_occurrences: body.generate_occurrences.unwrap_or(true),
    })
    .await?;

  Ok((
    StatusCode::CREATED,
    Json(CreatedSchedule { schedule: ScheduleView::from(schedule), generated }),
  ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateScheduleBody {
  pub start_date:           Option<String>,
  pub repeat_delta:         Option<RepeatDelta>,
  pub generate_occurrences: Option<bool>,
  pub version:              Option<ClientVersion>,
}

/// `PATCH /houses/:house_id/chores/:chore_id/schedules/:schedule_id` —
/// timing changes discard pending occurrences and regenerate under the new
/// parameters. Owner or assignee only; the store enforces it.
pub async fn update<S: ChoreStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
  Path((house_id, chore_id, schedule_id)): Path<(Uuid, Uuid, Uuid)>,
  Json(body): Json<UpdateScheduleBody>,
) -> Result<Json<ScheduleView>, ApiError> {
  let start_date = body
    .start_date
    .as_deref()
    .map(parse_client_datetime)
    .transpose()?;
  let schedule = store
    .update_schedule(
      user_id,
      house_id,
      chore_id,
      schedule_id,
      start_date,
      body.repeat_delta,
      body.generate_occurrences,
      body.version,
    )
    .await?;
  Ok(Json(ScheduleView::from(schedule)))
}

/// `DELETE /houses/:house_id/chores/:chore_id/schedules/:schedule_id?version=<n>`
pub async fn delete<S: ChoreStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
  Path((house_id, chore_id, schedule_id)): Path<(Uuid, Uuid, Uuid)>,
  Query(params): Query<VersionParams>,
) -> Result<StatusCode, ApiError> {
  store
    .delete_schedule(user_id, house_id, chore_id, schedule_id, params.version)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}
