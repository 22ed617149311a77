//! Handlers for `/houses/:house_id/chores` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use rota_core::{
  chore::{Chore, ChoreChanges, NewChore},
  store::ChoreStore,
  version::ClientVersion,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::ActingUser,
  houses::{VersionParams, require_membership},
};

/// `GET /houses/:house_id/chores`
pub async fn list<S: ChoreStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
  Path(house_id): Path<Uuid>,
) -> Result<Json<Vec<Chore>>, ApiError> {
  require_membership(store.as_ref(), house_id, user_id).await?;
  Ok(Json(store.list_chores(house_id).await?))
}

/// `POST /houses/:house_id/chores` — returns 201 + the chore.
pub async fn create<S: ChoreStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
  Path(house_id): Path<Uuid>,
  Json(body): Json<NewChore>,
) -> Result<impl IntoResponse, ApiError> {
  require_membership(store.as_ref(), house_id, user_id).await?;
  let chore = store.create_chore(house_id, body).await?;
  Ok((StatusCode::CREATED, Json(chore)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateChoreBody {
  #[serde(flatten)]
  pub changes: ChoreChanges,
  pub version: Option<ClientVersion>,
}

/// `PATCH /houses/:house_id/chores/:chore_id`
pub async fn update<S: ChoreStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
  Path((house_id, chore_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<UpdateChoreBody>,
) -> Result<Json<Chore>, ApiError> {
  require_membership(store.as_ref(), house_id, user_id).await?;
  let chore = store
    .update_chore(house_id, chore_id, body.changes, body.version)
    .await?;
  Ok(Json(chore))
}

/// `DELETE /houses/:house_id/chores/:chore_id?version=<n>`
pub async fn delete<S: ChoreStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
  Path((house_id, chore_id)): Path<(Uuid, Uuid)>,
  Query(params): Query<VersionParams>,
) -> Result<StatusCode, ApiError> {
  require_membership(store.as_ref(), house_id, user_id).await?;
  store.delete_chore(house_id, chore_id, params.version).await?;
  Ok(StatusCode::NO_CONTENT)
}
