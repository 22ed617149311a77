//! Handlers for `/houses` and membership endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/houses` | Body: [`NewHouseBody`]; caller becomes owner |
//! | `GET`    | `/houses/:house_id` | Members only |
//! | `DELETE` | `/houses/:house_id` | Owner only; `?version=` required |
//! | `GET`    | `/houses/:house_id/members` | Members only |
//! | `POST`   | `/houses/:house_id/members` | Owner only; body: [`AddMemberBody`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use rota_core::{
  house::{DEFAULT_MAX_MEMBERS, House, HouseMember, HouseRole, NewHouse},
  store::ChoreStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::ApiError, extract::ActingUser};

/// Resolve the caller's role in a house, rejecting outsiders. Handlers that
/// pass the acting user into the store skip this; everything else gates here.
pub(crate) async fn require_membership<S: ChoreStore>(
  store: &S,
  house_id: Uuid,
  user_id: Uuid,
) -> Result<HouseRole, ApiError> {
  store.role_of(house_id, user_id).await?.ok_or_else(|| {
    ApiError::Forbidden("You do not belong to this house.".to_owned())
  })
}

/// `?version=` carrier for DELETE endpoints, which take no body.
#[derive(Debug, Deserialize)]
pub struct VersionParams {
  pub version: Option<rota_core::version::ClientVersion>,
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewHouseBody {
  pub name:        String,
  pub address:     Option<String>,
  pub max_members: Option<i64>,
}

/// `POST /houses` — returns 201 + the house; the caller is seeded as owner.
pub async fn create<S: ChoreStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
  Json(body): Json<NewHouseBody>,
) -> Result<impl IntoResponse, ApiError> {
  let max_members = body.max_members.unwrap_or(DEFAULT_MAX_MEMBERS);
  if max_members < 1 {
    return Err(ApiError::BadRequest(
      "max_members must be at least 1".to_owned(),
    ));
  }

  let house = store
    .create_house(user_id, NewHouse {
      name: body.name,
      address: body.address,
      max_members,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(house)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /houses/:house_id`
pub async fn get_one<S: ChoreStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
  Path(house_id): Path<Uuid>,
) -> Result<Json<House>, ApiError> {
  require_membership(store.as_ref(), house_id, user_id).await?;
  Ok(Json(store.get_house(house_id).await?))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /houses/:house_id?version=<n>` — owner only; cascades.
pub async fn delete<S: ChoreStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
  Path(house_id): Path<Uuid>,
  Query(params): Query<VersionParams>,
) -> Result<StatusCode, ApiError> {
  store.delete_house(user_id, house_id, params.version).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Members ─────────────────────────────────────────────────────────────────

/// `GET /houses/:house_id/members`
pub async fn list_members<S: ChoreStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
  Path(house_id): Path<Uuid>,
) -> Result<Json<Vec<HouseMember>>, ApiError> {
  require_membership(store.as_ref(), house_id, user_id).await?;
  Ok(Json(store.list_members(house_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddMemberBody {
  pub user_id: Uuid,
  pub role:    Option<HouseRole>,
}

/// `POST /houses/:house_id/members` — owner only; returns 201 + membership.
pub async fn add_member<S: ChoreStore>(
  State(store): State<Arc<S>>,
  ActingUser(user_id): ActingUser,
  Path(house_id): Path<Uuid>,
  Json(body): Json<AddMemberBody>,
) -> Result<impl IntoResponse, ApiError> {
  let role = require_membership(store.as_ref(), house_id, user_id).await?;
  if role != HouseRole::Owner {
    return Err(ApiError::Forbidden(
      "Only the owner can add members.".to_owned(),
    ));
  }

  let member = store
    .add_member(house_id, body.user_id, body.role.unwrap_or(HouseRole::Member))
    .await?;
  Ok((StatusCode::CREATED, Json(member)))
}
