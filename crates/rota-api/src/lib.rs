//! JSON REST API for Rota.
//!
//! Exposes an axum [`Router`] backed by any [`rota_core::store::ChoreStore`].
//! The acting user arrives in the `x-user-id` header; authenticating that
//! header is the caller's responsibility (gateway, reverse proxy, or the
//! server binary's own middleware).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rota_api::api_router(store.clone()))
//! ```

pub mod chores;
pub mod error;
pub mod extract;
pub mod houses;
pub mod occurrences;
pub mod schedules;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post, put},
};
use rota_core::store::ChoreStore;

pub use error::ApiError;
pub use extract::ActingUser;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S: ChoreStore>(store: Arc<S>) -> Router<()> {
  Router::new()
    // Houses and membership
    .route("/houses", post(houses::create::<S>))
    .route(
      "/houses/{house_id}",
      get(houses::get_one::<S>).delete(houses::delete::<S>),
    )
    .route(
      "/houses/{house_id}/members",
      get(houses::list_members::<S>).post(houses::add_member::<S>),
    )
    // Chores
    .route(
      "/houses/{house_id}/chores",
      get(chores::list::<S>).post(chores::create::<S>),
    )
    .route(
      "/houses/{house_id}/chores/{chore_id}",
      patch(chores::update::<S>).delete(chores::delete::<S>),
    )
    // Schedules
    .route(
      "/houses/{house_id}/chores/{chore_id}/schedules",
      get(schedules::list::<S>).post(schedules::create::<S>),
    )
    .route(
      "/houses/{house_id}/chores/{chore_id}/schedules/{schedule_id}",
      patch(schedules::update::<S>).delete(schedules::delete::<S>),
    )
    // Occurrences
    .route(
      "/houses/{house_id}/chores/{chore_id}/schedules/{schedule_id}/occurrences/{occurrence_id}",
      put(occurrences::edit::<S>),
    )
    .route("/houses/{house_id}/occurrences", get(occurrences::list::<S>))
    .route(
      "/houses/{house_id}/occurrences/{occurrence_id}",
      patch(occurrences::update::<S>),
    )
    .with_state(store)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
