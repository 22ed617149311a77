//! Error taxonomy for `rota-core`.
//!
//! The variants map one-to-one onto HTTP statuses at the API boundary:
//! NotFound → 404, Forbidden → 403, Conflict → 409, Validation → 400,
//! Storage → 500. The taxonomy is part of the store contract, so the
//! [`crate::store::ChoreStore`] trait is pinned to this type.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// The referenced entity does not exist or is outside the caller's scope
  /// (e.g. a chore looked up under the wrong house).
  #[error("{entity} {id} not found")]
  NotFound { entity: &'static str, id: Uuid },

  #[error("forbidden: {0}")]
  Forbidden(String),

  /// Optimistic-concurrency failure. `entity` names the first entity whose
  /// version check failed, in the fixed house→chore→schedule→occurrence
  /// order; `message` carries the human-readable cause.
  #[error("conflict on {entity}: {message}")]
  Conflict { entity: String, message: String },

  #[error("validation error: {0}")]
  Validation(String),

  #[error("storage error: {0}")]
  Storage(String),
}

impl Error {
  pub fn not_found(entity: &'static str, id: Uuid) -> Self {
    Self::NotFound { entity, id }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
