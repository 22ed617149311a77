//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict on {entity}: {message}")]
  Conflict { entity: String, message: String },

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<rota_core::Error> for ApiError {
  fn from(err: rota_core::Error) -> Self {
    use rota_core::Error as E;
    match err {
      E::NotFound { .. } => ApiError::NotFound(err.to_string()),
      E::Forbidden(msg) => ApiError::Forbidden(msg),
      E::Conflict { entity, message } => ApiError::Conflict { entity, message },
      E::Validation(msg) => ApiError::BadRequest(msg),
      E::Storage(msg) => ApiError::Internal(msg),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Unauthorized(m) => {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": m })))
          .into_response()
      }
      ApiError::Forbidden(m) => {
        (StatusCode::FORBIDDEN, Json(json!({ "error": m }))).into_response()
      }
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Conflict { entity, message } => (
        StatusCode::CONFLICT,
        Json(json!({ "error": message, "entity": entity })),
      )
        .into_response(),
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Internal(m) => {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": m })))
          .into_response()
      }
    }
  }
}
