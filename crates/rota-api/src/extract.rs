//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

/// The authenticated user, taken from the `x-user-id` header.
///
/// Authentication itself happens upstream (a gateway or reverse proxy);
/// this layer trusts the header and only insists it is present and a valid
/// UUID.
#[derive(Debug, Clone, Copy)]
pub struct ActingUser(pub Uuid);

impl<S> FromRequestParts<S> for ActingUser
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let header = parts
      .headers
      .get("x-user-id")
      .and_then(|v| v.to_str().ok())
      .ok_or_else(|| {
        ApiError::Unauthorized("missing x-user-id header".to_owned())
      })?;

    let user_id = Uuid::parse_str(header).map_err(|_| {
      ApiError::Unauthorized("invalid x-user-id header".to_owned())
    })?;

    Ok(ActingUser(user_id))
  }
}
