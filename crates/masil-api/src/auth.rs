//! The acting user, as asserted by the upstream auth gateway.
//!
//! Token validation happens before requests reach this router; the gateway
//! forwards the authenticated user's id in [`USER_ID_HEADER`].

use axum::{extract::FromRequestParts, http::request::Parts};
use masil_core::user::UserId;
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor for the authenticated user. Rejects with 401 if the header is
/// absent or not a UUID.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

impl<S> FromRequestParts<S> for CurrentUser
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    let raw = parts
      .headers
      .get(USER_ID_HEADER)
      .and_then(|v| v.to_str().ok())
      .ok_or(ApiError::Unauthorized)?;

    let id = Uuid::parse_str(raw.trim()).map_err(|_| ApiError::Unauthorized)?;
    Ok(CurrentUser(UserId(id)))
  }
}
