//! Handlers for `/users` endpoints.
//!
//! Accounts belong to the user component; these endpoints only manage the
//! local envelope the visit ledger hangs off.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/users` | Returns 201 + the new user |
//! | `DELETE` | `/users/me` | Deletes the caller and all of their visit records |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use masil_core::store::VisitStore;
use tracing::info;

use crate::{
  auth::CurrentUser,
  error::ApiError,
  response::{ok, respond},
};

/// `POST /users`
pub async fn create<S>(State(store): State<Arc<S>>) -> Result<Response, ApiError>
where
  S: VisitStore,
{
  let user = store
    .add_user()
    .await
    .map_err(ApiError::store)?;
  info!(user_id = %user.user_id, "user created");
  Ok(respond(StatusCode::CREATED, "user created", Some(user)))
}

/// `DELETE /users/me`
pub async fn delete_me<S>(
  State(store): State<Arc<S>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<Response, ApiError>
where
  S: VisitStore,
{
  let deleted = store
    .delete_user(user_id)
    .await
    .map_err(ApiError::store)?;
  if !deleted {
    return Err(ApiError::NotFound(format!("user {user_id} not found")));
  }
  Ok(ok("user deleted", serde_json::json!({ "userId": user_id })))
}
