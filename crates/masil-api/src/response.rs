//! The JSON envelope shared by every endpoint:
//! `{ "success": bool, "message": str, "data"?: any }`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
  pub success: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data:    Option<T>,
}

/// 200 with `data`.
pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> Response {
  respond(StatusCode::OK, message, Some(data))
}

/// Any status; `success` follows the status class.
pub fn respond<T: Serialize>(
  status: StatusCode,
  message: impl Into<String>,
  data: Option<T>,
) -> Response {
  let body = Envelope {
    success: status.is_success(),
    message: message.into(),
    data,
  };
  (status, Json(body)).into_response()
}
