//! Error types for `masil-core`.
//!
//! Address rejections are not errors; they are reported through
//! [`Verification::Rejected`](crate::verify::Verification::Rejected). This
//! type only covers conditions the caller cannot fix by changing its input.

use thiserror::Error;

use crate::user::UserId;

#[derive(Debug, Error)]
pub enum Error {
  /// The acting user does not exist. Authentication upstream should have
  /// made this impossible, so it is surfaced as a hard failure.
  #[error("user not found: {0}")]
  UserNotFound(UserId),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
