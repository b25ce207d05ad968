//! User — the thin envelope owned by the external account component.
//!
//! The visit core only needs to know that a user exists; everything else about
//! an account lives elsewhere.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an application user.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
  pub fn new() -> Self { Self(Uuid::new_v4()) }
}

impl Default for UserId {
  fn default() -> Self { Self::new() }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl From<Uuid> for UserId {
  fn from(id: Uuid) -> Self { Self(id) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:    UserId,
  pub created_at: DateTime<Utc>,
}
