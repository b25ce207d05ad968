//! Visit records — the per-(user, region) ledger of confirmed presence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{region::RegionId, user::UserId};

/// A user's cumulative visit count for one region.
///
/// There is at most one record per (user, region). The count starts at 1
/// when the record is created and grows by exactly one per successful
/// verification touching the region; it never decreases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
  pub visit_id:    Uuid,
  pub user_id:     UserId,
  pub region_id:   RegionId,
  pub visit_count: u32,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}
