//! Region — a node of the two-level administrative hierarchy.
//!
//! A region with no parent is a top-level region (province, metropolitan
//! city). A region with a parent is a child region (district, city) and its
//! parent is always top-level. Child names are only unique within their
//! parent.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a region.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RegionId(pub Uuid);

impl RegionId {
  pub fn new() -> Self { Self(Uuid::new_v4()) }
}

impl Default for RegionId {
  fn default() -> Self { Self::new() }
}

impl fmt::Display for RegionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl From<Uuid> for RegionId {
  fn from(id: Uuid) -> Self { Self(id) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
  pub region_id: RegionId,
  pub name:      String,
  pub parent_id: Option<RegionId>,
}

impl Region {
  pub fn is_top_level(&self) -> bool { self.parent_id.is_none() }
}

/// One top-level region and the names of its districts, as written in
/// configuration. An empty `districts` list describes a standalone region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSeed {
  pub name:      String,
  #[serde(default)]
  pub districts: Vec<String>,
}

impl RegionSeed {
  pub fn new(
    name: impl Into<String>,
    districts: impl IntoIterator<Item = impl Into<String>>,
  ) -> Self {
    Self {
      name:      name.into(),
      districts: districts.into_iter().map(Into::into).collect(),
    }
  }
}

/// A top-level region together with its children, for browsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionTree {
  pub region:    Region,
  pub districts: Vec<Region>,
}
