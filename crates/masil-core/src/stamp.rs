//! Map stamps — per top-level region completion levels.
//!
//! A top-level region's colour level reflects how many of its child regions
//! the user has visited. "Visited" means a visit record exists; visit counts
//! do not matter here.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
  Error, Result,
  region::Region,
  store::VisitStore,
  user::UserId,
};

// ─── Colour level ────────────────────────────────────────────────────────────

/// Completion tier on a 0–4 scale.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ColorLevel(u8);

impl ColorLevel {
  pub const NONE: Self = Self(0);
  pub const COMPLETE: Self = Self(4);

  /// Map a visited ratio to a tier. Thresholds are checked top-down and the
  /// first match wins.
  pub fn from_ratio(ratio: f64) -> Self {
    let level = if ratio >= 1.0 {
      4
    } else if ratio >= 0.66 {
      3
    } else if ratio >= 0.33 {
      2
    } else if ratio > 0.0 {
      1
    } else {
      0
    };
    Self(level)
  }

  pub fn value(self) -> u8 { self.0 }
}

// ─── Tallies ─────────────────────────────────────────────────────────────────

/// Raw counts for one top-level region, as produced by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampTally {
  pub region:           Region,
  /// Number of child regions under `region`.
  pub child_count:      u32,
  /// Number of distinct child regions the user holds a visit record for.
  pub visited_children: u32,
  /// Whether the user holds a visit record for `region` itself.
  pub visited_self:     bool,
}

impl StampTally {
  /// Standalone regions (no children) are all-or-nothing on the same scale.
  pub fn color_level(&self) -> ColorLevel {
    if self.child_count == 0 {
      return if self.visited_self { ColorLevel::COMPLETE } else { ColorLevel::NONE };
    }
    ColorLevel::from_ratio(f64::from(self.visited_children) / f64::from(self.child_count))
  }
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// One entry of the stamp map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapStamp {
  pub region:      String,
  pub color_level: ColorLevel,
}

/// Build the stamp map for `user_id`: one entry per top-level region, visited
/// or not, ordered by region name.
pub async fn map_stamps<S: VisitStore>(store: &S, user_id: UserId) -> Result<Vec<MapStamp>> {
  info!(%user_id, "building stamp map");

  if !store.user_exists(user_id).await.map_err(Error::store)? {
    return Err(Error::UserNotFound(user_id));
  }

  let tallies = store.stamp_tallies(user_id).await.map_err(Error::store)?;

  let mut stamps: Vec<MapStamp> = tallies
    .into_iter()
    .map(|tally| MapStamp {
      color_level: tally.color_level(),
      region:      tally.region.name,
    })
    .collect();
  stamps.sort_by(|a, b| a.region.cmp(&b.region));

  info!(%user_id, regions = stamps.len(), "stamp map built");
  Ok(stamps)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::region::RegionId;

  fn tally(child_count: u32, visited_children: u32, visited_self: bool) -> StampTally {
    StampTally {
      region: Region {
        region_id: RegionId::new(),
        name:      "Gyeonggi".into(),
        parent_id: None,
      },
      child_count,
      visited_children,
      visited_self,
    }
  }

  #[test]
  fn threshold_boundaries() {
    assert_eq!(ColorLevel::from_ratio(1.0).value(), 4);
    assert_eq!(ColorLevel::from_ratio(0.66).value(), 3);
    assert_eq!(ColorLevel::from_ratio(0.659999).value(), 2);
    assert_eq!(ColorLevel::from_ratio(0.33).value(), 2);
    assert_eq!(ColorLevel::from_ratio(0.329999).value(), 1);
    assert_eq!(ColorLevel::from_ratio(0.0001).value(), 1);
    assert_eq!(ColorLevel::from_ratio(0.0).value(), 0);
  }

  #[test]
  fn thirds_land_on_the_expected_tiers() {
    assert_eq!(tally(3, 1, true).color_level().value(), 2);
    assert_eq!(tally(3, 2, true).color_level().value(), 3);
    assert_eq!(tally(3, 3, true).color_level().value(), 4);
  }

  #[test]
  fn unvisited_region_with_children_is_zero() {
    assert_eq!(tally(31, 0, false).color_level(), ColorLevel::NONE);
  }

  #[test]
  fn one_of_many_children_is_level_one() {
    assert_eq!(tally(31, 1, true).color_level().value(), 1);
  }

  #[test]
  fn standalone_region_is_all_or_nothing() {
    assert_eq!(tally(0, 0, false).color_level(), ColorLevel::NONE);
    assert_eq!(tally(0, 0, true).color_level(), ColorLevel::COMPLETE);
  }

  #[test]
  fn map_stamp_serialises_camel_case() {
    let stamp = MapStamp { region: "Seoul".into(), color_level: ColorLevel::from_ratio(0.5) };
    let json = serde_json::to_value(&stamp).unwrap();
    assert_eq!(json, serde_json::json!({ "region": "Seoul", "colorLevel": 2 }));
  }
}
