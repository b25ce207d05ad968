//! Handler for `GET /regions` — the region hierarchy as reference data.

use std::sync::Arc;

use axum::{extract::State, response::Response};
use masil_core::{region::RegionTree, store::RegionHierarchy};

use crate::{error::ApiError, response::ok};

/// `GET /regions` — every top-level region with its districts.
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Response, ApiError>
where
  S: RegionHierarchy,
{
  let provinces = store
    .list_top_level()
    .await
    .map_err(ApiError::store)?;

  let mut trees = Vec::with_capacity(provinces.len());
  for region in provinces {
    let districts = store
      .list_children(region.region_id)
      .await
      .map_err(ApiError::store)?;
    trees.push(RegionTree { region, districts });
  }

  Ok(ok("regions", trees))
}
