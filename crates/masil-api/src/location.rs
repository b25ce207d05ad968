//! Handlers for `/location` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/location/verify` | Body: [`VisitBody`]; 400 if the address cannot be verified |
//! | `GET`  | `/location/stamp/map` | One `{region, colorLevel}` per top-level region |
//! | `GET`  | `/location/visits` | The caller's visit records |
//! | `GET`  | `/location/visited/:region_id` | Region gate for one region |
//! | `POST` | `/location/article-check` | Body: [`ArticleCheckBody`]; 403 if denied |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use masil_core::{
  gate::{self, ArticleGate},
  region::RegionId,
  stamp,
  store::VisitStore,
  user::UserId,
  verify::{self, AddressReport, Verification},
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
  auth::CurrentUser,
  error::ApiError,
  extract::{ApiJson, ApiPath},
  response::{ok, respond},
};

// ─── Request bodies ──────────────────────────────────────────────────────────

/// A geocoder road address. Field names follow the geocoder's snake_case
/// output; camelCase spellings are accepted too.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoadAddress {
  #[serde(rename = "address_name", alias = "addressName")]
  pub address_name:       Option<String>,
  /// Province / metropolitan city.
  #[serde(rename = "region_1depth_name", alias = "region1DepthName")]
  pub region_1depth_name: Option<String>,
  /// District / city.
  #[serde(rename = "region_2depth_name", alias = "region2DepthName")]
  pub region_2depth_name: Option<String>,
}

impl From<RoadAddress> for AddressReport {
  fn from(a: RoadAddress) -> Self {
    AddressReport {
      province:     a.region_1depth_name,
      district:     a.region_2depth_name,
      full_address: a.address_name,
    }
  }
}

/// JSON body accepted by `POST /location/verify`.
#[derive(Debug, Default, Deserialize)]
pub struct VisitBody {
  #[serde(rename = "road_address", alias = "roadAddress")]
  pub road_address: Option<RoadAddress>,
}

impl From<VisitBody> for AddressReport {
  fn from(b: VisitBody) -> Self { b.road_address.unwrap_or_default().into() }
}

/// JSON body accepted by `POST /location/article-check`.
#[derive(Debug, Default, Deserialize)]
pub struct ArticleCheckBody {
  #[serde(default)]
  pub places: Vec<VisitBody>,
}

// ─── Verify ──────────────────────────────────────────────────────────────────

/// `POST /location/verify`
pub async fn verify<S>(
  State(store): State<Arc<S>>,
  CurrentUser(user_id): CurrentUser,
  ApiJson(body): ApiJson<VisitBody>,
) -> Result<Response, ApiError>
where
  S: VisitStore,
{
  info!(%user_id, "POST /location/verify");

  let report = AddressReport::from(body);
  match verify::verify_visit(store.as_ref(), user_id, &report).await? {
    Verification::Verified { .. } => {
      Ok(ok("location verified", json!({ "isVerified": true })))
    }
    Verification::Rejected(rejection) => Ok(respond(
      StatusCode::BAD_REQUEST,
      "unverifiable region or invalid address",
      Some(json!({ "isVerified": false, "reason": rejection })),
    )),
  }
}

// ─── Stamp map ───────────────────────────────────────────────────────────────

/// `GET /location/stamp/map`
pub async fn stamp_map<S>(
  State(store): State<Arc<S>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<Response, ApiError>
where
  S: VisitStore,
{
  info!(%user_id, "GET /location/stamp/map");

  let stamps = stamp::map_stamps(store.as_ref(), user_id).await?;
  Ok(ok("stamp map", stamps))
}

// ─── Visits ──────────────────────────────────────────────────────────────────

/// `GET /location/visits`
pub async fn visits<S>(
  State(store): State<Arc<S>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<Response, ApiError>
where
  S: VisitStore,
{
  ensure_user(store.as_ref(), user_id).await?;

  let visits = store
    .list_visits(user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(ok("visit records", visits))
}

/// `GET /location/visited/:region_id`
pub async fn visited<S>(
  State(store): State<Arc<S>>,
  CurrentUser(user_id): CurrentUser,
  ApiPath(region_id): ApiPath<Uuid>,
) -> Result<Response, ApiError>
where
  S: VisitStore,
{
  ensure_user(store.as_ref(), user_id).await?;

  let visited = gate::has_visited(store.as_ref(), user_id, RegionId(region_id)).await?;
  Ok(ok("region gate", json!({ "regionId": region_id, "visited": visited })))
}

async fn ensure_user<S: VisitStore>(store: &S, user_id: UserId) -> Result<(), ApiError> {
  if !store.user_exists(user_id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!("user {user_id} not found")));
  }
  Ok(())
}

// ─── Article gate ────────────────────────────────────────────────────────────

/// `POST /location/article-check`
pub async fn article_check<S>(
  State(store): State<Arc<S>>,
  CurrentUser(user_id): CurrentUser,
  ApiJson(body): ApiJson<ArticleCheckBody>,
) -> Result<Response, ApiError>
where
  S: VisitStore,
{
  info!(%user_id, places = body.places.len(), "POST /location/article-check");

  let places: Vec<AddressReport> = body.places.into_iter().map(AddressReport::from).collect();
  let outcome = gate::check_article_places(store.as_ref(), user_id, &places).await?;

  let response = match &outcome {
    ArticleGate::Allowed { .. } => ok("article places allowed", &outcome),
    ArticleGate::Denied(_) => {
      respond(StatusCode::FORBIDDEN, "article places denied", Some(&outcome))
    }
  };
  Ok(response)
}
