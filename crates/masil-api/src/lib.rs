//! JSON REST API for Masil region visits.
//!
//! Exposes an axum [`Router`] backed by any [`masil_core::store::VisitStore`].
//! Token validation, TLS, and transport concerns are the caller's
//! responsibility; the acting user arrives in the `x-user-id` header.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", masil_api::api_router(store.clone()))
//! ```

pub mod auth;
pub mod error;
pub mod extract;
pub mod location;
pub mod regions;
pub mod response;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use masil_core::store::VisitStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: VisitStore + 'static,
{
  Router::new()
    // Location
    .route("/location/verify", post(location::verify::<S>))
    .route("/location/stamp/map", get(location::stamp_map::<S>))
    .route("/location/visits", get(location::visits::<S>))
    .route("/location/visited/{region_id}", get(location::visited::<S>))
    .route("/location/article-check", post(location::article_check::<S>))
    // Reference data
    .route("/regions", get(regions::list::<S>))
    // Users
    .route("/users", post(users::create::<S>))
    .route("/users/me", delete(users::delete_me::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use masil_core::{
    region::RegionSeed,
    store::{RegionHierarchy, VisitStore},
    user::UserId,
  };
  use masil_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use crate::auth::USER_ID_HEADER;

  async fn make_store() -> (Arc<SqliteStore>, UserId) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store
      .seed_regions(&[
        RegionSeed::new("Gyeonggi", ["Suwon", "Seongnam"]),
        RegionSeed::new("Busan Metro", ["Busan"]),
        RegionSeed::new("Sejong", Vec::<String>::new()),
      ])
      .await
      .unwrap();
    let user = store.add_user().await.unwrap().user_id;
    (Arc::new(store), user)
  }

  async fn send(
    store:  Arc<SqliteStore>,
    method: &str,
    uri:    &str,
    user:   Option<UserId>,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    send_raw(store, method, uri, user, body.map(|json| json.to_string())).await
  }

  async fn send_raw(
    store:  Arc<SqliteStore>,
    method: &str,
    uri:    &str,
    user:   Option<UserId>,
    body:   Option<String>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
      builder = builder.header(USER_ID_HEADER, user.to_string());
    }
    let body = match body {
      Some(text) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(text)
      }
      None => Body::empty(),
    };
    let resp = api_router(store)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  fn address(province: &str, district: &str) -> Value {
    json!({
      "road_address": {
        "address_name": format!("{province} {district} 12"),
        "region_1depth_name": province,
        "region_2depth_name": district,
      }
    })
  }

  // ── Verify ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn verify_without_user_context_returns_401() {
    let (store, _) = make_store().await;
    let (status, body) = send(
      store,
      "POST",
      "/location/verify",
      None,
      Some(address("Gyeonggi", "Suwon")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
  }

  #[tokio::test]
  async fn verify_success_reports_is_verified() {
    let (store, user) = make_store().await;
    let (status, body) = send(
      store.clone(),
      "POST",
      "/location/verify",
      Some(user),
      Some(address("Gyeonggi", "Suwon")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["isVerified"], true);

    assert_eq!(store.list_visits(user).await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn verify_accepts_camel_case_body() {
    let (store, user) = make_store().await;
    let body = json!({
      "roadAddress": {
        "addressName": "Suwon-si 1",
        "region1DepthName": "Gyeonggi",
        "region2DepthName": "Suwon",
      }
    });
    let (status, body) = send(store, "POST", "/location/verify", Some(user), Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isVerified"], true);
  }

  #[tokio::test]
  async fn verify_district_of_other_province_returns_400() {
    let (store, user) = make_store().await;
    let (status, body) = send(
      store.clone(),
      "POST",
      "/location/verify",
      Some(user),
      Some(address("Gyeonggi", "Busan")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["isVerified"], false);
    assert_eq!(body["data"]["reason"]["reason"], "unknown_district");

    assert!(store.list_visits(user).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn verify_missing_address_returns_400() {
    let (store, user) = make_store().await;
    let (status, body) =
      send(store, "POST", "/location/verify", Some(user), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["reason"]["reason"], "missing_province");
  }

  #[tokio::test]
  async fn verify_unknown_user_returns_404() {
    let (store, _) = make_store().await;
    let (status, _) = send(
      store,
      "POST",
      "/location/verify",
      Some(UserId::new()),
      Some(address("Gyeonggi", "Suwon")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn verify_malformed_body_returns_envelope() {
    let (store, user) = make_store().await;
    let (status, body) = send_raw(
      store.clone(),
      "POST",
      "/location/verify",
      Some(user),
      Some("{not json".to_owned()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

    assert!(store.list_visits(user).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn article_check_malformed_body_returns_envelope() {
    let (store, user) = make_store().await;
    let (status, body) = send_raw(
      store,
      "POST",
      "/location/article-check",
      Some(user),
      Some(r#"{"places": 7}"#.to_owned()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
  }

  // ── Stamp map ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn stamp_map_lists_every_top_level_region() {
    let (store, user) = make_store().await;
    send(
      store.clone(),
      "POST",
      "/location/verify",
      Some(user),
      Some(address("Gyeonggi", "Suwon")),
    )
    .await;

    let (status, body) = send(store, "GET", "/location/stamp/map", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
      body["data"],
      json!([
        { "region": "Busan Metro", "colorLevel": 0 },
        { "region": "Gyeonggi",    "colorLevel": 2 },
        { "region": "Sejong",      "colorLevel": 0 },
      ])
    );
  }

  // ── Region gate ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn visited_flips_after_verification() {
    let (store, user) = make_store().await;
    let gyeonggi = store.find_top_level_by_name("Gyeonggi").await.unwrap().unwrap();
    let suwon = store
      .find_child_by_name_and_parent("Suwon", gyeonggi.region_id)
      .await
      .unwrap()
      .unwrap();
    let uri = format!("/location/visited/{}", suwon.region_id);

    let (_, body) = send(store.clone(), "GET", &uri, Some(user), None).await;
    assert_eq!(body["data"]["visited"], false);

    send(
      store.clone(),
      "POST",
      "/location/verify",
      Some(user),
      Some(address("Gyeonggi", "Suwon")),
    )
    .await;

    let (status, body) = send(store, "GET", &uri, Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["visited"], true);
  }

  #[tokio::test]
  async fn visited_with_invalid_region_id_returns_envelope() {
    let (store, user) = make_store().await;
    let (status, body) =
      send(store, "GET", "/location/visited/not-a-uuid", Some(user), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
  }

  #[tokio::test]
  async fn visited_for_unknown_user_returns_404() {
    let (store, _) = make_store().await;
    let gyeonggi = store.find_top_level_by_name("Gyeonggi").await.unwrap().unwrap();
    let uri = format!("/location/visited/{}", gyeonggi.region_id);

    let (status, body) = send(store, "GET", &uri, Some(UserId::new()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
  }

  #[tokio::test]
  async fn article_check_requires_a_visit() {
    let (store, user) = make_store().await;
    let places = json!({ "places": [address("Gyeonggi", "Seongnam")] });

    let (status, body) = send(
      store.clone(),
      "POST",
      "/location/article-check",
      Some(user),
      Some(places.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["data"]["reason"], "not_visited");

    send(
      store.clone(),
      "POST",
      "/location/verify",
      Some(user),
      Some(address("Gyeonggi", "Seongnam")),
    )
    .await;

    let (status, body) =
      send(store, "POST", "/location/article-check", Some(user), Some(places)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "allowed");
    assert_eq!(body["data"]["region"]["name"], "Seongnam");
  }

  // ── Reference data and users ────────────────────────────────────────────────

  #[tokio::test]
  async fn regions_lists_hierarchy() {
    let (store, _) = make_store().await;
    let (status, body) = send(store, "GET", "/regions", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let trees = body["data"].as_array().unwrap();
    assert_eq!(trees.len(), 3);
    assert_eq!(trees[1]["region"]["name"], "Gyeonggi");
    assert_eq!(trees[1]["districts"].as_array().unwrap().len(), 2);
    assert!(trees[2]["districts"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn create_then_delete_user() {
    let (store, _) = make_store().await;
    let (status, body) = send(store.clone(), "POST", "/users", None, None).await;
    assert_eq!(status, StatusCode::CREATED);

    let id: UserId = serde_json::from_value(body["data"]["user_id"].clone()).unwrap();
    send(
      store.clone(),
      "POST",
      "/location/verify",
      Some(id),
      Some(address("Gyeonggi", "Suwon")),
    )
    .await;

    let (status, _) = send(store.clone(), "DELETE", "/users/me", Some(id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(store.list_visits(id).await.unwrap().is_empty());

    let (status, _) = send(store, "DELETE", "/users/me", Some(id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
