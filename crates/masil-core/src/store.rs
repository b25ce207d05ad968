//! Storage traits consumed by the visit core.
//!
//! [`RegionHierarchy`] is the read-only reference-data view; [`VisitStore`]
//! adds the user envelope and the visit ledger on top of it. Both are
//! implemented by storage backends (e.g. `masil-store-sqlite`). The verifier,
//! aggregator and gate are written against these traits only.

use std::future::Future;

use crate::{
  region::{Region, RegionId},
  stamp::StampTally,
  user::{User, UserId},
  visit::VisitRecord,
};

// ─── Region hierarchy ────────────────────────────────────────────────────────

/// Read access to the two-level region hierarchy.
///
/// Name matching is exact and case-sensitive; callers pass names as they
/// should be persisted.
pub trait RegionHierarchy: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Resolve `name` among regions that have no parent.
  fn find_top_level_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Region>, Self::Error>> + Send + 'a;

  /// Resolve `name` among the children of `parent` only.
  fn find_child_by_name_and_parent<'a>(
    &'a self,
    name: &'a str,
    parent: RegionId,
  ) -> impl Future<Output = Result<Option<Region>, Self::Error>> + Send + 'a;

  /// All top-level regions, ordered by name.
  fn list_top_level(
    &self,
  ) -> impl Future<Output = Result<Vec<Region>, Self::Error>> + Send + '_;

  /// The children of `parent`, ordered by name.
  fn list_children(
    &self,
    parent: RegionId,
  ) -> impl Future<Output = Result<Vec<Region>, Self::Error>> + Send + '_;
}

// ─── Visit store ─────────────────────────────────────────────────────────────

/// Users and the visit ledger.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait VisitStore: RegionHierarchy {
  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a new user envelope.
  fn add_user(&self) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn user_exists(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete a user together with all of their visit records. Returns `false`
  /// if the user did not exist.
  fn delete_user(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Ledger writes ─────────────────────────────────────────────────────

  /// Count one visit to each of `regions`, in order, as a single unit of
  /// work: either every record is created or incremented, or none is.
  ///
  /// Each increment must be atomic with respect to concurrent callers
  /// recording the same (user, region) pair.
  fn record_visits<'a>(
    &'a self,
    user_id: UserId,
    regions: &'a [RegionId],
  ) -> impl Future<Output = Result<Vec<VisitRecord>, Self::Error>> + Send + 'a;

  // ── Ledger reads ──────────────────────────────────────────────────────

  fn get_visit(
    &self,
    user_id: UserId,
    region_id: RegionId,
  ) -> impl Future<Output = Result<Option<VisitRecord>, Self::Error>> + Send + '_;

  /// Every record held by `user_id`, most recently updated first.
  fn list_visits(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<VisitRecord>, Self::Error>> + Send + '_;

  /// Whether a record exists for exactly `region_id`. Does not look at the
  /// region's parent or children.
  fn has_visited(
    &self,
    user_id: UserId,
    region_id: RegionId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// One tally per top-level region describing how much of it `user_id` has
  /// visited.
  fn stamp_tallies(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<StampTally>, Self::Error>> + Send + '_;
}
