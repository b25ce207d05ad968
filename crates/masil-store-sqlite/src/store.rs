//! [`SqliteStore`] — the SQLite implementation of [`VisitStore`].

use std::path::Path;

use chrono::Utc;
use masil_core::{
  region::{Region, RegionId, RegionSeed},
  stamp::StampTally,
  store::{RegionHierarchy, VisitStore},
  user::{User, UserId},
  visit::VisitRecord,
};
use rusqlite::OptionalExtension as _;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    RawRegion, RawTally, RawUser, RawVisit, encode_dt, encode_region_id, encode_user_id,
    encode_uuid,
  },
  schema::{SCHEMA, UPSERT_VISIT},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Masil visit store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Every call
/// runs on the connection's own thread, so statements from concurrent
/// requests never interleave.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Load the region hierarchy from configuration seeds.
  ///
  /// Idempotent: regions that already exist (same name, same parent) are
  /// reused, so re-running with the same seeds creates nothing and adding a
  /// district to an existing province only inserts the district. Returns the
  /// number of regions created.
  pub async fn seed_regions(&self, seeds: &[RegionSeed]) -> Result<usize> {
    let provinces = seeds.len();
    let seeds     = seeds.to_vec();

    let created = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut created = 0;
        for seed in &seeds {
          let (province_id, inserted) = ensure_region(&tx, &seed.name, None)?;
          created += usize::from(inserted);
          for district in &seed.districts {
            let (_, inserted) = ensure_region(&tx, district, Some(&province_id))?;
            created += usize::from(inserted);
          }
        }
        tx.commit()?;
        Ok(created)
      })
      .await?;

    info!(provinces, created, "region hierarchy seeded");
    Ok(created)
  }

  /// Insert a single region. `parent` must be a top-level region.
  pub async fn add_region(&self, name: &str, parent: Option<RegionId>) -> Result<Region> {
    let region = Region {
      region_id: RegionId::new(),
      name:      name.to_owned(),
      parent_id: parent,
    };

    let id_str     = encode_region_id(region.region_id);
    let name_str   = region.name.clone();
    let parent_str = parent.map(encode_region_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO regions (region_id, name, parent_id) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name_str, parent_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(region)
  }
}

/// Look up a region by name within a parent scope, inserting it if absent.
/// Returns the region id and whether it was inserted.
fn ensure_region(
  conn: &rusqlite::Connection,
  name: &str,
  parent_id: Option<&str>,
) -> rusqlite::Result<(String, bool)> {
  let existing: Option<String> = match parent_id {
    None => conn
      .query_row(
        "SELECT region_id FROM regions WHERE name = ?1 AND parent_id IS NULL",
        rusqlite::params![name],
        |row| row.get(0),
      )
      .optional()?,
    Some(parent) => conn
      .query_row(
        "SELECT region_id FROM regions WHERE name = ?1 AND parent_id = ?2",
        rusqlite::params![name, parent],
        |row| row.get(0),
      )
      .optional()?,
  };

  if let Some(id) = existing {
    return Ok((id, false));
  }

  let id = encode_uuid(Uuid::new_v4());
  conn.execute(
    "INSERT INTO regions (region_id, name, parent_id) VALUES (?1, ?2, ?3)",
    rusqlite::params![id, name, parent_id],
  )?;
  debug!(name, parent = ?parent_id, "region created");
  Ok((id, true))
}

// ─── RegionHierarchy impl ────────────────────────────────────────────────────

impl RegionHierarchy for SqliteStore {
  type Error = crate::Error;

  async fn find_top_level_by_name(&self, name: &str) -> Result<Option<Region>> {
    let name = name.to_owned();

    let raw: Option<RawRegion> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT region_id, name, parent_id FROM regions
             WHERE name = ?1 AND parent_id IS NULL",
            rusqlite::params![name],
            RawRegion::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawRegion::into_region).transpose()
  }

  async fn find_child_by_name_and_parent(
    &self,
    name:   &str,
    parent: RegionId,
  ) -> Result<Option<Region>> {
    let name       = name.to_owned();
    let parent_str = encode_region_id(parent);

    let raw: Option<RawRegion> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT region_id, name, parent_id FROM regions
             WHERE name = ?1 AND parent_id = ?2",
            rusqlite::params![name, parent_str],
            RawRegion::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawRegion::into_region).transpose()
  }

  async fn list_top_level(&self) -> Result<Vec<Region>> {
    let raws: Vec<RawRegion> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT region_id, name, parent_id FROM regions
           WHERE parent_id IS NULL ORDER BY name",
        )?;
        let rows = stmt
          .query_map([], RawRegion::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRegion::into_region).collect()
  }

  async fn list_children(&self, parent: RegionId) -> Result<Vec<Region>> {
    let parent_str = encode_region_id(parent);

    let raws: Vec<RawRegion> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT region_id, name, parent_id FROM regions
           WHERE parent_id = ?1 ORDER BY name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![parent_str], RawRegion::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRegion::into_region).collect()
  }
}

// ─── VisitStore impl ─────────────────────────────────────────────────────────

impl VisitStore for SqliteStore {
  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self) -> Result<User> {
    let user = User { user_id: UserId::new(), created_at: Utc::now() };

    let id_str = encode_user_id(user.user_id);
    let at_str = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, created_at) VALUES (?1, ?2)",
          rusqlite::params![id_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn user_exists(&self, user_id: UserId) -> Result<bool> {
    let id_str = encode_user_id(user_id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, created_at FROM users WHERE user_id = ?1",
            rusqlite::params![id_str],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    Ok(raw.map(RawUser::into_user).transpose()?.is_some())
  }

  async fn delete_user(&self, user_id: UserId) -> Result<bool> {
    let id_str = encode_user_id(user_id);

    let (visits, users) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let visits = tx.execute(
          "DELETE FROM user_visits WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?;
        let users = tx.execute(
          "DELETE FROM users WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok((visits, users))
      })
      .await?;

    info!(%user_id, visits, "user deleted");
    Ok(users > 0)
  }

  // ── Ledger writes ─────────────────────────────────────────────────────────

  async fn record_visits(
    &self,
    user_id: UserId,
    regions: &[RegionId],
  ) -> Result<Vec<VisitRecord>> {
    let user_str = encode_user_id(user_id);
    let at_str   = encode_dt(Utc::now());
    let rows: Vec<(String, String)> = regions
      .iter()
      .map(|&region| (encode_uuid(Uuid::new_v4()), encode_region_id(region)))
      .collect();

    let raws: Vec<RawVisit> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut recorded = Vec::with_capacity(rows.len());
        {
          let mut stmt = tx.prepare(UPSERT_VISIT)?;
          for (visit_id, region_id) in &rows {
            let raw = stmt.query_row(
              rusqlite::params![visit_id, user_str, region_id, at_str],
              RawVisit::from_row,
            )?;
            debug!(region_id = %raw.region_id, visit_count = raw.visit_count, "visit counted");
            recorded.push(raw);
          }
        }
        tx.commit()?;
        Ok(recorded)
      })
      .await?;

    raws.into_iter().map(RawVisit::into_visit).collect()
  }

  // ── Ledger reads ──────────────────────────────────────────────────────────

  async fn get_visit(
    &self,
    user_id:   UserId,
    region_id: RegionId,
  ) -> Result<Option<VisitRecord>> {
    let user_str   = encode_user_id(user_id);
    let region_str = encode_region_id(region_id);

    let raw: Option<RawVisit> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT visit_id, user_id, region_id, visit_count, created_at, updated_at
             FROM user_visits WHERE user_id = ?1 AND region_id = ?2",
            rusqlite::params![user_str, region_str],
            RawVisit::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawVisit::into_visit).transpose()
  }

  async fn list_visits(&self, user_id: UserId) -> Result<Vec<VisitRecord>> {
    let user_str = encode_user_id(user_id);

    let raws: Vec<RawVisit> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT visit_id, user_id, region_id, visit_count, created_at, updated_at
           FROM user_visits WHERE user_id = ?1
           ORDER BY updated_at DESC, visit_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawVisit::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVisit::into_visit).collect()
  }

  async fn has_visited(&self, user_id: UserId, region_id: RegionId) -> Result<bool> {
    let user_str   = encode_user_id(user_id);
    let region_str = encode_region_id(region_id);

    let visited = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS (
             SELECT 1 FROM user_visits WHERE user_id = ?1 AND region_id = ?2
           )",
          rusqlite::params![user_str, region_str],
          |row| row.get::<_, bool>(0),
        )?)
      })
      .await?;

    Ok(visited)
  }

  async fn stamp_tallies(&self, user_id: UserId) -> Result<Vec<StampTally>> {
    let user_str = encode_user_id(user_id);

    // The (user_id, region_id) uniqueness constraint makes the join count
    // distinct visited children.
    let raws: Vec<RawTally> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             p.region_id, p.name, p.parent_id,
             (SELECT COUNT(*) FROM regions c WHERE c.parent_id = p.region_id),
             (SELECT COUNT(*)
                FROM regions c
                JOIN user_visits v ON v.region_id = c.region_id
               WHERE c.parent_id = p.region_id AND v.user_id = ?1),
             EXISTS (SELECT 1 FROM user_visits v
                      WHERE v.region_id = p.region_id AND v.user_id = ?1)
           FROM regions p
           WHERE p.parent_id IS NULL
           ORDER BY p.name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawTally::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTally::into_tally).collect()
  }
}
