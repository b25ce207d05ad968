//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use masil_core::{
  region::{Region, RegionId},
  stamp::StampTally,
  user::{User, UserId},
  visit::VisitRecord,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_user_id(id: UserId) -> String { encode_uuid(id.0) }

pub fn encode_region_id(id: RegionId) -> String { encode_uuid(id.0) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub created_at: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { user_id: row.get(0)?, created_at: row.get(1)? })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    UserId(decode_uuid(&self.user_id)?),
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `regions` row.
pub struct RawRegion {
  pub region_id: String,
  pub name:      String,
  pub parent_id: Option<String>,
}

impl RawRegion {
  /// Expects `region_id, name, parent_id` in the first three columns.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      region_id: row.get(0)?,
      name:      row.get(1)?,
      parent_id: row.get(2)?,
    })
  }

  pub fn into_region(self) -> Result<Region> {
    Ok(Region {
      region_id: RegionId(decode_uuid(&self.region_id)?),
      name:      self.name,
      parent_id: self
        .parent_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?
        .map(RegionId),
    })
  }
}

/// Raw values read directly from a `user_visits` row.
pub struct RawVisit {
  pub visit_id:    String,
  pub user_id:     String,
  pub region_id:   String,
  pub visit_count: i64,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawVisit {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      visit_id:    row.get(0)?,
      user_id:     row.get(1)?,
      region_id:   row.get(2)?,
      visit_count: row.get(3)?,
      created_at:  row.get(4)?,
      updated_at:  row.get(5)?,
    })
  }

  pub fn into_visit(self) -> Result<VisitRecord> {
    Ok(VisitRecord {
      visit_id:    decode_uuid(&self.visit_id)?,
      user_id:     UserId(decode_uuid(&self.user_id)?),
      region_id:   RegionId(decode_uuid(&self.region_id)?),
      visit_count: decode_count("visit_count", self.visit_count)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// A top-level region row with its per-user aggregates.
pub struct RawTally {
  pub region:           RawRegion,
  pub child_count:      i64,
  pub visited_children: i64,
  pub visited_self:     bool,
}

impl RawTally {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      region:           RawRegion::from_row(row)?,
      child_count:      row.get(3)?,
      visited_children: row.get(4)?,
      visited_self:     row.get(5)?,
    })
  }

  pub fn into_tally(self) -> Result<StampTally> {
    Ok(StampTally {
      region:           self.region.into_region()?,
      child_count:      decode_count("child_count", self.child_count)?,
      visited_children: decode_count("visited_children", self.visited_children)?,
      visited_self:     self.visited_self,
    })
  }
}

fn decode_count(column: &'static str, value: i64) -> Result<u32> {
  u32::try_from(value).map_err(|_| Error::Corrupt { column, value })
}
