//! SQL schema for the Masil SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Local envelope for accounts owned by the user component.
CREATE TABLE IF NOT EXISTS users (
    user_id    TEXT PRIMARY KEY,
    created_at TEXT NOT NULL
);

-- Two-level hierarchy: parent_id IS NULL marks a top-level region.
CREATE TABLE IF NOT EXISTS regions (
    region_id TEXT PRIMARY KEY,
    name      TEXT NOT NULL,
    parent_id TEXT REFERENCES regions(region_id)
);

-- Top-level names are unique among themselves; child names only within
-- their parent.
CREATE UNIQUE INDEX IF NOT EXISTS regions_top_name_idx
    ON regions(name) WHERE parent_id IS NULL;
CREATE UNIQUE INDEX IF NOT EXISTS regions_child_name_idx
    ON regions(parent_id, name) WHERE parent_id IS NOT NULL;

-- A child's parent must itself be top-level.
CREATE TRIGGER IF NOT EXISTS regions_depth_guard
BEFORE INSERT ON regions
WHEN NEW.parent_id IS NOT NULL
 AND (SELECT parent_id FROM regions WHERE region_id = NEW.parent_id) IS NOT NULL
BEGIN
    SELECT RAISE(ABORT, 'region hierarchy is limited to two levels');
END;

-- One row per (user, region); visit_count only ever grows.
CREATE TABLE IF NOT EXISTS user_visits (
    visit_id    TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    region_id   TEXT NOT NULL REFERENCES regions(region_id),
    visit_count INTEGER NOT NULL CHECK (visit_count >= 1),
    created_at  TEXT NOT NULL,   -- ISO 8601 UTC
    updated_at  TEXT NOT NULL,   -- ISO 8601 UTC
    UNIQUE (user_id, region_id)
);

CREATE INDEX IF NOT EXISTS regions_parent_idx     ON regions(parent_id);
CREATE INDEX IF NOT EXISTS user_visits_region_idx ON user_visits(region_id);

PRAGMA user_version = 1;
";

/// Count one visit: create the row with a count of 1, or bump an existing
/// row's count in the same statement.
pub const UPSERT_VISIT: &str = "
INSERT INTO user_visits (visit_id, user_id, region_id, visit_count, created_at, updated_at)
VALUES (?1, ?2, ?3, 1, ?4, ?4)
ON CONFLICT (user_id, region_id) DO UPDATE SET
    visit_count = visit_count + 1,
    updated_at  = excluded.updated_at
RETURNING visit_id, user_id, region_id, visit_count, created_at, updated_at
";
