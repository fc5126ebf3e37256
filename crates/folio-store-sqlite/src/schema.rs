//! SQL schema for the host tables the indexer reads.
//!
//! Executed once at connection startup. Timestamps are RFC 3339 strings; the
//! store writes them as UTC (`2024-05-01T09:30:00.000000Z`) but reads any
//! offset.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id             INTEGER PRIMARY KEY,
    username       TEXT NOT NULL UNIQUE,
    first_name     TEXT NOT NULL DEFAULT '',
    last_name      TEXT NOT NULL DEFAULT '',
    preferred_name TEXT
);

-- `owner` is not a foreign key; it may name a deleted account.
CREATE TABLE IF NOT EXISTS views (
    id          INTEGER PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT,
    view_type   TEXT NOT NULL DEFAULT 'portfolio',
    owner       INTEGER,
    group_id    INTEGER,
    institution TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS view_tags (
    view_id INTEGER NOT NULL REFERENCES views(id),
    tag     TEXT NOT NULL,
    PRIMARY KEY (view_id, tag)
);

-- One row per grant. Which target column is set depends on access_type:
-- 'public' | 'loggedin' -> none, 'institution' -> institution,
-- 'group' -> group_id (+ optional role), 'user' -> user_id.
CREATE TABLE IF NOT EXISTS view_access (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    view_id     INTEGER NOT NULL REFERENCES views(id),
    access_type TEXT NOT NULL,
    institution TEXT,
    group_id    INTEGER,
    role        TEXT,             -- 'member' | 'tutor' | 'admin' | NULL
    user_id     INTEGER,
    valid_from  TEXT,
    valid_until TEXT
);

CREATE INDEX IF NOT EXISTS view_access_view_idx ON view_access(view_id);

PRAGMA user_version = 1;
";
