//! SQL schema for the Skylog SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    open_id        TEXT NOT NULL UNIQUE,
    name           TEXT,
    email          TEXT,
    login_method   TEXT,
    role           TEXT NOT NULL DEFAULT 'user',   -- 'user' | 'admin'
    created_at     TEXT NOT NULL,                  -- ISO 8601 UTC
    updated_at     TEXT NOT NULL,
    last_signed_in TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS flight_tests (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    description TEXT,
    test_date   TEXT NOT NULL,
    aircraft    TEXT,
    status      TEXT NOT NULL DEFAULT 'draft',  -- 'draft' | 'in_progress' | 'completed' | 'archived'
    created_by  INTEGER NOT NULL REFERENCES users(id),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS parameters (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    name           TEXT NOT NULL,   -- duplicates permitted
    unit           TEXT,
    description    TEXT,
    parameter_type TEXT,
    created_at     TEXT NOT NULL
);

-- Values stay TEXT so heterogeneous numeric formats survive ingestion
-- unmodified. No cascade from parameters: orphaned parameter_id references
-- are tolerated by the LEFT JOIN on the read side.
CREATE TABLE IF NOT EXISTS data_points (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    flight_test_id INTEGER NOT NULL REFERENCES flight_tests(id) ON DELETE CASCADE,
    parameter_id   INTEGER NOT NULL REFERENCES parameters(id),
    timestamp      TEXT NOT NULL,
    value          TEXT NOT NULL,
    created_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS flight_tests_owner_idx ON flight_tests(created_by);
CREATE INDEX IF NOT EXISTS data_points_test_idx   ON data_points(flight_test_id);
CREATE INDEX IF NOT EXISTS data_points_param_idx  ON data_points(parameter_id);

PRAGMA user_version = 1;
";
