//! SQL schema for the run store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Runs are write-once; results are inserted with their run and never updated.
CREATE TABLE IF NOT EXISTS runs (
    run_id      TEXT PRIMARY KEY,
    created_at  TEXT NOT NULL,      -- RFC 3339 UTC
    source      TEXT,
    cancelled   INTEGER NOT NULL    -- 0 | 1
);

CREATE TABLE IF NOT EXISTS results (
    run_id        TEXT NOT NULL REFERENCES runs(run_id),
    position      INTEGER NOT NULL, -- input order within the run
    identifier    TEXT NOT NULL,    -- canonical key
    is_active     INTEGER NOT NULL, -- copy of verdict.is_active for summaries
    record_json   TEXT NOT NULL,
    verdict_json  TEXT NOT NULL,
    PRIMARY KEY (run_id, position)
);

-- One row per identifier; last writer wins.
CREATE TABLE IF NOT EXISTS overrides (
    identifier         TEXT PRIMARY KEY,
    confirmed_active   INTEGER NOT NULL,
    has_superseding    INTEGER NOT NULL,
    superseding_value  TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS runs_created_idx        ON runs(created_at);
CREATE INDEX IF NOT EXISTS results_identifier_idx  ON results(identifier);

PRAGMA user_version = 1;
";
