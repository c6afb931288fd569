//! SQL schema for the Haven SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS homes (
    home_id           TEXT PRIMARY KEY,
    user_id           TEXT NOT NULL,
    workspace_id      TEXT NOT NULL,
    address           TEXT NOT NULL,
    neighborhood      TEXT,
    price             REAL NOT NULL,
    bedrooms          INTEGER NOT NULL,
    bathrooms         REAL NOT NULL,
    year_built        INTEGER,
    property_taxes    REAL,
    square_footage    INTEGER,
    favorite          INTEGER NOT NULL DEFAULT 0,
    compare_selected  INTEGER NOT NULL DEFAULT 0,
    evaluation_status TEXT NOT NULL DEFAULT 'not_started',
    overall_rating    REAL NOT NULL DEFAULT 0.0,
    offer_intent      TEXT,            -- 'yes' | 'maybe' | 'no' | NULL
    primary_photo     TEXT,
    created_at        TEXT NOT NULL,   -- ISO 8601 UTC
    updated_at        TEXT NOT NULL
);

-- One evaluation per user per home; saves replace the row wholesale.
CREATE TABLE IF NOT EXISTS evaluations (
    evaluation_id         TEXT PRIMARY KEY,
    home_id               TEXT NOT NULL REFERENCES homes(home_id) ON DELETE CASCADE,
    user_id               TEXT NOT NULL,
    workspace_id          TEXT NOT NULL,
    ratings               TEXT NOT NULL DEFAULT '{}',  -- JSON: category -> item -> answer
    item_notes            TEXT NOT NULL DEFAULT '{}',  -- JSON: 'category/item' -> note
    section_notes         TEXT NOT NULL DEFAULT '{}',  -- JSON: category -> note
    overall_rating        REAL NOT NULL DEFAULT 0.0,
    user_overall_rating   INTEGER,
    completion_percentage INTEGER NOT NULL DEFAULT 0,
    status                TEXT NOT NULL DEFAULT 'not_started',
    started_at            TEXT,
    completed_at          TEXT,
    created_at            TEXT NOT NULL,
    updated_at            TEXT NOT NULL,
    UNIQUE (home_id, user_id)
);

CREATE TABLE IF NOT EXISTS inspections (
    inspection_id TEXT PRIMARY KEY,
    home_id       TEXT NOT NULL REFERENCES homes(home_id) ON DELETE CASCADE,
    user_id       TEXT NOT NULL,
    workspace_id  TEXT NOT NULL,
    categories    TEXT NOT NULL DEFAULT '{}',  -- JSON: full checklist state
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL,
    UNIQUE (home_id, user_id)
);

CREATE TABLE IF NOT EXISTS photos (
    photo_id       TEXT PRIMARY KEY,
    evaluation_id  TEXT NOT NULL REFERENCES evaluations(evaluation_id) ON DELETE CASCADE,
    category_id    TEXT NOT NULL,
    storage_path   TEXT NOT NULL,
    thumbnail_path TEXT NOT NULL,
    caption        TEXT,
    file_size      INTEGER NOT NULL,
    mime_type      TEXT NOT NULL,
    width          INTEGER,
    height         INTEGER,
    created_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS voice_notes (
    voice_note_id TEXT PRIMARY KEY,
    evaluation_id TEXT NOT NULL REFERENCES evaluations(evaluation_id) ON DELETE CASCADE,
    category_id   TEXT NOT NULL,
    storage_path  TEXT NOT NULL,
    duration_secs INTEGER NOT NULL,
    file_size     INTEGER NOT NULL,
    transcript    TEXT,
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS homes_workspace_idx       ON homes(workspace_id);
CREATE INDEX IF NOT EXISTS evaluations_home_idx      ON evaluations(home_id);
CREATE INDEX IF NOT EXISTS inspections_home_idx      ON inspections(home_id);
CREATE INDEX IF NOT EXISTS photos_evaluation_idx     ON photos(evaluation_id, category_id);
CREATE INDEX IF NOT EXISTS voice_notes_evaluation_idx ON voice_notes(evaluation_id, category_id);

PRAGMA user_version = 1;
";
