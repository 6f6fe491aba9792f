//! SQL schema for the Verdant SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    display_name  TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

-- Cached aggregate row, one per user, created with the user.
-- total_points / total_carbon_saved are only ever written by full
-- recomputation over the ledger table. events_attended and has_team are
-- engagement counters fed by the external event/team systems.
CREATE TABLE IF NOT EXISTS profiles (
    user_id            TEXT PRIMARY KEY REFERENCES users(user_id),
    total_points       INTEGER NOT NULL DEFAULT 0,
    total_carbon_saved REAL    NOT NULL DEFAULT 0.0,
    events_attended    INTEGER NOT NULL DEFAULT 0,
    has_team           INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS submissions (
    submission_id   TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL REFERENCES users(user_id),
    kind            TEXT NOT NULL,   -- discriminant of ActivityKind variant
    quantity        REAL NOT NULL CHECK (quantity > 0),
    description     TEXT NOT NULL DEFAULT '',
    evidence_ref    TEXT,
    status          TEXT NOT NULL DEFAULT 'pending',  -- 'pending' | 'approved' | 'rejected'
    points_awarded  INTEGER NOT NULL DEFAULT 0,
    carbon_saved_kg REAL    NOT NULL DEFAULT 0.0,
    submitted_at    TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    feedback        TEXT NOT NULL DEFAULT ''
);

-- The reward ledger is strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS ledger (
    entry_id        TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL REFERENCES users(user_id),
    submission_id   TEXT REFERENCES submissions(submission_id),
    carbon_saved_kg REAL    NOT NULL,
    points_earned   INTEGER NOT NULL,
    note            TEXT,
    recorded_at     TEXT NOT NULL
);

-- The UNIQUE constraint makes badge awarding race-safe: concurrent
-- evaluator runs collapse to one row via INSERT OR IGNORE.
CREATE TABLE IF NOT EXISTS badges (
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    kind        TEXT NOT NULL,   -- discriminant of BadgeKind variant
    earned_at   TEXT NOT NULL,
    description TEXT NOT NULL,
    UNIQUE (user_id, kind)
);

CREATE TABLE IF NOT EXISTS challenges (
    challenge_id     TEXT PRIMARY KEY,
    user_id          TEXT NOT NULL REFERENCES users(user_id),
    title            TEXT NOT NULL,
    description      TEXT NOT NULL,
    target_value     INTEGER NOT NULL CHECK (target_value > 0),
    current_progress INTEGER NOT NULL DEFAULT 0,
    reward_points    INTEGER NOT NULL CHECK (reward_points >= 0),
    is_completed     INTEGER NOT NULL DEFAULT 0,
    created_at       TEXT NOT NULL,
    expires_at       TEXT NOT NULL,
    completed_at     TEXT
);

CREATE INDEX IF NOT EXISTS submissions_user_idx ON submissions(user_id);
CREATE INDEX IF NOT EXISTS ledger_user_idx      ON ledger(user_id);
CREATE INDEX IF NOT EXISTS badges_user_idx      ON badges(user_id);
CREATE INDEX IF NOT EXISTS challenges_user_idx  ON challenges(user_id);

PRAGMA user_version = 1;
";
