//! SQL schema for the Rota SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS houses (
    house_id    TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    address     TEXT,
    max_members INTEGER NOT NULL,
    version     INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC
    deleted_at  TEXT
);

CREATE TABLE IF NOT EXISTS house_members (
    member_id TEXT PRIMARY KEY,
    house_id  TEXT NOT NULL REFERENCES houses(house_id),
    user_id   TEXT NOT NULL,
    role      TEXT NOT NULL,     -- 'owner' | 'member'
    joined_at TEXT NOT NULL,
    UNIQUE (house_id, user_id)
);

CREATE TABLE IF NOT EXISTS chores (
    chore_id    TEXT PRIMARY KEY,
    house_id    TEXT NOT NULL REFERENCES houses(house_id),
    name        TEXT NOT NULL,
    description TEXT,
    color       TEXT,
    version     INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL,
    deleted_at  TEXT
);

CREATE TABLE IF NOT EXISTS chore_schedules (
    schedule_id          TEXT PRIMARY KEY,
    chore_id             TEXT NOT NULL REFERENCES chores(chore_id),
    assignee_user_id     TEXT NOT NULL,
    start_date           TEXT NOT NULL,
    repeat_delta         TEXT NOT NULL,   -- JSON mapping of the seven delta fields
    generate_occurrences INTEGER NOT NULL DEFAULT 1,
    version              INTEGER NOT NULL DEFAULT 1,
    created_at           TEXT NOT NULL,
    deleted_at           TEXT
);

-- The uniqueness spans soft-deleted rows too; it is the concurrency guard
-- that makes horizon generation and completion chaining idempotent.
CREATE TABLE IF NOT EXISTS chore_occurrences (
    occurrence_id        TEXT PRIMARY KEY,
    schedule_id          TEXT NOT NULL REFERENCES chore_schedules(schedule_id),
    due_date             TEXT NOT NULL,   -- RFC 3339 UTC, whole seconds
    completed            INTEGER NOT NULL DEFAULT 0,
    completed_at         TEXT,            -- non-null iff completed
    notification_sent    INTEGER NOT NULL DEFAULT 0,
    notification_sent_at TEXT,            -- non-null iff notification_sent
    version              INTEGER NOT NULL DEFAULT 1,
    created_at           TEXT NOT NULL,
    deleted_at           TEXT,
    UNIQUE (schedule_id, due_date)
);

CREATE INDEX IF NOT EXISTS members_house_idx     ON house_members(house_id);
CREATE INDEX IF NOT EXISTS chores_house_idx      ON chores(house_id);
CREATE INDEX IF NOT EXISTS schedules_chore_idx   ON chore_schedules(chore_id);
CREATE INDEX IF NOT EXISTS occurrences_sched_idx ON chore_occurrences(schedule_id);
CREATE INDEX IF NOT EXISTS occurrences_due_idx   ON chore_occurrences(due_date);

PRAGMA user_version = 1;
";
