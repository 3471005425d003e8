//! SQL schema for the Campus SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Append-only. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS chat_messages (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    chat_type     TEXT NOT NULL,
    sender_login  TEXT NOT NULL,
    sender_name   TEXT NOT NULL DEFAULT '',
    message_text  TEXT NOT NULL,
    created_at    TEXT NOT NULL    -- fixed-width RFC 3339 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    login         TEXT NOT NULL UNIQUE,
    display_name  TEXT NOT NULL,
    role          TEXT NOT NULL CHECK (role IN ('admin', 'teacher', 'student')),
    grade         INTEGER,
    created_by    TEXT NOT NULL DEFAULT 'admin',
    created_at    TEXT NOT NULL
);

-- One row per student login. Written insert-if-absent during provisioning;
-- limits may later be changed by other services.
CREATE TABLE IF NOT EXISTS student_time_limits (
    student_login        TEXT PRIMARY KEY,
    daily_limit_minutes  INTEGER NOT NULL DEFAULT 80
);

CREATE TABLE IF NOT EXISTS subjects (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    grade        INTEGER NOT NULL,
    quarter      INTEGER NOT NULL,
    description  TEXT
);

CREATE INDEX IF NOT EXISTS chat_messages_channel_idx ON chat_messages(chat_type, created_at);
CREATE INDEX IF NOT EXISTS users_created_idx         ON users(created_at);
CREATE INDEX IF NOT EXISTS subjects_level_idx        ON subjects(grade, quarter, name);

PRAGMA user_version = 1;
";
