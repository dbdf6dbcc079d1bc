//! SQLite schema definitions and SQL query constants.
//!
//! This module contains all SQL statements used by the SQLite repository,
//! following the Functional Core pattern - pure data, no I/O.

/// SQL statement to create all tables.
///
/// Everything is `IF NOT EXISTS` so running the batch twice is harmless;
/// the `DatabaseInitializer` contract depends on that.
pub const CREATE_TABLES: &str = r#"
-- Habit templates table
CREATE TABLE IF NOT EXISTS templates (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    version TEXT NOT NULL,
    description TEXT NOT NULL,
    tags TEXT NOT NULL,
    kind TEXT NOT NULL,
    difficulty TEXT NOT NULL,
    duration TEXT NOT NULL,
    benefits TEXT NOT NULL,
    outcomes TEXT NOT NULL,
    timeline TEXT NOT NULL,
    emoji TEXT NOT NULL,
    color TEXT NOT NULL,
    habits TEXT NOT NULL,
    is_default INTEGER NOT NULL DEFAULT 0,
    archived INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

-- Vacation-mode interval history
CREATE TABLE IF NOT EXISTS vacation_periods (
    id TEXT PRIMARY KEY,
    start_date TEXT NOT NULL,
    end_date TEXT
);

-- Single-row user profile
CREATE TABLE IF NOT EXISTS user_profile (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    name TEXT,
    email TEXT
);

-- String key/value metadata (migration markers, flags)
CREATE TABLE IF NOT EXISTS app_metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Indexes for efficient queries
CREATE INDEX IF NOT EXISTS idx_templates_archived ON templates(archived);
CREATE INDEX IF NOT EXISTS idx_vacation_periods_start_date ON vacation_periods(start_date);
"#;

// Template queries
pub const INSERT_TEMPLATE: &str = r#"
INSERT INTO templates (id, name, version, description, tags, kind, difficulty, duration,
    benefits, outcomes, timeline, emoji, color, habits, is_default, archived, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
"#;

pub const SELECT_TEMPLATES: &str = r#"
SELECT id, name, version, description, tags, kind, difficulty, duration,
    benefits, outcomes, timeline, emoji, color, habits, is_default, archived, created_at
FROM templates
ORDER BY created_at
"#;

pub const SELECT_ACTIVE_TEMPLATES: &str = r#"
SELECT id, name, version, description, tags, kind, difficulty, duration,
    benefits, outcomes, timeline, emoji, color, habits, is_default, archived, created_at
FROM templates
WHERE archived = 0
ORDER BY created_at
"#;

pub const DELETE_TEMPLATES: &str = r#"
DELETE FROM templates
"#;

// Vacation period queries
pub const INSERT_VACATION_PERIOD: &str = r#"
INSERT INTO vacation_periods (id, start_date, end_date)
VALUES (?1, ?2, ?3)
"#;

pub const SELECT_VACATION_PERIODS: &str = r#"
SELECT id, start_date, end_date
FROM vacation_periods
ORDER BY start_date
"#;

pub const DELETE_VACATION_PERIODS: &str = r#"
DELETE FROM vacation_periods
"#;

// Profile queries
pub const SELECT_PROFILE: &str = r#"
SELECT name, email
FROM user_profile
WHERE id = 1
"#;

/// Partial upsert: `NULL` parameters leave the stored column untouched.
pub const UPSERT_PROFILE: &str = r#"
INSERT INTO user_profile (id, name, email)
VALUES (1, ?1, ?2)
ON CONFLICT(id) DO UPDATE SET
    name = COALESCE(?1, user_profile.name),
    email = COALESCE(?2, user_profile.email)
"#;

// Metadata queries
pub const SELECT_METADATA: &str = r#"
SELECT value
FROM app_metadata
WHERE key = ?1
"#;

pub const UPSERT_METADATA: &str = r#"
INSERT INTO app_metadata (key, value)
VALUES (?1, ?2)
ON CONFLICT(key) DO UPDATE SET value = ?2
"#;

pub const DELETE_METADATA: &str = r#"
DELETE FROM app_metadata
WHERE key = ?1
"#;
