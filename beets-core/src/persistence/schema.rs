use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult};

/// Schema version for the relational format.
pub const SCHEMA_VERSION: i32 = 1;

/// Create all tables and record the schema version.
pub fn create_tables(conn: &Connection) -> SqlResult<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
        params![SCHEMA_VERSION],
    )?;
    Ok(())
}

/// Highest schema version recorded in the database, if any.
pub fn stored_version(conn: &Connection) -> SqlResult<Option<i32>> {
    let has_table: bool = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
        [],
        |row| row.get::<_, i64>(0),
    )? > 0;
    if !has_table {
        return Ok(None);
    }
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
        .optional()
        .map(Option::flatten)
}

// Ids and audit timestamps are assigned by the database, the same way a hosted
// backend would fill them from column defaults.
const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY NOT NULL DEFAULT (lower(hex(randomblob(16)))),
    name TEXT NOT NULL,
    created_on TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    created_by_id TEXT,
    updated_on TEXT,
    updated_by_id TEXT
);

CREATE TABLE IF NOT EXISTS tracks (
    id TEXT PRIMARY KEY NOT NULL DEFAULT (lower(hex(randomblob(16)))),
    project_id TEXT NOT NULL REFERENCES projects(id),
    name TEXT NOT NULL,
    mute INTEGER NOT NULL,
    solo INTEGER NOT NULL,
    pan REAL NOT NULL,
    volume REAL NOT NULL,
    created_on TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    created_by_id TEXT,
    updated_on TEXT,
    updated_by_id TEXT
);

CREATE INDEX IF NOT EXISTS idx_tracks_project ON tracks(project_id);

CREATE TABLE IF NOT EXISTS track_sections (
    id TEXT PRIMARY KEY NOT NULL DEFAULT (lower(hex(randomblob(16)))),
    track_id TEXT NOT NULL REFERENCES tracks(id),
    position INTEGER NOT NULL,
    step_count INTEGER NOT NULL CHECK (step_count BETWEEN 1 AND 64),
    created_on TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    created_by_id TEXT,
    updated_on TEXT,
    updated_by_id TEXT
);

CREATE INDEX IF NOT EXISTS idx_track_sections_track ON track_sections(track_id);
";
