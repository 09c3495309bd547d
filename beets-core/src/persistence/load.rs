use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result as SqlResult, Row};

use beets_types::{Audit, Id, Project, Track, TrackSection};

const PROJECT_COLUMNS: &str = "id, name, created_on, created_by_id, updated_on, updated_by_id";
const TRACK_COLUMNS: &str =
    "id, project_id, name, mute, solo, pan, volume, created_on, created_by_id, updated_on, updated_by_id";
const TRACK_SECTION_COLUMNS: &str =
    "id, track_id, position, step_count, created_on, created_by_id, updated_on, updated_by_id";

pub fn load_project(conn: &Connection, id: &Id) -> SqlResult<Option<Project>> {
    conn.query_row(
        &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
        params![id.as_str()],
        project_from_row,
    )
    .optional()
}

pub fn load_track(conn: &Connection, id: &Id) -> SqlResult<Option<Track>> {
    conn.query_row(
        &format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE id = ?1"),
        params![id.as_str()],
        track_from_row,
    )
    .optional()
}

/// Tracks of a project, oldest first.
pub fn load_tracks(conn: &Connection, project_id: &Id) -> SqlResult<Vec<Track>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TRACK_COLUMNS} FROM tracks WHERE project_id = ?1 ORDER BY rowid"
    ))?;
    let tracks = stmt
        .query_map(params![project_id.as_str()], track_from_row)?
        .collect::<SqlResult<_>>()?;
    Ok(tracks)
}

pub fn load_track_section(conn: &Connection, id: &Id) -> SqlResult<Option<TrackSection>> {
    conn.query_row(
        &format!("SELECT {TRACK_SECTION_COLUMNS} FROM track_sections WHERE id = ?1"),
        params![id.as_str()],
        track_section_from_row,
    )
    .optional()
}

/// Sections belonging to any of `track_ids`, by position on their track.
pub fn load_track_sections(conn: &Connection, track_ids: &[Id]) -> SqlResult<Vec<TrackSection>> {
    if track_ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; track_ids.len()].join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT {TRACK_SECTION_COLUMNS} FROM track_sections
         WHERE track_id IN ({placeholders})
         ORDER BY position, rowid"
    ))?;
    let sections = stmt
        .query_map(params_from_iter(track_ids.iter().map(Id::as_str)), track_section_from_row)?
        .collect::<SqlResult<_>>()?;
    Ok(sections)
}

fn project_from_row(row: &Row<'_>) -> SqlResult<Project> {
    Ok(Project {
        id: Id::new(row.get::<_, String>(0)?),
        name: row.get(1)?,
        audit: audit_from_row(row, 2)?,
    })
}

fn track_from_row(row: &Row<'_>) -> SqlResult<Track> {
    Ok(Track {
        id: Id::new(row.get::<_, String>(0)?),
        project_id: Id::new(row.get::<_, String>(1)?),
        name: row.get(2)?,
        mute: row.get(3)?,
        solo: row.get(4)?,
        pan: row.get(5)?,
        volume: row.get(6)?,
        audit: audit_from_row(row, 7)?,
    })
}

fn track_section_from_row(row: &Row<'_>) -> SqlResult<TrackSection> {
    Ok(TrackSection {
        id: Id::new(row.get::<_, String>(0)?),
        track_id: Id::new(row.get::<_, String>(1)?),
        index: row.get(2)?,
        step_count: row.get(3)?,
        audit: audit_from_row(row, 4)?,
    })
}

/// Audit columns always come last, in `created_on, created_by_id,
/// updated_on, updated_by_id` order, starting at `first`.
fn audit_from_row(row: &Row<'_>, first: usize) -> SqlResult<Audit> {
    Ok(Audit {
        created_on: row.get(first)?,
        created_by_id: row.get::<_, Option<String>>(first + 1)?.map(Id::new),
        updated_on: row.get(first + 2)?,
        updated_by_id: row.get::<_, Option<String>>(first + 3)?.map(Id::new),
    })
}
