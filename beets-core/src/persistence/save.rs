use rusqlite::{params, Connection, ErrorCode};

use beets_types::{EntityKind, Id, Project, Track, TrackSection};

use super::load;
use crate::store::StoreError;

const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

// ============================================================
// Projects
// ============================================================

pub fn upsert_project(conn: &Connection, project: &Project) -> Result<Project, StoreError> {
    let id: String = if project.id.is_persistent() {
        conn.query_row(
            &format!(
                "INSERT INTO projects (id, name, created_by_id, updated_by_id)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    updated_by_id = excluded.updated_by_id,
                    updated_on = {NOW}
                 RETURNING id"
            ),
            params![
                project.id.as_str(),
                project.name,
                project.audit.created_by_id.as_ref().map(Id::as_str),
                project.audit.updated_by_id.as_ref().map(Id::as_str),
            ],
            |row| row.get(0),
        )?
    } else {
        conn.query_row(
            "INSERT INTO projects (name, created_by_id, updated_by_id)
             VALUES (?1, ?2, ?3)
             RETURNING id",
            params![
                project.name,
                project.audit.created_by_id.as_ref().map(Id::as_str),
                project.audit.updated_by_id.as_ref().map(Id::as_str),
            ],
            |row| row.get(0),
        )?
    };
    reload(load::load_project(conn, &Id::new(id.clone()))?, EntityKind::Project, id)
}

// ============================================================
// Tracks
// ============================================================

pub fn upsert_track(conn: &Connection, track: &Track) -> Result<Track, StoreError> {
    let result = if track.id.is_persistent() {
        conn.query_row(
            &format!(
                "INSERT INTO tracks (id, project_id, name, mute, solo, pan, volume, created_by_id, updated_by_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(id) DO UPDATE SET
                    project_id = excluded.project_id,
                    name = excluded.name,
                    mute = excluded.mute,
                    solo = excluded.solo,
                    pan = excluded.pan,
                    volume = excluded.volume,
                    updated_by_id = excluded.updated_by_id,
                    updated_on = {NOW}
                 RETURNING id"
            ),
            params![
                track.id.as_str(),
                track.project_id.as_str(),
                track.name,
                track.mute,
                track.solo,
                track.pan,
                track.volume,
                track.audit.created_by_id.as_ref().map(Id::as_str),
                track.audit.updated_by_id.as_ref().map(Id::as_str),
            ],
            |row| row.get::<_, String>(0),
        )
    } else {
        conn.query_row(
            "INSERT INTO tracks (project_id, name, mute, solo, pan, volume, created_by_id, updated_by_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id",
            params![
                track.project_id.as_str(),
                track.name,
                track.mute,
                track.solo,
                track.pan,
                track.volume,
                track.audit.created_by_id.as_ref().map(Id::as_str),
                track.audit.updated_by_id.as_ref().map(Id::as_str),
            ],
            |row| row.get::<_, String>(0),
        )
    };
    let id = result.map_err(|e| {
        on_foreign_key(e, || StoreError::ForeignKey {
            kind: EntityKind::Track,
            id: track.id.clone(),
            parent: track.project_id.clone(),
        })
    })?;
    reload(load::load_track(conn, &Id::new(id.clone()))?, EntityKind::Track, id)
}

pub fn delete_track(conn: &Connection, id: &Id) -> Result<(), StoreError> {
    let deleted = conn
        .execute("DELETE FROM tracks WHERE id = ?1", params![id.as_str()])
        .map_err(|e| {
            on_foreign_key(e, || StoreError::HasChildren {
                kind: EntityKind::Track,
                id: id.clone(),
            })
        })?;
    expect_one(deleted, EntityKind::Track, id)
}

// ============================================================
// Track sections
// ============================================================

pub fn upsert_track_section(conn: &Connection, section: &TrackSection) -> Result<TrackSection, StoreError> {
    let result = if section.id.is_persistent() {
        conn.query_row(
            &format!(
                "INSERT INTO track_sections (id, track_id, position, step_count, created_by_id, updated_by_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    track_id = excluded.track_id,
                    position = excluded.position,
                    step_count = excluded.step_count,
                    updated_by_id = excluded.updated_by_id,
                    updated_on = {NOW}
                 RETURNING id"
            ),
            params![
                section.id.as_str(),
                section.track_id.as_str(),
                section.index,
                section.step_count,
                section.audit.created_by_id.as_ref().map(Id::as_str),
                section.audit.updated_by_id.as_ref().map(Id::as_str),
            ],
            |row| row.get::<_, String>(0),
        )
    } else {
        conn.query_row(
            "INSERT INTO track_sections (track_id, position, step_count, created_by_id, updated_by_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id",
            params![
                section.track_id.as_str(),
                section.index,
                section.step_count,
                section.audit.created_by_id.as_ref().map(Id::as_str),
                section.audit.updated_by_id.as_ref().map(Id::as_str),
            ],
            |row| row.get::<_, String>(0),
        )
    };
    let id = result.map_err(|e| {
        on_foreign_key(e, || StoreError::ForeignKey {
            kind: EntityKind::TrackSection,
            id: section.id.clone(),
            parent: section.track_id.clone(),
        })
    })?;
    reload(
        load::load_track_section(conn, &Id::new(id.clone()))?,
        EntityKind::TrackSection,
        id,
    )
}

pub fn delete_track_section(conn: &Connection, id: &Id) -> Result<(), StoreError> {
    let deleted = conn.execute("DELETE FROM track_sections WHERE id = ?1", params![id.as_str()])?;
    expect_one(deleted, EntityKind::TrackSection, id)
}

// ============================================================
// Helpers
// ============================================================

/// Translate SQLite's foreign key constraint failure into a domain error.
fn on_foreign_key(err: rusqlite::Error, domain: impl FnOnce() -> StoreError) -> StoreError {
    let is_foreign_key = err.sqlite_error().is_some_and(|e| {
        e.code == ErrorCode::ConstraintViolation
            && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    });
    if is_foreign_key {
        domain()
    } else {
        StoreError::Sqlite(err)
    }
}

fn expect_one(affected: usize, kind: EntityKind, id: &Id) -> Result<(), StoreError> {
    if affected == 0 {
        return Err(StoreError::NotFound { kind, id: id.clone() });
    }
    Ok(())
}

/// The row we just wrote must be readable again on the same connection.
fn reload<T>(row: Option<T>, kind: EntityKind, id: String) -> Result<T, StoreError> {
    row.ok_or(StoreError::NotFound { kind, id: Id::new(id) })
}

