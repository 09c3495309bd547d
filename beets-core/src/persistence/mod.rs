//! SQLite-backed remote store.
//!
//! Tables are laid out relationally (`projects`, `tracks`, `track_sections`)
//! with foreign keys enforced, so the store rejects exactly the out-of-order
//! writes and deletes a hosted relational backend would.

pub mod load;
pub mod save;
pub mod schema;
#[cfg(test)]
mod tests;

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_std::task;
use async_trait::async_trait;
use rusqlite::Connection;

use beets_types::{Id, Project, Track, TrackSection};

use crate::config::Config;
use crate::store::{RemoteStore, StoreError};

/// A [`RemoteStore`] over a single SQLite connection.
///
/// Each primitive runs as its own statement on a blocking worker thread; the
/// connection is shared behind a mutex, so calls dispatched concurrently are
/// serialized at the database.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(busy_timeout)?;
        log::info!(target: "store", "opened workstation database {}", path.display());
        Self::init(conn)
    }

    /// Open the database configured in `config`, creating its directory.
    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        let path = config.database_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }
        Self::open(&path, config.busy_timeout())
    }

    /// A private, throwaway database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;

        if let Some(version) = schema::stored_version(&conn)? {
            if version > schema::SCHEMA_VERSION {
                return Err(StoreError::Unavailable(format!(
                    "database schema version {} is newer than supported ({})",
                    version,
                    schema::SCHEMA_VERSION
                )));
            }
        }
        schema::create_tables(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on a blocking worker.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
            f(&*guard)
        })
        .await
    }
}

#[async_trait]
impl RemoteStore for SqliteStore {
    async fn upsert_project(&self, project: Project) -> Result<Project, StoreError> {
        self.with_conn(move |conn| save::upsert_project(conn, &project)).await
    }

    async fn fetch_project(&self, id: &Id) -> Result<Option<Project>, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| Ok(load::load_project(conn, &id)?)).await
    }

    async fn upsert_track(&self, track: Track) -> Result<Track, StoreError> {
        self.with_conn(move |conn| save::upsert_track(conn, &track)).await
    }

    async fn delete_track(&self, id: &Id) -> Result<(), StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| save::delete_track(conn, &id)).await
    }

    async fn fetch_tracks(&self, project_id: &Id) -> Result<Vec<Track>, StoreError> {
        let project_id = project_id.clone();
        self.with_conn(move |conn| Ok(load::load_tracks(conn, &project_id)?))
            .await
    }

    async fn upsert_track_section(&self, section: TrackSection) -> Result<TrackSection, StoreError> {
        self.with_conn(move |conn| save::upsert_track_section(conn, &section))
            .await
    }

    async fn delete_track_section(&self, id: &Id) -> Result<(), StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| save::delete_track_section(conn, &id))
            .await
    }

    async fn fetch_track_sections(&self, track_ids: &[Id]) -> Result<Vec<TrackSection>, StoreError> {
        let track_ids = track_ids.to_vec();
        self.with_conn(move |conn| Ok(load::load_track_sections(conn, &track_ids)?))
            .await
    }
}
