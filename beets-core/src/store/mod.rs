//! Remote store interface.
//!
//! The sync engine only ever talks to persistence through [`RemoteStore`]:
//! per-entity upsert, delete and fetch primitives. Every call stands on its
//! own; the engine never opens a multi-statement transaction.

pub mod memory;

pub use memory::{MemoryStore, StoreCall};

use async_trait::async_trait;
use beets_types::{EntityKind, Id, Project, Track, TrackSection};

/// Failure reported by a remote store primitive.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("{kind} {id} does not exist")]
    NotFound { kind: EntityKind, id: Id },
    /// A write referenced a parent row that does not exist.
    #[error("{kind} {id} references missing parent {parent}")]
    ForeignKey { kind: EntityKind, id: Id, parent: Id },
    /// A delete was refused because other rows still reference the target.
    #[error("{kind} {id} is still referenced by other rows")]
    HasChildren { kind: EntityKind, id: Id },
    #[error("store rejected the request: {0}")]
    Rejected(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Per-entity CRUD primitives the sync engine requires.
///
/// Upserts create when the entity's id is temporary or empty and update when
/// it is persistent; the returned entity always carries a persistent id and
/// store-computed audit fields.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn upsert_project(&self, project: Project) -> Result<Project, StoreError>;

    async fn fetch_project(&self, id: &Id) -> Result<Option<Project>, StoreError>;

    async fn upsert_track(&self, track: Track) -> Result<Track, StoreError>;

    /// Fails with [`StoreError::NotFound`] if no such track exists.
    async fn delete_track(&self, id: &Id) -> Result<(), StoreError>;

    async fn fetch_tracks(&self, project_id: &Id) -> Result<Vec<Track>, StoreError>;

    async fn upsert_track_section(&self, section: TrackSection) -> Result<TrackSection, StoreError>;

    /// Fails with [`StoreError::NotFound`] if no such section exists.
    async fn delete_track_section(&self, id: &Id) -> Result<(), StoreError>;

    /// All sections whose `track_id` is one of `track_ids`.
    async fn fetch_track_sections(&self, track_ids: &[Id]) -> Result<Vec<TrackSection>, StoreError>;
}
