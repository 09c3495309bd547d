use beets_types::{EntityKind, Id, MAX_STEP_COUNT};

use crate::store::StoreError;

/// A snapshot that cannot be written as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Tracks need a parent project, and none is persisted or was just created.
    #[error("{tracks} new track(s) could not be created without a project id")]
    MissingProjectId { tracks: usize },
    /// A section points at a track id that no upserted track was created from.
    #[error("track section {section} references track {track}, which was never created")]
    UnresolvedTrack { section: Id, track: Id },
    /// Step counts run from 1 to [`MAX_STEP_COUNT`].
    #[error("track section {section} has {step_count} steps, expected 1..={max}", max = MAX_STEP_COUNT)]
    InvalidStepCount { section: Id, step_count: u32 },
    /// Nothing to re-fetch: the project has never been persisted.
    #[error("the project has no persistent id to sync against")]
    NoPersistedProject,
}

/// Everything that can make a sync fail.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("remote store error: {0}")]
    Remote(#[from] StoreError),
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Id },
}

pub type SyncResult<T> = Result<T, SyncError>;
