//! Pushing a locally edited workstation snapshot to the remote store.
//!
//! A sync diffs `initial` against `current` and replays the changes in
//! foreign-key order, one phase at a time:
//!
//! 1. upsert the project
//! 2. upsert tracks, rewriting placeholder project ids
//! 3. upsert track sections, rewriting placeholder track ids
//! 4. delete track sections
//! 5. delete tracks
//! 6. re-fetch the whole workstation
//!
//! Calls inside a phase are independent and run concurrently; a phase only
//! starts once the previous one has fully completed. The first failing call
//! aborts the sync. Nothing is rolled back: the store keeps whatever the
//! completed calls wrote, and the caller's snapshots are left as they were.

mod rewrite;

pub use rewrite::RewriteTable;

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::{self, try_join};
use futures_util::stream::{self, StreamExt};

use beets_types::{diff, EntityKind, Id, Project, Track, TrackSection, WorkstationState};

use crate::error::{SyncError, SyncResult, ValidationError};
use crate::store::{RemoteStore, StoreError};

/// Tuning knobs for a [`Synchronizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Upper bound on store calls in flight within one phase.
    pub max_concurrent_requests: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 8,
        }
    }
}

/// Drives syncs against one remote store.
pub struct Synchronizer<'s, S: ?Sized> {
    store: &'s S,
    options: SyncOptions,
}

impl<'s, S: RemoteStore + ?Sized> Synchronizer<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self::with_options(store, SyncOptions::default())
    }

    pub fn with_options(store: &'s S, options: SyncOptions) -> Self {
        Self { store, options }
    }

    /// Persist everything that changed between `initial` and `current` and
    /// return the workstation as the store now sees it.
    pub async fn sync(
        &self,
        initial: &WorkstationState,
        current: &WorkstationState,
    ) -> SyncResult<WorkstationState> {
        let changes = diff(initial, current);
        log::debug!(
            target: "sync",
            "syncing project {}: {} store operation(s)",
            current.project.id,
            changes.len()
        );
        check_step_counts(&changes.created_or_updated_track_sections)?;

        let upserted_project = match changes.created_or_updated_project {
            Some(project) => Some(self.store.upsert_project(project).await?),
            None => None,
        };
        let project_id = effective_project_id(current, initial, upserted_project.as_ref());

        let tracks = attach_project(changes.created_or_updated_tracks, project_id.as_ref())?;
        let rewrites = self.upsert_tracks(tracks).await?;

        let sections = attach_tracks(changes.created_or_updated_track_sections, &rewrites)?;
        let upserted_sections = self.upsert_track_sections(sections).await?;

        // Children before parents, so no delete trips a foreign key.
        self.delete_track_sections(&changes.deleted_track_sections).await?;
        self.delete_tracks(&changes.deleted_tracks).await?;

        let project_id = project_id.ok_or(ValidationError::NoPersistedProject)?;
        let state = load_workstation(self.store, &project_id).await?;

        log::info!(
            target: "sync",
            "synced project {}: {} track(s) created, {} section(s) upserted, {} track(s) and {} section(s) deleted",
            project_id,
            rewrites.len(),
            upserted_sections,
            changes.deleted_tracks.len(),
            changes.deleted_track_sections.len()
        );
        Ok(state)
    }

    /// Upsert every track, remembering which temporary id became which
    /// persistent one.
    async fn upsert_tracks(&self, tracks: Vec<Track>) -> Result<RewriteTable, StoreError> {
        log::debug!(target: "sync", "upserting {} track(s)", tracks.len());
        let store = self.store;
        let saved = self
            .dispatch(tracks, move |track| async move {
                let before = track.id.clone();
                let saved = store.upsert_track(track).await?;
                Ok::<_, StoreError>((before, saved.id))
            })
            .await?;

        let mut rewrites = RewriteTable::new();
        for (before, after) in &saved {
            rewrites.record(before, after);
        }
        Ok(rewrites)
    }

    async fn upsert_track_sections(&self, sections: Vec<TrackSection>) -> Result<usize, StoreError> {
        log::debug!(target: "sync", "upserting {} track section(s)", sections.len());
        let store = self.store;
        let saved = self
            .dispatch(sections, move |section| store.upsert_track_section(section))
            .await?;
        Ok(saved.len())
    }

    async fn delete_track_sections(&self, sections: &[TrackSection]) -> Result<(), StoreError> {
        log::debug!(target: "sync", "deleting {} track section(s)", sections.len());
        let store = self.store;
        self.dispatch(sections, move |section| store.delete_track_section(&section.id))
            .await?;
        Ok(())
    }

    async fn delete_tracks(&self, tracks: &[Track]) -> Result<(), StoreError> {
        log::debug!(target: "sync", "deleting {} track(s)", tracks.len());
        let store = self.store;
        self.dispatch(tracks, move |track| store.delete_track(&track.id))
            .await?;
        Ok(())
    }

    /// Run `op` over every item with at most `max_concurrent_requests` in
    /// flight, returning results in input order.
    ///
    /// After the first error no further items are started, but calls already
    /// in flight are awaited before the error is returned. A failed phase
    /// never leaves writes landing behind the caller's back.
    async fn dispatch<I, F, Fut, T>(&self, items: I, op: F) -> Result<Vec<T>, StoreError>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let failed = AtomicBool::new(false);
        let mut calls = stream::iter(items)
            .take_while(|_| future::ready(!failed.load(Ordering::Relaxed)))
            .map(op)
            .buffered(self.options.max_concurrent_requests.max(1));

        let mut done = Vec::new();
        let mut first_error = None;
        while let Some(result) = calls.next().await {
            match result {
                Ok(value) => done.push(value),
                Err(err) if first_error.is_none() => {
                    log::warn!(target: "sync", "store call failed, draining calls in flight: {}", err);
                    failed.store(true, Ordering::Relaxed);
                    first_error = Some(err);
                }
                Err(err) => {
                    log::debug!(target: "sync", "further store failure while draining: {}", err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(done),
        }
    }
}

/// Sync `current` against `initial` with default options.
pub async fn sync<S: RemoteStore + ?Sized>(
    store: &S,
    initial: &WorkstationState,
    current: &WorkstationState,
) -> SyncResult<WorkstationState> {
    Synchronizer::new(store).sync(initial, current).await
}

/// Fetch the project, its tracks and their sections.
pub async fn load_workstation<S: RemoteStore + ?Sized>(
    store: &S,
    project_id: &Id,
) -> SyncResult<WorkstationState> {
    let (project, tracks) = try_join(store.fetch_project(project_id), store.fetch_tracks(project_id)).await?;
    let project = project.ok_or_else(|| SyncError::NotFound {
        kind: EntityKind::Project,
        id: project_id.clone(),
    })?;

    let track_ids: Vec<Id> = tracks.iter().map(|t| t.id.clone()).collect();
    let track_sections = store.fetch_track_sections(&track_ids).await?;

    Ok(WorkstationState::from_parts(project, tracks, track_sections))
}

/// First persistent id out of the current project, the initial project and
/// the project the store just returned.
fn effective_project_id(
    current: &WorkstationState,
    initial: &WorkstationState,
    upserted: Option<&Project>,
) -> Option<Id> {
    [
        Some(&current.project.id),
        Some(&initial.project.id),
        upserted.map(|p| &p.id),
    ]
    .into_iter()
    .flatten()
    .find(|id| id.is_persistent())
    .cloned()
}

/// Refuse the whole sync, before anything is written, if a section has a step
/// count the store would not accept.
fn check_step_counts(sections: &[TrackSection]) -> Result<(), ValidationError> {
    match sections.iter().find(|s| !s.has_valid_step_count()) {
        Some(section) => Err(ValidationError::InvalidStepCount {
            section: section.id.clone(),
            step_count: section.step_count,
        }),
        None => Ok(()),
    }
}

/// Point every track without a persistent project id at `project_id`.
fn attach_project(tracks: Vec<Track>, project_id: Option<&Id>) -> Result<Vec<Track>, ValidationError> {
    let orphans = tracks.iter().filter(|t| !t.project_id.is_persistent()).count();
    if orphans == 0 {
        return Ok(tracks);
    }
    let Some(project_id) = project_id else {
        return Err(ValidationError::MissingProjectId { tracks: orphans });
    };

    Ok(tracks
        .into_iter()
        .map(|mut track| {
            if !track.project_id.is_persistent() {
                track.project_id = project_id.clone();
            }
            track
        })
        .collect())
}

/// Swap placeholder track ids on sections for the ids their tracks were
/// persisted under.
fn attach_tracks(
    sections: Vec<TrackSection>,
    rewrites: &RewriteTable,
) -> Result<Vec<TrackSection>, ValidationError> {
    sections
        .into_iter()
        .map(|mut section| {
            if section.has_track_id() {
                return Ok(section);
            }
            let Some(track_id) = rewrites.resolve(&section.track_id) else {
                return Err(ValidationError::UnresolvedTrack {
                    section: section.id,
                    track: section.track_id,
                });
            };
            log::debug!(
                target: "sync",
                "matched track section {} with temporary track {} to {}",
                section.id,
                section.track_id,
                track_id
            );
            section.track_id = track_id.clone();
            Ok(section)
        })
        .collect()
}
