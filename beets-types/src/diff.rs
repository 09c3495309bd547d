//! Pure snapshot diffing.
//!
//! [`diff`] compares the last persisted snapshot (`initial`) with the live,
//! edited one (`current`) and reports, per entity type, what has to be
//! upserted and what has to be deleted to bring the store in line.
//!
//! The diff is:
//! - pure: neither snapshot is modified
//! - deterministic: every output list is sorted by entity id
//! - keyed by id only: display order changes alone produce no operations

use std::collections::BTreeMap;

use crate::{Entity, Id, Project, Track, TrackSection, WorkstationState};

/// Changes between two workstation snapshots.
///
/// Created and updated entities are reported together, since both map to the
/// same upsert call against the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkstationDiff {
    pub created_or_updated_project: Option<Project>,
    pub created_or_updated_tracks: Vec<Track>,
    pub deleted_tracks: Vec<Track>,
    pub created_or_updated_track_sections: Vec<TrackSection>,
    pub deleted_track_sections: Vec<TrackSection>,
}

impl WorkstationDiff {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of store operations this diff implies.
    pub fn len(&self) -> usize {
        usize::from(self.created_or_updated_project.is_some())
            + self.created_or_updated_tracks.len()
            + self.deleted_tracks.len()
            + self.created_or_updated_track_sections.len()
            + self.deleted_track_sections.len()
    }
}

/// Compute the changes that turn `initial` into `current`.
pub fn diff(initial: &WorkstationState, current: &WorkstationState) -> WorkstationDiff {
    // The project is a singleton: it is never deleted, only upserted when it
    // differs from what was last persisted.
    let created_or_updated_project = if initial.project != current.project {
        Some(current.project.clone())
    } else {
        None
    };

    let (created_or_updated_tracks, deleted_tracks) = diff_collection(&initial.tracks, &current.tracks);
    let (created_or_updated_track_sections, deleted_track_sections) =
        diff_collection(&initial.track_sections, &current.track_sections);

    WorkstationDiff {
        created_or_updated_project,
        created_or_updated_tracks,
        deleted_tracks,
        created_or_updated_track_sections,
        deleted_track_sections,
    }
}

/// Split one entity collection into (created or updated, deleted).
///
/// Only entities present in `initial` can be deleted, so anything created and
/// removed again between two syncs never shows up here.
fn diff_collection<E>(initial: &[E], current: &[E]) -> (Vec<E>, Vec<E>)
where
    E: Entity + Clone + PartialEq,
{
    let before: BTreeMap<&Id, &E> = initial.iter().map(|e| (e.id(), e)).collect();
    let after: BTreeMap<&Id, &E> = current.iter().map(|e| (e.id(), e)).collect();

    let upserted = after
        .iter()
        .filter(|(id, entity)| before.get(*id).map_or(true, |old| old != *entity))
        .map(|(_, entity)| (*entity).clone())
        .collect();

    let deleted = before
        .iter()
        .filter(|(id, _)| !after.contains_key(*id))
        .map(|(_, entity)| (*entity).clone())
        .collect();

    (upserted, deleted)
}
