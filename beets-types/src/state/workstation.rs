//! Workstation snapshot: one project plus its tracks and track sections.

use serde::{Deserialize, Serialize};

use super::{Project, Track, TrackSection};
use crate::diff::{diff, WorkstationDiff};
use crate::Id;

/// Full editable state at one point in time.
///
/// Snapshots are values. Editing helpers consume the snapshot and hand back a
/// new one, so an `initial` snapshot kept around for diffing can never be
/// disturbed by edits made to `current`.
///
/// Track and section order is display order. It survives diffing and syncing
/// but plays no part in identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkstationState {
    pub project: Project,
    pub tracks: Vec<Track>,
    pub track_sections: Vec<TrackSection>,
}

impl WorkstationState {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            tracks: Vec::new(),
            track_sections: Vec::new(),
        }
    }

    pub fn from_parts(project: Project, tracks: Vec<Track>, track_sections: Vec<TrackSection>) -> Self {
        Self {
            project,
            tracks,
            track_sections,
        }
    }

    pub fn track(&self, id: &Id) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.id == id)
    }

    pub fn track_section(&self, id: &Id) -> Option<&TrackSection> {
        self.track_sections.iter().find(|s| &s.id == id)
    }

    pub fn sections_for<'a>(&'a self, track_id: &'a Id) -> impl Iterator<Item = &'a TrackSection> + 'a {
        self.track_sections.iter().filter(move |s| &s.track_id == track_id)
    }

    /// True if any id or foreign key in the snapshot is still a placeholder.
    pub fn has_temporary_ids(&self) -> bool {
        self.project.id.is_temporary()
            || self
                .tracks
                .iter()
                .any(|t| t.id.is_temporary() || t.project_id.is_temporary())
            || self
                .track_sections
                .iter()
                .any(|s| s.id.is_temporary() || s.track_id.is_temporary())
    }

    pub fn with_project(mut self, project: Project) -> Self {
        self.project = project;
        self
    }

    /// Insert `track`, or replace the track with the same id in place.
    pub fn with_track(mut self, track: Track) -> Self {
        match self.tracks.iter_mut().find(|t| t.id == track.id) {
            Some(existing) => *existing = track,
            None => self.tracks.push(track),
        }
        self
    }

    /// Remove a track together with every section that sits on it.
    pub fn without_track(mut self, id: &Id) -> Self {
        self.tracks.retain(|t| &t.id != id);
        self.track_sections.retain(|s| &s.track_id != id);
        self
    }

    /// Insert `section`, or replace the section with the same id in place.
    pub fn with_track_section(mut self, section: TrackSection) -> Self {
        match self.track_sections.iter_mut().find(|s| s.id == section.id) {
            Some(existing) => *existing = section,
            None => self.track_sections.push(section),
        }
        self
    }

    pub fn without_track_section(mut self, id: &Id) -> Self {
        self.track_sections.retain(|s| &s.id != id);
        self
    }

    /// Diff `self` (as the last persisted state) against `current`.
    pub fn diff(&self, current: &WorkstationState) -> WorkstationDiff {
        diff(self, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persisted_project() -> Project {
        Project {
            id: Id::from("P1"),
            name: "Song A".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn with_track_replaces_in_place() {
        let project = persisted_project();
        let a = Track::new(project.id.clone(), "Kick");
        let b = Track::new(project.id.clone(), "Snare");
        let state = WorkstationState::new(project)
            .with_track(a.clone())
            .with_track(b.clone());

        let renamed = Track {
            name: "Kick 2".to_string(),
            ..a.clone()
        };
        let state = state.with_track(renamed);

        assert_eq!(state.tracks.len(), 2);
        assert_eq!(state.tracks[0].id, a.id);
        assert_eq!(state.tracks[0].name, "Kick 2");
        assert_eq!(state.tracks[1].id, b.id);
    }

    #[test]
    fn without_track_drops_its_sections() {
        let project = persisted_project();
        let kick = Track::new(project.id.clone(), "Kick");
        let hat = Track::new(project.id.clone(), "Hat");
        let state = WorkstationState::new(project)
            .with_track(kick.clone())
            .with_track(hat.clone())
            .with_track_section(TrackSection::new(kick.id.clone(), 0, 16))
            .with_track_section(TrackSection::new(kick.id.clone(), 1, 16))
            .with_track_section(TrackSection::new(hat.id.clone(), 0, 8));

        let state = state.without_track(&kick.id);

        assert_eq!(state.tracks.len(), 1);
        assert_eq!(state.track_sections.len(), 1);
        assert_eq!(state.sections_for(&hat.id).count(), 1);
        assert!(state.track(&kick.id).is_none());
    }

    #[test]
    fn editing_leaves_the_original_untouched() {
        let initial = WorkstationState::new(persisted_project());
        let current = initial
            .clone()
            .with_track(Track::new(Id::from("P1"), "Bass"));

        assert!(initial.tracks.is_empty());
        assert_eq!(current.tracks.len(), 1);
    }

    #[test]
    fn temporary_ids_are_detected_anywhere() {
        let state = WorkstationState::new(persisted_project());
        assert!(!state.has_temporary_ids());

        let section = TrackSection {
            id: Id::from("S1"),
            track_id: Id::from("temp-3"),
            index: 0,
            step_count: 4,
            audit: Default::default(),
        };
        let state = state.with_track_section(section);
        assert!(state.has_temporary_ids());
    }
}
