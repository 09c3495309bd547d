//! In-process remote store.
//!
//! Behaves like a small relational backend: it mints persistent ids, enforces
//! foreign keys, stamps audit fields from a logical clock and refuses to
//! delete rows that do not exist. Every primitive invoked is appended to a
//! call log so callers can assert on ordering, and failures can be injected
//! for any call.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use beets_types::{Audit, Entity, EntityKind, Id, Project, Track, TrackSection, WorkstationState};

use super::{RemoteStore, StoreError};

/// One primitive invoked on a [`MemoryStore`], with the id it was called for
/// (as passed in, before any id was minted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    UpsertProject(Id),
    FetchProject(Id),
    UpsertTrack(Id),
    DeleteTrack(Id),
    FetchTracks(Id),
    UpsertTrackSection(Id),
    DeleteTrackSection(Id),
    FetchTrackSections(Vec<Id>),
}

impl StoreCall {
    /// Upserts and deletes; everything except fetches.
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            Self::FetchProject(_) | Self::FetchTracks(_) | Self::FetchTrackSections(_)
        )
    }
}

type FailurePredicate = Box<dyn Fn(&StoreCall) -> bool + Send>;

#[derive(Default)]
struct Tables {
    projects: Vec<Project>,
    tracks: Vec<Track>,
    track_sections: Vec<TrackSection>,
    next_project: u64,
    next_track: u64,
    next_section: u64,
    clock: u64,
    calls: Vec<StoreCall>,
    fail_when: Option<FailurePredicate>,
}

impl Tables {
    /// Next unused id for `kind`. Seeded rows may already hold low numbers.
    fn mint(&mut self, kind: EntityKind) -> Id {
        loop {
            let (prefix, counter) = match kind {
                EntityKind::Project => ("P", &mut self.next_project),
                EntityKind::Track => ("T", &mut self.next_track),
                EntityKind::TrackSection => ("S", &mut self.next_section),
            };
            *counter += 1;
            let id = Id::new(format!("{}{}", prefix, counter));
            let taken = match kind {
                EntityKind::Project => self.projects.iter().any(|r| r.id == id),
                EntityKind::Track => self.tracks.iter().any(|r| r.id == id),
                EntityKind::TrackSection => self.track_sections.iter().any(|r| r.id == id),
            };
            if !taken {
                return id;
            }
        }
    }

    fn tick(&mut self) -> String {
        self.clock += 1;
        format!("tick-{:06}", self.clock)
    }

    /// Mint an id for `row` if it has no persistent one, without touching
    /// the row itself.
    fn fresh_id_for<R: Entity>(&mut self, row: &R) -> Option<Id> {
        if row.id().is_persistent() {
            None
        } else {
            Some(self.mint(R::KIND))
        }
    }
}

/// Access to the fields the store owns on every row.
trait Row: Entity + Clone {
    fn set_id(&mut self, id: Id);
    fn audit(&self) -> &Audit;
    fn audit_mut(&mut self) -> &mut Audit;
}

macro_rules! impl_row {
    ($($ty:ty),*) => {
        $(impl Row for $ty {
            fn set_id(&mut self, id: Id) {
                self.id = id;
            }
            fn audit(&self) -> &Audit {
                &self.audit
            }
            fn audit_mut(&mut self) -> &mut Audit {
                &mut self.audit
            }
        })*
    };
}

impl_row!(Project, Track, TrackSection);

fn upsert_row<R: Row>(rows: &mut Vec<R>, mut row: R, fresh_id: Option<Id>, stamp: String) -> R {
    if let Some(id) = fresh_id {
        row.set_id(id);
    }
    let existing = rows.iter().position(|r| r.id() == row.id());
    let created_on = match existing {
        Some(i) => rows[i].audit().created_on.clone(),
        None => Some(stamp.clone()),
    };
    let audit = row.audit_mut();
    audit.created_on = created_on;
    audit.updated_on = Some(stamp);

    match existing {
        Some(i) => rows[i] = row.clone(),
        None => rows.push(row.clone()),
    }
    row
}

/// A [`RemoteStore`] held entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds every row of `state`, ids and all.
    pub fn seeded(state: &WorkstationState) -> Self {
        let store = Self::new();
        if let Ok(mut t) = store.tables.lock() {
            t.projects.push(state.project.clone());
            t.tracks.extend(state.tracks.iter().cloned());
            t.track_sections.extend(state.track_sections.iter().cloned());
        }
        store
    }

    /// Make every call matching `predicate` fail with [`StoreError::Rejected`].
    /// The call is still recorded.
    pub fn fail_when(&self, predicate: impl Fn(&StoreCall) -> bool + Send + 'static) {
        if let Ok(mut t) = self.tables.lock() {
            t.fail_when = Some(Box::new(predicate));
        }
    }

    /// Every call made so far, in the order it reached the store.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.tables.lock().map(|t| t.calls.clone()).unwrap_or_default()
    }

    pub fn clear_calls(&self) {
        if let Ok(mut t) = self.tables.lock() {
            t.calls.clear();
        }
    }

    pub fn tracks(&self) -> Vec<Track> {
        self.tables.lock().map(|t| t.tracks.clone()).unwrap_or_default()
    }

    pub fn track_sections(&self) -> Vec<TrackSection> {
        self.tables
            .lock()
            .map(|t| t.track_sections.clone())
            .unwrap_or_default()
    }

    fn begin(&self, call: StoreCall) -> Result<MutexGuard<'_, Tables>, StoreError> {
        let mut t = self
            .tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        let fails = t.fail_when.as_ref().is_some_and(|f| f(&call));
        let message = format!("injected failure on {:?}", call);
        t.calls.push(call);
        if fails {
            return Err(StoreError::Rejected(message));
        }
        Ok(t)
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn upsert_project(&self, project: Project) -> Result<Project, StoreError> {
        let mut t = self.begin(StoreCall::UpsertProject(project.id.clone()))?;
        let fresh = t.fresh_id_for(&project);
        let stamp = t.tick();
        Ok(upsert_row(&mut t.projects, project, fresh, stamp))
    }

    async fn fetch_project(&self, id: &Id) -> Result<Option<Project>, StoreError> {
        let t = self.begin(StoreCall::FetchProject(id.clone()))?;
        Ok(t.projects.iter().find(|p| &p.id == id).cloned())
    }

    async fn upsert_track(&self, track: Track) -> Result<Track, StoreError> {
        let mut t = self.begin(StoreCall::UpsertTrack(track.id.clone()))?;
        if !t.projects.iter().any(|p| p.id == track.project_id) {
            return Err(StoreError::ForeignKey {
                kind: EntityKind::Track,
                id: track.id,
                parent: track.project_id,
            });
        }
        let fresh = t.fresh_id_for(&track);
        let stamp = t.tick();
        Ok(upsert_row(&mut t.tracks, track, fresh, stamp))
    }

    async fn delete_track(&self, id: &Id) -> Result<(), StoreError> {
        let mut t = self.begin(StoreCall::DeleteTrack(id.clone()))?;
        let Some(pos) = t.tracks.iter().position(|tr| &tr.id == id) else {
            return Err(StoreError::NotFound {
                kind: EntityKind::Track,
                id: id.clone(),
            });
        };
        if t.track_sections.iter().any(|s| &s.track_id == id) {
            return Err(StoreError::HasChildren {
                kind: EntityKind::Track,
                id: id.clone(),
            });
        }
        t.tracks.remove(pos);
        Ok(())
    }

    async fn fetch_tracks(&self, project_id: &Id) -> Result<Vec<Track>, StoreError> {
        let t = self.begin(StoreCall::FetchTracks(project_id.clone()))?;
        Ok(t.tracks
            .iter()
            .filter(|tr| &tr.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn upsert_track_section(&self, section: TrackSection) -> Result<TrackSection, StoreError> {
        let mut t = self.begin(StoreCall::UpsertTrackSection(section.id.clone()))?;
        if !section.has_valid_step_count() {
            return Err(StoreError::Rejected(format!(
                "track section {} has {} steps",
                section.id, section.step_count
            )));
        }
        if !t.tracks.iter().any(|tr| tr.id == section.track_id) {
            return Err(StoreError::ForeignKey {
                kind: EntityKind::TrackSection,
                id: section.id,
                parent: section.track_id,
            });
        }
        let fresh = t.fresh_id_for(&section);
        let stamp = t.tick();
        Ok(upsert_row(&mut t.track_sections, section, fresh, stamp))
    }

    async fn delete_track_section(&self, id: &Id) -> Result<(), StoreError> {
        let mut t = self.begin(StoreCall::DeleteTrackSection(id.clone()))?;
        let Some(pos) = t.track_sections.iter().position(|s| &s.id == id) else {
            return Err(StoreError::NotFound {
                kind: EntityKind::TrackSection,
                id: id.clone(),
            });
        };
        t.track_sections.remove(pos);
        Ok(())
    }

    async fn fetch_track_sections(&self, track_ids: &[Id]) -> Result<Vec<TrackSection>, StoreError> {
        let t = self.begin(StoreCall::FetchTrackSections(track_ids.to_vec()))?;
        Ok(t.track_sections
            .iter()
            .filter(|s| track_ids.contains(&s.track_id))
            .cloned()
            .collect())
    }
}
