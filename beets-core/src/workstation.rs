//! The pair of snapshots an editing session works with.

use beets_types::{Id, WorkstationDiff, WorkstationState};

use crate::error::SyncResult;
use crate::store::RemoteStore;
use crate::sync::{load_workstation, Synchronizer};

/// Holds the last persisted snapshot (`initial`) next to the live, edited
/// one (`current`).
///
/// A successful [`Workstation::sync`] replaces both with the freshly fetched
/// snapshot. A failed one leaves both exactly as they were, so local edits
/// survive and the sync can simply be retried.
#[derive(Debug, Clone)]
pub struct Workstation {
    initial: WorkstationState,
    current: WorkstationState,
}

impl Workstation {
    pub fn new(state: WorkstationState) -> Self {
        Self {
            initial: state.clone(),
            current: state,
        }
    }

    /// Load an existing project from the store.
    pub async fn open<S: RemoteStore + ?Sized>(store: &S, project_id: &Id) -> SyncResult<Self> {
        Ok(Self::new(load_workstation(store, project_id).await?))
    }

    pub fn initial(&self) -> &WorkstationState {
        &self.initial
    }

    pub fn current(&self) -> &WorkstationState {
        &self.current
    }

    /// Replace the current snapshot with an edited version of itself.
    pub fn edit(&mut self, f: impl FnOnce(WorkstationState) -> WorkstationState) {
        let current = std::mem::take(&mut self.current);
        self.current = f(current);
    }

    pub fn pending_diff(&self) -> WorkstationDiff {
        self.initial.diff(&self.current)
    }

    pub fn has_changes(&self) -> bool {
        !self.pending_diff().is_empty()
    }

    /// Throw away every edit since the last sync.
    pub fn discard_changes(&mut self) {
        self.current = self.initial.clone();
    }

    pub async fn sync<S: RemoteStore + ?Sized>(
        &mut self,
        synchronizer: &Synchronizer<'_, S>,
    ) -> SyncResult<&WorkstationState> {
        let synced = synchronizer.sync(&self.initial, &self.current).await?;
        self.initial = synced.clone();
        self.current = synced;
        Ok(&self.current)
    }
}
