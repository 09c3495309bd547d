//! Track section entity.

use serde::{Deserialize, Serialize};

use super::Audit;
use crate::{Entity, EntityKind, Id};

/// Longest section a track can hold.
pub const MAX_STEP_COUNT: u32 = 64;

/// A block of sequencer steps placed on a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSection {
    pub id: Id,
    /// Foreign key to `tracks.id`. Holds the temporary id of its track while
    /// that track only exists locally.
    pub track_id: Id,
    /// Position of the section on its track (0-based)
    pub index: u32,
    pub step_count: u32,
    #[serde(flatten)]
    pub audit: Audit,
}

impl TrackSection {
    /// `step_count` is not checked here; see [`TrackSection::has_valid_step_count`].
    pub fn new(track_id: Id, index: u32, step_count: u32) -> Self {
        Self {
            id: Id::temporary(),
            track_id,
            index,
            step_count,
            audit: Audit::default(),
        }
    }

    pub fn has_valid_step_count(&self) -> bool {
        (1..=MAX_STEP_COUNT).contains(&self.step_count)
    }

    /// Whether this section already points at a persisted track.
    pub fn has_track_id(&self) -> bool {
        self.track_id.is_persistent()
    }
}

impl Entity for TrackSection {
    const KIND: EntityKind = EntityKind::TrackSection;

    fn id(&self) -> &Id {
        &self.id
    }
}
