//! Track entity.

use serde::{Deserialize, Serialize};

use super::Audit;
use crate::{Entity, EntityKind, Id};

/// A single track in a project's arrangement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: Id,
    /// Foreign key to `projects.id`. May hold a temporary project id (or be
    /// empty) until the project has been persisted.
    pub project_id: Id,
    pub name: String,
    pub mute: bool,
    pub solo: bool,
    /// -1.0 (hard left) .. 1.0 (hard right)
    pub pan: f32,
    /// Gain in dB
    pub volume: f32,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Track {
    pub fn new(project_id: Id, name: impl Into<String>) -> Self {
        Self {
            id: Id::temporary(),
            project_id,
            name: name.into(),
            mute: false,
            solo: false,
            pan: 0.0,
            volume: 0.0,
            audit: Audit::default(),
        }
    }
}

impl Entity for Track {
    const KIND: EntityKind = EntityKind::Track;

    fn id(&self) -> &Id {
        &self.id
    }
}
