//! Project entity.

use serde::{Deserialize, Serialize};

use super::Audit;
use crate::{Entity, EntityKind, Id};

/// Root of a workstation: one per snapshot, never deleted through sync.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Id,
    pub name: String,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Project {
    /// A brand new, not yet persisted project.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Id::temporary(),
            name: name.into(),
            audit: Audit::default(),
        }
    }
}

impl Entity for Project {
    const KIND: EntityKind = EntityKind::Project;

    fn id(&self) -> &Id {
        &self.id
    }
}
