//! Audit columns shared by every persisted entity.

use serde::{Deserialize, Serialize};

use crate::Id;

/// Bookkeeping fields stamped by the remote store. Clients never set the
/// timestamps themselves; they come back on every upsert and fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub created_by_id: Option<Id>,
    #[serde(default)]
    pub updated_on: Option<String>,
    #[serde(default)]
    pub updated_by_id: Option<Id>,
}
