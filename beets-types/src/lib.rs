//! # beets-types
//!
//! Shared type definitions for the beets workstation.
//! This crate holds the editable entity model (projects, tracks, track
//! sections), the immutable workstation snapshot, and the pure diff engine
//! that compares two snapshots. Nothing in here talks to a store.

pub mod diff;
pub mod state;

pub use diff::{diff, WorkstationDiff};
pub use state::*;

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Prefix that marks a client-generated placeholder id.
pub const TEMPORARY_ID_PREFIX: &str = "temp-";

static NEXT_TEMPORARY_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a project, track or track section.
///
/// Ids live in two disjoint spaces: temporary ids minted locally (prefixed
/// with [`TEMPORARY_ID_PREFIX`]) and persistent ids assigned by the remote
/// store. An empty id means "not assigned yet".
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh temporary id, unique within this process. The counter is
    /// zero-padded so ids sort in minting order.
    pub fn temporary() -> Self {
        let n = NEXT_TEMPORARY_ID.fetch_add(1, Ordering::Relaxed);
        Self(format!("{}{:012}", TEMPORARY_ID_PREFIX, n))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMPORARY_ID_PREFIX)
    }

    /// True for ids the remote store handed out: non-empty and not temporary.
    pub fn is_persistent(&self) -> bool {
        !self.is_empty() && !self.is_temporary()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            write!(f, "<unassigned>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<&str> for Id {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Id {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The three kinds of entity a workstation snapshot is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Project,
    Track,
    TrackSection,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Project => "project",
            Self::Track => "track",
            Self::TrackSection => "track section",
        };
        f.write_str(name)
    }
}

/// Anything with an identity inside a workstation snapshot.
pub trait Entity {
    const KIND: EntityKind;

    fn id(&self) -> &Id;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporary_ids_are_recognized_structurally() {
        let id = Id::temporary();
        assert!(id.is_temporary());
        assert!(!id.is_persistent());
        assert!(id.as_str().starts_with("temp-"));

        assert!(Id::from("temp-42").is_temporary());
        assert!(Id::from("a1b2c3").is_persistent());
    }

    #[test]
    fn empty_id_is_neither_temporary_nor_persistent() {
        let id = Id::default();
        assert!(id.is_empty());
        assert!(!id.is_temporary());
        assert!(!id.is_persistent());
        assert_eq!(id.to_string(), "<unassigned>");
    }

    #[test]
    fn minted_temporary_ids_are_distinct() {
        let a = Id::temporary();
        let b = Id::temporary();
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn id_serializes_as_a_bare_string() {
        let json = serde_json::to_string(&Id::from("T1")).unwrap();
        assert_eq!(json, "\"T1\"");
        let back: Id = serde_json::from_str("\"temp-7\"").unwrap();
        assert!(back.is_temporary());
    }
}
