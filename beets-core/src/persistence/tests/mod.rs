use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;

use beets_types::{Id, Project};

use super::SqliteStore;
use crate::store::RemoteStore;

mod basic;

/// A database file in a fresh directory; the directory lives as long as the
/// returned guard.
fn temp_db_path() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("workstation.sqlite");
    (dir, path)
}

fn open(path: &std::path::Path) -> SqliteStore {
    SqliteStore::open(path, Duration::from_millis(500)).expect("open store")
}

async fn saved_project(store: &SqliteStore, name: &str) -> Project {
    store
        .upsert_project(Project::new(name))
        .await
        .expect("upsert project")
}

fn project_id(project: &Project) -> Id {
    assert!(project.id.is_persistent());
    project.id.clone()
}
