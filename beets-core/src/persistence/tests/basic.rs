use beets_types::{EntityKind, Id, Project, Track, TrackSection};
use rusqlite::{params, Connection};

use super::{open, project_id, saved_project, temp_db_path};
use crate::persistence::{schema, SqliteStore};
use crate::store::{RemoteStore, StoreError};

#[async_std::test]
async fn create_assigns_ids_and_created_on() {
    let store = SqliteStore::open_in_memory().unwrap();
    let draft = Project::new("Song A");
    assert!(draft.id.is_temporary());

    let project = store.upsert_project(draft).await.unwrap();
    assert!(project.id.is_persistent());
    assert_eq!(project.id.as_str().len(), 32);
    assert_eq!(project.name, "Song A");
    assert!(project.audit.created_on.is_some());
    assert!(project.audit.updated_on.is_none());
}

#[async_std::test]
async fn update_keeps_id_and_stamps_updated_on() {
    let store = SqliteStore::open_in_memory().unwrap();
    let project = saved_project(&store, "Song A").await;
    let pid = project_id(&project);

    let track = store.upsert_track(Track::new(pid.clone(), "Kick")).await.unwrap();
    let mut louder = track.clone();
    louder.volume = -3.5;
    louder.pan = 0.25;
    louder.solo = true;

    let updated = store.upsert_track(louder).await.unwrap();
    assert_eq!(updated.id, track.id);
    assert_eq!(updated.volume, -3.5);
    assert_eq!(updated.pan, 0.25);
    assert!(updated.solo);
    assert!(!updated.mute);
    assert_eq!(updated.audit.created_on, track.audit.created_on);
    assert!(updated.audit.updated_on.is_some());
}

#[async_std::test]
async fn upsert_with_unknown_persistent_id_creates_that_row() {
    let store = SqliteStore::open_in_memory().unwrap();
    let project = Project {
        id: Id::from("imported-1"),
        name: "Imported".to_string(),
        ..Default::default()
    };

    let saved = store.upsert_project(project).await.unwrap();
    assert_eq!(saved.id, Id::from("imported-1"));
    assert!(store.fetch_project(&Id::from("imported-1")).await.unwrap().is_some());
}

#[async_std::test]
async fn track_for_missing_project_is_a_foreign_key_error() {
    let store = SqliteStore::open_in_memory().unwrap();
    let err = store
        .upsert_track(Track::new(Id::from("nope"), "Orphan"))
        .await
        .unwrap_err();

    match err {
        StoreError::ForeignKey { kind, parent, .. } => {
            assert_eq!(kind, EntityKind::Track);
            assert_eq!(parent, Id::from("nope"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[async_std::test]
async fn section_for_missing_track_is_a_foreign_key_error() {
    let store = SqliteStore::open_in_memory().unwrap();
    let err = store
        .upsert_track_section(TrackSection::new(Id::from("nope"), 0, 16))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::ForeignKey {
            kind: EntityKind::TrackSection,
            ..
        }
    ));
}

#[async_std::test]
async fn deleting_a_track_with_sections_is_refused() {
    let store = SqliteStore::open_in_memory().unwrap();
    let pid = project_id(&saved_project(&store, "Song A").await);
    let track = store.upsert_track(Track::new(pid, "Kick")).await.unwrap();
    store
        .upsert_track_section(TrackSection::new(track.id.clone(), 0, 16))
        .await
        .unwrap();

    let err = store.delete_track(&track.id).await.unwrap_err();
    assert!(matches!(err, StoreError::HasChildren { .. }));
}

#[async_std::test]
async fn out_of_range_step_count_violates_the_schema() {
    let store = SqliteStore::open_in_memory().unwrap();
    let pid = project_id(&saved_project(&store, "Song A").await);
    let track = store.upsert_track(Track::new(pid, "Kick")).await.unwrap();

    for step_count in [0, beets_types::MAX_STEP_COUNT + 1] {
        let err = store
            .upsert_track_section(TrackSection::new(track.id.clone(), 0, step_count))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)), "step_count {step_count}");
    }
    let longest = TrackSection::new(track.id.clone(), 0, beets_types::MAX_STEP_COUNT);
    assert!(store.upsert_track_section(longest).await.is_ok());
}

#[async_std::test]
async fn deleting_missing_rows_is_not_found() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert!(matches!(
        store.delete_track(&Id::from("T404")).await,
        Err(StoreError::NotFound {
            kind: EntityKind::Track,
            ..
        })
    ));
    assert!(matches!(
        store.delete_track_section(&Id::from("S404")).await,
        Err(StoreError::NotFound {
            kind: EntityKind::TrackSection,
            ..
        })
    ));
}

#[async_std::test]
async fn fetches_come_back_in_a_stable_order() {
    let store = SqliteStore::open_in_memory().unwrap();
    let pid = project_id(&saved_project(&store, "Song A").await);
    let other = project_id(&saved_project(&store, "Song B").await);

    let kick = store.upsert_track(Track::new(pid.clone(), "Kick")).await.unwrap();
    let snare = store.upsert_track(Track::new(pid.clone(), "Snare")).await.unwrap();
    store.upsert_track(Track::new(other, "Elsewhere")).await.unwrap();

    let tracks = store.fetch_tracks(&pid).await.unwrap();
    let names: Vec<_> = tracks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Kick", "Snare"]);

    for (track, index) in [(&snare, 1), (&kick, 1), (&kick, 0)] {
        store
            .upsert_track_section(TrackSection::new(track.id.clone(), index, 16))
            .await
            .unwrap();
    }
    let sections = store
        .fetch_track_sections(&[kick.id.clone(), snare.id.clone()])
        .await
        .unwrap();
    let order: Vec<_> = sections.iter().map(|s| (s.track_id.clone(), s.index)).collect();
    assert_eq!(
        order,
        vec![
            (kick.id.clone(), 0),
            (snare.id.clone(), 1),
            (kick.id.clone(), 1),
        ]
    );

    assert!(store.fetch_track_sections(&[]).await.unwrap().is_empty());
}

#[async_std::test]
async fn data_survives_reopening_the_file() {
    let (_dir, path) = temp_db_path();
    let pid = {
        let store = open(&path);
        let pid = project_id(&saved_project(&store, "Song A").await);
        store.upsert_track(Track::new(pid.clone(), "Kick")).await.unwrap();
        pid
    };

    let store = open(&path);
    let project = store.fetch_project(&pid).await.unwrap().unwrap();
    assert_eq!(project.name, "Song A");
    assert_eq!(store.fetch_tracks(&pid).await.unwrap().len(), 1);
}

#[test]
fn schema_version_is_recorded() {
    let conn = Connection::open_in_memory().unwrap();
    assert_eq!(schema::stored_version(&conn).unwrap(), None);
    schema::create_tables(&conn).unwrap();
    assert_eq!(
        schema::stored_version(&conn).unwrap(),
        Some(schema::SCHEMA_VERSION)
    );
    // idempotent
    schema::create_tables(&conn).unwrap();
}

#[test]
fn newer_schema_is_refused() {
    let (_dir, path) = temp_db_path();
    {
        let conn = Connection::open(&path).unwrap();
        schema::create_tables(&conn).unwrap();
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
            params![schema::SCHEMA_VERSION + 1],
        )
        .unwrap();
    }

    let err = SqliteStore::open(&path, std::time::Duration::from_millis(100))
        .err()
        .expect("newer schema must be refused");
    assert!(matches!(err, StoreError::Unavailable(_)));
}
