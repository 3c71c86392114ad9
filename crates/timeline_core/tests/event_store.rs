use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use std::collections::BTreeSet;
use timeline_core::db::{open_db, open_db_in_memory};
use timeline_core::repo::relation_linker::count_edges;
use timeline_core::{
    CatalogDraft, EventDraft, EventRepository, RecordKind, RelationKind, SqliteEventRepository,
    StoreError, ValidationError,
};

fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn ids<T>(values: impl IntoIterator<Item = T>) -> BTreeSet<T>
where
    T: Ord,
{
    values.into_iter().collect()
}

#[test]
fn add_and_get_roundtrip_materializes_relations() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();

    let nasa = repo.create_entity(&CatalogDraft::new("NASA", "")).unwrap();
    let esa = repo.create_entity(&CatalogDraft::new("ESA", "")).unwrap();
    let lunar = repo.create_tag(&CatalogDraft::new("lunar", "")).unwrap();
    let earlier = repo
        .add_event(&EventDraft::new("Apollo 11", at(1969, 7, 20)))
        .unwrap();

    let draft = EventDraft::new("Artemis I", at(2022, 11, 16))
        .with_end(at(2022, 12, 11))
        .with_description("Uncrewed lunar flyby")
        .with_related_events([earlier])
        .with_entities([nasa, esa])
        .with_tags([lunar]);
    let id = repo.add_event(&draft).unwrap();

    let loaded = repo.get_event(id).unwrap().unwrap();
    assert_eq!(loaded.title, "Artemis I");
    assert_eq!(loaded.description, "Uncrewed lunar flyby");
    assert_eq!(loaded.start, at(2022, 11, 16));
    assert_eq!(loaded.end, at(2022, 12, 11));
    assert_eq!(loaded.related_event_ids(), ids([earlier]));
    assert_eq!(loaded.entity_ids(), ids([nasa, esa]));
    assert_eq!(loaded.tag_ids(), ids([lunar]));
    assert_eq!(loaded.related_events[0].title, "Apollo 11");

    // The reverse side of a directed edge does not list it.
    let apollo = repo.get_event(earlier).unwrap().unwrap();
    assert!(apollo.related_events.is_empty());
}

#[test]
fn add_event_deduplicates_repeated_ids() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();

    let tag = repo.create_tag(&CatalogDraft::new("mars", "")).unwrap();
    let id = repo
        .add_event(&EventDraft::new("Landing", at(2021, 2, 18)).with_tags([tag, tag, tag]))
        .unwrap();

    let loaded = repo.get_event(id).unwrap().unwrap();
    assert_eq!(loaded.tags.len(), 1);
}

#[test]
fn get_event_returns_none_for_unknown_id() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&mut conn).unwrap();

    assert!(repo.get_event(42).unwrap().is_none());
    assert!(repo.is_empty().unwrap());
    assert!(repo.get_all_events().unwrap().is_empty());
}

#[test]
fn edit_replaces_relation_sets_instead_of_merging() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();

    let old_tag = repo.create_tag(&CatalogDraft::new("old", "")).unwrap();
    let new_tag = repo.create_tag(&CatalogDraft::new("new", "")).unwrap();
    let entity = repo.create_entity(&CatalogDraft::new("ESA", "")).unwrap();
    let other = repo
        .add_event(&EventDraft::new("Other", at(2020, 1, 1)))
        .unwrap();
    let id = repo
        .add_event(
            &EventDraft::new("Target", at(2020, 2, 1))
                .with_tags([old_tag])
                .with_entities([entity])
                .with_related_events([other]),
        )
        .unwrap();

    let edited = EventDraft::new("Target renamed", at(2020, 3, 1)).with_tags([new_tag]);
    repo.edit_event(id, &edited).unwrap();

    let loaded = repo.get_event(id).unwrap().unwrap();
    assert_eq!(loaded.title, "Target renamed");
    assert_eq!(loaded.start, at(2020, 3, 1));
    assert_eq!(loaded.tag_ids(), ids([new_tag]));
    assert!(loaded.related_entities.is_empty());
    assert!(loaded.related_events.is_empty());
}

#[test]
fn edit_keeps_incoming_event_edges() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();

    let target = repo
        .add_event(&EventDraft::new("Target", at(2020, 1, 1)))
        .unwrap();
    let source = repo
        .add_event(&EventDraft::new("Source", at(2020, 1, 2)).with_related_events([target]))
        .unwrap();

    repo.edit_event(target, &EventDraft::new("Target v2", at(2020, 1, 1)))
        .unwrap();

    let source_event = repo.get_event(source).unwrap().unwrap();
    assert!(source_event.links_to(target));
}

#[test]
fn edit_missing_event_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();

    let err = repo
        .edit_event(77, &EventDraft::new("Ghost", at(2020, 1, 1)))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            kind: RecordKind::Event,
            id: 77
        }
    ));
    assert!(repo.is_empty().unwrap());
}

#[test]
fn edit_with_missing_reference_rolls_back_everything() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();

    let tag = repo.create_tag(&CatalogDraft::new("kept", "")).unwrap();
    let id = repo
        .add_event(&EventDraft::new("Stable", at(2020, 1, 1)).with_tags([tag]))
        .unwrap();

    let err = repo
        .edit_event(id, &EventDraft::new("Changed", at(2021, 1, 1)).with_tags([999]))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::MissingReference {
            kind: RecordKind::Tag,
            id: 999
        }
    ));

    let loaded = repo.get_event(id).unwrap().unwrap();
    assert_eq!(loaded.title, "Stable");
    assert_eq!(loaded.tag_ids(), ids([tag]));
}

#[test]
fn add_with_missing_reference_creates_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();

    let err = repo
        .add_event(&EventDraft::new("Dangling", at(2020, 1, 1)).with_entities([5]))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::MissingReference {
            kind: RecordKind::Entity,
            id: 5
        }
    ));
    assert!(repo.is_empty().unwrap());
}

#[test]
fn blank_title_is_rejected_before_write() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();

    let err = repo
        .add_event(&EventDraft::new("   ", at(2020, 1, 1)))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::BlankTitle)
    ));
    assert!(repo.is_empty().unwrap());
}

#[test]
fn link_is_idempotent_and_unlink_absent_pair_is_noop() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();

    let a = repo.add_event(&EventDraft::new("A", at(2020, 1, 1))).unwrap();
    let b = repo.add_event(&EventDraft::new("B", at(2020, 1, 2))).unwrap();
    let tag = repo.create_tag(&CatalogDraft::new("t", "")).unwrap();

    repo.link_events(a, b).unwrap();
    repo.link_events(a, b).unwrap();
    repo.tag_event(a, tag).unwrap();
    repo.tag_event(a, tag).unwrap();

    let loaded = repo.get_event(a).unwrap().unwrap();
    assert_eq!(loaded.related_events.len(), 1);
    assert_eq!(loaded.tags.len(), 1);

    repo.unlink_events(b, a).unwrap();
    repo.unlink_entity_from_event(a, 123).unwrap();
    assert!(repo.get_event(a).unwrap().unwrap().links_to(b));

    repo.unlink_events(a, b).unwrap();
    repo.untag_event(a, tag).unwrap();
    let loaded = repo.get_event(a).unwrap().unwrap();
    assert!(loaded.related_events.is_empty());
    assert!(loaded.tags.is_empty());
}

#[test]
fn self_relation_and_missing_endpoints_are_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();

    let a = repo.add_event(&EventDraft::new("A", at(2020, 1, 1))).unwrap();

    assert!(matches!(
        repo.link_events(a, a).unwrap_err(),
        StoreError::SelfRelation(id) if id == a
    ));
    assert!(matches!(
        repo.link_entity_to_event(a, 9).unwrap_err(),
        StoreError::MissingReference {
            kind: RecordKind::Entity,
            id: 9
        }
    ));
    assert!(matches!(
        repo.tag_event(404, 1).unwrap_err(),
        StoreError::MissingReference {
            kind: RecordKind::Event,
            id: 404
        }
    ));

    let b = repo
        .add_event(&EventDraft::new("B", at(2020, 1, 1)).with_related_events([a, a]))
        .unwrap();
    assert_eq!(repo.get_event(b).unwrap().unwrap().related_event_ids(), ids([a]));
}

#[test]
fn delete_event_cascades_edges_in_both_directions() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();
        let tag = repo.create_tag(&CatalogDraft::new("t", "")).unwrap();
        let entity = repo.create_entity(&CatalogDraft::new("e", "")).unwrap();
        let a = repo.add_event(&EventDraft::new("A", at(2020, 1, 1))).unwrap();
        let b = repo
            .add_event(
                &EventDraft::new("B", at(2020, 1, 2))
                    .with_related_events([a])
                    .with_tags([tag])
                    .with_entities([entity]),
            )
            .unwrap();
        repo.link_events(a, b).unwrap();

        repo.delete_event(b).unwrap();

        let remaining = repo.get_all_events().unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].related_events.is_empty());
        assert!(repo.get_event(b).unwrap().is_none());
        assert_eq!(repo.list_tags().unwrap().len(), 1);
    }

    for kind in RelationKind::ALL {
        assert_eq!(count_edges(&conn, kind).unwrap(), 0, "{} edges", kind.as_str());
    }
}

#[test]
fn delete_missing_event_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();

    assert!(matches!(
        repo.delete_event(3).unwrap_err(),
        StoreError::NotFound {
            kind: RecordKind::Event,
            id: 3
        }
    ));
}

#[test]
fn catalog_crud_cascades_edges_on_delete() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();

    let entity = repo
        .create_entity(&CatalogDraft::new("Roscosmos", "Russian agency"))
        .unwrap();
    let tag = repo.create_tag(&CatalogDraft::new("iss", "")).unwrap();
    let event = repo
        .add_event(
            &EventDraft::new("Zarya launch", at(1998, 11, 20))
                .with_entities([entity])
                .with_tags([tag]),
        )
        .unwrap();

    repo.update_entity(entity, &CatalogDraft::new("Roscosmos", "State corporation"))
        .unwrap();
    let entities = repo.list_entities().unwrap();
    assert_eq!(entities[0].description, "State corporation");

    repo.update_tag(tag, &CatalogDraft::new("ISS", "")).unwrap();
    assert_eq!(repo.list_tags().unwrap()[0].name, "ISS");

    repo.delete_entity(entity).unwrap();
    repo.delete_tag(tag).unwrap();

    let loaded = repo.get_event(event).unwrap().unwrap();
    assert!(loaded.related_entities.is_empty());
    assert!(loaded.tags.is_empty());
    assert!(repo.list_entities().unwrap().is_empty());

    assert!(matches!(
        repo.delete_tag(tag).unwrap_err(),
        StoreError::NotFound {
            kind: RecordKind::Tag,
            ..
        }
    ));
    assert!(matches!(
        repo.update_entity(entity, &CatalogDraft::new("x", "")).unwrap_err(),
        StoreError::NotFound {
            kind: RecordKind::Entity,
            ..
        }
    ));
}

#[test]
fn blank_catalog_name_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();

    assert!(matches!(
        repo.create_tag(&CatalogDraft::new("  ", "no name")).unwrap_err(),
        StoreError::Validation(ValidationError::BlankName)
    ));
}

#[test]
fn load_test_data_seeds_sample_set() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();
        repo.load_test_data().unwrap();

        assert!(!repo.is_empty().unwrap());
        let events = repo.get_all_events().unwrap();
        assert_eq!(events.len(), 7);
        assert_eq!(repo.list_entities().unwrap().len(), 5);
        assert_eq!(repo.list_tags().unwrap().len(), 4);

        let ingenuity = events
            .iter()
            .find(|event| event.title == "Ingenuity first flight")
            .unwrap();
        assert_eq!(ingenuity.related_events.len(), 1);
        assert_eq!(
            ingenuity.related_events[0].title,
            "Perseverance lands in Jezero Crater"
        );
    }

    assert_eq!(count_edges(&conn, RelationKind::Event).unwrap(), 3);
    assert_eq!(count_edges(&conn, RelationKind::Entity).unwrap(), 13);
    assert_eq!(count_edges(&conn, RelationKind::Tag).unwrap(), 7);
}

#[test]
fn records_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timeline.sqlite3");

    let id = {
        let mut conn = open_db(&path).unwrap();
        let mut repo = SqliteEventRepository::try_new(&mut conn).unwrap();
        let tag = repo.create_tag(&CatalogDraft::new("durable", "")).unwrap();
        repo.add_event(&EventDraft::new("Persisted", at(2024, 5, 1)).with_tags([tag]))
            .unwrap()
    };

    let mut conn = open_db(&path).unwrap();
    let repo = SqliteEventRepository::try_new(&mut conn).unwrap();
    let loaded = repo.get_event(id).unwrap().unwrap();
    assert_eq!(loaded.title, "Persisted");
    assert_eq!(loaded.tags[0].name, "durable");
}

#[test]
fn unparsable_stored_date_is_invalid_data() {
    let mut conn = open_db_in_memory().unwrap();
    insert_raw_event(&conn, "not-a-date");

    let repo = SqliteEventRepository::try_new(&mut conn).unwrap();
    assert!(matches!(
        repo.get_all_events().unwrap_err(),
        StoreError::InvalidData(_)
    ));
}

fn insert_raw_event(conn: &Connection, start: &str) {
    conn.execute(
        "INSERT INTO events (title, description, start_date_time, end_date_time)
         VALUES ('raw', '', ?1, ?1);",
        [start],
    )
    .unwrap();
}
