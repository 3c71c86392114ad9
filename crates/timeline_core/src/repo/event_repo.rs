//! Event store contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over events, entities and tags.
//! - Materialize relation lists from the edge tables on every read.
//! - Run replace-on-edit through [`relation_linker`] inside one transaction.
//!
//! # Invariants
//! - `add_event` either creates the record with all its edges or nothing.
//! - `edit_event` on a missing id fails with `NotFound` and writes nothing.
//! - Reads never serve cached relation lists.

use crate::model::catalog::{CatalogDraft, Entity, EntityId, Tag, TagId};
use crate::model::datetime::{format_date_time, parse_date_time};
use crate::model::event::{Event, EventDraft, EventId, EventRecord};
use crate::model::projection::{materialize, RecordIndex};
use crate::repo::catalog_repo::{self, CatalogTable};
use crate::repo::error::{RecordKind, StoreError, StoreResult};
use crate::repo::relation_linker::{self, RelationKind};
use crate::repo::seed;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    start_date_time,
    end_date_time
FROM events";

const REQUIRED_TABLES: [&str; 6] = [
    "events",
    "entities",
    "tags",
    "event_relations",
    "event_entities",
    "event_tags",
];

/// The event store: sole owner of all records and association edges.
pub trait EventRepository {
    /// Returns every event with relation lists materialized. Order is unspecified.
    fn get_all_events(&self) -> StoreResult<Vec<Event>>;
    /// Returns one materialized event.
    fn get_event(&self, id: EventId) -> StoreResult<Option<Event>>;
    /// Whether the store holds no events.
    fn is_empty(&self) -> StoreResult<bool>;
    /// Creates an event and one edge per listed relation id.
    fn add_event(&mut self, draft: &EventDraft) -> StoreResult<EventId>;
    /// Replaces scalar fields and all three relation sets of an existing event.
    fn edit_event(&mut self, id: EventId, draft: &EventDraft) -> StoreResult<()>;
    /// Deletes an event together with every edge referencing it.
    fn delete_event(&mut self, id: EventId) -> StoreResult<()>;

    fn link_events(&self, from: EventId, to: EventId) -> StoreResult<()>;
    fn unlink_events(&self, from: EventId, to: EventId) -> StoreResult<()>;
    fn link_entity_to_event(&self, event_id: EventId, entity_id: EntityId) -> StoreResult<()>;
    fn unlink_entity_from_event(&self, event_id: EventId, entity_id: EntityId)
        -> StoreResult<()>;
    fn tag_event(&self, event_id: EventId, tag_id: TagId) -> StoreResult<()>;
    fn untag_event(&self, event_id: EventId, tag_id: TagId) -> StoreResult<()>;

    fn list_entities(&self) -> StoreResult<Vec<Entity>>;
    fn create_entity(&mut self, draft: &CatalogDraft) -> StoreResult<EntityId>;
    fn update_entity(&mut self, id: EntityId, draft: &CatalogDraft) -> StoreResult<()>;
    fn delete_entity(&mut self, id: EntityId) -> StoreResult<()>;

    fn list_tags(&self) -> StoreResult<Vec<Tag>>;
    fn create_tag(&mut self, draft: &CatalogDraft) -> StoreResult<TagId>;
    fn update_tag(&mut self, id: TagId, draft: &CatalogDraft) -> StoreResult<()>;
    fn delete_tag(&mut self, id: TagId) -> StoreResult<()>;

    /// Seeds the fixed sample data set.
    fn load_test_data(&mut self) -> StoreResult<()>;
}

/// SQLite-backed event store.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> StoreResult<Self> {
        for table in REQUIRED_TABLES {
            if !table_exists(conn, table)? {
                return Err(StoreError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }

    fn load_index(&self, records: &[EventRecord]) -> StoreResult<RecordIndex> {
        Ok(RecordIndex::new(
            records,
            catalog_repo::list_entities(self.conn)?,
            catalog_repo::list_tags(self.conn)?,
        ))
    }

    fn load_records(&self) -> StoreResult<Vec<EventRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_event_row(row)?);
        }
        Ok(records)
    }

    fn delete_catalog_record(&mut self, table: CatalogTable, id: i64) -> StoreResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        catalog_repo::delete_record(&tx, table, id)?;
        tx.commit()?;
        Ok(())
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn get_all_events(&self) -> StoreResult<Vec<Event>> {
        let records = self.load_records()?;
        let edges = relation_linker::load_edges(self.conn)?;
        let index = self.load_index(&records)?;
        Ok(records
            .iter()
            .map(|record| materialize(record, &edges, &index))
            .collect())
    }

    fn get_event(&self, id: EventId) -> StoreResult<Option<Event>> {
        let record = self
            .conn
            .query_row(
                &format!("{EVENT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_event_row(row)),
            )
            .optional()?
            .transpose()?;
        let Some(record) = record else {
            return Ok(None);
        };

        // Related events are resolved against the full record set.
        let records = self.load_records()?;
        let edges = relation_linker::load_edges(self.conn)?;
        let index = self.load_index(&records)?;
        Ok(Some(materialize(&record, &edges, &index)))
    }

    fn is_empty(&self) -> StoreResult<bool> {
        let exists: i64 = self
            .conn
            .query_row("SELECT EXISTS(SELECT 1 FROM events);", [], |row| row.get(0))?;
        Ok(exists == 0)
    }

    fn add_event(&mut self, draft: &EventDraft) -> StoreResult<EventId> {
        draft.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO events (title, description, start_date_time, end_date_time)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                draft.title.as_str(),
                draft.description.as_str(),
                format_date_time(&draft.start),
                format_date_time(&draft.end),
            ],
        )?;
        let event_id = tx.last_insert_rowid();

        relation_linker::replace_links(&tx, RelationKind::Event, event_id, &draft.related_events)?;
        relation_linker::replace_links(
            &tx,
            RelationKind::Entity,
            event_id,
            &draft.related_entities,
        )?;
        relation_linker::replace_links(&tx, RelationKind::Tag, event_id, &draft.tags)?;
        tx.commit()?;

        debug!("event=event_insert module=repo status=ok event_id={event_id}");
        Ok(event_id)
    }

    fn edit_event(&mut self, id: EventId, draft: &EventDraft) -> StoreResult<()> {
        draft.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE events
             SET
                title = ?1,
                description = ?2,
                start_date_time = ?3,
                end_date_time = ?4
             WHERE id = ?5;",
            params![
                draft.title.as_str(),
                draft.description.as_str(),
                format_date_time(&draft.start),
                format_date_time(&draft.end),
                id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: RecordKind::Event,
                id,
            });
        }

        relation_linker::replace_links(&tx, RelationKind::Event, id, &draft.related_events)?;
        relation_linker::replace_links(&tx, RelationKind::Entity, id, &draft.related_entities)?;
        relation_linker::replace_links(&tx, RelationKind::Tag, id, &draft.tags)?;
        tx.commit()?;

        debug!("event=event_update module=repo status=ok event_id={id}");
        Ok(())
    }

    fn delete_event(&mut self, id: EventId) -> StoreResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        relation_linker::clear_event_edges(&tx, id)?;
        let changed = tx.execute("DELETE FROM events WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: RecordKind::Event,
                id,
            });
        }
        tx.commit()?;

        debug!("event=event_delete module=repo status=ok event_id={id}");
        Ok(())
    }

    fn link_events(&self, from: EventId, to: EventId) -> StoreResult<()> {
        relation_linker::link(self.conn, RelationKind::Event, from, to).map(|_| ())
    }

    fn unlink_events(&self, from: EventId, to: EventId) -> StoreResult<()> {
        relation_linker::unlink(self.conn, RelationKind::Event, from, to).map(|_| ())
    }

    fn link_entity_to_event(&self, event_id: EventId, entity_id: EntityId) -> StoreResult<()> {
        relation_linker::link(self.conn, RelationKind::Entity, event_id, entity_id).map(|_| ())
    }

    fn unlink_entity_from_event(
        &self,
        event_id: EventId,
        entity_id: EntityId,
    ) -> StoreResult<()> {
        relation_linker::unlink(self.conn, RelationKind::Entity, event_id, entity_id).map(|_| ())
    }

    fn tag_event(&self, event_id: EventId, tag_id: TagId) -> StoreResult<()> {
        relation_linker::link(self.conn, RelationKind::Tag, event_id, tag_id).map(|_| ())
    }

    fn untag_event(&self, event_id: EventId, tag_id: TagId) -> StoreResult<()> {
        relation_linker::unlink(self.conn, RelationKind::Tag, event_id, tag_id).map(|_| ())
    }

    fn list_entities(&self) -> StoreResult<Vec<Entity>> {
        catalog_repo::list_entities(self.conn)
    }

    fn create_entity(&mut self, draft: &CatalogDraft) -> StoreResult<EntityId> {
        catalog_repo::insert_record(self.conn, CatalogTable::Entities, draft)
    }

    fn update_entity(&mut self, id: EntityId, draft: &CatalogDraft) -> StoreResult<()> {
        catalog_repo::update_record(self.conn, CatalogTable::Entities, id, draft)
    }

    fn delete_entity(&mut self, id: EntityId) -> StoreResult<()> {
        self.delete_catalog_record(CatalogTable::Entities, id)
    }

    fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        catalog_repo::list_tags(self.conn)
    }

    fn create_tag(&mut self, draft: &CatalogDraft) -> StoreResult<TagId> {
        catalog_repo::insert_record(self.conn, CatalogTable::Tags, draft)
    }

    fn update_tag(&mut self, id: TagId, draft: &CatalogDraft) -> StoreResult<()> {
        catalog_repo::update_record(self.conn, CatalogTable::Tags, id, draft)
    }

    fn delete_tag(&mut self, id: TagId) -> StoreResult<()> {
        self.delete_catalog_record(CatalogTable::Tags, id)
    }

    fn load_test_data(&mut self) -> StoreResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        seed::insert_sample_data(&tx)?;
        tx.commit()?;

        debug!(
            "event=seed_insert module=repo status=ok events={}",
            seed::sample_event_count()
        );
        Ok(())
    }
}

fn parse_event_row(row: &Row<'_>) -> StoreResult<EventRecord> {
    let id: EventId = row.get("id")?;
    let start_text: String = row.get("start_date_time")?;
    let end_text: String = row.get("end_date_time")?;

    let start = parse_date_time(&start_text).map_err(|err| {
        StoreError::InvalidData(format!("events.start_date_time for event {id}: {err}"))
    })?;
    let end = parse_date_time(&end_text).map_err(|err| {
        StoreError::InvalidData(format!("events.end_date_time for event {id}: {err}"))
    })?;

    Ok(EventRecord {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        start,
        end,
    })
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
