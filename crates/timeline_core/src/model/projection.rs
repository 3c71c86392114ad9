//! Pure projection from records + edge sets to materialized events.
//!
//! # Invariants
//! - Output depends only on the inputs; nothing is cached between calls.
//! - Relation lists are ordered by related id, so equal inputs give equal output.
//! - Edges pointing at ids missing from the index are skipped.

use crate::model::catalog::{Entity, EntityId, Tag, TagId};
use crate::model::event::{Event, EventId, EventRecord};
use std::collections::{BTreeSet, HashMap};

/// The three association edge sets, keyed by the event id first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeSets {
    /// Directed `(event_id_a, event_id_b)` pairs.
    pub event_relations: BTreeSet<(EventId, EventId)>,
    pub event_entities: BTreeSet<(EventId, EntityId)>,
    pub event_tags: BTreeSet<(EventId, TagId)>,
}

impl EdgeSets {
    fn outgoing(set: &BTreeSet<(i64, i64)>, event_id: EventId) -> impl Iterator<Item = i64> + '_ {
        set.range((event_id, i64::MIN)..=(event_id, i64::MAX))
            .map(|(_, target)| *target)
    }
}

/// Lookup tables of every record kind, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct RecordIndex {
    pub events: HashMap<EventId, EventRecord>,
    pub entities: HashMap<EntityId, Entity>,
    pub tags: HashMap<TagId, Tag>,
}

impl RecordIndex {
    pub fn new(events: &[EventRecord], entities: Vec<Entity>, tags: Vec<Tag>) -> Self {
        Self {
            events: events
                .iter()
                .map(|record| (record.id, record.clone()))
                .collect(),
            entities: entities
                .into_iter()
                .map(|entity| (entity.id, entity))
                .collect(),
            tags: tags.into_iter().map(|tag| (tag.id, tag)).collect(),
        }
    }
}

/// Resolves the relation lists of `record` from the current edge sets.
pub fn materialize(record: &EventRecord, edges: &EdgeSets, index: &RecordIndex) -> Event {
    let related_events = EdgeSets::outgoing(&edges.event_relations, record.id)
        .filter_map(|id| index.events.get(&id).cloned())
        .collect();
    let related_entities = EdgeSets::outgoing(&edges.event_entities, record.id)
        .filter_map(|id| index.entities.get(&id).cloned())
        .collect();
    let tags = EdgeSets::outgoing(&edges.event_tags, record.id)
        .filter_map(|id| index.tags.get(&id).cloned())
        .collect();

    Event {
        id: record.id,
        title: record.title.clone(),
        description: record.description.clone(),
        start: record.start,
        end: record.end,
        related_events,
        related_entities,
        tags,
    }
}
