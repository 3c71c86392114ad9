//! Event domain model.
//!
//! # Responsibility
//! - Define the scalar event record persisted in `events`.
//! - Define the materialized read model with resolved relations.
//! - Define the draft shape submitted for create and edit.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused.
//! - `title` must not be blank on save.
//! - `end >= start` is expected but not enforced.

use crate::model::catalog::{Entity, EntityId, Tag, TagId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned identifier of an event.
pub type EventId = i64;

/// Client-side validation failures raised before any store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Event title is empty or whitespace only.
    BlankTitle,
    /// Entity or tag name is empty or whitespace only.
    BlankName,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "title is required"),
            Self::BlankName => write!(f, "name is required"),
        }
    }
}

impl Error for ValidationError {}

/// Scalar fields of one persisted event, without relations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Event with its relation lists resolved to full related records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Targets of this event's outgoing event-event edges.
    pub related_events: Vec<EventRecord>,
    pub related_entities: Vec<Entity>,
    pub tags: Vec<Tag>,
}

impl Event {
    /// Returns the scalar part of this event.
    pub fn record(&self) -> EventRecord {
        EventRecord {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            start: self.start,
            end: self.end,
        }
    }

    pub fn related_event_ids(&self) -> BTreeSet<EventId> {
        self.related_events.iter().map(|event| event.id).collect()
    }

    pub fn entity_ids(&self) -> BTreeSet<EntityId> {
        self.related_entities.iter().map(|entity| entity.id).collect()
    }

    pub fn tag_ids(&self) -> BTreeSet<TagId> {
        self.tags.iter().map(|tag| tag.id).collect()
    }

    /// Whether this event stores an outgoing edge to `other`.
    pub fn links_to(&self, other: EventId) -> bool {
        self.related_events.iter().any(|event| event.id == other)
    }

    pub fn has_tag(&self, tag_id: TagId) -> bool {
        self.tags.iter().any(|tag| tag.id == tag_id)
    }

    pub fn has_entity(&self, entity_id: EntityId) -> bool {
        self.related_entities.iter().any(|entity| entity.id == entity_id)
    }

    /// Copies this event into an editable draft carrying relation ids.
    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            start: self.start,
            end: self.end,
            related_events: self.related_events.iter().map(|event| event.id).collect(),
            related_entities: self
                .related_entities
                .iter()
                .map(|entity| entity.id)
                .collect(),
            tags: self.tags.iter().map(|tag| tag.id).collect(),
        }
    }
}

/// Event content submitted for create (no id yet) or full-replacement edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub related_events: Vec<EventId>,
    pub related_entities: Vec<EntityId>,
    pub tags: Vec<TagId>,
}

impl EventDraft {
    /// Creates a point-in-time draft: `end` defaults to `start`.
    pub fn new(title: impl Into<String>, start: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            start,
            end: start,
            related_events: Vec::new(),
            related_entities: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_end(mut self, end: NaiveDateTime) -> Self {
        self.end = end;
        self
    }

    pub fn with_related_events(mut self, ids: impl IntoIterator<Item = EventId>) -> Self {
        self.related_events = ids.into_iter().collect();
        self
    }

    pub fn with_entities(mut self, ids: impl IntoIterator<Item = EntityId>) -> Self {
        self.related_entities = ids.into_iter().collect();
        self
    }

    pub fn with_tags(mut self, ids: impl IntoIterator<Item = TagId>) -> Self {
        self.tags = ids.into_iter().collect();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankTitle);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{EventDraft, ValidationError};
    use crate::model::datetime::parse_date_time;

    #[test]
    fn draft_end_defaults_to_start() {
        let start = parse_date_time("2024-03-01T12:00:00").unwrap();
        let draft = EventDraft::new("Launch", start);
        assert_eq!(draft.end, start);
    }

    #[test]
    fn blank_title_fails_validation() {
        let start = parse_date_time("2024-03-01T12:00:00").unwrap();
        let draft = EventDraft::new("   ", start);
        assert_eq!(draft.validate(), Err(ValidationError::BlankTitle));
    }
}
