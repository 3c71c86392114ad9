//! Pure visible-set and highlight computations.
//!
//! Nothing here holds state: every function derives its answer from the
//! event list, the window and the active filters it is given.

use crate::model::catalog::{EntityId, TagId};
use crate::model::event::{Event, EventId};
use crate::view::window::TimelineWindow;
use serde::Serialize;
use std::collections::HashSet;

/// Active tag/entity filters. `None` means the filter is off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ViewFilter {
    pub tag: Option<TagId>,
    pub entity: Option<EntityId>,
}

impl ViewFilter {
    pub fn matches(&self, event: &Event) -> bool {
        let tag_ok = self.tag.map_or(true, |tag_id| event.has_tag(tag_id));
        let entity_ok = self
            .entity
            .map_or(true, |entity_id| event.has_entity(entity_id));
        tag_ok && entity_ok
    }
}

/// Events whose start date lies in the window and that pass `filter`,
/// sorted ascending by start. Equal starts keep their input order.
pub fn visible_events<'a>(
    events: &'a [Event],
    window: &TimelineWindow,
    filter: &ViewFilter,
) -> Vec<&'a Event> {
    let mut visible: Vec<&Event> = events
        .iter()
        .filter(|event| window.contains(event.start.date()) && filter.matches(event))
        .collect();
    visible.sort_by_key(|event| event.start);
    visible
}

/// Whether `candidate` should be highlighted for the current selection.
///
/// Event-event edges are stored directed, so both directions are checked.
pub fn is_highlighted(selected: Option<&Event>, candidate: &Event) -> bool {
    let Some(selected) = selected else {
        return false;
    };

    selected.links_to(candidate.id)
        || candidate.links_to(selected.id)
        || selected
            .related_entities
            .iter()
            .any(|entity| candidate.has_entity(entity.id))
        || selected.tags.iter().any(|tag| candidate.has_tag(tag.id))
}

/// Directed `(from, to)` edges whose endpoints are both visible, in
/// visible order.
pub fn connections(visible: &[&Event]) -> Vec<(EventId, EventId)> {
    let visible_ids: HashSet<EventId> = visible.iter().map(|event| event.id).collect();
    visible
        .iter()
        .flat_map(|event| {
            event
                .related_events
                .iter()
                .filter(|target| visible_ids.contains(&target.id))
                .map(move |target| (event.id, target.id))
        })
        .collect()
}
