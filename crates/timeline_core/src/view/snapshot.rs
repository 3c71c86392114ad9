//! Immutable view state handed to the rendering layer.

use crate::model::catalog::{Entity, Tag};
use crate::model::event::{Event, EventId};
use crate::view::filter::ViewFilter;
use chrono::NaiveDate;
use serde::Serialize;

/// Exclusive detail-panel modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "event_id", rename_all = "snake_case")]
pub enum DetailMode {
    None,
    Viewing(EventId),
    Editing(EventId),
    Creating,
}

impl DetailMode {
    /// Event shown in the detail panel, if any.
    pub fn event_id(self) -> Option<EventId> {
        match self {
            Self::Viewing(id) | Self::Editing(id) => Some(id),
            Self::None | Self::Creating => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Viewing(_) => "viewing",
            Self::Editing(_) => "editing",
            Self::Creating => "creating",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleEvent {
    pub event: Event,
    pub selected: bool,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineSnapshot {
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    pub zoom_index: usize,
    pub zoom_width_days: i64,
    pub can_zoom_in: bool,
    pub can_zoom_out: bool,
    pub mode: DetailMode,
    pub selected: Option<Event>,
    pub filter: ViewFilter,
    pub highlight_related: bool,
    pub show_connections: bool,
    /// Visible events, ascending by start.
    pub visible: Vec<VisibleEvent>,
    /// Directed edges between visible events; empty unless connections are shown.
    pub connections: Vec<(EventId, EventId)>,
    pub total_events: usize,
    pub entities: Vec<Entity>,
    pub tags: Vec<Tag>,
}

impl TimelineSnapshot {
    pub fn visible_ids(&self) -> Vec<EventId> {
        self.visible.iter().map(|item| item.event.id).collect()
    }

    pub fn highlighted_ids(&self) -> Vec<EventId> {
        self.visible
            .iter()
            .filter(|item| item.highlighted)
            .map(|item| item.event.id)
            .collect()
    }
}
