//! Core domain logic for the timeline.
//! This crate is the single source of truth for store and view invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod view;

pub use config::{ConfigError, TimelineConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::catalog::{CatalogDraft, Entity, EntityId, Tag, TagId};
pub use model::event::{Event, EventDraft, EventId, EventRecord, ValidationError};
pub use repo::{
    EventRepository, RecordKind, RelationKind, SqliteEventRepository, StoreError, StoreResult,
};
pub use view::clock::{Clock, FixedClock, SystemClock};
pub use view::controller::{ControllerError, ControllerResult, EventForm, ViewController};
pub use view::filter::ViewFilter;
pub use view::snapshot::{DetailMode, TimelineSnapshot, VisibleEvent};
pub use view::window::{TimelineWindow, ZOOM_LEVELS};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
