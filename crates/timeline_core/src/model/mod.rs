//! Timeline domain model.
//!
//! # Responsibility
//! - Define the records owned by the store: events, entities and tags.
//! - Define the materialized event read model and its pure projection.
//! - Own the ISO-8601 text codec used for persisted date/time values.
//!
//! # Invariants
//! - Relation lists on [`Event`] are derived from edge sets at read time
//!   and are never stored as independent state.

pub mod catalog;
pub mod datetime;
pub mod event;
pub mod projection;
