//! Persistence layer: the event store and its edge-maintenance policy.
//!
//! # Responsibility
//! - Define the use-case oriented store contract ([`EventRepository`]).
//! - Isolate SQLite query details from view/controller orchestration.
//! - Keep the three association edge sets consistent across edits.
//!
//! # Invariants
//! - Multi-step mutations run inside one transaction; partial writes are
//!   never observable.
//! - Deleting a record removes every edge that references it.

pub mod catalog_repo;
pub mod error;
pub mod event_repo;
pub mod relation_linker;
pub mod seed;

pub use error::{RecordKind, StoreError, StoreResult};
pub use event_repo::{EventRepository, SqliteEventRepository};
pub use relation_linker::RelationKind;
