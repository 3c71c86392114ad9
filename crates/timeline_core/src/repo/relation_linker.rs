//! Edge-maintenance policy for the three association sets.
//!
//! # Responsibility
//! - Link/unlink primitives for event-event, event-entity and event-tag edges.
//! - Replace-on-edit: clear an event's edges of one kind, then rebuild them.
//! - Cascade cleanup of every edge touching a deleted record.
//!
//! # Invariants
//! - Linking an existing pair is a no-op (`INSERT OR IGNORE` on the
//!   composite primary key).
//! - Unlinking an absent pair is a no-op, never an error.
//! - Event-event edges are directed `a -> b`. Replacement only clears the
//!   edited event's outgoing edges; cascade clears both directions.
//!
//! Every function takes a plain `&Connection` so callers can pass a
//! `Transaction` (via deref) to make multi-step changes atomic.

use crate::model::projection::EdgeSets;
use crate::repo::error::{RecordKind, StoreError, StoreResult};
use rusqlite::{params, Connection};
use std::collections::BTreeSet;

/// One of the three association edge sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// `event_relations(event_id_a, event_id_b)`.
    Event,
    /// `event_entities(event_id, entity_id)`.
    Entity,
    /// `event_tags(event_id, tag_id)`.
    Tag,
}

impl RelationKind {
    pub const ALL: [RelationKind; 3] = [Self::Event, Self::Entity, Self::Tag];

    fn table(self) -> &'static str {
        match self {
            Self::Event => "event_relations",
            Self::Entity => "event_entities",
            Self::Tag => "event_tags",
        }
    }

    fn source_column(self) -> &'static str {
        match self {
            Self::Event => "event_id_a",
            Self::Entity | Self::Tag => "event_id",
        }
    }

    fn target_column(self) -> &'static str {
        match self {
            Self::Event => "event_id_b",
            Self::Entity => "entity_id",
            Self::Tag => "tag_id",
        }
    }

    /// Record kind an edge of this relation points at.
    pub fn target_kind(self) -> RecordKind {
        match self {
            Self::Event => RecordKind::Event,
            Self::Entity => RecordKind::Entity,
            Self::Tag => RecordKind::Tag,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Entity => "entity",
            Self::Tag => "tag",
        }
    }
}

/// Inserts one edge. Returns `true` when a new edge was created.
pub fn link(
    conn: &Connection,
    kind: RelationKind,
    event_id: i64,
    target_id: i64,
) -> StoreResult<bool> {
    if kind == RelationKind::Event && event_id == target_id {
        return Err(StoreError::SelfRelation(event_id));
    }
    ensure_record_exists(conn, RecordKind::Event, event_id)?;
    ensure_record_exists(conn, kind.target_kind(), target_id)?;

    let inserted = conn.execute(
        &format!(
            "INSERT OR IGNORE INTO {} ({}, {}) VALUES (?1, ?2);",
            kind.table(),
            kind.source_column(),
            kind.target_column()
        ),
        params![event_id, target_id],
    )?;
    Ok(inserted > 0)
}

/// Removes one edge. Returns `true` when an edge was actually removed.
pub fn unlink(
    conn: &Connection,
    kind: RelationKind,
    event_id: i64,
    target_id: i64,
) -> StoreResult<bool> {
    let removed = conn.execute(
        &format!(
            "DELETE FROM {} WHERE {} = ?1 AND {} = ?2;",
            kind.table(),
            kind.source_column(),
            kind.target_column()
        ),
        params![event_id, target_id],
    )?;
    Ok(removed > 0)
}

/// Replaces every edge of `kind` owned by `event_id` with `targets`.
///
/// Duplicate ids in `targets` collapse to one edge. Returns the number of
/// edges present afterwards.
pub fn replace_links(
    conn: &Connection,
    kind: RelationKind,
    event_id: i64,
    targets: &[i64],
) -> StoreResult<usize> {
    conn.execute(
        &format!(
            "DELETE FROM {} WHERE {} = ?1;",
            kind.table(),
            kind.source_column()
        ),
        [event_id],
    )?;

    let unique: BTreeSet<i64> = targets.iter().copied().collect();
    for target_id in &unique {
        link(conn, kind, event_id, *target_id)?;
    }
    Ok(unique.len())
}

/// Removes every edge that references `event_id`, in either direction.
pub fn clear_event_edges(conn: &Connection, event_id: i64) -> StoreResult<()> {
    conn.execute(
        "DELETE FROM event_relations WHERE event_id_a = ?1 OR event_id_b = ?1;",
        [event_id],
    )?;
    conn.execute("DELETE FROM event_entities WHERE event_id = ?1;", [event_id])?;
    conn.execute("DELETE FROM event_tags WHERE event_id = ?1;", [event_id])?;
    Ok(())
}

/// Removes every edge pointing at an entity or tag.
pub fn clear_target_edges(
    conn: &Connection,
    kind: RelationKind,
    target_id: i64,
) -> StoreResult<()> {
    conn.execute(
        &format!(
            "DELETE FROM {} WHERE {} = ?1;",
            kind.table(),
            kind.target_column()
        ),
        [target_id],
    )?;
    Ok(())
}

/// Loads the full content of all three edge sets.
pub fn load_edges(conn: &Connection) -> StoreResult<EdgeSets> {
    Ok(EdgeSets {
        event_relations: load_pairs(conn, RelationKind::Event)?,
        event_entities: load_pairs(conn, RelationKind::Entity)?,
        event_tags: load_pairs(conn, RelationKind::Tag)?,
    })
}

fn load_pairs(conn: &Connection, kind: RelationKind) -> StoreResult<BTreeSet<(i64, i64)>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {}, {} FROM {};",
        kind.source_column(),
        kind.target_column(),
        kind.table()
    ))?;
    let mut rows = stmt.query([])?;
    let mut pairs = BTreeSet::new();
    while let Some(row) = rows.next()? {
        pairs.insert((row.get(0)?, row.get(1)?));
    }
    Ok(pairs)
}

/// Counts edges of one kind.
pub fn count_edges(conn: &Connection, kind: RelationKind) -> StoreResult<u64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {};", kind.table()),
        [],
        |row| row.get(0),
    )?;
    u64::try_from(count)
        .map_err(|_| StoreError::InvalidData(format!("negative edge count {count}")))
}

pub(crate) fn ensure_record_exists(
    conn: &Connection,
    kind: RecordKind,
    id: i64,
) -> StoreResult<()> {
    if record_exists(conn, kind, id)? {
        return Ok(());
    }
    Err(StoreError::MissingReference { kind, id })
}

pub(crate) fn record_exists(conn: &Connection, kind: RecordKind, id: i64) -> StoreResult<bool> {
    let table = match kind {
        RecordKind::Event => "events",
        RecordKind::Entity => "entities",
        RecordKind::Tag => "tags",
    };
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
