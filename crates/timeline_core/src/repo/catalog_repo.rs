//! Entity and tag persistence.
//!
//! Both tables share one shape, so every statement here is parameterized
//! by [`CatalogTable`] instead of being written twice.

use crate::model::catalog::{CatalogDraft, Entity, Tag};
use crate::repo::error::{RecordKind, StoreError, StoreResult};
use crate::repo::relation_linker::{clear_target_edges, RelationKind};
use rusqlite::{params, Connection, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CatalogTable {
    Entities,
    Tags,
}

impl CatalogTable {
    fn table(self) -> &'static str {
        match self {
            Self::Entities => "entities",
            Self::Tags => "tags",
        }
    }

    fn record_kind(self) -> RecordKind {
        match self {
            Self::Entities => RecordKind::Entity,
            Self::Tags => RecordKind::Tag,
        }
    }

    fn relation_kind(self) -> RelationKind {
        match self {
            Self::Entities => RelationKind::Entity,
            Self::Tags => RelationKind::Tag,
        }
    }
}

pub(crate) fn insert_record(
    conn: &Connection,
    table: CatalogTable,
    draft: &CatalogDraft,
) -> StoreResult<i64> {
    draft.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO {} (name, description) VALUES (?1, ?2);",
            table.table()
        ),
        params![draft.name.trim(), draft.description.as_str()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn update_record(
    conn: &Connection,
    table: CatalogTable,
    id: i64,
    draft: &CatalogDraft,
) -> StoreResult<()> {
    draft.validate()?;
    let changed = conn.execute(
        &format!(
            "UPDATE {} SET name = ?1, description = ?2 WHERE id = ?3;",
            table.table()
        ),
        params![draft.name.trim(), draft.description.as_str(), id],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound {
            kind: table.record_kind(),
            id,
        });
    }
    Ok(())
}

/// Deletes one record and its edges. Callers run this inside a transaction.
pub(crate) fn delete_record(conn: &Connection, table: CatalogTable, id: i64) -> StoreResult<()> {
    clear_target_edges(conn, table.relation_kind(), id)?;
    let changed = conn.execute(
        &format!("DELETE FROM {} WHERE id = ?1;", table.table()),
        [id],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound {
            kind: table.record_kind(),
            id,
        });
    }
    Ok(())
}

pub(crate) fn list_entities(conn: &Connection) -> StoreResult<Vec<Entity>> {
    list_records(conn, CatalogTable::Entities, |row| {
        Ok(Entity {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
        })
    })
}

pub(crate) fn list_tags(conn: &Connection) -> StoreResult<Vec<Tag>> {
    list_records(conn, CatalogTable::Tags, |row| {
        Ok(Tag {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
        })
    })
}

fn list_records<T>(
    conn: &Connection,
    table: CatalogTable,
    parse: impl Fn(&Row<'_>) -> rusqlite::Result<T>,
) -> StoreResult<Vec<T>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, name, description FROM {} ORDER BY name COLLATE NOCASE ASC, id ASC;",
        table.table()
    ))?;
    let mut rows = stmt.query([])?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(parse(row)?);
    }
    Ok(records)
}
