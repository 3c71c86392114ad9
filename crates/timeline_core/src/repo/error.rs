//! Store error taxonomy.

use crate::db::DbError;
use crate::model::event::{EventId, ValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Record kinds owned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Event,
    Entity,
    Tag,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Entity => "entity",
            Self::Tag => "tag",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for store persistence and query operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Validation(ValidationError),
    /// Target record of an update/delete does not exist.
    NotFound { kind: RecordKind, id: i64 },
    /// An edge would reference a record that does not exist.
    MissingReference { kind: RecordKind, id: i64 },
    /// An event cannot be related to itself.
    SelfRelation(EventId),
    /// Connection is missing a table the store depends on.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::MissingReference { kind, id } => {
                write!(f, "cannot link to missing {kind}: {id}")
            }
            Self::SelfRelation(id) => write!(f, "event {id} cannot be related to itself"),
            Self::MissingRequiredTable(table) => {
                write!(f, "timeline store requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted timeline data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}
