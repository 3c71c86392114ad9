//! Entity and tag records.
//!
//! Both kinds share the same shape (`id`, `name`, `description`) and the
//! same validation rule: a name must contain a non-whitespace character.

use crate::model::event::ValidationError;
use serde::{Deserialize, Serialize};

/// Store-assigned identifier of an [`Entity`].
pub type EntityId = i64;

/// Store-assigned identifier of a [`Tag`].
pub type TagId = i64;

/// A person, organization, location, or object involved in events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub description: String,
}

/// A label assigned to events for organization and filtering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub description: String,
}

/// Input for creating or updating an entity or a tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogDraft {
    pub name: String,
    pub description: String,
}

impl CatalogDraft {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Rejects blank names before any store mutation is attempted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::CatalogDraft;
    use crate::model::event::ValidationError;

    #[test]
    fn blank_name_is_rejected() {
        let draft = CatalogDraft::new(" \t", "whitespace only");
        assert_eq!(draft.validate(), Err(ValidationError::BlankName));
    }

    #[test]
    fn named_draft_is_accepted() {
        assert!(CatalogDraft::new("Ada Lovelace", "").validate().is_ok());
    }
}
