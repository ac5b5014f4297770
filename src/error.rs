// Catalog error types
// Every failure of a catalog operation surfaces as one of these variants

use crate::schema::EntityKind;

/// Error returned by catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A field is malformed, a required reference is missing, or a
    /// reference points to a record that does not exist.
    #[error("{entity}.{field}: {message}")]
    Validation {
        entity: EntityKind,
        field: String,
        message: String,
    },

    /// The addressed record does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: String },

    /// Deletion blocked by a protecting reference.
    #[error("cannot delete {entity} {id}: referenced by {count} {referencing} record(s) through `{field}`")]
    ReferentialIntegrity {
        entity: EntityKind,
        id: String,
        referencing: EntityKind,
        field: String,
        count: usize,
    },

    /// No entity kind is registered under this name.
    #[error("unknown entity `{0}`")]
    UnknownEntity(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    pub fn validation(
        entity: EntityKind,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        CatalogError::Validation {
            entity,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        CatalogError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
