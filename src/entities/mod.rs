// Entity Models
//
// Each catalog entity is a flat record with:
// - A stable identity (UUID string) assigned by the store on create
// - Plain attributes and reference columns holding the target's id
// - A human-readable rendering, resolved recursively through the store

pub mod address;
pub mod classification;
pub mod contact;
pub mod good;
pub mod place;
pub mod pricing;

pub use address::Address;
pub use classification::{GoodCategory, GoodType, SubjectArea};
pub use contact::{Contact, Email, PhoneNumber, Url};
pub use good::{Good, Unit};
pub use place::{Employee, GoodPlace, PlaceType};
pub use pricing::{Currency, GoodCost, GoodCount};

use rusqlite::types::Value;
use rusqlite::Row;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CatalogError, Result};
use crate::schema::EntityKind;
use crate::store::CatalogStore;

/// A record type stored in its own catalog table.
///
/// `COLUMNS` lists the non-id columns in the order `values` produces them.
/// Reference columns must match the `field` of a relation declared for `KIND`.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Column values, aligned with `COLUMNS`
    fn values(&self) -> Vec<Value>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Reference columns and the ids they point at
    fn references(&self) -> Vec<(&'static str, Option<&str>)> {
        Vec::new()
    }

    /// Field-level checks; reference existence is checked by the store
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Canonicalize blank optional values before validation
    fn normalize(&mut self) {}

    fn render(&self, store: &CatalogStore) -> Result<String>;
}

// ============================================================================
// COLUMN VALUE HELPERS
// ============================================================================

pub(crate) fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

pub(crate) fn opt_text(value: &Option<String>) -> Value {
    match value {
        Some(v) => Value::Text(v.clone()),
        None => Value::Null,
    }
}

pub(crate) fn opt_int(value: Option<i64>) -> Value {
    match value {
        Some(v) => Value::Integer(v),
        None => Value::Null,
    }
}

pub(crate) fn blank_to_none(value: &mut Option<String>) {
    if value.as_deref().map_or(false, |v| v.trim().is_empty()) {
        *value = None;
    }
}

// ============================================================================
// FIELD VALIDATION
// ============================================================================

pub(crate) fn required_text(
    kind: EntityKind,
    field: &str,
    value: &str,
    max_len: Option<usize>,
) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::validation(kind, field, "this field is required"));
    }
    check_length(kind, field, value, max_len)
}

pub(crate) fn optional_text(
    kind: EntityKind,
    field: &str,
    value: &Option<String>,
    max_len: Option<usize>,
) -> Result<()> {
    match value {
        Some(v) => check_length(kind, field, v, max_len),
        None => Ok(()),
    }
}

fn check_length(kind: EntityKind, field: &str, value: &str, max_len: Option<usize>) -> Result<()> {
    if let Some(max) = max_len {
        let len = value.chars().count();
        if len > max {
            return Err(CatalogError::validation(
                kind,
                field,
                format!("at most {} characters allowed, got {}", max, len),
            ));
        }
    }
    Ok(())
}

pub(crate) fn finite(kind: EntityKind, field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CatalogError::validation(kind, field, "must be a finite number"))
    }
}

pub(crate) fn positive(kind: EntityKind, field: &str, value: i64) -> Result<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(CatalogError::validation(
            kind,
            field,
            format!("must be a positive number, got {}", value),
        ))
    }
}

pub(crate) fn optional_positive(kind: EntityKind, field: &str, value: Option<i64>) -> Result<()> {
    match value {
        Some(v) => positive(kind, field, v),
        None => Ok(()),
    }
}
