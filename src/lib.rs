// Goods Catalog - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod error;
pub mod schema;
pub mod entities;
pub mod store;
pub mod audit;
pub mod admin;
pub mod import;
pub mod pages;
pub mod config;

#[cfg(feature = "server")]
pub mod web;

// Re-export commonly used types
pub use error::{CatalogError, Result};
pub use schema::{setup_database, EntityKind, OnDelete, Relation, RELATIONS};
pub use entities::{
    Address, Contact, Currency, Email, Employee, Entity, Good, GoodCategory, GoodCost,
    GoodCount, GoodPlace, GoodType, PhoneNumber, PlaceType, SubjectArea, Unit, Url,
};
pub use store::{CatalogStore, DeleteReport, DeletedRecord, ListFilter, DEFAULT_ACTOR};
pub use audit::{Action, Event};
pub use admin::{AdminEntry, AdminRow};
pub use import::{import_csv, import_csv_reader};
pub use config::{CatalogConfig, ServerArgs};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
