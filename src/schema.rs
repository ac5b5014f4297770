// 📐 Catalog Schema - entity kinds, relations and table layout
//
// The RELATIONS table is the single source of truth for which column points
// at which entity, whether it may be empty, and what happens on delete.

use rusqlite::Connection;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{CatalogError, Result};

// ============================================================================
// ENTITY KINDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    SubjectArea,
    GoodCategory,
    GoodType,
    Unit,
    Good,
    PlaceType,
    Contact,
    PhoneNumber,
    Email,
    Url,
    Address,
    GoodPlace,
    Currency,
    GoodCost,
    GoodCount,
    Employee,
}

impl EntityKind {
    pub const ALL: [EntityKind; 16] = [
        EntityKind::SubjectArea,
        EntityKind::GoodCategory,
        EntityKind::GoodType,
        EntityKind::Unit,
        EntityKind::Good,
        EntityKind::PlaceType,
        EntityKind::Contact,
        EntityKind::PhoneNumber,
        EntityKind::Email,
        EntityKind::Url,
        EntityKind::Address,
        EntityKind::GoodPlace,
        EntityKind::Currency,
        EntityKind::GoodCost,
        EntityKind::GoodCount,
        EntityKind::Employee,
    ];

    /// Name used in URLs, CLI arguments and error messages
    pub fn slug(&self) -> &'static str {
        match self {
            EntityKind::SubjectArea => "subject_area",
            EntityKind::GoodCategory => "good_category",
            EntityKind::GoodType => "good_type",
            EntityKind::Unit => "unit",
            EntityKind::Good => "good",
            EntityKind::PlaceType => "place_type",
            EntityKind::Contact => "contact",
            EntityKind::PhoneNumber => "phone_number",
            EntityKind::Email => "email",
            EntityKind::Url => "url",
            EntityKind::Address => "address",
            EntityKind::GoodPlace => "good_place",
            EntityKind::Currency => "currency",
            EntityKind::GoodCost => "good_cost",
            EntityKind::GoodCount => "good_count",
            EntityKind::Employee => "employee",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::SubjectArea => "subject_areas",
            EntityKind::GoodCategory => "good_categories",
            EntityKind::GoodType => "good_types",
            EntityKind::Unit => "units",
            EntityKind::Good => "goods",
            EntityKind::PlaceType => "place_types",
            EntityKind::Contact => "contacts",
            EntityKind::PhoneNumber => "phone_numbers",
            EntityKind::Email => "emails",
            EntityKind::Url => "urls",
            EntityKind::Address => "addresses",
            EntityKind::GoodPlace => "good_places",
            EntityKind::Currency => "currencies",
            EntityKind::GoodCost => "good_costs",
            EntityKind::GoodCount => "good_counts",
            EntityKind::Employee => "employees",
        }
    }

    pub fn verbose_name(&self) -> &'static str {
        match self {
            EntityKind::SubjectArea => "subject area",
            EntityKind::GoodCategory => "good category",
            EntityKind::GoodType => "good type",
            EntityKind::Unit => "unit of measure",
            EntityKind::Good => "good",
            EntityKind::PlaceType => "place type",
            EntityKind::Contact => "contact",
            EntityKind::PhoneNumber => "phone number",
            EntityKind::Email => "email address",
            EntityKind::Url => "link",
            EntityKind::Address => "address",
            EntityKind::GoodPlace => "good place",
            EntityKind::Currency => "currency",
            EntityKind::GoodCost => "good cost",
            EntityKind::GoodCount => "good count",
            EntityKind::Employee => "employee",
        }
    }

    pub fn verbose_name_plural(&self) -> &'static str {
        match self {
            EntityKind::SubjectArea => "subject areas",
            EntityKind::GoodCategory => "good categories",
            EntityKind::GoodType => "good types",
            EntityKind::Unit => "units of measure",
            EntityKind::Good => "goods",
            EntityKind::PlaceType => "place types",
            EntityKind::Contact => "contacts",
            EntityKind::PhoneNumber => "phone numbers",
            EntityKind::Email => "email addresses",
            EntityKind::Url => "links",
            EntityKind::Address => "addresses",
            EntityKind::GoodPlace => "good places",
            EntityKind::Currency => "currencies",
            EntityKind::GoodCost => "good costs",
            EntityKind::GoodCount => "good counts",
            EntityKind::Employee => "employees",
        }
    }

    /// Columns shown in the admin list view
    pub fn list_display(&self) -> &'static [&'static str] {
        match self {
            EntityKind::SubjectArea => &["name"],
            EntityKind::GoodCategory => &["name", "subject_area"],
            EntityKind::GoodType => &["name", "category"],
            EntityKind::Unit => &["full_name", "short_name"],
            EntityKind::Good => &["name", "code", "description"],
            EntityKind::PlaceType => &["name"],
            EntityKind::Contact => &["first_name", "last_name", "passport"],
            EntityKind::PhoneNumber => &["phone_number", "contact"],
            EntityKind::Email => &["email", "contact"],
            EntityKind::Url => &["url", "contact"],
            EntityKind::Address => &["country", "region", "city", "street"],
            EntityKind::GoodPlace => &["name", "place_type", "address", "contact"],
            EntityKind::Currency => &["name", "short_name"],
            EntityKind::GoodCost => &["good_place", "good", "currency", "cost"],
            EntityKind::GoodCount => &["good_place", "good", "count"],
            EntityKind::Employee => &["position_name", "contact", "job_place"],
        }
    }

    /// Text columns matched by admin search
    pub fn search_fields(&self) -> &'static [&'static str] {
        match self {
            EntityKind::SubjectArea => &["name"],
            EntityKind::GoodCategory => &["name"],
            EntityKind::GoodType => &["name"],
            EntityKind::Unit => &["full_name", "short_name"],
            EntityKind::Good => &["name", "code", "description"],
            EntityKind::PlaceType => &["name"],
            EntityKind::Contact => &["first_name", "last_name", "passport"],
            EntityKind::PhoneNumber => &["phone_number"],
            EntityKind::Email => &["email"],
            EntityKind::Url => &["url"],
            EntityKind::Address => &["country", "region", "city", "street"],
            EntityKind::GoodPlace => &["name"],
            EntityKind::Currency => &["name", "short_name"],
            EntityKind::GoodCost => &[],
            EntityKind::GoodCount => &[],
            EntityKind::Employee => &["position_name"],
        }
    }

    /// Relations declared on this kind (its outgoing references)
    pub fn references(&self) -> impl Iterator<Item = &'static Relation> + '_ {
        RELATIONS.iter().filter(move |r| r.from == *self)
    }

    /// Relations pointing at this kind (its dependents)
    pub fn dependents(&self) -> impl Iterator<Item = &'static Relation> + '_ {
        RELATIONS.iter().filter(move |r| r.to == *self)
    }

    pub fn relation(&self, field: &str) -> Option<&'static Relation> {
        self.references().find(|r| r.field == field)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for EntityKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        EntityKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.slug() == wanted || kind.table() == wanted)
            .ok_or_else(|| CatalogError::UnknownEntity(s.to_string()))
    }
}

// ============================================================================
// RELATIONS
// ============================================================================

/// What happens to dependents when the referenced record is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnDelete {
    /// Deletion is rejected while dependents exist
    Protect,
    /// Dependents are deleted along with the referenced record
    Cascade,
}

/// A foreign-key column `from.field` pointing at `to.id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub from: EntityKind,
    pub field: &'static str,
    pub to: EntityKind,
    pub required: bool,
    pub on_delete: OnDelete,
}

const fn rel(
    from: EntityKind,
    field: &'static str,
    to: EntityKind,
    required: bool,
    on_delete: OnDelete,
) -> Relation {
    Relation {
        from,
        field,
        to,
        required,
        on_delete,
    }
}

use EntityKind as K;
use OnDelete::{Cascade, Protect};

pub static RELATIONS: &[Relation] = &[
    rel(K::GoodCategory, "subject_area", K::SubjectArea, false, Protect),
    rel(K::GoodType, "category", K::GoodCategory, true, Protect),
    rel(K::Good, "good_type", K::GoodType, true, Protect),
    rel(K::Good, "unit", K::Unit, true, Protect),
    rel(K::PhoneNumber, "contact", K::Contact, true, Protect),
    rel(K::Email, "contact", K::Contact, true, Protect),
    rel(K::Url, "contact", K::Contact, true, Protect),
    rel(K::GoodPlace, "place_type", K::PlaceType, true, Protect),
    rel(K::GoodPlace, "address", K::Address, true, Cascade),
    rel(K::GoodPlace, "contact", K::Contact, true, Cascade),
    rel(K::GoodCost, "good_place", K::GoodPlace, true, Protect),
    rel(K::GoodCost, "good", K::Good, true, Protect),
    rel(K::GoodCost, "currency", K::Currency, false, Protect),
    rel(K::GoodCount, "good_place", K::GoodPlace, true, Protect),
    rel(K::GoodCount, "good", K::Good, true, Protect),
    rel(K::Employee, "contact", K::Contact, true, Cascade),
    rel(K::Employee, "address", K::Address, true, Cascade),
    rel(K::Employee, "job_place", K::GoodPlace, true, Protect),
];

// ============================================================================
// DATABASE SETUP
// ============================================================================

/// Table definitions in dependency order.
///
/// Foreign keys are deferred to commit time: the store deletes whole cascade
/// sets inside one transaction and enforces the delete policy itself.
const TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS subject_areas (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS good_categories (
        id TEXT PRIMARY KEY NOT NULL,
        subject_area TEXT REFERENCES subject_areas(id) DEFERRABLE INITIALLY DEFERRED,
        name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS good_types (
        id TEXT PRIMARY KEY NOT NULL,
        category TEXT NOT NULL REFERENCES good_categories(id) DEFERRABLE INITIALLY DEFERRED,
        name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS units (
        id TEXT PRIMARY KEY NOT NULL,
        full_name TEXT NOT NULL,
        short_name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS goods (
        id TEXT PRIMARY KEY NOT NULL,
        good_type TEXT NOT NULL REFERENCES good_types(id) DEFERRABLE INITIALLY DEFERRED,
        unit TEXT NOT NULL REFERENCES units(id) DEFERRABLE INITIALLY DEFERRED,
        name TEXT NOT NULL,
        code TEXT NOT NULL,
        description TEXT
    )",
    "CREATE TABLE IF NOT EXISTS place_types (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS contacts (
        id TEXT PRIMARY KEY NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        passport TEXT
    )",
    "CREATE TABLE IF NOT EXISTS phone_numbers (
        id TEXT PRIMARY KEY NOT NULL,
        contact TEXT NOT NULL REFERENCES contacts(id) DEFERRABLE INITIALLY DEFERRED,
        phone_number TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS emails (
        id TEXT PRIMARY KEY NOT NULL,
        contact TEXT NOT NULL REFERENCES contacts(id) DEFERRABLE INITIALLY DEFERRED,
        email TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS urls (
        id TEXT PRIMARY KEY NOT NULL,
        contact TEXT NOT NULL REFERENCES contacts(id) DEFERRABLE INITIALLY DEFERRED,
        url TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS addresses (
        id TEXT PRIMARY KEY NOT NULL,
        country TEXT NOT NULL,
        region TEXT NOT NULL,
        city TEXT NOT NULL,
        street TEXT NOT NULL,
        building INTEGER NOT NULL,
        housing INTEGER,
        entrance INTEGER,
        floor INTEGER,
        room INTEGER
    )",
    "CREATE TABLE IF NOT EXISTS good_places (
        id TEXT PRIMARY KEY NOT NULL,
        place_type TEXT NOT NULL REFERENCES place_types(id) DEFERRABLE INITIALLY DEFERRED,
        address TEXT NOT NULL REFERENCES addresses(id) DEFERRABLE INITIALLY DEFERRED,
        contact TEXT NOT NULL REFERENCES contacts(id) DEFERRABLE INITIALLY DEFERRED,
        name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS currencies (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        short_name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS good_costs (
        id TEXT PRIMARY KEY NOT NULL,
        good_place TEXT NOT NULL REFERENCES good_places(id) DEFERRABLE INITIALLY DEFERRED,
        good TEXT NOT NULL REFERENCES goods(id) DEFERRABLE INITIALLY DEFERRED,
        currency TEXT REFERENCES currencies(id) DEFERRABLE INITIALLY DEFERRED,
        cost REAL NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS good_counts (
        id TEXT PRIMARY KEY NOT NULL,
        good_place TEXT NOT NULL REFERENCES good_places(id) DEFERRABLE INITIALLY DEFERRED,
        good TEXT NOT NULL REFERENCES goods(id) DEFERRABLE INITIALLY DEFERRED,
        count REAL NOT NULL DEFAULT 0.0
    )",
    "CREATE TABLE IF NOT EXISTS employees (
        id TEXT PRIMARY KEY NOT NULL,
        contact TEXT NOT NULL REFERENCES contacts(id) DEFERRABLE INITIALLY DEFERRED,
        address TEXT NOT NULL REFERENCES addresses(id) DEFERRABLE INITIALLY DEFERRED,
        job_place TEXT NOT NULL REFERENCES good_places(id) DEFERRABLE INITIALLY DEFERRED,
        position_name TEXT NOT NULL
    )",
    // Admin change log (one row per create/update/delete)
    "CREATE TABLE IF NOT EXISTS admin_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        event_id TEXT UNIQUE NOT NULL,
        timestamp TEXT NOT NULL,
        action TEXT NOT NULL,
        entity_type TEXT NOT NULL,
        entity_id TEXT NOT NULL,
        data TEXT NOT NULL,
        actor TEXT NOT NULL
    )",
];

/// Create every catalog table and index. Safe to run on an existing database.
pub fn setup_database(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", true)?;

    for ddl in TABLES {
        conn.execute(ddl, [])?;
    }

    // Reference lookups drive both validation and cascade collection
    for relation in RELATIONS {
        conn.execute(
            &format!(
                "CREATE INDEX IF NOT EXISTS idx_{table}_{field} ON {table}({field})",
                table = relation.from.table(),
                field = relation.field,
            ),
            [],
        )?;
    }

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_admin_log_entity ON admin_log(entity_type, entity_id)",
        [],
    )?;

    Ok(())
}
