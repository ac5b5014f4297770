// 🗄️ Catalog Store - SQLite-backed CRUD with referential integrity
//
// Reference checks and the delete policy are enforced here, driven by the
// RELATIONS table in `schema`. SQLite's own foreign keys are only a backstop
// checked at commit.

use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::audit::{get_events_for_entity, insert_event, Action, Event};
use crate::entities::Entity;
use crate::error::{CatalogError, Result};
use crate::schema::{setup_database, EntityKind, OnDelete, Relation};

pub const DEFAULT_ACTOR: &str = "admin";

// ============================================================================
// LIST FILTER
// ============================================================================

/// Admin list filter: free-text search plus equality on reference columns
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub search: Option<String>,
    pub references: Vec<(String, String)>,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(query: impl Into<String>) -> Self {
        ListFilter {
            search: Some(query.into()),
            references: Vec::new(),
        }
    }

    pub fn with_reference(mut self, field: impl Into<String>, id: impl Into<String>) -> Self {
        self.references.push((field.into(), id.into()));
        self
    }

    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }
}

// ============================================================================
// DELETE REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedRecord {
    pub entity: EntityKind,
    pub id: String,
}

/// Every record removed by one delete, dependents first
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeleteReport {
    pub deleted: Vec<DeletedRecord>,
}

impl DeleteReport {
    pub fn contains(&self, entity: EntityKind, id: &str) -> bool {
        self.deleted.iter().any(|r| r.entity == entity && r.id == id)
    }

    pub fn len(&self) -> usize {
        self.deleted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty()
    }
}

/// The record being deleted plus everything reachable through Cascade relations
#[derive(Debug, Default)]
struct DeletePlan {
    order: Vec<(EntityKind, String)>,
    members: HashSet<(EntityKind, String)>,
}

// ============================================================================
// STORE
// ============================================================================

pub struct CatalogStore {
    conn: Connection,
    actor: String,
}

impl CatalogStore {
    /// Open (or create) a file-backed catalog
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        // Enable WAL mode for crash recovery
        conn.pragma_update(None, "journal_mode", "WAL")?;
        info!(path = %path.display(), "catalog database opened");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(CatalogStore {
            conn,
            actor: DEFAULT_ACTOR.to_string(),
        })
    }

    /// Name recorded in the admin log for changes made through this store
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ========================================================================
    // READ
    // ========================================================================

    pub fn exists(&self, kind: EntityKind, id: &str) -> Result<bool> {
        record_exists(&self.conn, kind, id)
    }

    pub fn count(&self, kind: EntityKind) -> Result<i64> {
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", kind.table()),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn get<T: Entity>(&self, id: &str) -> Result<T> {
        let sql = format!(
            "SELECT id, {} FROM {} WHERE id = ?1",
            T::COLUMNS.join(", "),
            T::KIND.table()
        );
        self.conn
            .query_row(&sql, params![id], |row| T::from_row(row))
            .optional()?
            .ok_or_else(|| CatalogError::not_found(T::KIND, id))
    }

    /// All records of a kind in insertion order
    pub fn all<T: Entity>(&self) -> Result<Vec<T>> {
        self.list(&ListFilter::new())
    }

    /// Records matching the filter, in insertion order
    pub fn list<T: Entity>(&self, filter: &ListFilter) -> Result<Vec<T>> {
        let mut sql = format!(
            "SELECT id, {} FROM {}",
            T::COLUMNS.join(", "),
            T::KIND.table()
        );

        let mut clauses = Vec::new();
        let mut values = Vec::new();
        for (field, id) in &filter.references {
            let relation = T::KIND.relation(field).ok_or_else(|| {
                CatalogError::validation(T::KIND, field.as_str(), "not a filterable reference")
            })?;
            values.push(Value::Text(id.clone()));
            clauses.push(format!("{} = ?{}", relation.field, values.len()));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY rowid");

        debug!(entity = %T::KIND, sql = %sql, "listing records");

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(values.iter()), |row| T::from_row(row))?
            .collect::<std::result::Result<Vec<T>, _>>()?;

        match filter.search_term() {
            Some(term) => search_records(records, &term),
            None => Ok(records),
        }
    }

    /// Human-readable rendering of one record
    pub fn render<T: Entity>(&self, id: &str) -> Result<String> {
        self.get::<T>(id)?.render(self)
    }

    /// Admin log for one record, newest first
    pub fn history(&self, kind: EntityKind, id: &str) -> Result<Vec<Event>> {
        get_events_for_entity(&self.conn, kind, id)
    }

    // ========================================================================
    // WRITE
    // ========================================================================

    /// Insert a new record. A blank id is replaced by a fresh UUID.
    pub fn create<T: Entity>(&mut self, mut entity: T) -> Result<T> {
        entity.normalize();
        entity.validate()?;

        if entity.id().trim().is_empty() {
            entity.set_id(uuid::Uuid::new_v4().to_string());
        } else if self.exists(T::KIND, entity.id())? {
            return Err(CatalogError::validation(
                T::KIND,
                "id",
                format!("a record with id {} already exists", entity.id()),
            ));
        }

        self.check_references(&entity)?;

        let placeholders: Vec<String> = (1..=T::COLUMNS.len() + 1).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} (id, {}) VALUES ({})",
            T::KIND.table(),
            T::COLUMNS.join(", "),
            placeholders.join(", ")
        );
        let mut values = vec![Value::Text(entity.id().to_string())];
        values.extend(entity.values());

        let data = serde_json::to_value(&entity)?;
        let tx = self.conn.transaction()?;
        tx.execute(&sql, params_from_iter(values.iter()))?;
        insert_event(
            &tx,
            &Event::new(Action::Created, T::KIND, entity.id(), data, &self.actor),
        )?;
        tx.commit()?;

        info!(entity = %T::KIND, id = %entity.id(), "record created");
        Ok(entity)
    }

    /// Replace every attribute of an existing record
    pub fn update<T: Entity>(&mut self, id: &str, mut entity: T) -> Result<T> {
        if !self.exists(T::KIND, id)? {
            return Err(CatalogError::not_found(T::KIND, id));
        }

        entity.set_id(id.to_string());
        entity.normalize();
        entity.validate()?;
        self.check_references(&entity)?;

        let assignments: Vec<String> = T::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            T::KIND.table(),
            assignments.join(", "),
            T::COLUMNS.len() + 1
        );
        let mut values = entity.values();
        values.push(Value::Text(id.to_string()));

        let data = serde_json::to_value(&entity)?;
        let tx = self.conn.transaction()?;
        tx.execute(&sql, params_from_iter(values.iter()))?;
        insert_event(
            &tx,
            &Event::new(Action::Updated, T::KIND, id, data, &self.actor),
        )?;
        tx.commit()?;

        info!(entity = %T::KIND, id = %id, "record updated");
        Ok(entity)
    }

    /// Delete a record together with its cascade set.
    ///
    /// Rejected with `ReferentialIntegrity` when any record in the cascade set
    /// is protect-referenced from outside the set; nothing is deleted then.
    pub fn delete(&mut self, kind: EntityKind, id: &str) -> Result<DeleteReport> {
        if !self.exists(kind, id)? {
            return Err(CatalogError::not_found(kind, id));
        }

        let tx = self.conn.transaction()?;

        let mut plan = DeletePlan::default();
        collect_cascade(&tx, kind, id, &mut plan)?;
        if let Err(err) = check_protected(&tx, &plan) {
            warn!(entity = %kind, id = %id, error = %err, "delete rejected");
            return Err(err);
        }

        let mut report = DeleteReport::default();
        for (entity, record_id) in &plan.order {
            let data = row_json(&tx, *entity, record_id)?.unwrap_or(serde_json::Value::Null);
            tx.execute(
                &format!("DELETE FROM {} WHERE id = ?1", entity.table()),
                params![record_id],
            )?;
            insert_event(
                &tx,
                &Event::new(Action::Deleted, *entity, record_id, data, &self.actor),
            )?;
            report.deleted.push(DeletedRecord {
                entity: *entity,
                id: record_id.clone(),
            });
        }
        tx.commit()?;

        info!(
            entity = %kind,
            id = %id,
            cascaded = report.len() - 1,
            "record deleted"
        );
        Ok(report)
    }

    /// Every reference must be declared in the schema, present when required,
    /// and point at an existing record
    fn check_references<T: Entity>(&self, entity: &T) -> Result<()> {
        for (field, target) in entity.references() {
            let relation = T::KIND.relation(field).ok_or_else(|| {
                CatalogError::validation(T::KIND, field, "undeclared reference")
            })?;

            match target.filter(|t| !t.trim().is_empty()) {
                None if relation.required => {
                    return Err(CatalogError::validation(T::KIND, field, "this field is required"));
                }
                None => {}
                Some(target_id) => {
                    if !record_exists(&self.conn, relation.to, target_id)? {
                        return Err(CatalogError::validation(
                            T::KIND,
                            field,
                            format!("{} {} does not exist", relation.to, target_id),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn record_exists(conn: &Connection, kind: EntityKind, id: &str) -> Result<bool> {
    let found = conn
        .query_row(
            &format!("SELECT 1 FROM {} WHERE id = ?1", kind.table()),
            params![id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Ids of `relation.from` records whose `relation.field` points at `target_id`
fn referencing_ids(conn: &Connection, relation: &Relation, target_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id FROM {} WHERE {} = ?1 ORDER BY rowid",
        relation.from.table(),
        relation.field
    ))?;
    let ids = stmt
        .query_map(params![target_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(ids)
}

/// Depth-first walk over Cascade relations; dependents land in `order` before
/// the record they depend on
fn collect_cascade(conn: &Connection, kind: EntityKind, id: &str, plan: &mut DeletePlan) -> Result<()> {
    if !plan.members.insert((kind, id.to_string())) {
        return Ok(());
    }

    for relation in kind.dependents().filter(|r| r.on_delete == OnDelete::Cascade) {
        for dependent in referencing_ids(conn, relation, id)? {
            collect_cascade(conn, relation.from, &dependent, plan)?;
        }
    }

    plan.order.push((kind, id.to_string()));
    Ok(())
}

/// Protect references from records that are themselves being deleted don't block
fn check_protected(conn: &Connection, plan: &DeletePlan) -> Result<()> {
    for (kind, id) in &plan.order {
        for relation in kind.dependents().filter(|r| r.on_delete == OnDelete::Protect) {
            let blockers = referencing_ids(conn, relation, id)?
                .into_iter()
                .filter(|r| !plan.members.contains(&(relation.from, r.clone())))
                .count();

            if blockers > 0 {
                return Err(CatalogError::ReferentialIntegrity {
                    entity: *kind,
                    id: id.clone(),
                    referencing: relation.from,
                    field: relation.field.to_string(),
                    count: blockers,
                });
            }
        }
    }
    Ok(())
}

/// Raw row as a JSON object keyed by column name
fn row_json(conn: &Connection, kind: EntityKind, id: &str) -> Result<Option<serde_json::Value>> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {} WHERE id = ?1", kind.table()))?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query(params![id])?;

    let row = match rows.next()? {
        Some(row) => row,
        None => return Ok(None),
    };

    let mut map = serde_json::Map::new();
    for (i, name) in names.iter().enumerate() {
        let value = match row.get_ref(i)? {
            ValueRef::Null => serde_json::Value::Null,
            ValueRef::Integer(n) => serde_json::json!(n),
            ValueRef::Real(f) => serde_json::json!(f),
            ValueRef::Text(t) => serde_json::Value::String(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(_) => serde_json::Value::Null,
        };
        map.insert(name.clone(), value);
    }
    Ok(Some(serde_json::Value::Object(map)))
}

/// Case-insensitive substring match over the kind's search fields
fn search_records<T: Entity>(records: Vec<T>, term: &str) -> Result<Vec<T>> {
    let fields = T::KIND.search_fields();
    if fields.is_empty() {
        return Err(CatalogError::validation(T::KIND, "q", "this entity has no search fields"));
    }

    let mut matched = Vec::new();
    for record in records {
        let json = serde_json::to_value(&record)?;
        let hit = fields.iter().any(|field| {
            json.get(*field)
                .and_then(|v| v.as_str())
                .map_or(false, |v| v.to_lowercase().contains(term))
        });
        if hit {
            matched.push(record);
        }
    }
    Ok(matched)
}
