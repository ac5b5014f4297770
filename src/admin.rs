// 🛠️ Admin Site - CRUD over JSON attributes for any entity kind
//
// The HTTP server and the CLI address entities by name at runtime; this
// module turns that name into the typed store call.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::audit::Event;
use crate::entities::Entity;
use crate::error::{CatalogError, Result};
use crate::schema::EntityKind;
use crate::store::{CatalogStore, DeleteReport, ListFilter};

/// Run `$body` with `$t` bound to the record type of `$kind`
macro_rules! with_entity_type {
    ($kind:expr, $t:ident => $body:expr) => {
        match $kind {
            $crate::schema::EntityKind::SubjectArea => { type $t = $crate::entities::SubjectArea; $body }
            $crate::schema::EntityKind::GoodCategory => { type $t = $crate::entities::GoodCategory; $body }
            $crate::schema::EntityKind::GoodType => { type $t = $crate::entities::GoodType; $body }
            $crate::schema::EntityKind::Unit => { type $t = $crate::entities::Unit; $body }
            $crate::schema::EntityKind::Good => { type $t = $crate::entities::Good; $body }
            $crate::schema::EntityKind::PlaceType => { type $t = $crate::entities::PlaceType; $body }
            $crate::schema::EntityKind::Contact => { type $t = $crate::entities::Contact; $body }
            $crate::schema::EntityKind::PhoneNumber => { type $t = $crate::entities::PhoneNumber; $body }
            $crate::schema::EntityKind::Email => { type $t = $crate::entities::Email; $body }
            $crate::schema::EntityKind::Url => { type $t = $crate::entities::Url; $body }
            $crate::schema::EntityKind::Address => { type $t = $crate::entities::Address; $body }
            $crate::schema::EntityKind::GoodPlace => { type $t = $crate::entities::GoodPlace; $body }
            $crate::schema::EntityKind::Currency => { type $t = $crate::entities::Currency; $body }
            $crate::schema::EntityKind::GoodCost => { type $t = $crate::entities::GoodCost; $body }
            $crate::schema::EntityKind::GoodCount => { type $t = $crate::entities::GoodCount; $body }
            $crate::schema::EntityKind::Employee => { type $t = $crate::entities::Employee; $body }
        }
    };
}

pub(crate) use with_entity_type;

/// One row of an admin list view
#[derive(Debug, Clone, Serialize)]
pub struct AdminRow {
    pub id: String,
    /// Human-readable rendering
    pub display: String,
    /// List-display columns only
    pub columns: Map<String, Value>,
    /// Full record
    pub record: Value,
}

/// Entity kind as listed on the admin index
#[derive(Debug, Clone, Serialize)]
pub struct AdminEntry {
    pub slug: &'static str,
    pub verbose_name: &'static str,
    pub verbose_name_plural: &'static str,
    pub list_display: &'static [&'static str],
    pub search_fields: &'static [&'static str],
}

pub fn registry() -> Vec<AdminEntry> {
    EntityKind::ALL
        .iter()
        .map(|kind| AdminEntry {
            slug: kind.slug(),
            verbose_name: kind.verbose_name(),
            verbose_name_plural: kind.verbose_name_plural(),
            list_display: kind.list_display(),
            search_fields: kind.search_fields(),
        })
        .collect()
}

pub fn list(store: &CatalogStore, kind: EntityKind, filter: &ListFilter) -> Result<Vec<AdminRow>> {
    with_entity_type!(kind, T => {
        store
            .list::<T>(filter)?
            .iter()
            .map(|record| to_row(store, record))
            .collect()
    })
}

pub fn get(store: &CatalogStore, kind: EntityKind, id: &str) -> Result<AdminRow> {
    with_entity_type!(kind, T => {
        let record = store.get::<T>(id)?;
        to_row(store, &record)
    })
}

pub fn create(store: &mut CatalogStore, kind: EntityKind, attributes: Value) -> Result<AdminRow> {
    with_entity_type!(kind, T => {
        let entity: T = parse_attributes(kind, attributes)?;
        let created = store.create(entity)?;
        to_row(store, &created)
    })
}

/// Partial update: given attributes are merged over the stored record
pub fn update(
    store: &mut CatalogStore,
    kind: EntityKind,
    id: &str,
    attributes: Value,
) -> Result<AdminRow> {
    with_entity_type!(kind, T => {
        let current = store.get::<T>(id)?;
        let merged = merge(serde_json::to_value(&current)?, attributes, kind)?;
        let entity: T = parse_attributes(kind, merged)?;
        let updated = store.update(id, entity)?;
        to_row(store, &updated)
    })
}

pub fn delete(store: &mut CatalogStore, kind: EntityKind, id: &str) -> Result<DeleteReport> {
    store.delete(kind, id)
}

pub fn history(store: &CatalogStore, kind: EntityKind, id: &str) -> Result<Vec<Event>> {
    let events = store.history(kind, id)?;
    if events.is_empty() && !store.exists(kind, id)? {
        return Err(CatalogError::not_found(kind, id));
    }
    Ok(events)
}

fn to_row<T: Entity>(store: &CatalogStore, record: &T) -> Result<AdminRow> {
    let json = serde_json::to_value(record)?;
    let columns = T::KIND
        .list_display()
        .iter()
        .map(|field| {
            let value = json.get(*field).cloned().unwrap_or(Value::Null);
            (field.to_string(), value)
        })
        .collect();

    Ok(AdminRow {
        id: record.id().to_string(),
        display: record.render(store)?,
        columns,
        record: json,
    })
}

fn parse_attributes<T: Entity>(kind: EntityKind, attributes: Value) -> Result<T> {
    serde_json::from_value(attributes)
        .map_err(|e| CatalogError::validation(kind, "attributes", e.to_string()))
}

fn merge(current: Value, changes: Value, kind: EntityKind) -> Result<Value> {
    let mut current = match current {
        Value::Object(map) => map,
        _ => return Err(CatalogError::validation(kind, "attributes", "stored record is not an object")),
    };
    let changes = match changes {
        Value::Object(map) => map,
        _ => return Err(CatalogError::validation(kind, "attributes", "expected a JSON object")),
    };

    for (field, value) in changes {
        // Identity is fixed by the addressed record
        if field == "id" {
            continue;
        }
        current.insert(field, value);
    }
    Ok(Value::Object(current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_with_unit() -> (CatalogStore, String) {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let row = create(
            &mut store,
            EntityKind::Unit,
            json!({"full_name": "kilogram", "short_name": "kg"}),
        )
        .unwrap();
        (store, row.id)
    }

    #[test]
    fn test_registry_lists_every_kind() {
        let entries = registry();
        assert_eq!(entries.len(), 16);
        let good = entries.iter().find(|e| e.slug == "good").unwrap();
        assert_eq!(good.search_fields, &["name", "code", "description"]);
    }

    #[test]
    fn test_create_returns_display_and_columns() {
        let (store, id) = store_with_unit();
        let row = get(&store, EntityKind::Unit, &id).unwrap();

        assert_eq!(row.display, "kg");
        assert_eq!(row.columns["full_name"], "kilogram");
        assert_eq!(row.record["id"], id.as_str());
    }

    #[test]
    fn test_create_with_missing_field_is_validation_error() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let err = create(&mut store, EntityKind::Unit, json!({"full_name": "kilogram"})).unwrap_err();
        assert!(matches!(err, CatalogError::Validation { field, .. } if field == "attributes"));
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let (mut store, id) = store_with_unit();
        let row = update(
            &mut store,
            EntityKind::Unit,
            &id,
            json!({"full_name": "kilogramme", "id": "ignored"}),
        )
        .unwrap();

        assert_eq!(row.id, id);
        assert_eq!(row.record["full_name"], "kilogramme");
        assert_eq!(row.record["short_name"], "kg");
    }

    #[test]
    fn test_update_missing_record() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let err = update(&mut store, EntityKind::Unit, "nope", json!({})).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[test]
    fn test_list_with_search() {
        let (mut store, _) = store_with_unit();
        create(
            &mut store,
            EntityKind::Unit,
            json!({"full_name": "liter", "short_name": "l"}),
        )
        .unwrap();

        let rows = list(&store, EntityKind::Unit, &ListFilter::search("LIT")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].display, "l");
    }

    #[test]
    fn test_null_count_defaults_to_zero() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let id = |row: AdminRow| row.id;

        let category = id(create(&mut store, EntityKind::GoodCategory, json!({"name": "Dairy"})).unwrap());
        let good_type = id(create(
            &mut store,
            EntityKind::GoodType,
            json!({"name": "Milk", "category": category}),
        )
        .unwrap());
        let unit = id(create(
            &mut store,
            EntityKind::Unit,
            json!({"full_name": "liter", "short_name": "l"}),
        )
        .unwrap());
        let good = id(create(
            &mut store,
            EntityKind::Good,
            json!({"name": "Milk", "code": "1", "good_type": good_type, "unit": unit}),
        )
        .unwrap());
        let place_type = id(create(&mut store, EntityKind::PlaceType, json!({"name": "shop"})).unwrap());
        let contact = id(create(
            &mut store,
            EntityKind::Contact,
            json!({"first_name": "Ivan", "last_name": "Petrov"}),
        )
        .unwrap());
        let address = id(create(
            &mut store,
            EntityKind::Address,
            json!({"country": "Belarus", "region": "Minsk", "city": "Minsk", "street": "Lenina", "building": 5}),
        )
        .unwrap());
        let place = id(create(
            &mut store,
            EntityKind::GoodPlace,
            json!({"name": "Shop", "place_type": place_type, "address": address, "contact": contact}),
        )
        .unwrap());

        let row = create(
            &mut store,
            EntityKind::GoodCount,
            json!({"good_place": place, "good": good, "count": null}),
        )
        .unwrap();
        assert_eq!(row.record["count"], 0.0);
    }

    #[test]
    fn test_history_survives_delete() {
        let (mut store, id) = store_with_unit();
        delete(&mut store, EntityKind::Unit, &id).unwrap();

        let events = history(&store, EntityKind::Unit, &id).unwrap();
        assert_eq!(events.len(), 2);
        assert!(history(&store, EntityKind::Unit, "nope").is_err());
    }
}
