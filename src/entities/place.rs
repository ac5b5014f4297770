// 🏬 Places where goods are kept or sold, and the people working there
//
// A GoodPlace is owned by its address and contact: removing either one
// removes the place. Employees are owned by their own contact and address,
// but only protect-reference the place they work at.

use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{required_text, text, Entity};
use crate::error::Result;
use crate::schema::EntityKind;
use crate::store::CatalogStore;

/// Kind of location: warehouse, shop, pickup point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceType {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

impl PlaceType {
    pub fn new(name: impl Into<String>) -> Self {
        PlaceType {
            id: String::new(),
            name: name.into(),
        }
    }
}

impl Entity for PlaceType {
    const KIND: EntityKind = EntityKind::PlaceType;
    const COLUMNS: &'static [&'static str] = &["name"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn values(&self) -> Vec<Value> {
        vec![text(&self.name)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PlaceType {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }

    fn validate(&self) -> Result<()> {
        required_text(Self::KIND, "name", &self.name, Some(30))
    }

    fn render(&self, _store: &CatalogStore) -> Result<String> {
        Ok(self.name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodPlace {
    #[serde(default)]
    pub id: String,
    pub place_type: String,
    pub address: String,
    pub contact: String,
    pub name: String,
}

impl GoodPlace {
    pub fn new(
        name: impl Into<String>,
        place_type: impl Into<String>,
        address: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        GoodPlace {
            id: String::new(),
            place_type: place_type.into(),
            address: address.into(),
            contact: contact.into(),
            name: name.into(),
        }
    }
}

impl Entity for GoodPlace {
    const KIND: EntityKind = EntityKind::GoodPlace;
    const COLUMNS: &'static [&'static str] = &["place_type", "address", "contact", "name"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.place_type),
            text(&self.address),
            text(&self.contact),
            text(&self.name),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(GoodPlace {
            id: row.get("id")?,
            place_type: row.get("place_type")?,
            address: row.get("address")?,
            contact: row.get("contact")?,
            name: row.get("name")?,
        })
    }

    fn references(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("place_type", Some(self.place_type.as_str())),
            ("address", Some(self.address.as_str())),
            ("contact", Some(self.contact.as_str())),
        ]
    }

    fn validate(&self) -> Result<()> {
        required_text(Self::KIND, "name", &self.name, Some(300))
    }

    fn render(&self, _store: &CatalogStore) -> Result<String> {
        Ok(self.name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(default)]
    pub id: String,
    pub contact: String,
    pub address: String,
    pub job_place: String,
    pub position_name: String,
}

impl Employee {
    pub fn new(
        position_name: impl Into<String>,
        contact: impl Into<String>,
        address: impl Into<String>,
        job_place: impl Into<String>,
    ) -> Self {
        Employee {
            id: String::new(),
            contact: contact.into(),
            address: address.into(),
            job_place: job_place.into(),
            position_name: position_name.into(),
        }
    }
}

impl Entity for Employee {
    const KIND: EntityKind = EntityKind::Employee;
    const COLUMNS: &'static [&'static str] = &["contact", "address", "job_place", "position_name"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.contact),
            text(&self.address),
            text(&self.job_place),
            text(&self.position_name),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Employee {
            id: row.get("id")?,
            contact: row.get("contact")?,
            address: row.get("address")?,
            job_place: row.get("job_place")?,
            position_name: row.get("position_name")?,
        })
    }

    fn references(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("contact", Some(self.contact.as_str())),
            ("address", Some(self.address.as_str())),
            ("job_place", Some(self.job_place.as_str())),
        ]
    }

    fn validate(&self) -> Result<()> {
        required_text(Self::KIND, "position_name", &self.position_name, Some(50))
    }

    fn render(&self, _store: &CatalogStore) -> Result<String> {
        Ok(self.position_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_type_name_limit() {
        assert!(PlaceType::new("pickup point").validate().is_ok());
        assert!(PlaceType::new("p".repeat(31)).validate().is_err());
    }

    #[test]
    fn test_employee_deserializes_from_admin_form() {
        let json = serde_json::json!({
            "contact": "c1",
            "address": "a1",
            "job_place": "p1",
            "position_name": "cashier",
        });
        let employee: Employee = serde_json::from_value(json).unwrap();
        assert_eq!(employee.position_name, "cashier");
        assert_eq!(
            employee.references(),
            vec![
                ("contact", Some("c1")),
                ("address", Some("a1")),
                ("job_place", Some("p1")),
            ]
        );
    }

    #[test]
    fn test_good_place_missing_contact_fails_to_parse() {
        let json = serde_json::json!({
            "place_type": "t1",
            "address": "a1",
            "name": "Shop #1",
        });
        assert!(serde_json::from_value::<GoodPlace>(json).is_err());
    }
}
