// 📦 Goods and their units of measure

use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{blank_to_none, opt_text, optional_text, required_text, text, Entity};
use crate::error::Result;
use crate::schema::EntityKind;
use crate::store::CatalogStore;

/// Unit a good is counted in (e.g., "kilogram" / "kg")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    #[serde(default)]
    pub id: String,
    pub full_name: String,
    pub short_name: String,
}

impl Unit {
    pub fn new(full_name: impl Into<String>, short_name: impl Into<String>) -> Self {
        Unit {
            id: String::new(),
            full_name: full_name.into(),
            short_name: short_name.into(),
        }
    }
}

impl Entity for Unit {
    const KIND: EntityKind = EntityKind::Unit;
    const COLUMNS: &'static [&'static str] = &["full_name", "short_name"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn values(&self) -> Vec<Value> {
        vec![text(&self.full_name), text(&self.short_name)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Unit {
            id: row.get("id")?,
            full_name: row.get("full_name")?,
            short_name: row.get("short_name")?,
        })
    }

    fn validate(&self) -> Result<()> {
        required_text(Self::KIND, "full_name", &self.full_name, Some(20))?;
        required_text(Self::KIND, "short_name", &self.short_name, Some(5))
    }

    fn render(&self, _store: &CatalogStore) -> Result<String> {
        Ok(self.short_name.clone())
    }
}

/// A good the shop sells. Prices live in `GoodCost`, stock in `GoodCount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Good {
    #[serde(default)]
    pub id: String,
    pub good_type: String,
    pub unit: String,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Good {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        good_type: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Good {
            id: String::new(),
            good_type: good_type.into(),
            unit: unit.into(),
            name: name.into(),
            code: code.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Entity for Good {
    const KIND: EntityKind = EntityKind::Good;
    const COLUMNS: &'static [&'static str] = &["good_type", "unit", "name", "code", "description"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.good_type),
            text(&self.unit),
            text(&self.name),
            text(&self.code),
            opt_text(&self.description),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Good {
            id: row.get("id")?,
            good_type: row.get("good_type")?,
            unit: row.get("unit")?,
            name: row.get("name")?,
            code: row.get("code")?,
            description: row.get("description")?,
        })
    }

    fn references(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("good_type", Some(self.good_type.as_str())),
            ("unit", Some(self.unit.as_str())),
        ]
    }

    fn validate(&self) -> Result<()> {
        required_text(Self::KIND, "name", &self.name, Some(300))?;
        required_text(Self::KIND, "code", &self.code, Some(50))?;
        optional_text(Self::KIND, "description", &self.description, None)
    }

    fn normalize(&mut self) {
        blank_to_none(&mut self.description);
    }

    fn render(&self, _store: &CatalogStore) -> Result<String> {
        Ok(self.name.clone())
    }
}
