// 🏠 Address - where employees live and goods are kept

use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{opt_int, optional_positive, positive, required_text, text, Entity};
use crate::error::Result;
use crate::schema::EntityKind;
use crate::store::CatalogStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub id: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub street: String,
    pub building: i64,
    #[serde(default)]
    pub housing: Option<i64>,
    #[serde(default)]
    pub entrance: Option<i64>,
    #[serde(default)]
    pub floor: Option<i64>,
    #[serde(default)]
    pub room: Option<i64>,
}

impl Address {
    pub fn new(
        country: impl Into<String>,
        region: impl Into<String>,
        city: impl Into<String>,
        street: impl Into<String>,
        building: i64,
    ) -> Self {
        Address {
            country: country.into(),
            region: region.into(),
            city: city.into(),
            street: street.into(),
            building,
            ..Address::default()
        }
    }

    /// Non-empty parts in display order: country, region, city, street,
    /// building, housing, entrance, floor, room
    fn parts(&self) -> Vec<String> {
        let mut parts = Vec::new();

        let texts = [
            (self.country.as_str(), ""),
            (self.region.as_str(), " region"),
            (self.city.as_str(), ""),
            (self.street.as_str(), ""),
        ];
        for (value, suffix) in texts {
            let value = value.trim();
            if !value.is_empty() {
                parts.push(format!("{}{}", value, suffix));
            }
        }

        if self.building != 0 {
            parts.push(self.building.to_string());
        }

        let numbers = [
            ("housing", self.housing),
            ("entrance", self.entrance),
            ("floor", self.floor),
            ("room", self.room),
        ];
        for (label, value) in numbers {
            if let Some(n) = value.filter(|n| *n != 0) {
                parts.push(format!("{} {}", label, n));
            }
        }

        parts
    }
}

impl Entity for Address {
    const KIND: EntityKind = EntityKind::Address;
    const COLUMNS: &'static [&'static str] = &[
        "country", "region", "city", "street", "building", "housing", "entrance", "floor", "room",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.country),
            text(&self.region),
            text(&self.city),
            text(&self.street),
            Value::Integer(self.building),
            opt_int(self.housing),
            opt_int(self.entrance),
            opt_int(self.floor),
            opt_int(self.room),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Address {
            id: row.get("id")?,
            country: row.get("country")?,
            region: row.get("region")?,
            city: row.get("city")?,
            street: row.get("street")?,
            building: row.get("building")?,
            housing: row.get("housing")?,
            entrance: row.get("entrance")?,
            floor: row.get("floor")?,
            room: row.get("room")?,
        })
    }

    fn validate(&self) -> Result<()> {
        required_text(Self::KIND, "country", &self.country, Some(30))?;
        required_text(Self::KIND, "region", &self.region, Some(30))?;
        required_text(Self::KIND, "city", &self.city, Some(30))?;
        required_text(Self::KIND, "street", &self.street, Some(50))?;
        positive(Self::KIND, "building", self.building)?;
        optional_positive(Self::KIND, "housing", self.housing)?;
        optional_positive(Self::KIND, "entrance", self.entrance)?;
        optional_positive(Self::KIND, "floor", self.floor)?;
        optional_positive(Self::KIND, "room", self.room)
    }

    fn render(&self, _store: &CatalogStore) -> Result<String> {
        Ok(self.parts().join(", "))
    }
}
