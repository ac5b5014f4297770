// 💰 Currencies, prices and stock counts
//
// GoodCost and GoodCount rows hang off a (GoodPlace, Good) pair. Several rows
// may exist per pair: price history, or one price per currency.

use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Deserializer, Serialize};

use super::{blank_to_none, finite, opt_text, required_text, text, Entity};
use crate::entities::{Good, GoodPlace};
use crate::error::Result;
use crate::schema::EntityKind;
use crate::store::CatalogStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// ISO 4217 code, e.g. "BYN"
    pub short_name: String,
}

impl Currency {
    pub fn new(name: impl Into<String>, short_name: impl Into<String>) -> Self {
        Currency {
            id: String::new(),
            name: name.into(),
            short_name: short_name.into(),
        }
    }
}

impl Entity for Currency {
    const KIND: EntityKind = EntityKind::Currency;
    const COLUMNS: &'static [&'static str] = &["name", "short_name"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn values(&self) -> Vec<Value> {
        vec![text(&self.name), text(&self.short_name)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Currency {
            id: row.get("id")?,
            name: row.get("name")?,
            short_name: row.get("short_name")?,
        })
    }

    fn validate(&self) -> Result<()> {
        required_text(Self::KIND, "name", &self.name, Some(50))?;
        required_text(Self::KIND, "short_name", &self.short_name, Some(3))
    }

    fn render(&self, _store: &CatalogStore) -> Result<String> {
        Ok(format!("{} - {}", self.short_name, self.name))
    }
}

/// Price of a good at a place, optionally in a given currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodCost {
    #[serde(default)]
    pub id: String,
    pub good_place: String,
    pub good: String,
    #[serde(default)]
    pub currency: Option<String>,
    pub cost: f64,
}

impl GoodCost {
    pub fn new(good_place: impl Into<String>, good: impl Into<String>, cost: f64) -> Self {
        GoodCost {
            id: String::new(),
            good_place: good_place.into(),
            good: good.into(),
            currency: None,
            cost,
        }
    }

    pub fn in_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }
}

impl Entity for GoodCost {
    const KIND: EntityKind = EntityKind::GoodCost;
    const COLUMNS: &'static [&'static str] = &["good_place", "good", "currency", "cost"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.good_place),
            text(&self.good),
            opt_text(&self.currency),
            Value::Real(self.cost),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(GoodCost {
            id: row.get("id")?,
            good_place: row.get("good_place")?,
            good: row.get("good")?,
            currency: row.get("currency")?,
            cost: row.get("cost")?,
        })
    }

    fn references(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("good_place", Some(self.good_place.as_str())),
            ("good", Some(self.good.as_str())),
            ("currency", self.currency.as_deref()),
        ]
    }

    fn validate(&self) -> Result<()> {
        finite(Self::KIND, "cost", self.cost)
    }

    fn normalize(&mut self) {
        blank_to_none(&mut self.currency);
    }

    fn render(&self, store: &CatalogStore) -> Result<String> {
        let place: GoodPlace = store.get(&self.good_place)?;
        let good: Good = store.get(&self.good)?;
        let mut rendered = format!("{}\n{}\ncost: {:?}", place.name, good.name, self.cost);
        if let Some(currency_id) = &self.currency {
            let currency: Currency = store.get(currency_id)?;
            rendered.push(' ');
            rendered.push_str(&currency.short_name);
        }
        Ok(rendered)
    }
}

/// Quantity of a good at a place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodCount {
    #[serde(default)]
    pub id: String,
    pub good_place: String,
    pub good: String,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub count: f64,
}

/// Null or an empty CSV cell count as zero, like an absent field
fn count_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

impl GoodCount {
    /// New stock row with a count of zero
    pub fn new(good_place: impl Into<String>, good: impl Into<String>) -> Self {
        GoodCount {
            id: String::new(),
            good_place: good_place.into(),
            good: good.into(),
            count: 0.0,
        }
    }

    pub fn with_count(mut self, count: f64) -> Self {
        self.count = count;
        self
    }
}

impl Entity for GoodCount {
    const KIND: EntityKind = EntityKind::GoodCount;
    const COLUMNS: &'static [&'static str] = &["good_place", "good", "count"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.good_place),
            text(&self.good),
            Value::Real(self.count),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(GoodCount {
            id: row.get("id")?,
            good_place: row.get("good_place")?,
            good: row.get("good")?,
            count: row.get("count")?,
        })
    }

    fn references(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("good_place", Some(self.good_place.as_str())),
            ("good", Some(self.good.as_str())),
        ]
    }

    fn validate(&self) -> Result<()> {
        finite(Self::KIND, "count", self.count)
    }

    fn render(&self, store: &CatalogStore) -> Result<String> {
        let place: GoodPlace = store.get(&self.good_place)?;
        let good: Good = store.get(&self.good)?;
        Ok(format!("{}\n{}\ncount: {:?}", place.name, good.name, self.count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_render() {
        let store = CatalogStore::open_in_memory().unwrap();
        let byn = Currency::new("Belarusian ruble", "BYN");
        assert_eq!(byn.render(&store).unwrap(), "BYN - Belarusian ruble");
    }

    #[test]
    fn test_count_defaults_to_zero() {
        assert_eq!(GoodCount::new("p1", "g1").count, 0.0);

        let json = serde_json::json!({ "good_place": "p1", "good": "g1" });
        let parsed: GoodCount = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.count, 0.0);
    }

    #[test]
    fn test_null_count_is_zero() {
        let json = serde_json::json!({ "good_place": "p1", "good": "g1", "count": null });
        let parsed: GoodCount = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.count, 0.0);
    }

    #[test]
    fn test_whole_numbers_render_with_fraction() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let unit = store.create(crate::entities::Unit::new("liter", "l")).unwrap();
        let category = store
            .create(crate::entities::GoodCategory::new("Dairy", None))
            .unwrap();
        let good_type = store
            .create(crate::entities::GoodType::new("Milk", category.id.clone()))
            .unwrap();
        let good = store
            .create(Good::new("Milk", "1", good_type.id.clone(), unit.id.clone()))
            .unwrap();
        let place_type = store.create(crate::entities::PlaceType::new("shop")).unwrap();
        let contact = store.create(crate::entities::Contact::new("Ivan", "Petrov")).unwrap();
        let address = store
            .create(crate::entities::Address::new("Belarus", "Minsk", "Minsk", "Lenina", 5))
            .unwrap();
        let place = store
            .create(GoodPlace::new("Shop", place_type.id, address.id, contact.id))
            .unwrap();

        let count = GoodCount::new(place.id.clone(), good.id.clone());
        assert_eq!(count.render(&store).unwrap(), "Shop\nMilk\ncount: 0.0");
        let cost = GoodCost::new(place.id, good.id, 2.0);
        assert_eq!(cost.render(&store).unwrap(), "Shop\nMilk\ncost: 2.0");
    }

    #[test]
    fn test_cost_currency_is_optional() {
        let json = serde_json::json!({ "good_place": "p1", "good": "g1", "cost": 2.49 });
        let cost: GoodCost = serde_json::from_value(json).unwrap();
        assert_eq!(cost.currency, None);
        assert_eq!(cost.references()[2], ("currency", None));
    }

    #[test]
    fn test_cost_must_be_finite() {
        assert!(GoodCost::new("p1", "g1", f64::INFINITY).validate().is_err());
        assert!(GoodCount::new("p1", "g1").with_count(f64::NAN).validate().is_err());
    }
}
