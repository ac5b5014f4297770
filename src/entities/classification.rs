// 🏷️ Classification - subject areas, good categories and good types
//
// Three-level tree: SubjectArea → GoodCategory → GoodType.
// A category may stand alone; a type always belongs to a category.

use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{opt_text, required_text, text, Entity};
use crate::error::Result;
use crate::schema::EntityKind;
use crate::store::CatalogStore;

// ============================================================================
// SUBJECT AREA
// ============================================================================

/// Top-level grouping of good categories (e.g., "Food", "Household")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectArea {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

impl SubjectArea {
    pub fn new(name: impl Into<String>) -> Self {
        SubjectArea {
            id: String::new(),
            name: name.into(),
        }
    }
}

impl Entity for SubjectArea {
    const KIND: EntityKind = EntityKind::SubjectArea;
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
        Ok(SubjectArea {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }

    fn validate(&self) -> Result<()> {
        required_text(Self::KIND, "name", &self.name, Some(50))
    }

    fn render(&self, _store: &CatalogStore) -> Result<String> {
        Ok(self.name.clone())
    }
}

// ============================================================================
// GOOD CATEGORY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodCategory {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub subject_area: Option<String>,
    pub name: String,
}

impl GoodCategory {
    pub fn new(name: impl Into<String>, subject_area: Option<String>) -> Self {
        GoodCategory {
            id: String::new(),
            subject_area,
            name: name.into(),
        }
    }
}

impl Entity for GoodCategory {
    const KIND: EntityKind = EntityKind::GoodCategory;
    const COLUMNS: &'static [&'static str] = &["subject_area", "name"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn values(&self) -> Vec<Value> {
        vec![opt_text(&self.subject_area), text(&self.name)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(GoodCategory {
            id: row.get("id")?,
            subject_area: row.get("subject_area")?,
            name: row.get("name")?,
        })
    }

    fn references(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("subject_area", self.subject_area.as_deref())]
    }

    fn validate(&self) -> Result<()> {
        required_text(Self::KIND, "name", &self.name, Some(50))
    }

    fn normalize(&mut self) {
        super::blank_to_none(&mut self.subject_area);
    }

    fn render(&self, store: &CatalogStore) -> Result<String> {
        match &self.subject_area {
            Some(area_id) => {
                let area: SubjectArea = store.get(area_id)?;
                Ok(format!("{}; subject area: {}", self.name, area.name))
            }
            None => Ok(self.name.clone()),
        }
    }
}

// ============================================================================
// GOOD TYPE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodType {
    #[serde(default)]
    pub id: String,
    pub category: String,
    pub name: String,
}

impl GoodType {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        GoodType {
            id: String::new(),
            category: category.into(),
            name: name.into(),
        }
    }
}

impl Entity for GoodType {
    const KIND: EntityKind = EntityKind::GoodType;
    const COLUMNS: &'static [&'static str] = &["category", "name"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn values(&self) -> Vec<Value> {
        vec![text(&self.category), text(&self.name)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(GoodType {
            id: row.get("id")?,
            category: row.get("category")?,
            name: row.get("name")?,
        })
    }

    fn references(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("category", Some(self.category.as_str()))]
    }

    fn validate(&self) -> Result<()> {
        required_text(Self::KIND, "name", &self.name, Some(50))
    }

    fn render(&self, store: &CatalogStore) -> Result<String> {
        let category: GoodCategory = store.get(&self.category)?;
        Ok(format!("{}; category: {}", self.name, category.render(store)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_render_includes_subject_area() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let food = store.create(SubjectArea::new("Food")).unwrap();
        let dairy = store
            .create(GoodCategory::new("Dairy", Some(food.id.clone())))
            .unwrap();

        let rendered = dairy.render(&store).unwrap();
        assert!(rendered.contains("Dairy"));
        assert!(rendered.contains("Food"));
        assert_eq!(rendered, "Dairy; subject area: Food");
    }

    #[test]
    fn test_category_without_subject_area_renders_name() {
        let store = CatalogStore::open_in_memory().unwrap();
        let category = GoodCategory::new("Misc", None);
        assert_eq!(category.render(&store).unwrap(), "Misc");
    }

    #[test]
    fn test_type_render_is_recursive() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let food = store.create(SubjectArea::new("Food")).unwrap();
        let dairy = store
            .create(GoodCategory::new("Dairy", Some(food.id)))
            .unwrap();
        let milk = store.create(GoodType::new("Milk", dairy.id)).unwrap();

        assert_eq!(
            milk.render(&store).unwrap(),
            "Milk; category: Dairy; subject area: Food"
        );
    }

    #[test]
    fn test_category_normalize_blank_subject_area() {
        let mut category = GoodCategory::new("Bread", Some(String::new()));
        category.normalize();
        assert_eq!(category.subject_area, None);
    }

    #[test]
    fn test_subject_area_name_limit() {
        assert!(SubjectArea::new("x".repeat(50)).validate().is_ok());
        assert!(SubjectArea::new("x".repeat(51)).validate().is_err());
    }
}
