// 📄 Public pages - landing page and greeting

use chrono::{DateTime, FixedOffset, Utc};

use crate::entities::{Entity, GoodCategory};
use crate::error::Result;
use crate::store::CatalogStore;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");
const CATEGORIES_SLOT: &str = "{{categories}}";

pub const GREETING: &str = "Hello, World!";

/// Minsk time, UTC+03:00 with no daylight saving
const GREETING_OFFSET_SECS: i32 = 3 * 3600;

/// Landing page listing every good category in insertion order
pub fn index_page(store: &CatalogStore) -> Result<String> {
    let categories = store.all::<GoodCategory>()?;

    let listing = if categories.is_empty() {
        "    <p class=\"empty\">No categories yet.</p>".to_string()
    } else {
        let mut items = Vec::with_capacity(categories.len());
        for category in &categories {
            items.push(format!("        <li>{}</li>", escape_html(&category.render(store)?)));
        }
        format!("    <ul>\n{}\n    </ul>", items.join("\n"))
    };

    Ok(INDEX_TEMPLATE.replace(CATEGORIES_SLOT, &listing))
}

/// Greeting line followed by the time in UTC+03:00
pub fn greeting(now: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(GREETING_OFFSET_SECS) {
        Some(offset) => format!(
            "{}\n{}",
            GREETING,
            now.with_timezone(&offset).format("%d %B %Y %H:%M:%S")
        ),
        None => GREETING.to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::SubjectArea;
    use chrono::TimeZone;

    #[test]
    fn test_index_lists_categories_in_order() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let food = store.create(SubjectArea::new("Food")).unwrap();
        store
            .create(GoodCategory::new("Dairy", Some(food.id.clone())))
            .unwrap();
        store.create(GoodCategory::new("Bakery", None)).unwrap();

        let page = index_page(&store).unwrap();
        let dairy = page.find("<li>Dairy; subject area: Food</li>").unwrap();
        let bakery = page.find("<li>Bakery</li>").unwrap();
        assert!(dairy < bakery);
        assert!(!page.contains(CATEGORIES_SLOT));
    }

    #[test]
    fn test_index_escapes_names() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store.create(GoodCategory::new("Tea & <Coffee>", None)).unwrap();

        let page = index_page(&store).unwrap();
        assert!(page.contains("Tea &amp; &lt;Coffee&gt;"));
        assert!(!page.contains("<Coffee>"));
    }

    #[test]
    fn test_index_empty_state() {
        let store = CatalogStore::open_in_memory().unwrap();
        let page = index_page(&store).unwrap();
        assert!(page.contains("No categories yet."));
        assert!(!page.contains("<li>"));
    }

    #[test]
    fn test_greeting_uses_minsk_time() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 22, 15, 9).unwrap();
        assert_eq!(greeting(now), "Hello, World!\n06 March 2024 01:15:09");
    }
}
