// 📇 Contacts and their phone numbers, emails and links

use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{blank_to_none, opt_text, optional_text, required_text, text, Entity};
use crate::error::Result;
use crate::schema::EntityKind;
use crate::store::CatalogStore;

/// Contact data of employees, clients and so on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub passport: Option<String>,
}

impl Contact {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Contact {
            id: String::new(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            passport: None,
        }
    }

    pub fn with_passport(mut self, passport: impl Into<String>) -> Self {
        self.passport = Some(passport.into());
        self
    }
}

impl Entity for Contact {
    const KIND: EntityKind = EntityKind::Contact;
    const COLUMNS: &'static [&'static str] = &["first_name", "last_name", "passport"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.first_name),
            text(&self.last_name),
            opt_text(&self.passport),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Contact {
            id: row.get("id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            passport: row.get("passport")?,
        })
    }

    fn validate(&self) -> Result<()> {
        required_text(Self::KIND, "first_name", &self.first_name, Some(30))?;
        required_text(Self::KIND, "last_name", &self.last_name, Some(30))?;
        optional_text(Self::KIND, "passport", &self.passport, Some(20))
    }

    fn normalize(&mut self) {
        blank_to_none(&mut self.passport);
    }

    fn render(&self, _store: &CatalogStore) -> Result<String> {
        let mut rendered = format!("{} {}", self.first_name, self.last_name);
        if let Some(passport) = self.passport.as_deref().filter(|p| !p.is_empty()) {
            rendered.push_str(", passport ");
            rendered.push_str(&passport.to_uppercase());
        }
        Ok(rendered)
    }
}

/// Phone number attached to a contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumber {
    #[serde(default)]
    pub id: String,
    pub contact: String,
    pub phone_number: String,
}

impl PhoneNumber {
    pub fn new(contact: impl Into<String>, phone_number: impl Into<String>) -> Self {
        PhoneNumber {
            id: String::new(),
            contact: contact.into(),
            phone_number: phone_number.into(),
        }
    }
}

impl Entity for PhoneNumber {
    const KIND: EntityKind = EntityKind::PhoneNumber;
    const COLUMNS: &'static [&'static str] = &["contact", "phone_number"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn values(&self) -> Vec<Value> {
        vec![text(&self.contact), text(&self.phone_number)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PhoneNumber {
            id: row.get("id")?,
            contact: row.get("contact")?,
            phone_number: row.get("phone_number")?,
        })
    }

    fn references(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("contact", Some(self.contact.as_str()))]
    }

    fn validate(&self) -> Result<()> {
        required_text(Self::KIND, "phone_number", &self.phone_number, Some(30))
    }

    fn render(&self, _store: &CatalogStore) -> Result<String> {
        Ok(self.phone_number.clone())
    }
}

/// Email address attached to a contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    #[serde(default)]
    pub id: String,
    pub contact: String,
    pub email: String,
}

impl Email {
    pub fn new(contact: impl Into<String>, email: impl Into<String>) -> Self {
        Email {
            id: String::new(),
            contact: contact.into(),
            email: email.into(),
        }
    }
}

impl Entity for Email {
    const KIND: EntityKind = EntityKind::Email;
    const COLUMNS: &'static [&'static str] = &["contact", "email"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn values(&self) -> Vec<Value> {
        vec![text(&self.contact), text(&self.email)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Email {
            id: row.get("id")?,
            contact: row.get("contact")?,
            email: row.get("email")?,
        })
    }

    fn references(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("contact", Some(self.contact.as_str()))]
    }

    fn validate(&self) -> Result<()> {
        required_text(Self::KIND, "email", &self.email, Some(100))
    }

    fn render(&self, _store: &CatalogStore) -> Result<String> {
        Ok(self.email.clone())
    }
}

/// Link (site, social profile) attached to a contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Url {
    #[serde(default)]
    pub id: String,
    pub contact: String,
    pub url: String,
}

impl Url {
    pub fn new(contact: impl Into<String>, url: impl Into<String>) -> Self {
        Url {
            id: String::new(),
            contact: contact.into(),
            url: url.into(),
        }
    }
}

impl Entity for Url {
    const KIND: EntityKind = EntityKind::Url;
    const COLUMNS: &'static [&'static str] = &["contact", "url"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn values(&self) -> Vec<Value> {
        vec![text(&self.contact), text(&self.url)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Url {
            id: row.get("id")?,
            contact: row.get("contact")?,
            url: row.get("url")?,
        })
    }

    fn references(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("contact", Some(self.contact.as_str()))]
    }

    fn validate(&self) -> Result<()> {
        required_text(Self::KIND, "url", &self.url, None)
    }

    fn render(&self, _store: &CatalogStore) -> Result<String> {
        Ok(self.url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_render_without_passport() {
        let store = CatalogStore::open_in_memory().unwrap();
        let contact = Contact::new("Ivan", "Petrov");
        assert_eq!(contact.render(&store).unwrap(), "Ivan Petrov");
    }

    #[test]
    fn test_contact_render_uppercases_passport() {
        let store = CatalogStore::open_in_memory().unwrap();
        let contact = Contact::new("Ivan", "Petrov").with_passport("mp1234567");
        assert_eq!(
            contact.render(&store).unwrap(),
            "Ivan Petrov, passport MP1234567"
        );
    }

    #[test]
    fn test_contact_passport_limit() {
        let contact = Contact::new("Ivan", "Petrov").with_passport("x".repeat(21));
        let err = contact.validate().unwrap_err();
        assert!(err.to_string().starts_with("contact.passport"));
    }

    #[test]
    fn test_channels_render_their_value() {
        let store = CatalogStore::open_in_memory().unwrap();
        assert_eq!(
            PhoneNumber::new("c1", "+375 29 123-45-67").render(&store).unwrap(),
            "+375 29 123-45-67"
        );
        assert_eq!(
            Email::new("c1", "shop@example.by").render(&store).unwrap(),
            "shop@example.by"
        );
        assert_eq!(
            Url::new("c1", "https://example.by").render(&store).unwrap(),
            "https://example.by"
        );
    }
}
