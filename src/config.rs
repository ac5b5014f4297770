// Catalog configuration
// Shared by the CLI and the HTTP server

use clap::Parser;
use std::path::PathBuf;

use crate::store::DEFAULT_ACTOR;

/// Default SQLite database file.
pub const DEFAULT_DATABASE_PATH: &str = "catalog.db";

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Address the HTTP server listens on.
    pub bind_address: String,

    /// Name recorded in the admin change log.
    pub actor: String,
}

impl CatalogConfig {
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            actor: DEFAULT_ACTOR.to_string(),
        }
    }

    pub fn with_bind_address(mut self, address: impl Into<String>) -> Self {
        self.bind_address = address.into();
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE_PATH)
    }
}

/// Command-line arguments for `catalog-server`.
#[derive(Parser, Debug)]
#[command(name = "catalog-server")]
#[command(version, about = "Goods catalog HTTP server", long_about = None)]
pub struct ServerArgs {
    /// Path to the SQLite database file.
    #[arg(short, long, default_value = DEFAULT_DATABASE_PATH)]
    pub database: PathBuf,

    /// Address to listen on.
    #[arg(short, long, default_value = DEFAULT_BIND_ADDRESS)]
    pub bind: String,

    /// Name recorded in the admin change log.
    #[arg(long, default_value = DEFAULT_ACTOR)]
    pub actor: String,
}

impl ServerArgs {
    pub fn into_config(self) -> CatalogConfig {
        CatalogConfig::new(self.database)
            .with_bind_address(self.bind)
            .with_actor(self.actor)
    }
}
