use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use goods_catalog::admin;
use goods_catalog::config::{CatalogConfig, DEFAULT_DATABASE_PATH};
use goods_catalog::{import_csv, CatalogStore, EntityKind, ListFilter, DEFAULT_ACTOR};

#[derive(Parser, Debug)]
#[command(name = "goods-catalog")]
#[command(version, about = "Goods catalog administration", long_about = None)]
struct Cli {
    /// Path to the SQLite database file.
    #[arg(short, long, global = true, default_value = DEFAULT_DATABASE_PATH)]
    database: PathBuf,

    /// Name recorded in the admin change log.
    #[arg(long, global = true, default_value = DEFAULT_ACTOR)]
    actor: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database schema
    Init,
    /// List records of one entity kind
    List {
        entity: EntityKind,
        /// Case-insensitive search over the kind's search fields
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one record
    Show { entity: EntityKind, id: String },
    /// Create a record from JSON attributes
    Create { entity: EntityKind, attributes: String },
    /// Merge JSON attributes over an existing record
    Update {
        entity: EntityKind,
        id: String,
        attributes: String,
    },
    /// Delete a record and its cascading dependents
    Delete { entity: EntityKind, id: String },
    /// Show the change log of one record
    History { entity: EntityKind, id: String },
    /// Import fixture rows from a headered CSV file
    Import { entity: EntityKind, csv: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "goods_catalog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = CatalogConfig::new(cli.database).with_actor(cli.actor);

    let mut store = CatalogStore::open(&config.database_path)
        .with_context(|| format!("Failed to open database {:?}", config.database_path))?
        .with_actor(config.actor.clone());

    match cli.command {
        Command::Init => {
            println!("✓ Database ready: {:?}", config.database_path);
            for kind in EntityKind::ALL {
                println!("  {:<14} {}", kind.slug(), store.count(kind)?);
            }
        }
        Command::List { entity, search } => {
            let filter = match search {
                Some(q) => ListFilter::search(q),
                None => ListFilter::new(),
            };
            let rows = admin::list(&store, entity, &filter)?;
            println!("📋 {} ({})", entity.verbose_name_plural(), rows.len());
            for row in rows {
                println!("  {}  {}", row.id, row.display.replace('\n', " | "));
            }
        }
        Command::Show { entity, id } => {
            let row = admin::get(&store, entity, &id)?;
            println!("{}", row.display);
            println!("{}", serde_json::to_string_pretty(&row.record)?);
        }
        Command::Create { entity, attributes } => {
            let row = admin::create(&mut store, entity, parse_json(&attributes)?)?;
            println!("✓ Created {} {}", entity, row.id);
        }
        Command::Update {
            entity,
            id,
            attributes,
        } => {
            let row = admin::update(&mut store, entity, &id, parse_json(&attributes)?)?;
            println!("✓ Updated {} {}", entity, row.id);
        }
        Command::Delete { entity, id } => {
            let report = admin::delete(&mut store, entity, &id)?;
            println!("🗑️  Deleted {} record(s)", report.len());
            for record in &report.deleted {
                println!("  {} {}", record.entity, record.id);
            }
        }
        Command::History { entity, id } => {
            for event in admin::history(&store, entity, &id)? {
                println!(
                    "  {}  {:<8} by {}",
                    event.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    event.action.as_str(),
                    event.actor
                );
            }
        }
        Command::Import { entity, csv } => {
            let imported = import_csv(&mut store, entity, &csv)
                .with_context(|| format!("Failed to import {:?}", csv))?;
            println!("✓ Imported {} {} record(s) from {:?}", imported, entity, csv);
        }
    }

    Ok(())
}

fn parse_json(attributes: &str) -> Result<Value> {
    serde_json::from_str(attributes).context("Attributes must be a JSON object")
}
