//! # Demo Catalog Loader
//!
//! Loads the fixed-id demo catalog into a SQLite database.
//!
//! ## Usage
//! ```bash
//! # Default database path
//! cargo run -p bistro-db --bin seed
//!
//! # Specify database path
//! cargo run -p bistro-db --bin seed -- --db ./data/bistro.db
//! ```
//!
//! Safe to run repeatedly: every row is an upsert keyed by its fixed id.

use std::env;

use bistro_db::fixtures;
use bistro_db::migrations::migration_status;
use bistro_db::{Database, DbConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./bistro_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bistro demo catalog loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./bistro_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {other}");
            }
        }
        i += 1;
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let (total, applied) = migration_status(db.pool()).await?;
    info!(path = %db_path, total, applied, "Connected");

    let before = db.menu().item_count().await?;
    fixtures::seed_sqlite(&db).await?;
    let after = db.menu().item_count().await?;

    info!(items_before = before, items_after = after, "Seed complete");
    println!("store_id: {}", fixtures::STORE_ID);
    println!("menu_id:  {}", fixtures::MENU_ID);
    println!("items:    {after}");

    db.close().await;
    Ok(())
}
