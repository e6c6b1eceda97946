//! # Seed Data
//!
//! Prepares a database file for a first run: default administrator plus
//! the sample catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p medicare-db --bin seed
//! cargo run -p medicare-db --bin seed -- --db ./data/medicare.db
//! ```

use std::env;

use anyhow::Context;
use medicare_db::seed::{ensure_default_admin, insert_sample_medicines};
use medicare_db::{Database, DbConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./medicare.db");

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
                println!("Medicare POS seed");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./medicare.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
        i += 1;
    }

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {db_path}"))?;

    if ensure_default_admin(&db).await?.is_some() {
        info!("Log in as admin/admin and change the password");
    }
    let inserted = insert_sample_medicines(&db).await?;

    info!(path = %db_path, medicines = inserted, "Seed complete");
    db.close().await;
    Ok(())
}
