//! Database configuration module for the marketplace service.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated with `Schema::create_table_from_entity`, so the database schema
//! always matches the entity definitions without hand-written SQL.

use crate::entities::{Listing, RevenueInsight, RevenueMetric, Transaction, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::{info, instrument};

/// Default database location used when neither config.toml nor `DATABASE_URL` set one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/resale_market.sqlite?mode=rwc";

/// Creates the parent directory of a file-backed `SQLite` database if it is missing.
///
/// In-memory and non-`SQLite` URLs are left alone.
pub fn ensure_database_dir(database_url: &str) -> Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let file = rest.split('?').next().unwrap_or_default();
    if file.is_empty() || file.starts_with(":memory:") {
        return Ok(());
    }
    if let Some(parent) = Path::new(file).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Establishes a connection to the database at `database_url`.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    info!("Connected to database");
    Ok(db)
}

/// Creates all tables that do not exist yet.
///
/// Parents are created before children so foreign keys resolve: users, listings,
/// transactions, then the two analytics tables.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        schema.create_table_from_entity(User).if_not_exists().to_owned(),
        schema.create_table_from_entity(Listing).if_not_exists().to_owned(),
        schema.create_table_from_entity(Transaction).if_not_exists().to_owned(),
        schema.create_table_from_entity(RevenueInsight).if_not_exists().to_owned(),
        schema.create_table_from_entity(RevenueMetric).if_not_exists().to_owned(),
    ];

    for table in &tables {
        db.execute(builder.build(table)).await?;
    }

    info!("Database tables ensured");
    Ok(())
}
