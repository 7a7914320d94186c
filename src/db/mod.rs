//! Database module for SQLite persistence.
//!
//! SQLite plays the hosted plant database and stores care reminders.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS plants (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            -- Lowercased by the application; SQLite's LOWER() folds ASCII only
            name_key TEXT NOT NULL,
            image TEXT NOT NULL DEFAULT '',
            difficulty TEXT NOT NULL,
            light TEXT NOT NULL,
            water TEXT NOT NULL,
            temperature TEXT NOT NULL,
            grow_time TEXT,
            description TEXT,
            edible INTEGER,
            edible_parts TEXT,
            is_external INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS care_steps (
            plant_id INTEGER NOT NULL REFERENCES plants(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            PRIMARY KEY (plant_id, position)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // plant_id may point at any tier, so it carries no foreign key
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reminders (
            id TEXT PRIMARY KEY,
            plant_id INTEGER NOT NULL,
            plant_name TEXT NOT NULL,
            task TEXT NOT NULL,
            frequency TEXT NOT NULL,
            enabled INTEGER NOT NULL DEFAULT 1,
            next_due TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_plants_name_key ON plants(name_key);
        CREATE INDEX IF NOT EXISTS idx_reminders_plant_id ON reminders(plant_id);
        CREATE INDEX IF NOT EXISTS idx_reminders_next_due ON reminders(next_due);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
