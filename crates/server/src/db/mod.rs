//! Database operations for the EZElectronics `SQLite` database.
//!
//! ## Tables
//!
//! - `users` - Registered users and their password hashes
//! - `products` - Catalog and stock levels
//! - `carts` - Paid and unpaid carts, lines stored as JSON
//! - `reviews` - One review per product and customer
//! - `tower_sessions` - Session storage (created by `SqliteStore::migrate`)
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/`, are embedded at compile
//! time and run at server start-up or via:
//! ```bash
//! cargo run -p ezelectronics-cli -- migrate
//! ```

pub mod carts;
pub mod products;
pub mod reviews;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use thiserror::Error;

pub use carts::CartRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;
pub use users::UserRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-constraint failure to [`RepositoryError::Conflict`].
pub(crate) fn map_unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Returns true for URLs that open a private in-memory database.
fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Create a `SQLite` connection pool.
///
/// File databases get WAL journaling and a small pool. In-memory databases
/// live only as long as their connection, so they get exactly one connection
/// that is never recycled.
///
/// Foreign keys are enabled on every connection.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(database_url: &SecretString) -> Result<SqlitePool, sqlx::Error> {
    let url = database_url.expose_secret();
    let options = SqliteConnectOptions::from_str(url)?
        .foreign_keys(true)
        .create_if_missing(true);

    if is_in_memory(url) {
        return SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await;
    }

    SqlitePoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(
            options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal),
        )
        .await
}

/// Run the embedded migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the applied history does
/// not match the embedded migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<(), MigrateError> {
    tracing::info!("Running database migrations");
    MIGRATOR.run(pool).await?;
    tracing::info!("Database migrations complete");
    Ok(())
}

/// Open a fresh in-memory database with the schema applied.
///
/// # Errors
///
/// Returns an error if the pool cannot be created or migrations fail.
pub async fn create_test_pool() -> Result<SqlitePool, Box<dyn std::error::Error + Send + Sync>> {
    let pool = create_pool(&SecretString::from("sqlite::memory:")).await?;
    migrate(&pool).await?;
    Ok(pool)
}
