//! Database migration command.
//!
//! ```bash
//! ez-cli migrate
//! ```
//!
//! Applies the migrations embedded in the server crate
//! (`crates/server/migrations/`). The server also runs them at startup.

use ezelectronics_server::db;

use super::ConnectError;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run every pending migration.
pub async fn run() -> Result<(), MigrationError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    db::migrate(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
