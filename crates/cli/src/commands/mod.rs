//! Subcommand implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use ezelectronics_server::config::{ConfigError, ServerConfig};
use ezelectronics_server::db;
use sqlx::SqlitePool;

/// Errors opening the database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Open the database the server is configured to use.
pub async fn connect() -> Result<SqlitePool, ConnectError> {
    let config = ServerConfig::from_env()?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&config.database_url).await?)
}
