//! User management commands.
//!
//! ```bash
//! ez-cli user create -u admin -n Ada -s Lovelace -r Admin -p secret
//! ```
//!
//! This is the only way to create the first `Admin`.

use ezelectronics_server::services::{AuthError, AuthService, Registration};
use thiserror::Error;

use super::ConnectError;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// User already exists.
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Registration failed.
    #[error("Could not create user: {0}")]
    Auth(AuthError),
}

/// Create a new user with the given role.
pub async fn create(
    username: &str,
    name: &str,
    surname: &str,
    role: &str,
    password: &str,
) -> Result<(), UserError> {
    let pool = super::connect().await?;

    tracing::info!("Creating user: {} ({})", username, role);

    let user = AuthService::new(&pool)
        .register(Registration {
            username,
            name,
            surname,
            password,
            role,
        })
        .await
        .map_err(|e| match e {
            AuthError::UserAlreadyExists => UserError::UserExists(username.to_owned()),
            other => UserError::Auth(other),
        })?;

    tracing::info!(
        "User created successfully! Username: {}, Role: {}",
        user.username,
        user.role
    );
    Ok(())
}
