//! Authentication service.
//!
//! Provides password registration and login.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use ezelectronics_core::{Role, Username};

use crate::db::RepositoryError;
use crate::db::users::{NewUser, UserRepository};
use crate::models::User;

/// Input for creating an account.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    pub username: &'a str,
    pub name: &'a str,
    pub surname: &'a str,
    pub password: &'a str,
    pub role: &'a str,
}

/// Authentication service.
///
/// Handles user registration and password login.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidInput` if a field is blank or the role is
    /// unknown.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    pub async fn register(&self, registration: Registration<'_>) -> Result<User, AuthError> {
        let username =
            Username::parse(registration.username).map_err(|e| AuthError::InvalidInput(e.to_string()))?;
        let name = non_empty("name", registration.name)?;
        let surname = non_empty("surname", registration.surname)?;
        let password = non_empty("password", registration.password)?;
        let role: Role = registration.role.parse().map_err(AuthError::InvalidInput)?;

        let (password_hash, salt) = hash_password(password)?;

        let user = self
            .users
            .create(&NewUser {
                username: &username,
                name,
                surname,
                role,
                password_hash: &password_hash,
                salt: &salt,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(username = %user.username, role = %user.role, "user registered");
        Ok(user)
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

fn non_empty<'s>(field: &str, value: &'s str) -> Result<&'s str, AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::InvalidInput(format!("{field} cannot be empty")));
    }
    Ok(value)
}

/// Hash a password using Argon2id with a fresh salt.
///
/// Returns the PHC hash string and the salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<(String, String), AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)?;

    Ok((hash, salt.as_str().to_owned()))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
