//! User management rules.
//!
//! Admins may act on any non-admin account and on themselves. Everyone else
//! may only act on their own account.

use sqlx::SqlitePool;

use ezelectronics_core::{Role, Username, ensure_not_future, parse_iso_date};

use super::error::{DomainError, require_non_empty};
use super::today;
use crate::db::users::{ProfileUpdate, UserRepository};
use crate::db::RepositoryError;
use crate::models::User;

/// Raw profile update as received from the client.
#[derive(Debug, Clone, Copy)]
pub struct ProfileInput<'a> {
    pub name: &'a str,
    pub surname: &'a str,
    pub address: &'a str,
    pub birthdate: &'a str,
}

/// User management service.
pub struct UserService<'a> {
    users: UserRepository<'a>,
}

impl<'a> UserService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Every user.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Repository` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.users.list().await?)
    }

    /// Users with the given role, parsed from its name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the role is unknown.
    pub async fn list_by_role(&self, role: &str) -> Result<Vec<User>, DomainError> {
        let role: Role = role.parse().map_err(DomainError::Validation)?;
        Ok(self.users.list_by_role(role).await?)
    }

    /// Read a user's profile.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthorized` if a non-admin asks for someone
    /// else and `DomainError::UserNotFound` for unknown users.
    pub async fn get(&self, actor: &User, username: &str) -> Result<User, DomainError> {
        let username = Username::parse(username)?;
        ensure_self_or_admin(actor, &username)?;

        self.users
            .get(&username)
            .await?
            .ok_or(DomainError::UserNotFound)
    }

    /// Delete a user together with their carts and reviews.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthorized` if a non-admin targets someone else
    /// or an admin targets another admin, and `DomainError::UserNotFound` for
    /// unknown users.
    pub async fn delete(&self, actor: &User, username: &str) -> Result<(), DomainError> {
        let username = Username::parse(username)?;
        let target = self.authorized_target(actor, &username).await?;

        if !self.users.delete(&target.username).await? {
            return Err(DomainError::UserNotFound);
        }

        tracing::info!(actor = %actor.username, username = %target.username, "user deleted");
        Ok(())
    }

    /// Delete every non-admin user.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Repository` if the delete fails.
    pub async fn delete_all_non_admins(&self) -> Result<u64, DomainError> {
        let deleted = self.users.delete_non_admins().await?;
        tracing::info!(deleted, "non-admin users deleted");
        Ok(deleted)
    }

    /// Update a user's profile and return the updated user.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for blank fields or a malformed
    /// birthdate, `DomainError::InvalidDate` for a birthdate after today, and
    /// the same authorization errors as [`Self::delete`].
    pub async fn update(
        &self,
        actor: &User,
        username: &str,
        input: ProfileInput<'_>,
    ) -> Result<User, DomainError> {
        let username = Username::parse(username)?;
        let name = require_non_empty("name", input.name)?;
        let surname = require_non_empty("surname", input.surname)?;
        let address = require_non_empty("address", input.address)?;
        let birthdate = parse_iso_date(input.birthdate)?;
        let birthdate = ensure_not_future(birthdate, today())?;

        let target = self.authorized_target(actor, &username).await?;

        let updated = self
            .users
            .update_profile(
                &target.username,
                &ProfileUpdate {
                    name,
                    surname,
                    address,
                    birthdate,
                },
            )
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => DomainError::UserNotFound,
                other => DomainError::Repository(other),
            })?;

        tracing::info!(username = %updated.username, "user profile updated");
        Ok(updated)
    }

    /// Load the target of a write, applying the ownership and admin rules.
    async fn authorized_target(
        &self,
        actor: &User,
        username: &Username,
    ) -> Result<User, DomainError> {
        ensure_self_or_admin(actor, username)?;

        let target = self
            .users
            .get(username)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        if target.is_admin() && target.username != actor.username {
            return Err(DomainError::Unauthorized(
                "admins cannot modify other admins".to_string(),
            ));
        }
        Ok(target)
    }
}

fn ensure_self_or_admin(actor: &User, username: &Username) -> Result<(), DomainError> {
    if actor.is_admin() || &actor.username == username {
        Ok(())
    } else {
        Err(DomainError::Unauthorized(
            "users can only access their own account".to_string(),
        ))
    }
}
