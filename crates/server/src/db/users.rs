//! User repository for database operations.
//!
//! Queries are built at runtime with `sqlx::query_as` and mapped through
//! row types, so no database is needed at compile time.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use ezelectronics_core::{Role, Username};

use super::{RepositoryError, map_unique_violation};
use crate::models::User;

const USER_COLUMNS: &str = "username, name, surname, role, address, birthdate";

/// A user as stored, before validation.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    username: String,
    name: String,
    surname: String,
    role: String,
    address: Option<String>,
    birthdate: Option<NaiveDate>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| RepositoryError::DataCorruption(format!("{e} for {username}")))?;

        Ok(Self {
            username,
            name: row.name,
            surname: row.surname,
            role,
            address: row.address,
            birthdate: row.birthdate,
        })
    }
}

/// Data needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a Username,
    pub name: &'a str,
    pub surname: &'a str,
    pub role: Role,
    /// Argon2 PHC string.
    pub password_hash: &'a str,
    /// Salt used for `password_hash`.
    pub salt: &'a str,
}

/// Profile fields a user can change.
#[derive(Debug, Clone)]
pub struct ProfileUpdate<'a> {
    pub name: &'a str,
    pub surname: &'a str,
    pub address: &'a str,
    pub birthdate: NaiveDate,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, user: &NewUser<'_>) -> Result<User, RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO users (username, name, surname, role, password, salt)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(user.username.as_str())
        .bind(user.name)
        .bind(user.surname)
        .bind(user.role.as_str())
        .bind(user.password_hash)
        .bind(user.salt)
        .execute(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "username"))?;

        tracing::debug!(username = %user.username, "user row inserted");

        Ok(User {
            username: user.username.clone(),
            name: user.name.to_owned(),
            surname: user.surname.to_owned(),
            role: user.role,
            address: None,
            birthdate: None,
        })
    }

    /// Get a user by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get(&self, username: &Username) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
                .bind(username.as_str())
                .fetch_optional(self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user together with their stored password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_with_password(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            #[sqlx(flatten)]
            user: UserRow,
            password: String,
        }

        let row: Option<Row> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS}, password FROM users WHERE username = ?"
        ))
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((User::try_from(r.user)?, r.password)))
            .transpose()
    }

    /// List every user, ordered by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY username"))
                .fetch_all(self.pool)
                .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// List users with the given role, ordered by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_role(&self, role: Role) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = ? ORDER BY username"
        ))
        .bind(role.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Update the profile fields of a user and return the updated user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        username: &Username,
        update: &ProfileUpdate<'_>,
    ) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r"
            UPDATE users
            SET name = ?, surname = ?, address = ?, birthdate = ?
            WHERE username = ?
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(update.name)
        .bind(update.surname)
        .bind(update.address)
        .bind(update.birthdate)
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)
            .and_then(User::try_from)
    }

    /// Delete a user. Their carts and reviews go with them.
    ///
    /// Returns true if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, username: &Username) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE username = ?")
            .bind(username.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every user that is not an admin.
    ///
    /// Returns the number of deleted users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_non_admins(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE role <> ?")
            .bind(Role::Admin.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn username(s: &str) -> Username {
        Username::parse(s).unwrap()
    }

    async fn insert(repo: &UserRepository<'_>, name: &str, role: Role) -> User {
        let username = username(name);
        repo.create(&NewUser {
            username: &username,
            name: "Test",
            surname: "User",
            role,
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA",
            salt: "c2FsdA",
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let pool = create_test_pool().await.unwrap();
        let repo = UserRepository::new(&pool);

        let created = insert(&repo, "mario", Role::Customer).await;
        let fetched = repo.get(&username("mario")).await.unwrap().unwrap();

        assert_eq!(created, fetched);
        assert!(fetched.address.is_none());
        assert!(repo.get(&username("luigi")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_conflicts() {
        let pool = create_test_pool().await.unwrap();
        let repo = UserRepository::new(&pool);

        insert(&repo, "mario", Role::Customer).await;
        let username = username("mario");
        let err = repo
            .create(&NewUser {
                username: &username,
                name: "Other",
                surname: "Person",
                role: Role::Manager,
                password_hash: "x",
                salt: "y",
            })
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_get_with_password() {
        let pool = create_test_pool().await.unwrap();
        let repo = UserRepository::new(&pool);
        insert(&repo, "mario", Role::Customer).await;

        let (user, hash) = repo
            .get_with_password(&username("mario"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.username.as_str(), "mario");
        assert!(hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_list_by_role() {
        let pool = create_test_pool().await.unwrap();
        let repo = UserRepository::new(&pool);
        insert(&repo, "c1", Role::Customer).await;
        insert(&repo, "c2", Role::Customer).await;
        insert(&repo, "m1", Role::Manager).await;

        assert_eq!(repo.list().await.unwrap().len(), 3);

        let customers = repo.list_by_role(Role::Customer).await.unwrap();
        let names: Vec<&str> = customers.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["c1", "c2"]);
    }

    #[tokio::test]
    async fn test_update_profile() {
        let pool = create_test_pool().await.unwrap();
        let repo = UserRepository::new(&pool);
        insert(&repo, "mario", Role::Customer).await;

        let birthdate = NaiveDate::from_ymd_opt(1990, 4, 12).unwrap();
        let updated = repo
            .update_profile(
                &username("mario"),
                &ProfileUpdate {
                    name: "Mario",
                    surname: "Rossi",
                    address: "Via Roma 1",
                    birthdate,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Mario");
        assert_eq!(updated.address.as_deref(), Some("Via Roma 1"));
        assert_eq!(updated.birthdate, Some(birthdate));

        let missing = repo
            .update_profile(
                &username("nobody"),
                &ProfileUpdate {
                    name: "A",
                    surname: "B",
                    address: "C",
                    birthdate,
                },
            )
            .await;
        assert!(matches!(missing, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_non_admins_keeps_admins() {
        let pool = create_test_pool().await.unwrap();
        let repo = UserRepository::new(&pool);
        insert(&repo, "admin", Role::Admin).await;
        insert(&repo, "manager", Role::Manager).await;
        insert(&repo, "customer", Role::Customer).await;

        assert_eq!(repo.delete_non_admins().await.unwrap(), 2);
        let remaining = repo.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].is_admin());
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = create_test_pool().await.unwrap();
        let repo = UserRepository::new(&pool);
        insert(&repo, "mario", Role::Customer).await;

        assert!(repo.delete(&username("mario")).await.unwrap());
        assert!(!repo.delete(&username("mario")).await.unwrap());
    }
}
