//! Review repository for database operations.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use ezelectronics_core::{ProductModel, Username};

use super::{RepositoryError, map_unique_violation};
use crate::models::Review;

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    model: String,
    username: String,
    score: i64,
    date: NaiveDate,
    comment: String,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let model = ProductModel::parse(&row.model).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid model on review: {e}"))
        })?;
        let user = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username on review: {e}"))
        })?;
        let score = u8::try_from(row.score).map_err(|_| {
            RepositoryError::DataCorruption(format!("invalid score on review of {model}"))
        })?;

        Ok(Self {
            model,
            user,
            score,
            date: row.date,
            comment: row.comment,
        })
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already reviewed the
    /// product.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, review: &Review) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO reviews (model, username, score, date, comment) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(review.model.as_str())
        .bind(review.user.as_str())
        .bind(i64::from(review.score))
        .bind(review.date)
        .bind(&review.comment)
        .execute(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "review"))?;

        Ok(())
    }

    /// Reviews of a product, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_model(
        &self,
        model: &ProductModel,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows: Vec<ReviewRow> = sqlx::query_as(
            r"
            SELECT model, username, score, date, comment
            FROM reviews
            WHERE model = ?
            ORDER BY date, username
            ",
        )
        .bind(model.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Review::try_from).collect()
    }

    /// Delete one user's review of a product.
    ///
    /// Returns false if there was no such review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(
        &self,
        model: &ProductModel,
        username: &Username,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM reviews WHERE model = ? AND username = ?")
            .bind(model.as_str())
            .bind(username.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every review of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_for_model(&self, model: &ProductModel) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM reviews WHERE model = ?")
            .bind(model.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Delete every review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM reviews").execute(self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ezelectronics_core::{Category, Role};

    use super::*;
    use crate::db::products::ProductRepository;
    use crate::db::users::{NewUser, UserRepository};
    use crate::models::Product;

    fn username(s: &str) -> Username {
        Username::parse(s).unwrap()
    }

    fn model(s: &str) -> ProductModel {
        ProductModel::parse(s).unwrap()
    }

    fn review(user: &str, score: u8) -> Review {
        Review {
            model: model("iPhone13"),
            user: username(user),
            score,
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            comment: "Solid phone".to_string(),
        }
    }

    async fn setup() -> SqlitePool {
        let pool = crate::db::create_test_pool().await.unwrap();
        let users = UserRepository::new(&pool);
        for name in ["mario", "luigi"] {
            let username = username(name);
            users
                .create(&NewUser {
                    username: &username,
                    name: "Test",
                    surname: "User",
                    role: Role::Customer,
                    password_hash: "hash",
                    salt: "salt",
                })
                .await
                .unwrap();
        }
        ProductRepository::new(&pool)
            .create(&Product {
                model: model("iPhone13"),
                category: Category::Smartphone,
                quantity: 3,
                details: None,
                selling_price: "799.00".parse().unwrap(),
                arrival_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            })
            .await
            .unwrap();
        pool
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let pool = setup().await;
        let repo = ReviewRepository::new(&pool);

        repo.create(&review("mario", 5)).await.unwrap();
        repo.create(&review("luigi", 3)).await.unwrap();

        let reviews = repo.list_for_model(&model("iPhone13")).await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert!(reviews.contains(&review("mario", 5)));
    }

    #[tokio::test]
    async fn test_second_review_by_same_user_conflicts() {
        let pool = setup().await;
        let repo = ReviewRepository::new(&pool);

        repo.create(&review("mario", 5)).await.unwrap();
        let err = repo.create(&review("mario", 1)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_deletes() {
        let pool = setup().await;
        let repo = ReviewRepository::new(&pool);
        repo.create(&review("mario", 5)).await.unwrap();
        repo.create(&review("luigi", 3)).await.unwrap();

        assert!(repo.delete(&model("iPhone13"), &username("mario")).await.unwrap());
        assert!(!repo.delete(&model("iPhone13"), &username("mario")).await.unwrap());
        assert_eq!(repo.delete_for_model(&model("iPhone13")).await.unwrap(), 1);
        assert_eq!(repo.delete_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_product_delete_cascades_to_reviews() {
        let pool = setup().await;
        let repo = ReviewRepository::new(&pool);
        repo.create(&review("mario", 4)).await.unwrap();

        ProductRepository::new(&pool)
            .delete(&model("iPhone13"))
            .await
            .unwrap();
        assert!(repo.list_for_model(&model("iPhone13")).await.unwrap().is_empty());
    }
}
