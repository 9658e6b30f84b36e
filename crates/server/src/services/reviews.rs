//! Product review rules.

use sqlx::SqlitePool;

use ezelectronics_core::{ProductModel, Username};

use super::error::{DomainError, require_non_empty};
use super::today;
use crate::db::RepositoryError;
use crate::db::products::ProductRepository;
use crate::db::reviews::ReviewRepository;
use crate::models::Review;

/// Lowest accepted score.
pub const MIN_SCORE: i64 = 1;
/// Highest accepted score.
pub const MAX_SCORE: i64 = 5;

/// Review service.
pub struct ReviewService<'a> {
    reviews: ReviewRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> ReviewService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            reviews: ReviewRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Review a product as `author`, dated today.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a score outside 1..=5 or a blank
    /// comment, `DomainError::ProductNotFound` for unknown models and
    /// `DomainError::ExistingReview` if the author already reviewed it.
    pub async fn add(
        &self,
        author: &Username,
        model: &str,
        score: i64,
        comment: &str,
    ) -> Result<Review, DomainError> {
        let model = ProductModel::parse(model)?;
        let score = validate_score(score)?;
        let comment = require_non_empty("comment", comment)?;

        self.require_product(&model).await?;

        let review = Review {
            model,
            user: author.clone(),
            score,
            date: today(),
            comment: comment.to_owned(),
        };

        self.reviews.create(&review).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => DomainError::ExistingReview,
            other => DomainError::Repository(other),
        })?;

        tracing::info!(model = %review.model, user = %review.user, score, "review added");
        Ok(review)
    }

    /// Reviews of a product.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProductNotFound` for unknown models.
    pub async fn list(&self, model: &str) -> Result<Vec<Review>, DomainError> {
        let model = ProductModel::parse(model)?;
        self.require_product(&model).await?;
        Ok(self.reviews.list_for_model(&model).await?)
    }

    /// Delete the author's own review of a product.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProductNotFound` for unknown models and
    /// `DomainError::ReviewNotFound` if the author has no review of it.
    pub async fn delete_own(&self, author: &Username, model: &str) -> Result<(), DomainError> {
        let model = ProductModel::parse(model)?;
        self.require_product(&model).await?;

        if !self.reviews.delete(&model, author).await? {
            return Err(DomainError::ReviewNotFound);
        }

        tracing::info!(model = %model, user = %author, "review deleted");
        Ok(())
    }

    /// Delete every review of a product.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProductNotFound` for unknown models.
    pub async fn delete_for_model(&self, model: &str) -> Result<u64, DomainError> {
        let model = ProductModel::parse(model)?;
        self.require_product(&model).await?;

        let deleted = self.reviews.delete_for_model(&model).await?;
        tracing::info!(model = %model, deleted, "product reviews deleted");
        Ok(deleted)
    }

    /// Delete every review.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Repository` if the delete fails.
    pub async fn delete_all(&self) -> Result<u64, DomainError> {
        let deleted = self.reviews.delete_all().await?;
        tracing::info!(deleted, "all reviews deleted");
        Ok(deleted)
    }

    async fn require_product(&self, model: &ProductModel) -> Result<(), DomainError> {
        match self.products.get(model).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::ProductNotFound),
        }
    }
}

fn validate_score(score: i64) -> Result<u8, DomainError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(DomainError::Validation(format!(
            "score must be between {MIN_SCORE} and {MAX_SCORE}"
        )));
    }
    u8::try_from(score).map_err(|_| DomainError::Validation("score out of range".to_string()))
}
