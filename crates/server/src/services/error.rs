//! Errors raised by the domain services.

use thiserror::Error;

use ezelectronics_core::{CartError, DateError, KeyError, PriceError};

use crate::db::RepositoryError;

/// Errors that can occur while applying a business rule.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed or missing input.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The caller may not act on the target.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("user not found")]
    UserNotFound,

    #[error("product not found")]
    ProductNotFound,

    #[error("product already exists")]
    ProductAlreadyExists,

    /// The product has no units left.
    #[error("product stock is empty")]
    EmptyProductStock,

    /// The product has fewer units than requested.
    #[error("product stock is lower than the requested quantity")]
    LowProductStock,

    /// A date is after today or before the product's arrival.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// The customer has no unpaid cart, or it has no lines.
    #[error("cart not found")]
    CartNotFound,

    #[error("product not in cart")]
    ProductNotInCart,

    /// Checkout of a cart without lines.
    #[error("cart is empty")]
    EmptyCart,

    #[error("review not found")]
    ReviewNotFound,

    /// The customer already reviewed this product.
    #[error("review already exists")]
    ExistingReview,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<KeyError> for DomainError {
    fn from(err: KeyError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<PriceError> for DomainError {
    fn from(err: PriceError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<DateError> for DomainError {
    fn from(err: DateError) -> Self {
        match err {
            DateError::Malformed(_) => Self::Validation(err.to_string()),
            DateError::InFuture(_) => Self::InvalidDate(err.to_string()),
        }
    }
}

impl From<CartError> for DomainError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ProductNotInCart(_) => Self::ProductNotInCart,
        }
    }
}

/// Reject blank strings.
pub(crate) fn require_non_empty<'a>(field: &str, value: &'a str) -> Result<&'a str, DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} cannot be empty")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_date_errors_split_by_kind() {
        let malformed = DomainError::from(DateError::Malformed("x".into()));
        assert!(matches!(malformed, DomainError::Validation(_)));

        let future = NaiveDate::from_ymd_opt(2999, 1, 1).unwrap_or_default();
        let in_future = DomainError::from(DateError::InFuture(future));
        assert!(matches!(in_future, DomainError::InvalidDate(_)));
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("name", "Mario").is_ok());
        assert!(matches!(
            require_non_empty("name", "  "),
            Err(DomainError::Validation(msg)) if msg == "name cannot be empty"
        ));
    }
}
