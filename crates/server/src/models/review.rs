//! Review domain types.

use chrono::NaiveDate;
use serde::Serialize;

use ezelectronics_core::{ProductModel, Username};

/// A customer's review of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    /// Reviewed product.
    pub model: ProductModel,
    /// Author of the review.
    pub user: Username,
    /// Score from 1 to 5.
    pub score: u8,
    /// Date the review was written.
    pub date: NaiveDate,
    /// Review text.
    pub comment: String,
}
