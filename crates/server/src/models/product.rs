//! Product domain types.

use chrono::NaiveDate;
use serde::Serialize;

use ezelectronics_core::{Category, Price, ProductModel};

/// A catalog product with its current stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique model name.
    pub model: ProductModel,
    /// Product category.
    pub category: Category,
    /// Units in stock.
    pub quantity: u32,
    /// Free-form description.
    pub details: Option<String>,
    /// Price of one unit.
    pub selling_price: Price,
    /// Date the product first arrived.
    pub arrival_date: NaiveDate,
}

impl Product {
    /// Returns true if at least one unit is in stock.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.quantity > 0
    }
}
