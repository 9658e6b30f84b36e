//! Cart bookkeeping.
//!
//! A cart stores a denormalized list of lines, each a frozen copy of the
//! product's category and price at the time it was added. The running total
//! always equals the sum of `price * quantity` over the lines.
//!
//! Everything here is pure: the server loads a cart, applies one of these
//! operations and writes it back.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Category, Price, ProductModel, Username};

/// Errors produced by cart operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The cart has no line for the requested model.
    #[error("product {0} is not in the cart")]
    ProductNotInCart(ProductModel),
}

/// A line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInCart {
    /// Product model.
    pub model: ProductModel,
    /// Units of the product in the cart. Always at least 1.
    pub quantity: u32,
    /// Product category when the line was created.
    pub category: Category,
    /// Unit price when the line was created.
    pub price: Price,
}

impl ProductInCart {
    /// `price * quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.amount() * Decimal::from(self.quantity)
    }
}

/// A customer's cart, paid or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Owner of the cart.
    pub customer: Username,
    /// Whether the cart has been checked out.
    pub paid: bool,
    /// Checkout date, set once paid.
    pub payment_date: Option<NaiveDate>,
    /// Sum of the line totals.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Lines, in the order they were first added.
    pub products: Vec<ProductInCart>,
}

impl Cart {
    /// A new unpaid cart with no lines.
    #[must_use]
    pub const fn empty(customer: Username) -> Self {
        Self {
            customer,
            paid: false,
            payment_date: None,
            total: Decimal::ZERO,
            products: Vec::new(),
        }
    }

    /// Returns true when the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Add one unit of a product.
    ///
    /// An existing line keeps the category and price it was created with.
    pub fn add_unit(&mut self, model: ProductModel, category: Category, price: Price) {
        if let Some(line) = self.products.iter_mut().find(|p| p.model == model) {
            line.quantity += 1;
            self.total += line.price.amount();
        } else {
            self.total += price.amount();
            self.products.push(ProductInCart {
                model,
                quantity: 1,
                category,
                price,
            });
        }
        self.total = self.total.round_dp(2);
    }

    /// Remove one unit of a product, dropping the line when it reaches zero.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ProductNotInCart`] if there is no line for
    /// `model`.
    pub fn remove_unit(&mut self, model: &ProductModel) -> Result<(), CartError> {
        let index = self
            .products
            .iter()
            .position(|p| &p.model == model)
            .ok_or_else(|| CartError::ProductNotInCart(model.clone()))?;

        let mut drop_line = false;
        if let Some(line) = self.products.get_mut(index) {
            line.quantity = line.quantity.saturating_sub(1);
            self.total -= line.price.amount();
            drop_line = line.quantity == 0;
        }
        if drop_line {
            self.products.remove(index);
        }

        if self.products.is_empty() {
            self.total = Decimal::ZERO;
        } else {
            self.total = self.total.round_dp(2);
        }
        Ok(())
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.products.clear();
        self.total = Decimal::ZERO;
    }

    /// Drop the line for `model` whatever its quantity.
    ///
    /// Returns true if a line was removed.
    pub fn strip_model(&mut self, model: &ProductModel) -> bool {
        let before = self.products.len();
        self.products.retain(|p| &p.model != model);
        if self.products.len() == before {
            return false;
        }
        self.recompute_total();
        true
    }

    /// Set the total to the sum of the line totals.
    pub fn recompute_total(&mut self) {
        self.total = self
            .products
            .iter()
            .map(ProductInCart::line_total)
            .sum::<Decimal>()
            .round_dp(2);
    }

    /// Mark the cart as paid on `date`.
    pub fn mark_paid(&mut self, date: NaiveDate) {
        self.paid = true;
        self.payment_date = Some(date);
    }
}
