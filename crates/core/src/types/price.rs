//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are exact decimals with two places. They travel over JSON as
//! plain numbers and are stored as text so no precision is lost.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when building a price.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Zero or negative amount.
    #[error("price must be greater than zero")]
    NotPositive,
    /// NaN, infinite, or otherwise unrepresentable input.
    #[error("price is not a valid number")]
    Invalid,
}

/// A strictly positive selling price, rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Build a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotPositive`] if the amount rounds to zero or
    /// below.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        let rounded = amount.round_dp(2);
        if rounded <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }
        Ok(Self(rounded))
    }

    /// Build a price from a floating point number, as received over JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Invalid`] for NaN or infinite input and
    /// [`PriceError::NotPositive`] for zero or negative amounts.
    pub fn parse_f64(value: f64) -> Result<Self, PriceError> {
        if !value.is_finite() {
            return Err(PriceError::Invalid);
        }
        let amount = Decimal::try_from(value).map_err(|_| PriceError::Invalid)?;
        Self::new(amount)
    }

    /// Returns the amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid)?;
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}
