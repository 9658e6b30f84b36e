//! Core types for EZElectronics.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod date;
pub mod key;
pub mod price;
pub mod role;

pub use date::{DATE_FORMAT, DateError, ensure_not_future, parse_iso_date};
pub use key::{KeyError, ProductModel, Username};
pub use price::{Price, PriceError};
pub use role::{Category, Role};
