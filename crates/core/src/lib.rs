//! EZElectronics Core - Shared domain types.
//!
//! This crate provides the types used across all EZElectronics components:
//! - `server` - REST API for users, products, carts and reviews
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. Cart bookkeeping lives here so it can be tested without
//! a database.
//!
//! # Modules
//!
//! - [`types`] - Validated keys, roles, categories, prices and dates
//! - [`cart`] - Cart and cart line bookkeeping

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartError, ProductInCart};
pub use types::*;
