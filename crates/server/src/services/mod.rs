//! Business logic services.
//!
//! Each service validates raw input, applies the authorization and stock
//! rules of its vertical and calls the matching repository.
//!
//! # Services
//!
//! - `auth` - Registration and password login
//! - `users` - Profile reads, updates and deletes
//! - `products` - Catalog and stock levels
//! - `carts` - The customer's unpaid cart, checkout and history
//! - `reviews` - Product reviews

pub mod auth;
pub mod carts;
pub mod error;
pub mod products;
pub mod reviews;
pub mod users;

use chrono::NaiveDate;

pub use auth::{AuthError, AuthService, Registration};
pub use carts::CartService;
pub use error::DomainError;
pub use products::{ListingQuery, NewProductInput, ProductService};
pub use reviews::ReviewService;
pub use users::{ProfileInput, UserService};

/// The current local date.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
