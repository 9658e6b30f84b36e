//! Domain models returned by the API.
//!
//! These are validated domain objects; database row types live next to the
//! repositories that read them.

pub mod product;
pub mod review;
pub mod session;
pub mod user;

pub use product::Product;
pub use review::Review;
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
