//! HTTP route handlers.
//!
//! # Route Structure
//!
//! Everything below is nested under `/ezelectronics`.
//!
//! ```text
//! # Users
//! POST   /users                     - Create account (public)
//! GET    /users                     - List users (admin)
//! GET    /users/roles/{role}        - List users by role (admin)
//! GET    /users/{username}          - Read profile (self or admin)
//! PATCH  /users/{username}          - Update profile (self or admin)
//! DELETE /users/{username}          - Delete account (self or admin)
//! DELETE /users                     - Delete every non-admin (admin)
//!
//! # Sessions
//! POST   /sessions                  - Login
//! GET    /sessions/current          - Logged-in user
//! DELETE /sessions/current          - Logout
//!
//! # Products
//! POST   /products                  - Register product (staff)
//! GET    /products                  - List products (staff)
//! GET    /products/available        - List products in stock (logged in)
//! PATCH  /products/{model}          - Restock (staff)
//! PATCH  /products/{model}/sell     - Record a sale (staff)
//! DELETE /products/{model}          - Delete product (staff)
//! DELETE /products                  - Delete every product (staff)
//!
//! # Carts
//! GET    /carts                     - Current cart (customer)
//! POST   /carts                     - Add one unit (customer)
//! PATCH  /carts                     - Checkout (customer)
//! GET    /carts/history             - Paid carts (customer)
//! DELETE /carts/products/{model}    - Remove one unit (customer)
//! DELETE /carts/current             - Empty current cart (customer)
//! GET    /carts/all                 - Every cart (staff)
//! DELETE /carts                     - Delete every cart (staff)
//!
//! # Reviews
//! POST   /reviews/{model}           - Review a product (customer)
//! GET    /reviews/{model}           - Reviews of a product (logged in)
//! DELETE /reviews/{model}           - Delete own review (customer)
//! DELETE /reviews/{model}/all       - Delete a product's reviews (staff)
//! DELETE /reviews                   - Delete every review (staff)
//! ```

pub mod carts;
pub mod products;
pub mod reviews;
pub mod sessions;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Path prefix shared by every API route.
pub const API_PREFIX: &str = "/ezelectronics";

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::create).get(users::list).delete(users::delete_all))
        .route("/roles/{role}", get(users::list_by_role))
        .route(
            "/{username}",
            get(users::get).patch(users::update).delete(users::delete),
        )
}

/// Create the session routes router.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(sessions::login))
        .route("/current", get(sessions::current).delete(sessions::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(products::register)
                .get(products::list)
                .delete(products::delete_all),
        )
        .route("/available", get(products::list_available))
        .route(
            "/{model}",
            patch(products::restock).delete(products::delete),
        )
        .route("/{model}/sell", patch(products::sell))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(carts::current)
                .post(carts::add)
                .patch(carts::checkout)
                .delete(carts::delete_all),
        )
        .route("/history", get(carts::history))
        .route("/all", get(carts::list_all))
        .route("/current", delete(carts::clear_current))
        .route("/products/{model}", delete(carts::remove_unit))
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", delete(reviews::delete_all))
        .route(
            "/{model}",
            post(reviews::add)
                .get(reviews::list)
                .delete(reviews::delete_own),
        )
        .route("/{model}/all", delete(reviews::delete_for_model))
}

/// Create all API routes, without the prefix.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/users", user_routes())
        .nest("/sessions", session_routes())
        .nest("/products", product_routes())
        .nest("/carts", cart_routes())
        .nest("/reviews", review_routes())
}
