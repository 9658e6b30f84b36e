//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (front-end origin, credentials allowed)
//! 5. Session layer (tower-sessions with `SQLite` store)
//!
//! Role checks are extractors in [`auth`], not layers.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    OptionalAuth, RequireAdmin, RequireAuth, RequireCustomer, RequireStaff, clear_current_user,
    set_current_user,
};
pub use request_id::request_id_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
