//! Integration test harness for EZElectronics.
//!
//! Every [`TestContext`] owns a fresh in-memory database and the real
//! router built over it. Requests go through `tower::ServiceExt::oneshot`,
//! so no port is bound. A [`TestClient`] keeps the session cookie between
//! requests like a browser would.
//!
//! ```rust,ignore
//! let ctx = TestContext::new().await;
//! let admin = ctx.logged_in("admin", "Admin").await;
//! let res = admin.get("/users").await;
//! assert_eq!(res.status, StatusCode::OK);
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tower::ServiceExt;

use ezelectronics_server::config::ServerConfig;
use ezelectronics_server::db::create_test_pool;
use ezelectronics_server::routes::API_PREFIX;
use ezelectronics_server::state::AppState;
use ezelectronics_server::{build_app, middleware::SESSION_COOKIE_NAME};

/// Password used for every account created through the helpers.
pub const PASSWORD: &str = "p4ssw0rd";

/// A router over a private in-memory database.
pub struct TestContext {
    pub app: Router,
    pub pool: SqlitePool,
}

/// Status and decoded body of a response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// JSON body, or a JSON string for non-JSON bodies, or `Null` when empty.
    pub body: Value,
}

/// A client with its own cookie.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestContext {
    /// Build the app over a fresh migrated in-memory database.
    pub async fn new() -> Self {
        let pool = create_test_pool().await.unwrap();
        let state = AppState::new(ServerConfig::for_testing(), pool.clone());
        let app = build_app(state).await.unwrap();
        Self { app, pool }
    }

    /// A client without a session.
    #[must_use]
    pub fn client(&self) -> TestClient {
        TestClient {
            app: self.app.clone(),
            cookie: None,
        }
    }

    /// Create an account through the API, asserting success.
    pub async fn create_user(&self, username: &str, role: &str) {
        let res = self
            .client()
            .post(
                "/users",
                json!({
                    "username": username,
                    "name": "Test",
                    "surname": "User",
                    "password": PASSWORD,
                    "role": role,
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "create {username}: {:?}", res.body);
    }

    /// Create an account and return a client logged in as it.
    pub async fn logged_in(&self, username: &str, role: &str) -> TestClient {
        self.create_user(username, role).await;
        let mut client = self.client();
        let res = client.login(username, PASSWORD).await;
        assert_eq!(res.status, StatusCode::OK, "login {username}: {:?}", res.body);
        client
    }

    /// Register a product through a staff client, asserting success.
    pub async fn create_product(
        &self,
        staff: &mut TestClient,
        model: &str,
        category: &str,
        quantity: i64,
        price: f64,
    ) {
        let res = staff
            .post(
                "/products",
                json!({
                    "model": model,
                    "category": category,
                    "quantity": quantity,
                    "details": "",
                    "sellingPrice": price,
                    "arrivalDate": "2024-01-01",
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "create {model}: {:?}", res.body);
    }
}

impl TestClient {
    /// Log in, keeping the session cookie on success.
    pub async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        self.post(
            "/sessions",
            json!({ "username": username, "password": password }),
        )
        .await
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&mut self, path: &str, body: Value) -> TestResponse {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn patch(&mut self, path: &str, body: Value) -> TestResponse {
        self.send(Method::PATCH, path, Some(body)).await
    }

    pub async fn patch_empty(&mut self, path: &str) -> TestResponse {
        self.send(Method::PATCH, path, None).await
    }

    pub async fn delete(&mut self, path: &str) -> TestResponse {
        self.send(Method::DELETE, path, None).await
    }

    /// Send a request to a path outside the API prefix.
    pub async fn get_raw(&mut self, uri: &str) -> TestResponse {
        self.send_to(Method::GET, uri.to_string(), None).await
    }

    async fn send(&mut self, method: Method, path: &str, body: Option<Value>) -> TestResponse {
        self.send_to(method, format!("{API_PREFIX}{path}"), body)
            .await
    }

    async fn send_to(&mut self, method: Method, uri: String, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();

        for value in response.headers().get_all(header::SET_COOKIE) {
            let value = value.to_str().unwrap();
            if let Some(pair) = value.split(';').next() {
                if let Some(session_id) = pair.strip_prefix(&format!("{SESSION_COOKIE_NAME}=")) {
                    self.cookie = (!session_id.is_empty()).then(|| pair.to_string());
                }
            }
        }

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }
}
