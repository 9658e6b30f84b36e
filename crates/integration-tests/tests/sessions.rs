//! Integration tests for login, logout and the current session.

use axum::http::StatusCode;
use serde_json::json;

use ezelectronics_integration_tests::{PASSWORD, TestContext};

#[tokio::test]
async fn test_login_returns_user_and_sets_session() {
    let ctx = TestContext::new().await;
    ctx.create_user("mario", "Customer").await;

    let mut client = ctx.client();
    let res = client.login("mario", PASSWORD).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["username"], "mario");
    assert_eq!(res.body["role"], "Customer");
    assert!(res.body.get("password").is_none());

    let res = client.get("/sessions/current").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["username"], "mario");
}

#[tokio::test]
async fn test_wrong_credentials_are_unauthorized() {
    let ctx = TestContext::new().await;
    ctx.create_user("mario", "Customer").await;

    let mut client = ctx.client();
    assert_eq!(
        client.login("mario", "wrong").await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        client.login("ghost", PASSWORD).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        client.get("/sessions/current").await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_login_twice_is_rejected() {
    let ctx = TestContext::new().await;
    let mut client = ctx.logged_in("mario", "Customer").await;

    let res = client.login("mario", PASSWORD).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["status"], 401);
}

#[tokio::test]
async fn test_logout_destroys_session() {
    let ctx = TestContext::new().await;
    let mut client = ctx.logged_in("mario", "Customer").await;

    assert_eq!(client.delete("/sessions/current").await.status, StatusCode::OK);
    assert_eq!(
        client.get("/sessions/current").await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        client.delete("/sessions/current").await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_session_ends_when_account_is_deleted() {
    let ctx = TestContext::new().await;
    let mut client = ctx.logged_in("mario", "Customer").await;

    assert_eq!(client.delete("/users/mario").await.status, StatusCode::OK);
    assert_eq!(
        client.get("/sessions/current").await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_malformed_login_body() {
    let ctx = TestContext::new().await;
    let mut client = ctx.client();

    let res = client.post("/sessions", json!({ "username": "mario" })).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
}
