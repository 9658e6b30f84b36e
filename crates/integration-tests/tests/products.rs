//! Integration tests for the product catalog.

use axum::http::StatusCode;
use serde_json::json;

use ezelectronics_integration_tests::{TestClient, TestContext};

async fn catalog(ctx: &TestContext) -> TestClient {
    let mut manager = ctx.logged_in("boss", "Manager").await;
    ctx.create_product(&mut manager, "iPhone13", "Smartphone", 5, 799.0)
        .await;
    ctx.create_product(&mut manager, "XPS13", "Laptop", 2, 1299.5)
        .await;
    ctx.create_product(&mut manager, "WM-7000", "Appliance", 1, 549.0)
        .await;
    manager
}

fn models(body: &serde_json::Value) -> Vec<String> {
    let mut models: Vec<String> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["model"].as_str().unwrap().to_string())
        .collect();
    models.sort();
    models
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_product() {
    let ctx = TestContext::new().await;
    let mut manager = catalog(&ctx).await;

    let res = manager.get("/products?grouping=model&model=XPS13").await;
    assert_eq!(res.status, StatusCode::OK);
    let product = &res.body[0];
    assert_eq!(product["category"], "Laptop");
    assert_eq!(product["quantity"], 2);
    assert_eq!(product["sellingPrice"], 1299.5);
    assert_eq!(product["arrivalDate"], "2024-01-01");
}

#[tokio::test]
async fn test_register_rules() {
    let ctx = TestContext::new().await;
    let mut manager = catalog(&ctx).await;
    let mut customer = ctx.logged_in("mario", "Customer").await;

    let body = |model: &str, quantity: i64, price: f64, date: &str| {
        json!({
            "model": model,
            "category": "Smartphone",
            "quantity": quantity,
            "sellingPrice": price,
            "arrivalDate": date,
        })
    };

    assert_eq!(
        manager.post("/products", body("iPhone13", 1, 10.0, "2024-01-01")).await.status,
        StatusCode::CONFLICT
    );
    assert_eq!(
        manager.post("/products", body("Pixel8", 0, 10.0, "2024-01-01")).await.status,
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        manager.post("/products", body("Pixel8", 1, -3.0, "2024-01-01")).await.status,
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        manager.post("/products", body("Pixel8", 1, 10.0, "2999-01-01")).await.status,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        customer.post("/products", body("Pixel8", 1, 10.0, "2024-01-01")).await.status,
        StatusCode::UNAUTHORIZED
    );

    let res = manager
        .post(
            "/products",
            json!({ "model": "Pixel8", "category": "Tablet", "quantity": 1, "sellingPrice": 10.0 }),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_mistyped_body_gets_json_error() {
    let ctx = TestContext::new().await;
    let mut manager = catalog(&ctx).await;

    let res = manager
        .post("/products", json!({ "model": "Pixel8", "quantity": "lots" }))
        .await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body["status"], 422);
    assert!(res.body["error"].is_string());
}

// ============================================================================
// Stock changes
// ============================================================================

#[tokio::test]
async fn test_restock() {
    let ctx = TestContext::new().await;
    let mut manager = catalog(&ctx).await;

    let res = manager
        .patch("/products/XPS13", json!({ "quantity": 3, "changeDate": "2024-02-01" }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["quantity"], 5);

    let res = manager.patch("/products/XPS13", json!({ "quantity": 1 })).await;
    assert_eq!(res.body["quantity"], 6);

    assert_eq!(
        manager
            .patch("/products/XPS13", json!({ "quantity": 1, "changeDate": "2023-12-31" }))
            .await
            .status,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        manager
            .patch("/products/XPS13", json!({ "quantity": 1, "changeDate": "2999-01-01" }))
            .await
            .status,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        manager.patch("/products/Pixel8", json!({ "quantity": 1 })).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_restock_past_stock_limit_keeps_product_readable() {
    let ctx = TestContext::new().await;
    let mut manager = ctx.logged_in("boss", "Manager").await;
    ctx.create_product(&mut manager, "iPhone13", "Smartphone", 4_000_000_000, 799.0)
        .await;

    let res = manager
        .patch("/products/iPhone13", json!({ "quantity": 1_000_000_000 }))
        .await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);

    let res = manager.get("/products").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body[0]["quantity"], 4_000_000_000_u64);
}

#[tokio::test]
async fn test_sell() {
    let ctx = TestContext::new().await;
    let mut manager = catalog(&ctx).await;

    assert_eq!(
        manager.patch("/products/XPS13/sell", json!({ "quantity": 3 })).await.status,
        StatusCode::CONFLICT
    );

    let res = manager
        .patch("/products/XPS13/sell", json!({ "quantity": 2, "sellingDate": "2024-03-01" }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["quantity"], 0);

    assert_eq!(
        manager.patch("/products/XPS13/sell", json!({ "quantity": 1 })).await.status,
        StatusCode::CONFLICT
    );
    assert_eq!(
        manager
            .patch("/products/iPhone13/sell", json!({ "quantity": 1, "sellingDate": "2023-01-01" }))
            .await
            .status,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        manager.patch("/products/Pixel8/sell", json!({ "quantity": 1 })).await.status,
        StatusCode::NOT_FOUND
    );
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_listing_filters() {
    let ctx = TestContext::new().await;
    let mut manager = catalog(&ctx).await;

    let res = manager.get("/products").await;
    assert_eq!(models(&res.body), ["WM-7000", "XPS13", "iPhone13"]);

    let res = manager.get("/products?grouping=category&category=Laptop").await;
    assert_eq!(models(&res.body), ["XPS13"]);

    for bad in [
        "/products?category=Laptop",
        "/products?model=XPS13",
        "/products?grouping=category",
        "/products?grouping=category&category=Tablet",
        "/products?grouping=category&category=Laptop&model=XPS13",
        "/products?grouping=model",
        "/products?grouping=model&model=",
        "/products?grouping=brand",
    ] {
        assert_eq!(
            manager.get(bad).await.status,
            StatusCode::UNPROCESSABLE_ENTITY,
            "{bad}"
        );
    }

    assert_eq!(
        manager.get("/products?grouping=model&model=Pixel8").await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_available_listing() {
    let ctx = TestContext::new().await;
    let mut manager = catalog(&ctx).await;
    let mut customer = ctx.logged_in("mario", "Customer").await;

    manager
        .patch("/products/WM-7000/sell", json!({ "quantity": 1 }))
        .await;

    assert_eq!(customer.get("/products").await.status, StatusCode::UNAUTHORIZED);

    let res = customer.get("/products/available").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(models(&res.body), ["XPS13", "iPhone13"]);

    let res = customer
        .get("/products/available?grouping=model&model=WM-7000")
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.as_array().unwrap().is_empty());

    assert_eq!(
        customer
            .get("/products/available?grouping=model&model=Pixel8")
            .await
            .status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        ctx.client().get("/products/available").await.status,
        StatusCode::UNAUTHORIZED
    );
}

// ============================================================================
// Deletes
// ============================================================================

#[tokio::test]
async fn test_delete_product_strips_carts_and_reviews() {
    let ctx = TestContext::new().await;
    let mut manager = catalog(&ctx).await;
    let mut customer = ctx.logged_in("mario", "Customer").await;

    customer.post("/carts", json!({ "model": "iPhone13" })).await;
    customer.post("/carts", json!({ "model": "iPhone13" })).await;
    customer.post("/carts", json!({ "model": "XPS13" })).await;
    customer
        .post("/reviews/iPhone13", json!({ "score": 5, "comment": "Great" }))
        .await;

    assert_eq!(manager.delete("/products/iPhone13").await.status, StatusCode::OK);
    assert_eq!(
        manager.delete("/products/iPhone13").await.status,
        StatusCode::NOT_FOUND
    );

    let cart = customer.get("/carts").await.body;
    assert_eq!(cart["products"].as_array().unwrap().len(), 1);
    assert_eq!(cart["products"][0]["model"], "XPS13");
    assert_eq!(cart["total"], 1299.5);

    assert_eq!(
        customer.get("/reviews/iPhone13").await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_delete_all_products_empties_unpaid_carts() {
    let ctx = TestContext::new().await;
    let mut manager = catalog(&ctx).await;
    let mut customer = ctx.logged_in("mario", "Customer").await;

    customer.post("/carts", json!({ "model": "XPS13" })).await;

    assert_eq!(manager.delete("/products").await.status, StatusCode::OK);
    assert!(manager.get("/products").await.body.as_array().unwrap().is_empty());

    let cart = customer.get("/carts").await.body;
    assert!(cart["products"].as_array().unwrap().is_empty());
    assert_eq!(cart["total"], 0.0);
}
