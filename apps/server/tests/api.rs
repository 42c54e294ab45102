//! End-to-end tests driving the router against a seeded memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use hearth_db::{seed_defaults, MemoryStore, RecordStore};
use hearth_server::{app, AppState};

async fn seeded_app() -> Router {
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    seed_defaults(store.as_ref()).await.unwrap();
    app(AppState::new(store))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn product_by_sku(app: &Router, sku: &str) -> Value {
    let (_, products) = send(app, Method::GET, &format!("/api/products?search={sku}"), None).await;
    products
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["sku"] == sku)
        .cloned()
        .unwrap()
}

fn croissant_checkout(product_id: &Value, payments: Value) -> Value {
    json!({
        "order": { "customerName": "" },
        "items": [{
            "productId": product_id,
            "productName": "Butter Croissant",
            "quantity": 2,
            "unit": "piece",
            "unitPrice": "50.00",
            "priceType": "counter",
            "gstRate": "18.00"
        }],
        "payments": payments
    })
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_login_and_me() {
    let app = seeded_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(json!({"username": "admin", "password": "admin123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("password").is_none());

    let token = body["token"].as_str().unwrap().to_string();
    assert!(token.starts_with("token_1_"));

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, token)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_bad_login_is_unauthorized() {
    let app = seeded_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(json!({"username": "admin", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = send(&app, Method::GET, "/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let app = seeded_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({"username": "baker", "password": "rye"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "cashier");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({"username": "baker", "password": "rye"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE");
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_product_filters_combine() {
    let app = seeded_app().await;

    let (status, all) = send(&app, Method::GET, "/api/products?category=All", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 10);

    let (_, cakes) = send(&app, Method::GET, "/api/products?category=Cakes&search=velvet", None).await;
    let cakes = cakes.as_array().unwrap();
    assert_eq!(cakes.len(), 1);
    assert_eq!(cakes[0]["sku"], "RVC001");
    assert_eq!(cakes[0]["counterPrice"], "150.00");
}

#[tokio::test]
async fn test_product_lifecycle() {
    let app = seeded_app().await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({
            "name": "Masala Chai",
            "sku": "MC001",
            "category": "Beverages",
            "counterPrice": "25.00",
            "wholesalePrice": 20,
            "stock": 40,
            "unit": "cup"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["gstRate"], "18.00");
    assert_eq!(created["status"], "active");
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/products/{id}"),
        Some(json!({"stock": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "low_stock");

    let (status, body) = send(&app, Method::DELETE, &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted successfully");

    let (status, body) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_duplicate_sku_conflicts() {
    let app = seeded_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({
            "name": "Another Cake",
            "sku": "CC001",
            "category": "Cakes",
            "counterPrice": "10.00",
            "wholesalePrice": "9.00",
            "unit": "piece"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["field"], "sku");
}

#[tokio::test]
async fn test_customer_search() {
    let app = seeded_app().await;

    let (_, found) = send(&app, Method::GET, "/api/customers?search=SARAH", None).await;
    let found = found.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["customerType"], "regular");

    let (_, by_phone) = send(&app, Method::GET, "/api/customers?search=3211", None).await;
    assert_eq!(by_phone[0]["name"], "Mike Chen");
}

// =============================================================================
// Settlement
// =============================================================================

#[tokio::test]
async fn test_checkout_full_payment() {
    let app = seeded_app().await;
    let croissant = product_by_sku(&app, "BC001").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(croissant_checkout(
            &croissant["id"],
            json!([{"method": "cash", "amount": "118.00"}]),
        )),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["subtotal"], "100.00");
    assert_eq!(body["order"]["gstAmount"], "18.00");
    assert_eq!(body["order"]["total"], "118.00");
    assert_eq!(body["order"]["status"], "completed");
    assert_eq!(body["order"]["paymentMethod"], "cash");
    assert_eq!(body["order"]["customerName"], "Walk-in Customer");
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert!(body["payments"][0]["transactionId"]
        .as_str()
        .unwrap()
        .starts_with("TXN"));
    assert_eq!(body["replayed"], false);

    let after = product_by_sku(&app, "BC001").await;
    assert_eq!(after["stock"], 10);
    assert_eq!(after["status"], "low_stock");

    let (_, metrics) = send(&app, Method::GET, "/api/dashboard/metrics", None).await;
    assert_eq!(metrics["todaySales"], "118.00");
    assert_eq!(metrics["ordersToday"], 1);
    assert_eq!(metrics["averageOrder"], "118.00");

    let (_, popular) = send(&app, Method::GET, "/api/dashboard/popular-items", None).await;
    assert_eq!(popular[0]["id"], croissant["id"]);
    assert_eq!(popular[0]["sold"], 2);
    assert_eq!(popular[0]["revenue"], "100.00");
}

#[tokio::test]
async fn test_split_and_partial_payments() {
    let app = seeded_app().await;
    let croissant = product_by_sku(&app, "BC001").await;

    let (_, split) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(croissant_checkout(
            &croissant["id"],
            json!([
                {"method": "cash", "amount": "60.00"},
                {"method": "card", "amount": 58}
            ]),
        )),
    )
    .await;
    assert_eq!(split["order"]["paymentMethod"], "split");
    assert_eq!(split["order"]["status"], "completed");
    assert_eq!(split["payments"].as_array().unwrap().len(), 2);

    let (status, partial) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(croissant_checkout(
            &croissant["id"],
            json!([{"method": "cash", "amount": "50.00"}]),
        )),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(partial["order"]["status"], "processing");
    assert_eq!(partial["order"]["paymentStatus"], "pending");

    // Only the completed order counts
    let (_, metrics) = send(&app, Method::GET, "/api/dashboard/metrics", None).await;
    assert_eq!(metrics["ordersToday"], 1);
    assert_eq!(metrics["todaySales"], "118.00");

    let (_, recent) = send(&app, Method::GET, "/api/dashboard/recent-orders?limit=1", None).await;
    let recent = recent.as_array().unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["id"], partial["order"]["id"]);
    assert_eq!(recent[0]["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_checkout_replay_returns_stored_order() {
    let app = seeded_app().await;
    let croissant = product_by_sku(&app, "BC001").await;

    let mut request = croissant_checkout(
        &croissant["id"],
        json!([{"method": "wallet", "amount": "118.00"}]),
    );
    request["order"]["idempotencyKey"] = json!(uuid::Uuid::new_v4().to_string());

    let (first_status, first) = send(&app, Method::POST, "/api/orders", Some(request.clone())).await;
    let (second_status, second) = send(&app, Method::POST, "/api/orders", Some(request)).await;

    assert_eq!(first_status, StatusCode::CREATED);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(second["replayed"], true);
    assert_eq!(second["order"]["id"], first["order"]["id"]);

    let after = product_by_sku(&app, "BC001").await;
    assert_eq!(after["stock"], 10);

    let (_, orders) = send(&app, Method::GET, "/api/orders", None).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_checkout_rejections() {
    let app = seeded_app().await;
    let croissant = product_by_sku(&app, "BC001").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({"order": {}, "items": [], "payments": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field"], "items");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(croissant_checkout(
            &croissant["id"],
            json!([{"method": "cash", "amount": "0.00"}]),
        )),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "payments[0].amount");

    let mut unknown_customer = croissant_checkout(
        &croissant["id"],
        json!([{"method": "cash", "amount": "118.00"}]),
    );
    unknown_customer["order"]["customerId"] = json!(999);
    let (status, _) = send(&app, Method::POST, "/api/orders", Some(unknown_customer)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing was written
    let after = product_by_sku(&app, "BC001").await;
    assert_eq!(after["stock"], 12);
}

#[tokio::test]
async fn test_empty_cart_reported_before_unknown_customer() {
    let app = seeded_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({
            "order": { "customerId": 999 },
            "items": [],
            "payments": [{"method": "cash", "amount": "10.00"}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field"], "items");
}

#[tokio::test]
async fn test_oversized_payments_are_rejected() {
    let app = seeded_app().await;
    let croissant = product_by_sku(&app, "BC001").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(croissant_checkout(
            &croissant["id"],
            json!([
                {"method": "cash", "amount": "50000000000000000"},
                {"method": "card", "amount": "50000000000000000"}
            ]),
        )),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "payments[0].amount");

    let after = product_by_sku(&app, "BC001").await;
    assert_eq!(after["stock"], 12);
}

#[tokio::test]
async fn test_checkout_uses_customer_name_and_product_rate() {
    let app = seeded_app().await;
    let bread = product_by_sku(&app, "WB001").await;
    let (_, customers) = send(&app, Method::GET, "/api/customers?search=Mike", None).await;
    let mike = &customers[0];

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({
            "order": { "customerId": mike["id"] },
            "items": [{
                "productId": bread["id"],
                "productName": "White Bread",
                "quantity": 1,
                "unitPrice": "28.00",
                "priceType": "wholesale"
            }],
            "payments": [{"method": "cash", "amount": "29.40"}]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["customerName"], "Mike Chen");
    assert_eq!(body["order"]["gstAmount"], "1.40");
    assert_eq!(body["items"][0]["gstRate"], "5.00");
    assert_eq!(body["order"]["status"], "completed");
}

// =============================================================================
// Misc
// =============================================================================

#[tokio::test]
async fn test_health_and_empty_dashboard() {
    let app = seeded_app().await;

    let (status, health) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["storage"]["backend"], "memory");

    let (_, metrics) = send(&app, Method::GET, "/api/dashboard/metrics", None).await;
    assert_eq!(metrics["ordersToday"], 0);
    assert_eq!(metrics["averageOrder"], "0.00");
    // Seeded catalog: AC001, WWB001, GJ001, RG001 are at or below 10
    assert_eq!(metrics["lowStockItems"], 4);

    let (_, popular) = send(&app, Method::GET, "/api/dashboard/popular-items", None).await;
    assert_eq!(popular, json!([]));
}
