//! HTTP-level order lifecycle tests
//!
//! Exercises the full router with an in-memory database and fake
//! gateways/carriers injected through `ServerState::with_services`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use shared::models::ProductCreate;
use store_server::core::{Config, ServerState};
use store_server::db::DbService;
use store_server::db::repository::product;
use store_server::notify::Notifier;
use store_server::payment::{
    GatewayError, PaymentGateway, PaymentService, PaymentSession, RazorpayGateway,
};
use store_server::shipping::{Carrier, CarrierError, CarrierTracking, ShippingService};
use shared::models::{Order, PaymentMethod};

// ========== Fakes ==========

/// Gateway that always fails, for compensating-delete coverage
struct DownGateway;

#[async_trait]
impl PaymentGateway for DownGateway {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Razorpay
    }

    async fn create_session(&self, _order: &Order) -> Result<PaymentSession, GatewayError> {
        Err(GatewayError::Http("connection refused".into()))
    }
}

/// Carrier that always fails, for cached-view coverage
struct DownCarrier;

#[async_trait]
impl Carrier for DownCarrier {
    fn name(&self) -> &'static str {
        "delhivery"
    }

    async fn track(&self, _awb: &str) -> Result<CarrierTracking, CarrierError> {
        Err(CarrierError::Http("timed out".into()))
    }
}

/// Carrier that reports a fixed raw status
struct FixedCarrier(&'static str);

#[async_trait]
impl Carrier for FixedCarrier {
    fn name(&self) -> &'static str {
        "delhivery"
    }

    async fn track(&self, _awb: &str) -> Result<CarrierTracking, CarrierError> {
        Ok(CarrierTracking {
            raw_status: self.0.to_string(),
            estimated_delivery: None,
            delivered_at: None,
            tracking_url: Some("https://track.example/AWB1".into()),
        })
    }
}

// ========== Harness ==========

async fn test_state(
    razorpay: Arc<dyn PaymentGateway>,
    carriers: Vec<Arc<dyn Carrier>>,
) -> ServerState {
    let db = DbService::open_in_memory().await.unwrap();
    let payment = PaymentService::new(razorpay, Arc::new(DownGateway));
    let shipping = ShippingService::new(carriers, "delhivery");
    ServerState::with_services(
        Config::from_env(),
        db,
        payment,
        shipping,
        Notifier::disabled(),
    )
}

/// Default harness: mock-mode Razorpay, no carriers
async fn default_state() -> ServerState {
    test_state(
        Arc::new(RazorpayGateway::new(Default::default())),
        vec![],
    )
    .await
}

async fn seed_product(state: &ServerState, price: f64, quantity: i64) -> i64 {
    product::create(
        &state.db.pool,
        ProductCreate {
            name: "Rose Serum".into(),
            slug: "rose-serum".into(),
            category: Some("skincare".into()),
            brand: None,
            price,
            origin_price: None,
            quantity,
            thumbnail: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            builder.body(Body::from(json.to_string())).unwrap()
        }
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

fn order_payload(product_id: i64, method: &str) -> Value {
    json!({
        "cart": [{"id": product_id, "name": "Rose Serum", "quantity": 2, "price": 500.0}],
        "shippingInfo": {
            "name": "Asha Verma",
            "phone": "9876543210",
            "email": "asha@example.com",
            "address": "12 Rose Lane",
            "city": "Pune",
            "pincode": "411001"
        },
        "total": 1000.0,
        "paymentMethod": method
    })
}

async fn order_count(state: &ServerState) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(&state.db.pool)
        .await
        .unwrap()
}

// ========== Order creation ==========

#[tokio::test]
async fn cod_order_is_placed_over_http() {
    let state = default_state().await;
    let product_id = seed_product(&state, 500.0, 10).await;
    let app = store_server::api::build_app(state.clone());

    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(order_payload(product_id, "cod")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["orderNumber"], json!(1001));

    // Stock decremented
    let quantity: i64 = sqlx::query_scalar("SELECT quantity FROM product WHERE id = ?")
        .bind(product_id)
        .fetch_one(&state.db.pool)
        .await
        .unwrap();
    assert_eq!(quantity, 8);
}

#[tokio::test]
async fn empty_cart_returns_400_envelope() {
    let state = default_state().await;
    let app = store_server::api::build_app(state);

    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(json!({
            "cart": [],
            "shippingInfo": {"name": "A", "address": "B"},
            "total": 100.0,
            "paymentMethod": "cod"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("Cart"));
}

#[tokio::test]
async fn order_history_includes_line_items() {
    let state = default_state().await;
    let product_id = seed_product(&state, 500.0, 10).await;
    let app = store_server::api::build_app(state.clone());

    let mut payload = order_payload(product_id, "cod");
    payload["userId"] = json!(77);
    let (status, _) = send(&app, "POST", "/api/orders", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/orders?userId=77", None).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["items"].as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["items"][0]["price"], json!(1000.0));
}

// ========== Payment initiation ==========

#[tokio::test]
async fn gateway_failure_leaves_no_order_behind() {
    let state = test_state(Arc::new(DownGateway), vec![]).await;
    let product_id = seed_product(&state, 500.0, 10).await;
    let app = store_server::api::build_app(state.clone());

    let (status, body) = send(
        &app,
        "POST",
        "/api/payment/initiate",
        Some(order_payload(product_id, "razorpay")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], json!(false));

    // Compensating delete: no order row, stock back to 10
    assert_eq!(order_count(&state).await, 0);
    let quantity: i64 = sqlx::query_scalar("SELECT quantity FROM product WHERE id = ?")
        .bind(product_id)
        .fetch_one(&state.db.pool)
        .await
        .unwrap();
    assert_eq!(quantity, 10);
}

#[tokio::test]
async fn cod_cannot_initiate_payment() {
    let state = default_state().await;
    let product_id = seed_product(&state, 500.0, 10).await;
    let app = store_server::api::build_app(state.clone());

    let (status, _) = send(
        &app,
        "POST",
        "/api/payment/initiate",
        Some(order_payload(product_id, "cod")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(order_count(&state).await, 0);
}

#[tokio::test]
async fn initiate_then_confirm_assigns_order_number() {
    // Unconfigured Razorpay runs in mock mode and still yields a session
    let state = default_state().await;
    let product_id = seed_product(&state, 500.0, 10).await;
    let app = store_server::api::build_app(state.clone());

    let (status, body) = send(
        &app,
        "POST",
        "/api/payment/initiate",
        Some(order_payload(product_id, "razorpay")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gateway"], json!("razorpay"));
    assert_eq!(body["mock"], json!(true));
    let order_id = body["orderId"].as_i64().unwrap();

    // Still pending, no order number
    let number: Option<i64> = sqlx::query_scalar("SELECT order_number FROM orders WHERE id = ?")
        .bind(order_id)
        .fetch_one(&state.db.pool)
        .await
        .unwrap();
    assert_eq!(number, None);

    let (status, body) = send(
        &app,
        "POST",
        "/api/payment/confirm",
        Some(json!({"orderId": order_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orderNumber"], json!(1001));

    // Idempotent: second callback returns the same number
    let (status, body) = send(
        &app,
        "POST",
        "/api/payment/confirm",
        Some(json!({"orderId": order_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orderNumber"], json!(1001));
}

// ========== Abandoned checkout sync ==========

#[tokio::test]
async fn checkout_sync_upserts_one_row() {
    let state = default_state().await;
    let app = store_server::api::build_app(state.clone());

    let payload = json!({
        "customerName": "Asha Verma",
        "customerEmail": "asha@example.com",
        "cartItems": [{"id": 1, "name": "Rose Serum", "quantity": 1, "price": 500.0}],
        "total": 500.0,
        "city": "Pune",
        "country": "India"
    });

    let (status, body) = send(&app, "POST", "/api/checkout/abandoned", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["id"].as_i64().unwrap();

    // Echo the id back with an updated cart: same row, no duplicate
    let again = json!({
        "checkoutId": id,
        "cartItems": [
            {"id": 1, "name": "Rose Serum", "quantity": 2, "price": 500.0}
        ],
        "total": 1000.0
    });
    let (status, body) = send(&app, "POST", "/api/checkout/abandoned", Some(again)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_i64().unwrap(), id);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM abandoned_checkout")
        .fetch_one(&state.db.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let total: f64 = sqlx::query_scalar("SELECT total FROM abandoned_checkout WHERE id = ?")
        .bind(id)
        .fetch_one(&state.db.pool)
        .await
        .unwrap();
    assert_eq!(total, 1000.0);
}

#[tokio::test]
async fn checkout_sync_requires_items() {
    let state = default_state().await;
    let app = store_server::api::build_app(state);

    let (status, _) = send(
        &app,
        "POST",
        "/api/checkout/abandoned",
        Some(json!({"cartItems": [], "total": 0.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ========== Admin tracking ==========

async fn place_shipped_order(state: &ServerState, app: &Router, product_id: i64) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/orders",
        Some(order_payload(product_id, "cod")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let order_id = body["orderId"].as_i64().unwrap();

    sqlx::query(
        "UPDATE orders SET status = 'SHIPPED', awb_number = 'AWB1', shipping_provider = 'delhivery' WHERE id = ?",
    )
    .bind(order_id)
    .execute(&state.db.pool)
    .await
    .unwrap();

    order_id
}

#[tokio::test]
async fn tracking_sync_maps_carrier_status() {
    let state = test_state(
        Arc::new(RazorpayGateway::new(Default::default())),
        vec![Arc::new(FixedCarrier("Delivered"))],
    )
    .await;
    let product_id = seed_product(&state, 500.0, 10).await;
    let app = store_server::api::build_app(state.clone());
    let order_id = place_shipped_order(&state, &app, product_id).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/admin/orders/tracking?orderId={order_id}"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("DELIVERED"));
    assert_eq!(body["data"]["cached"], json!(false));

    // Persisted on the order row
    let stored: String = sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
        .bind(order_id)
        .fetch_one(&state.db.pool)
        .await
        .unwrap();
    assert_eq!(stored, "DELIVERED");
}

#[tokio::test]
async fn tracking_serves_cached_fields_when_carrier_is_down() {
    let state = test_state(
        Arc::new(RazorpayGateway::new(Default::default())),
        vec![Arc::new(DownCarrier)],
    )
    .await;
    let product_id = seed_product(&state, 500.0, 10).await;
    let app = store_server::api::build_app(state.clone());
    let order_id = place_shipped_order(&state, &app, product_id).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/admin/orders/tracking?orderId={order_id}"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cached"], json!(true));
    assert_eq!(body["data"]["status"], json!("SHIPPED"));
}

#[tokio::test]
async fn batch_sync_reports_per_order_outcomes() {
    let state = test_state(
        Arc::new(RazorpayGateway::new(Default::default())),
        vec![Arc::new(FixedCarrier("In Transit"))],
    )
    .await;
    let product_id = seed_product(&state, 500.0, 10).await;
    let app = store_server::api::build_app(state.clone());
    place_shipped_order(&state, &app, product_id).await;

    let (status, body) = send(&app, "POST", "/api/admin/orders/tracking", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["synced"], json!(1));
    assert_eq!(body["data"]["failed"], json!(0));
    assert_eq!(body["data"]["results"][0]["status"], json!("SHIPPED"));
}

// ========== Admin order list ==========

#[tokio::test]
async fn admin_list_separates_abandoned_online_orders() {
    let state = default_state().await;
    let product_id = seed_product(&state, 500.0, 10).await;
    let app = store_server::api::build_app(state.clone());

    // One confirmed COD order, one unconfirmed online order
    let (status, _) = send(
        &app,
        "POST",
        "/api/orders",
        Some(order_payload(product_id, "cod")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        "POST",
        "/api/payment/initiate",
        Some(order_payload(product_id, "razorpay")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The default view hides never-confirmed online orders
    let (status, body) = send(&app, "GET", "/api/admin/orders", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], json!(1));
    assert_eq!(body["data"]["orders"][0]["paymentMethod"], json!("COD"));

    let (status, body) = send(&app, "GET", "/api/admin/orders?abandoned=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], json!(1));
    assert_eq!(
        body["data"]["orders"][0]["paymentMethod"],
        json!("RAZORPAY")
    );
}

#[tokio::test]
async fn admin_can_override_order_status() {
    let state = default_state().await;
    let product_id = seed_product(&state, 500.0, 10).await;
    let app = store_server::api::build_app(state.clone());

    let (_, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(order_payload(product_id, "cod")),
    )
    .await;
    let order_id = body["orderId"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/admin/orders/{order_id}/status"),
        Some(json!({"status": "SHIPPED"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("SHIPPED"));
}

// ========== Cart recovery ==========

#[tokio::test]
async fn recovery_without_configured_channel_is_rejected() {
    let state = default_state().await;
    let app = store_server::api::build_app(state.clone());

    let payload = json!({
        "customerName": "Asha Verma",
        "customerEmail": "asha@example.com",
        "cartItems": [{"id": 1, "name": "Rose Serum", "quantity": 1, "price": 500.0}],
        "total": 500.0,
        "city": "Pune",
        "country": "India"
    });
    let (_, body) = send(&app, "POST", "/api/checkout/abandoned", Some(payload)).await;
    let id = body["id"].as_i64().unwrap();

    // Notifier is disabled: the send fails and recovery_sent_at stays unset
    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/abandoned-carts/recover",
        Some(json!({"checkoutId": id, "type": "email"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let sent: Option<i64> =
        sqlx::query_scalar("SELECT recovery_sent_at FROM abandoned_checkout WHERE id = ?")
            .bind(id)
            .fetch_one(&state.db.pool)
            .await
            .unwrap();
    assert_eq!(sent, None);
}

#[tokio::test]
async fn admin_lists_outstanding_carts_with_items() {
    let state = default_state().await;
    let app = store_server::api::build_app(state);

    let payload = json!({
        "customerName": "Asha Verma",
        "customerPhone": "9876543210",
        "cartItems": [{"id": 1, "name": "Rose Serum", "quantity": 2, "price": 500.0}],
        "total": 1000.0
    });
    let (status, _) = send(&app, "POST", "/api/checkout/abandoned", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/admin/abandoned-carts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], json!(1));
    assert_eq!(body["data"]["carts"][0]["status"], json!("OUTSTANDING"));
    assert_eq!(
        body["data"]["carts"][0]["items"][0]["quantity"],
        json!(2)
    );
}

#[tokio::test]
async fn recovery_for_unknown_checkout_is_404() {
    let state = default_state().await;
    let app = store_server::api::build_app(state);

    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/abandoned-carts/recover",
        Some(json!({"checkoutId": 42, "type": "email"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ========== Health ==========

#[tokio::test]
async fn health_endpoints_respond() {
    let state = default_state().await;
    let app = store_server::api::build_app(state);

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));

    let (status, body) = send(&app, "GET", "/health/detailed", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"]["reachable"], json!(true));
}
