use shared::models::{
    CartLine, CheckoutItem, CheckoutStatus, CheckoutSync, OrderCreate, OrderStatus, PaymentMethod,
    PaymentStatus, ProductCreate, ShippingInfo,
};

use crate::db::DbService;
use crate::db::repository::{checkout, order, product, promo_code, sequence};
use crate::notify::Notifier;
use crate::orders::OrderService;
use crate::utils::AppError;

async fn test_service() -> OrderService {
    let db = DbService::open_in_memory().await.unwrap();
    OrderService::new(db.pool, Notifier::disabled())
}

async fn seed_product(svc: &OrderService, name: &str, price: f64, quantity: i64) -> i64 {
    product::create(
        svc.pool(),
        ProductCreate {
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
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

fn shipping_info() -> ShippingInfo {
    ShippingInfo {
        name: "Asha Verma".into(),
        phone: Some("9876543210".into()),
        email: Some("asha@example.com".into()),
        address: "12 Rose Lane".into(),
        city: Some("Pune".into()),
        state: Some("MH".into()),
        pincode: Some("411001".into()),
        country: Some("India".into()),
    }
}

fn cod_order(product_id: i64, quantity: i64, price: f64) -> OrderCreate {
    OrderCreate {
        cart: vec![CartLine {
            id: product_id,
            name: "Rose Serum".into(),
            quantity,
            price,
            size: None,
            color: None,
            image: None,
            slug: None,
        }],
        shipping_info: shipping_info(),
        user_id: None,
        total: price * quantity as f64,
        payment_method: PaymentMethod::Cod,
        shipping_fee: 0.0,
        discount_amount: 0.0,
        promo_code: None,
    }
}

// ========================================================================
// Creation
// ========================================================================

#[tokio::test]
async fn cod_order_end_to_end() {
    let svc = test_service().await;
    let p1 = seed_product(&svc, "Rose Serum", 500.0, 10).await;

    let created = svc.create_order(cod_order(p1, 2, 500.0)).await.unwrap();

    let order = order::find_by_id(svc.pool(), created.order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.order_number, Some(1001));
    assert_eq!(created.order_number, Some(1001));

    // Inventory decremented by exactly the line quantity
    let product = product::find_by_id(svc.pool(), p1).await.unwrap().unwrap();
    assert_eq!(product.quantity, 8);

    // One line item carrying the line-total snapshot
    let items = order::items_for_order(svc.pool(), created.order_id)
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].price, 1000.0);
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let svc = test_service().await;
    let mut data = cod_order(1, 1, 500.0);
    data.cart.clear();

    let err = svc.create_order(data).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn missing_total_is_rejected() {
    let svc = test_service().await;
    let p1 = seed_product(&svc, "Rose Serum", 500.0, 10).await;
    let mut data = cod_order(p1, 1, 500.0);
    data.total = 0.0;

    let err = svc.create_order(data).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn insufficient_stock_rolls_everything_back() {
    let svc = test_service().await;
    let p1 = seed_product(&svc, "Rose Serum", 500.0, 1).await;

    let err = svc.create_order(cod_order(p1, 2, 500.0)).await.unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    // No order, no items, stock untouched
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(svc.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
    let product = product::find_by_id(svc.pool(), p1).await.unwrap().unwrap();
    assert_eq!(product.quantity, 1);
}

#[tokio::test]
async fn order_numbers_are_unique_across_orders() {
    let svc = test_service().await;
    let p1 = seed_product(&svc, "Rose Serum", 500.0, 10).await;

    let a = svc.create_order(cod_order(p1, 1, 500.0)).await.unwrap();
    let b = svc.create_order(cod_order(p1, 1, 500.0)).await.unwrap();

    assert_eq!(a.order_number, Some(1001));
    assert_eq!(b.order_number, Some(1002));
}

#[tokio::test]
async fn promo_usage_increments_exactly_once() {
    let svc = test_service().await;
    let p1 = seed_product(&svc, "Rose Serum", 500.0, 10).await;
    promo_code::create(svc.pool(), "GLOW10", 10.0).await.unwrap();

    let mut data = cod_order(p1, 1, 500.0);
    data.promo_code = Some("GLOW10".into());
    data.discount_amount = 50.0;
    svc.create_order(data).await.unwrap();

    let promo = promo_code::find_by_code(svc.pool(), "GLOW10")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(promo.usage_count, 1);
}

// ========================================================================
// Online payment confirmation
// ========================================================================

#[tokio::test]
async fn online_order_is_pending_until_confirmed() {
    let svc = test_service().await;
    let p1 = seed_product(&svc, "Rose Serum", 500.0, 10).await;

    let mut data = cod_order(p1, 2, 500.0);
    data.payment_method = PaymentMethod::Razorpay;
    let created = svc.create_order(data).await.unwrap();
    assert_eq!(created.order_number, None);

    let order = order::find_by_id(svc.pool(), created.order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.order_number, None);

    // Inventory is still reserved at creation time
    let product = product::find_by_id(svc.pool(), p1).await.unwrap().unwrap();
    assert_eq!(product.quantity, 8);

    let confirmed = svc.confirm_payment(created.order_id).await.unwrap();
    assert_eq!(confirmed.status, OrderStatus::Processing);
    assert_eq!(confirmed.payment_status, PaymentStatus::Successful);
    assert_eq!(confirmed.order_number, Some(1001));
}

#[tokio::test]
async fn confirm_payment_is_idempotent() {
    let svc = test_service().await;
    let p1 = seed_product(&svc, "Rose Serum", 500.0, 10).await;
    promo_code::create(svc.pool(), "GLOW10", 10.0).await.unwrap();

    let mut data = cod_order(p1, 1, 500.0);
    data.payment_method = PaymentMethod::Phonepe;
    data.promo_code = Some("GLOW10".into());
    let created = svc.create_order(data).await.unwrap();

    let first = svc.confirm_payment(created.order_id).await.unwrap();
    let second = svc.confirm_payment(created.order_id).await.unwrap();
    assert_eq!(first.order_number, second.order_number);

    // Second confirmation consumed no sequence value and no promo usage
    let promo = promo_code::find_by_code(svc.pool(), "GLOW10")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(promo.usage_count, 1);
    let next = sequence::next_order_number(svc.pool()).await.unwrap();
    assert_eq!(next, first.order_number.unwrap() + 1);
}

#[tokio::test]
async fn payment_transition_applies_once() {
    let svc = test_service().await;
    let p1 = seed_product(&svc, "Rose Serum", 500.0, 10).await;
    promo_code::create(svc.pool(), "GLOW10", 10.0).await.unwrap();

    let mut data = cod_order(p1, 1, 500.0);
    data.payment_method = PaymentMethod::Razorpay;
    data.promo_code = Some("GLOW10".into());
    let created = svc.create_order(data).await.unwrap();

    // A racing callback already flipped the row; the repository reports it
    assert!(
        order::mark_payment_successful(svc.pool(), created.order_id)
            .await
            .unwrap()
    );
    assert!(
        !order::mark_payment_successful(svc.pool(), created.order_id)
            .await
            .unwrap()
    );

    // The losing caller sees the confirmed order without re-running the
    // confirmation side effects
    let confirmed = svc.confirm_payment(created.order_id).await.unwrap();
    assert_eq!(confirmed.payment_status, PaymentStatus::Successful);
    let promo = promo_code::find_by_code(svc.pool(), "GLOW10")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(promo.usage_count, 0);
}

// ========================================================================
// Abandoned filter + recovery heuristic
// ========================================================================

#[tokio::test]
async fn abandoned_filter_separates_unconfirmed_online_orders() {
    let svc = test_service().await;
    let p1 = seed_product(&svc, "Rose Serum", 500.0, 20).await;

    // COD (confirmed) + online unconfirmed
    svc.create_order(cod_order(p1, 1, 500.0)).await.unwrap();
    let mut online = cod_order(p1, 1, 500.0);
    online.payment_method = PaymentMethod::Razorpay;
    let pending = svc.create_order(online).await.unwrap();

    let (abandoned, total) = order::admin_list(
        svc.pool(),
        &order::AdminListFilter {
            page: 1,
            limit: 20,
            abandoned: true,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(total, 1);
    assert_eq!(abandoned[0].id, pending.order_id);

    let (rest, rest_total) = order::admin_list(
        svc.pool(),
        &order::AdminListFilter {
            page: 1,
            limit: 20,
            abandoned: false,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(rest_total, 1);
    assert!(rest.iter().all(|o| o.id != pending.order_id));
}

#[tokio::test]
async fn confirmed_order_marks_checkout_recovered_after_nudge() {
    let svc = test_service().await;
    let p1 = seed_product(&svc, "Rose Serum", 500.0, 10).await;

    let sync = CheckoutSync {
        checkout_id: None,
        user_id: None,
        customer_name: Some("Asha Verma".into()),
        customer_phone: Some("9876543210".into()),
        customer_email: Some("asha@example.com".into()),
        cart_items: vec![CheckoutItem {
            id: p1,
            name: "Rose Serum".into(),
            quantity: 1,
            price: 500.0,
        }],
        total: 500.0,
        city: None,
        country: None,
        source: Default::default(),
    };
    let checkout_id = checkout::upsert(svc.pool(), &sync, None, None).await.unwrap();

    // Without a recovery nudge, confirmation leaves the row outstanding
    svc.create_order(cod_order(p1, 1, 500.0)).await.unwrap();
    let row = checkout::find_by_id(svc.pool(), checkout_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, CheckoutStatus::Outstanding);

    // After a nudge, the next confirmed order flips it
    checkout::mark_recovery_sent(svc.pool(), checkout_id)
        .await
        .unwrap();
    svc.create_order(cod_order(p1, 1, 500.0)).await.unwrap();
    let row = checkout::find_by_id(svc.pool(), checkout_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, CheckoutStatus::Recovered);
}
