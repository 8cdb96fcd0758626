//! Order Repository
//!
//! Order + line-item persistence. Creation is one transaction covering the
//! order row, its items, and the guarded stock decrements, so a failed line
//! leaves nothing applied.

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus};
use shared::util::{now_millis, snowflake_id};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const ORDER_SELECT: &str = "SELECT id, user_id, customer_name, customer_email, customer_phone, total, shipping_fee, discount_amount, promo_code, status, payment_status, payment_method, address, awb_number, shipping_provider, shipping_status, tracking_url, shipped_at, delivered_at, estimated_delivery, last_tracking_sync, order_number, created_at FROM orders";

/// Compound filter distinguishing never-confirmed online orders from real ones
const ABANDONED_PREDICATE: &str =
    "(status = 'PENDING' AND payment_status = 'PENDING' AND payment_method != 'COD')";

/// Insert payload for a new order
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: i64,
    pub user_id: Option<i64>,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub total: f64,
    pub shipping_fee: f64,
    pub discount_amount: f64,
    pub promo_code: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub address: String,
}

/// Insert payload for a line item (price is the line total snapshot)
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i64,
    pub price: f64,
}

/// Create order + items and decrement stock in one transaction.
///
/// Every decrement is guarded by `quantity >= ?`; a line that cannot be
/// covered rolls the whole order back with `InsufficientStock`.
pub async fn create_with_items(
    pool: &SqlitePool,
    order: NewOrder,
    items: &[NewOrderItem],
) -> RepoResult<()> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO orders (id, user_id, customer_name, customer_email, customer_phone, total, shipping_fee, discount_amount, promo_code, status, payment_status, payment_method, address, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(&order.customer_name)
    .bind(&order.customer_email)
    .bind(&order.customer_phone)
    .bind(order.total)
    .bind(order.shipping_fee)
    .bind(order.discount_amount)
    .bind(&order.promo_code)
    .bind(order.status)
    .bind(order.payment_status)
    .bind(order.payment_method)
    .bind(&order.address)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for item in items {
        sqlx::query(
            "INSERT INTO order_item (id, order_id, product_id, quantity, price) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(snowflake_id())
        .bind(order.id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.price)
        .execute(&mut *tx)
        .await?;

        let decremented = sqlx::query(
            "UPDATE product SET quantity = quantity - ? WHERE id = ? AND quantity >= ?",
        )
        .bind(item.quantity)
        .bind(item.product_id)
        .bind(item.quantity)
        .execute(&mut *tx)
        .await?;

        if decremented.rows_affected() == 0 {
            // Dropping the transaction rolls back order, items, and decrements
            return Err(RepoError::InsufficientStock(format!(
                "product {} cannot cover quantity {}",
                item.product_id, item.quantity
            )));
        }
    }

    tx.commit().await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

/// A user's orders, newest first, with tracking fields included
pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE user_id = ? ORDER BY created_at DESC");
    let orders = sqlx::query_as::<_, Order>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(orders)
}

/// Compensating delete for failed payment initiation. Restores the stock
/// the creation transaction took; line items cascade with the order row.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE product SET quantity = quantity + (SELECT SUM(quantity) FROM order_item WHERE order_id = ? AND product_id = product.id) WHERE id IN (SELECT product_id FROM order_item WHERE order_id = ?)",
    )
    .bind(id)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let rows = sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn items_for_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, product_id, quantity, price FROM order_item WHERE order_id = ?",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

/// Gateway-confirmed payment: PENDING/PENDING -> PROCESSING/SUCCESSFUL.
///
/// Returns true when this call performed the transition. False means the
/// payment was already confirmed (or the order is gone), so callers racing
/// on the same callback must not run the confirmation side effects again.
pub async fn mark_payment_successful(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET payment_status = 'SUCCESSFUL', status = 'PROCESSING' WHERE id = ? AND payment_status = 'PENDING'",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn update_status(pool: &SqlitePool, id: i64, status: OrderStatus) -> RepoResult<Order> {
    let rows = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}

// =============================================================================
// Admin list
// =============================================================================

/// Admin list filters (`GET /api/admin/orders`)
#[derive(Debug, Clone, Default)]
pub struct AdminListFilter {
    pub page: i64,
    pub limit: i64,
    pub status: Option<OrderStatus>,
    pub search: Option<String>,
    pub abandoned: bool,
}

fn push_admin_filters<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filter: &'a AdminListFilter) {
    qb.push(" WHERE 1=1");

    if filter.abandoned {
        qb.push(" AND ").push(ABANDONED_PREDICATE);
    } else if filter.search.is_none() {
        // Default admin view: everything except never-confirmed online orders
        qb.push(" AND NOT ").push(ABANDONED_PREDICATE);
    }

    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }

    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        qb.push(" AND (customer_name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR customer_email LIKE ")
            .push_bind(pattern.clone())
            .push(" OR customer_phone LIKE ")
            .push_bind(pattern)
            .push(" OR CAST(order_number AS TEXT) = ")
            .push_bind(search.clone())
            .push(")");
    }
}

/// Paginated admin order list. Returns `(orders, total_matching)`.
pub async fn admin_list(
    pool: &SqlitePool,
    filter: &AdminListFilter,
) -> RepoResult<(Vec<Order>, i64)> {
    let page = filter.page.max(1);
    let limit = filter.limit.clamp(1, 100);

    let mut count_qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM orders");
    push_admin_filters(&mut count_qb, filter);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(ORDER_SELECT);
    push_admin_filters(&mut qb, filter);
    qb.push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind((page - 1) * limit);

    let orders = qb.build_query_as::<Order>().fetch_all(pool).await?;
    Ok((orders, total))
}

// =============================================================================
// Tracking
// =============================================================================

/// Non-terminal orders with an AWB assigned, for the batch tracking sync
pub async fn find_trackable(pool: &SqlitePool) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "{ORDER_SELECT} WHERE awb_number IS NOT NULL AND status NOT IN ('DELIVERED', 'RTO_DELIVERED', 'CANCELLED', 'COMPLETED') ORDER BY created_at DESC"
    );
    let orders = sqlx::query_as::<_, Order>(&sql).fetch_all(pool).await?;
    Ok(orders)
}

pub async fn find_by_awb(pool: &SqlitePool, awb: &str) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE awb_number = ?");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(awb)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

/// Normalized tracking fields written back after a carrier sync
#[derive(Debug, Clone)]
pub struct TrackingPatch {
    pub status: OrderStatus,
    pub shipping_status: String,
    pub tracking_url: Option<String>,
    pub estimated_delivery: Option<i64>,
    pub delivered_at: Option<i64>,
    pub last_tracking_sync: i64,
}

pub async fn apply_tracking(pool: &SqlitePool, id: i64, patch: &TrackingPatch) -> RepoResult<()> {
    sqlx::query(
        "UPDATE orders SET status = ?, shipping_status = ?, tracking_url = COALESCE(?, tracking_url), estimated_delivery = COALESCE(?, estimated_delivery), delivered_at = COALESCE(?, delivered_at), last_tracking_sync = ? WHERE id = ?",
    )
    .bind(patch.status)
    .bind(&patch.shipping_status)
    .bind(&patch.tracking_url)
    .bind(patch.estimated_delivery)
    .bind(patch.delivered_at)
    .bind(patch.last_tracking_sync)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}
