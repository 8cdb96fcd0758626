//! Abandoned Checkout Repository
//!
//! Idempotent upsert keyed by the client-persisted checkout id: the first
//! sync creates a row and returns its id, later syncs update the same row.

use super::{RepoError, RepoResult};
use shared::models::{AbandonedCheckout, CheckoutStatus, CheckoutSync};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const CHECKOUT_SELECT: &str = "SELECT id, user_id, customer_name, customer_phone, customer_email, items_json, total, source, city, country, status, recovery_sent_at, created_at, updated_at FROM abandoned_checkout";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<AbandonedCheckout>> {
    let sql = format!("{CHECKOUT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, AbandonedCheckout>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Upsert a cart snapshot. Returns the row id (newly generated for first
/// syncs, echoed back otherwise). An unknown incoming id recreates the row
/// under the same id so a stale client never loses tracking.
pub async fn upsert(
    pool: &SqlitePool,
    sync: &CheckoutSync,
    city: Option<String>,
    country: Option<String>,
) -> RepoResult<i64> {
    let items_json = serde_json::to_string(&sync.cart_items)
        .map_err(|e| RepoError::Validation(format!("Invalid cart items: {e}")))?;
    let now = now_millis();

    if let Some(id) = sync.checkout_id {
        let rows = sqlx::query(
            "UPDATE abandoned_checkout SET user_id = COALESCE(?, user_id), customer_name = COALESCE(?, customer_name), customer_phone = COALESCE(?, customer_phone), customer_email = COALESCE(?, customer_email), items_json = ?, total = ?, source = ?, city = COALESCE(?, city), country = COALESCE(?, country), updated_at = ? WHERE id = ?",
        )
        .bind(sync.user_id)
        .bind(&sync.customer_name)
        .bind(&sync.customer_phone)
        .bind(&sync.customer_email)
        .bind(&items_json)
        .bind(sync.total)
        .bind(sync.source)
        .bind(&city)
        .bind(&country)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

        if rows.rows_affected() > 0 {
            return Ok(id);
        }
        // Fall through: id unknown to the server, insert under it
        insert(pool, sync, id, city, country, now).await?;
        return Ok(id);
    }

    let id = snowflake_id();
    insert(pool, sync, id, city, country, now).await?;
    Ok(id)
}

async fn insert(
    pool: &SqlitePool,
    sync: &CheckoutSync,
    id: i64,
    city: Option<String>,
    country: Option<String>,
    now: i64,
) -> RepoResult<()> {
    let items_json = serde_json::to_string(&sync.cart_items)
        .map_err(|e| RepoError::Validation(format!("Invalid cart items: {e}")))?;
    sqlx::query(
        "INSERT INTO abandoned_checkout (id, user_id, customer_name, customer_phone, customer_email, items_json, total, source, city, country, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'OUTSTANDING', ?, ?)",
    )
    .bind(id)
    .bind(sync.user_id)
    .bind(&sync.customer_name)
    .bind(&sync.customer_phone)
    .bind(&sync.customer_email)
    .bind(&items_json)
    .bind(sync.total)
    .bind(sync.source)
    .bind(&city)
    .bind(&country)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM abandoned_checkout")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn list_by_status(
    pool: &SqlitePool,
    status: CheckoutStatus,
) -> RepoResult<Vec<AbandonedCheckout>> {
    let sql = format!("{CHECKOUT_SELECT} WHERE status = ? ORDER BY updated_at DESC");
    let rows = sqlx::query_as::<_, AbandonedCheckout>(&sql)
        .bind(status)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn mark_recovery_sent(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    sqlx::query("UPDATE abandoned_checkout SET recovery_sent_at = ? WHERE id = ?")
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// When a customer's order is confirmed after a recovery message went out,
/// flip their outstanding snapshots to RECOVERED. The linkage is heuristic
/// (same user id, phone, or email), mirroring the manual back-office flow.
pub async fn mark_recovered_for_customer(
    pool: &SqlitePool,
    user_id: Option<i64>,
    phone: Option<&str>,
    email: Option<&str>,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE abandoned_checkout SET status = 'RECOVERED', updated_at = ? WHERE status = 'OUTSTANDING' AND recovery_sent_at IS NOT NULL AND ((? IS NOT NULL AND user_id = ?) OR (? IS NOT NULL AND customer_phone = ?) OR (? IS NOT NULL AND customer_email = ?))",
    )
    .bind(now_millis())
    .bind(user_id)
    .bind(user_id)
    .bind(phone)
    .bind(phone)
    .bind(email)
    .bind(email)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}
