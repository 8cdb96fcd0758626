//! Promo Code Repository

use super::RepoResult;
use shared::models::PromoCode;
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

pub async fn find_by_code(pool: &SqlitePool, code: &str) -> RepoResult<Option<PromoCode>> {
    let row = sqlx::query_as::<_, PromoCode>(
        "SELECT id, code, discount_percent, usage_count, is_active, created_at FROM promo_code WHERE code = ? AND is_active = 1",
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Bump the usage counter once per confirmed order carrying the code.
/// Unknown codes are a no-op: the discount was already applied client-side
/// and the order must not fail over a counter.
pub async fn increment_usage(pool: &SqlitePool, code: &str) -> RepoResult<()> {
    sqlx::query("UPDATE promo_code SET usage_count = usage_count + 1 WHERE code = ?")
        .bind(code)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn create(pool: &SqlitePool, code: &str, discount_percent: f64) -> RepoResult<i64> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO promo_code (id, code, discount_percent, usage_count, is_active, created_at) VALUES (?, ?, ?, 0, 1, ?)",
    )
    .bind(id)
    .bind(code)
    .bind(discount_percent)
    .bind(now_millis())
    .execute(pool)
    .await?;
    Ok(id)
}
