//! Order-Number Sequence
//!
//! Human-facing order numbers come from a shared counter, allocated only
//! once an order is real (COD creation or payment confirmation) so failed
//! attempts never consume numbers. Assignment is at-most-once per order.

use super::{RepoError, RepoResult};
use sqlx::SqlitePool;

const ORDER_NUMBER_SEQ: &str = "order_number";

/// Atomically allocate the next order number
pub async fn next_order_number(pool: &SqlitePool) -> RepoResult<i64> {
    let value: i64 = sqlx::query_scalar(
        "UPDATE sequence_counter SET value = value + 1 WHERE name = ? RETURNING value",
    )
    .bind(ORDER_NUMBER_SEQ)
    .fetch_one(pool)
    .await?;
    Ok(value)
}

/// Assign a number to an order exactly once. If the order already carries a
/// number it is returned unchanged and no sequence value is consumed.
pub async fn assign_order_number(pool: &SqlitePool, order_id: i64) -> RepoResult<i64> {
    let existing: Option<Option<i64>> =
        sqlx::query_scalar("SELECT order_number FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(pool)
            .await?;

    let existing = match existing {
        None => return Err(RepoError::NotFound(format!("Order {order_id} not found"))),
        Some(n) => n,
    };
    if let Some(number) = existing {
        return Ok(number);
    }

    let number = next_order_number(pool).await?;
    // Guard on NULL again so two concurrent confirmations cannot both assign
    let rows = sqlx::query(
        "UPDATE orders SET order_number = ? WHERE id = ? AND order_number IS NULL",
    )
    .bind(number)
    .bind(order_id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        // Lost the race; read back the winner's number
        let number: Option<i64> =
            sqlx::query_scalar("SELECT order_number FROM orders WHERE id = ?")
                .bind(order_id)
                .fetch_one(pool)
                .await?;
        return number
            .ok_or_else(|| RepoError::Database(format!("Order {order_id} number vanished")));
    }

    Ok(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn sequence_is_monotonic() {
        let db = DbService::open_in_memory().await.unwrap();
        let a = next_order_number(&db.pool).await.unwrap();
        let b = next_order_number(&db.pool).await.unwrap();
        assert_eq!(a, 1001);
        assert_eq!(b, 1002);
    }

    #[tokio::test]
    async fn assign_is_at_most_once() {
        let db = DbService::open_in_memory().await.unwrap();
        sqlx::query(
            "INSERT INTO orders (id, customer_name, total, payment_method, address, created_at) VALUES (1, 'A', 10.0, 'COD', '{}', 0)",
        )
        .execute(&db.pool)
        .await
        .unwrap();

        let first = assign_order_number(&db.pool, 1).await.unwrap();
        let second = assign_order_number(&db.pool, 1).await.unwrap();
        assert_eq!(first, second);

        // The second call must not have consumed a sequence value
        let next = next_order_number(&db.pool).await.unwrap();
        assert_eq!(next, first + 1);
    }
}
