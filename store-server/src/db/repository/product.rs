//! Product Repository
//!
//! The order flow reads price/name and decrements stock (inside the order
//! creation transaction); catalog CRUD lives with the admin screens.

use super::{RepoError, RepoResult};
use shared::models::{Product, ProductCreate};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const PRODUCT_SELECT: &str = "SELECT id, name, slug, category, brand, price, origin_price, quantity, thumbnail, is_active, created_at FROM product";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let sql = format!("{PRODUCT_SELECT} WHERE id = ?");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(product)
}

pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO product (id, name, slug, category, brand, price, origin_price, quantity, thumbnail, is_active, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.slug)
    .bind(&data.category)
    .bind(&data.brand)
    .bind(data.price)
    .bind(data.origin_price)
    .bind(data.quantity)
    .bind(&data.thumbnail)
    .bind(now_millis())
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}
