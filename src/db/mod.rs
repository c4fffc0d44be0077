use chrono::Utc;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::*;

const SWEET_COLUMNS: &str =
    "id, sweet_id, name, category, price, quantity, description, image, created_at, updated_at";

// ── Reads ─────────────────────────────────────────────────────────────────────

pub async fn fetch_all_sweets(pool: &PgPool) -> AppResult<Vec<Sweet>> {
    let sweets = sqlx::query_as::<_, Sweet>(&format!(
        "SELECT {SWEET_COLUMNS} FROM sweets ORDER BY created_at ASC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(sweets)
}

pub async fn fetch_sweet(pool: &PgPool, sweet_id: &str) -> AppResult<Sweet> {
    sqlx::query_as::<_, Sweet>(&format!(
        "SELECT {SWEET_COLUMNS} FROM sweets WHERE sweet_id = $1"
    ))
    .bind(sweet_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Sweet {} not found", sweet_id)))
}

pub async fn search_sweets(pool: &PgPool, filters: &SearchFilters) -> AppResult<Vec<Sweet>> {
    let sweets = sqlx::query_as::<_, Sweet>(&format!(
        r#"
        SELECT {SWEET_COLUMNS}
        FROM sweets
        WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
          AND ($2::text IS NULL OR category ILIKE '%' || $2 || '%')
          AND ($3::double precision IS NULL OR price >= $3)
          AND ($4::double precision IS NULL OR price <= $4)
        ORDER BY created_at ASC
        "#
    ))
    .bind(filters.name.as_deref())
    .bind(filters.category.as_deref())
    .bind(filters.min_price)
    .bind(filters.max_price)
    .fetch_all(pool)
    .await?;

    Ok(sweets)
}

/// `field` and `order` arrive as enums, so only known column names and
/// directions are ever interpolated into the statement.
pub async fn sort_sweets(pool: &PgPool, field: SortField, order: SortOrder) -> AppResult<Vec<Sweet>> {
    let sweets = sqlx::query_as::<_, Sweet>(&format!(
        "SELECT {SWEET_COLUMNS} FROM sweets ORDER BY {} {}, sweet_id ASC",
        field.column(),
        order.sql()
    ))
    .fetch_all(pool)
    .await?;

    Ok(sweets)
}

pub async fn count_sweets(pool: &PgPool) -> AppResult<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sweets")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

// ── Writes ────────────────────────────────────────────────────────────────────

pub async fn insert_sweet(pool: &PgPool, payload: &CreateSweet) -> AppResult<Sweet> {
    sqlx::query_as::<_, Sweet>(&format!(
        r#"
        INSERT INTO sweets (sweet_id, name, category, price, quantity, description, image)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {SWEET_COLUMNS}
        "#
    ))
    .bind(&payload.sweet_id)
    .bind(&payload.name)
    .bind(&payload.category)
    .bind(payload.price)
    .bind(payload.quantity)
    .bind(&payload.description)
    .bind(&payload.image)
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("Sweet {} already exists", payload.sweet_id))
        }
        _ => AppError::from(e),
    })
}

pub async fn update_sweet(
    pool: &PgPool,
    sweet_id: &str,
    payload: &UpdateSweet,
) -> AppResult<Sweet> {
    // Fetch existing to merge optional fields
    let existing = fetch_sweet(pool, sweet_id).await?;

    let sweet = sqlx::query_as::<_, Sweet>(&format!(
        r#"
        UPDATE sweets
        SET name        = $1,
            category    = $2,
            price       = $3,
            quantity    = $4,
            description = $5,
            image       = $6,
            updated_at  = $7
        WHERE sweet_id = $8
        RETURNING {SWEET_COLUMNS}
        "#
    ))
    .bind(payload.name.as_deref().unwrap_or(&existing.name))
    .bind(payload.category.as_deref().unwrap_or(&existing.category))
    .bind(payload.price.unwrap_or(existing.price))
    .bind(payload.quantity.unwrap_or(existing.quantity))
    .bind(payload.description.as_deref().or(existing.description.as_deref()))
    .bind(payload.image.as_deref().or(existing.image.as_deref()))
    .bind(Utc::now())
    .bind(sweet_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Sweet {} not found", sweet_id)))?;

    Ok(sweet)
}

pub async fn delete_sweet(pool: &PgPool, sweet_id: &str) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM sweets WHERE sweet_id = $1")
        .bind(sweet_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Sweet {} not found", sweet_id)));
    }
    Ok(())
}

/// Decrement stock as a single conditional update: the `quantity >= $2`
/// guard makes the check and the write one atomic statement, so concurrent
/// purchases can never drive stock negative. A failed purchase leaves the
/// row untouched.
pub async fn purchase_sweet(pool: &PgPool, sweet_id: &str, quantity: i32) -> AppResult<Sweet> {
    let updated = sqlx::query_as::<_, Sweet>(&format!(
        r#"
        UPDATE sweets
        SET quantity = quantity - $2, updated_at = now()
        WHERE sweet_id = $1 AND quantity >= $2
        RETURNING {SWEET_COLUMNS}
        "#
    ))
    .bind(sweet_id)
    .bind(quantity)
    .fetch_optional(pool)
    .await?;

    match updated {
        Some(sweet) => Ok(sweet),
        // No row matched: either the sweet is absent (404 from the fetch)
        // or there is not enough stock.
        None => {
            let existing = fetch_sweet(pool, sweet_id).await?;
            Err(AppError::InsufficientStock(format!(
                "Insufficient stock for sweet {}: requested {}, on hand {}",
                sweet_id, quantity, existing.quantity
            )))
        }
    }
}

pub async fn restock_sweet(pool: &PgPool, sweet_id: &str, quantity: i32) -> AppResult<Sweet> {
    sqlx::query_as::<_, Sweet>(&format!(
        r#"
        UPDATE sweets
        SET quantity = quantity + $2, updated_at = now()
        WHERE sweet_id = $1
        RETURNING {SWEET_COLUMNS}
        "#
    ))
    .bind(sweet_id)
    .bind(quantity)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Sweet {} not found", sweet_id)))
}
