use sqlx::SqlitePool;

use crate::{
    auth::new_id,
    clock,
    models::{Review, ReviewDraft},
};

const REVIEW_COLUMNS: &str =
    "id, full_name, email, rating, review_text, is_approved, created_at, updated_at";

pub async fn list(pool: &SqlitePool) -> Result<Vec<Review>, sqlx::Error> {
    sqlx::query_as::<_, Review>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn list_approved(pool: &SqlitePool, limit: i64) -> Result<Vec<Review>, sqlx::Error> {
    sqlx::query_as::<_, Review>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews WHERE is_approved = 1 ORDER BY created_at DESC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<Review>, sqlx::Error> {
    sqlx::query_as::<_, Review>(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Public submission; stays hidden until approved.
pub async fn insert(pool: &SqlitePool, draft: &ReviewDraft) -> Result<Review, sqlx::Error> {
    let id = new_id();
    let now = clock::now_timestamp();
    sqlx::query(
        r#"INSERT INTO reviews (id, full_name, email, rating, review_text, is_approved, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, 0, ?, ?)"#,
    )
    .bind(&id)
    .bind(&draft.full_name)
    .bind(&draft.email)
    .bind(draft.rating)
    .bind(&draft.review_text)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    get(pool, &id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn approve(pool: &SqlitePool, id: &str) -> Result<Option<Review>, sqlx::Error> {
    let result = sqlx::query("UPDATE reviews SET is_approved = 1, updated_at = ? WHERE id = ?")
        .bind(clock::now_timestamp())
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get(pool, id).await
}

pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
