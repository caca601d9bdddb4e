use sqlx::SqlitePool;

use crate::{
    auth::new_id,
    clock,
    models::{Service, ServiceDraft},
};

const SERVICE_COLUMNS: &str = "id, name, description, duration_minutes, price, original_price, \
     category, image_url, is_active, created_at, updated_at";

pub async fn list(pool: &SqlitePool) -> Result<Vec<Service>, sqlx::Error> {
    sqlx::query_as::<_, Service>(&format!("SELECT {SERVICE_COLUMNS} FROM services ORDER BY name"))
        .fetch_all(pool)
        .await
}

pub async fn list_active(pool: &SqlitePool) -> Result<Vec<Service>, sqlx::Error> {
    sqlx::query_as::<_, Service>(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services WHERE is_active = 1 ORDER BY name"
    ))
    .fetch_all(pool)
    .await
}

pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<Service>, sqlx::Error> {
    sqlx::query_as::<_, Service>(&format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_active(pool: &SqlitePool, id: &str) -> Result<Option<Service>, sqlx::Error> {
    Ok(get(pool, id).await?.filter(|service| service.is_active))
}

pub async fn insert(pool: &SqlitePool, draft: &ServiceDraft) -> Result<Service, sqlx::Error> {
    let id = new_id();
    let now = clock::now_timestamp();
    sqlx::query(
        r#"INSERT INTO services
           (id, name, description, duration_minutes, price, original_price, category, image_url, is_active, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&id)
    .bind(&draft.name)
    .bind(&draft.description)
    .bind(draft.duration_minutes)
    .bind(draft.price)
    .bind(draft.original_price)
    .bind(&draft.category)
    .bind(&draft.image_url)
    .bind(draft.is_active)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    get(pool, &id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn update(
    pool: &SqlitePool,
    id: &str,
    draft: &ServiceDraft,
) -> Result<Option<Service>, sqlx::Error> {
    let result = sqlx::query(
        r#"UPDATE services
           SET name = ?, description = ?, duration_minutes = ?, price = ?, original_price = ?,
               category = ?, image_url = ?, is_active = ?, updated_at = ?
           WHERE id = ?"#,
    )
    .bind(&draft.name)
    .bind(&draft.description)
    .bind(draft.duration_minutes)
    .bind(draft.price)
    .bind(draft.original_price)
    .bind(&draft.category)
    .bind(&draft.image_url)
    .bind(draft.is_active)
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
    let result = sqlx::query("DELETE FROM services WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
