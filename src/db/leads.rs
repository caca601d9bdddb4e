use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{
    auth::new_id,
    clock,
    models::{Lead, LeadDraft, LeadStatus},
};

const LEAD_COLUMNS: &str = "id, full_name, phone, email, service_interested, preferred_date, \
     message, status, follow_up_date, created_at, updated_at";

pub async fn list(pool: &SqlitePool) -> Result<Vec<Lead>, sqlx::Error> {
    sqlx::query_as::<_, Lead>(&format!(
        "SELECT {LEAD_COLUMNS} FROM leads ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<Lead>, sqlx::Error> {
    sqlx::query_as::<_, Lead>(&format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Public capture. Every new lead starts as [`LeadStatus::New`] without a
/// follow-up date.
pub async fn insert(pool: &SqlitePool, draft: &LeadDraft) -> Result<Lead, sqlx::Error> {
    let id = new_id();
    let now = clock::now_timestamp();
    sqlx::query(
        r#"INSERT INTO leads
           (id, full_name, phone, email, service_interested, preferred_date, message, status, follow_up_date, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?)"#,
    )
    .bind(&id)
    .bind(&draft.full_name)
    .bind(&draft.phone)
    .bind(&draft.email)
    .bind(&draft.service_interested)
    .bind(&draft.preferred_date)
    .bind(&draft.message)
    .bind(LeadStatus::New)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    get(pool, &id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn update_status(
    pool: &SqlitePool,
    id: &str,
    status: LeadStatus,
) -> Result<Option<Lead>, sqlx::Error> {
    let result = sqlx::query("UPDATE leads SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(clock::now_timestamp())
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get(pool, id).await
}

/// Sets or clears (`None`) the follow-up date.
pub async fn set_follow_up(
    pool: &SqlitePool,
    id: &str,
    follow_up: Option<DateTime<Utc>>,
) -> Result<Option<Lead>, sqlx::Error> {
    let result = sqlx::query("UPDATE leads SET follow_up_date = ?, updated_at = ? WHERE id = ?")
        .bind(follow_up.map(clock::to_db_timestamp))
        .bind(clock::now_timestamp())
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get(pool, id).await
}

/// Leads whose follow-up falls inside `[start, end)`, earliest first.
pub async fn follow_ups_between(
    pool: &SqlitePool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Lead>, sqlx::Error> {
    sqlx::query_as::<_, Lead>(&format!(
        r#"SELECT {LEAD_COLUMNS} FROM leads
           WHERE follow_up_date >= ? AND follow_up_date < ?
           ORDER BY follow_up_date ASC"#
    ))
    .bind(clock::to_db_timestamp(start))
    .bind(clock::to_db_timestamp(end))
    .fetch_all(pool)
    .await
}
