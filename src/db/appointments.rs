use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    auth::new_id,
    clock,
    models::{
        AppointmentDetail, AppointmentDraft, AppointmentStatus, PaymentStatus, StatusChoice,
        TextEnum,
    },
};

const DETAIL_SELECT: &str = r#"SELECT a.id, a.client_id, a.service_id, a.appointment_date, a.status,
                  a.payment_amount, a.payment_status, a.notes, a.created_by,
                  a.created_at, a.updated_at,
                  c.full_name AS client_name, s.name AS service_name, s.price AS service_price
           FROM appointments a
           JOIN clients c ON c.id = a.client_id
           JOIN services s ON s.id = a.service_id"#;

pub async fn list(
    pool: &SqlitePool,
    status: Option<AppointmentStatus>,
) -> Result<Vec<AppointmentDetail>, sqlx::Error> {
    match status {
        Some(status) => {
            sqlx::query_as::<_, AppointmentDetail>(&format!(
                "{DETAIL_SELECT} WHERE a.status = ? ORDER BY a.appointment_date DESC"
            ))
            .bind(status)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, AppointmentDetail>(&format!(
                "{DETAIL_SELECT} ORDER BY a.appointment_date DESC"
            ))
            .fetch_all(pool)
            .await
        }
    }
}

pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<AppointmentDetail>, sqlx::Error> {
    sqlx::query_as::<_, AppointmentDetail>(&format!("{DETAIL_SELECT} WHERE a.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Inserts the appointment; the store rejects unknown client or service ids.
pub async fn insert(
    pool: &SqlitePool,
    draft: &AppointmentDraft,
    created_by: Option<&str>,
) -> Result<AppointmentDetail, sqlx::Error> {
    let id = new_id();
    let now = clock::now_timestamp();
    sqlx::query(
        r#"INSERT INTO appointments
           (id, client_id, service_id, appointment_date, status, payment_amount, payment_status, notes, created_by, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&id)
    .bind(&draft.client_id)
    .bind(&draft.service_id)
    .bind(&draft.appointment_date)
    .bind(draft.status)
    .bind(draft.payment_amount)
    .bind(draft.payment_status)
    .bind(&draft.notes)
    .bind(created_by)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    get(pool, &id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn update(
    pool: &SqlitePool,
    id: &str,
    draft: &AppointmentDraft,
) -> Result<Option<AppointmentDetail>, sqlx::Error> {
    let result = sqlx::query(
        r#"UPDATE appointments
           SET client_id = ?, service_id = ?, appointment_date = ?, status = ?,
               payment_amount = ?, payment_status = ?, notes = ?, updated_at = ?
           WHERE id = ?"#,
    )
    .bind(&draft.client_id)
    .bind(&draft.service_id)
    .bind(&draft.appointment_date)
    .bind(draft.status)
    .bind(draft.payment_amount)
    .bind(draft.payment_status)
    .bind(&draft.notes)
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
    let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

/// Select options for the appointment form.
#[derive(Debug, Clone, Serialize)]
pub struct FormOptions {
    pub clients: Vec<Choice>,
    pub services: Vec<Choice>,
    pub statuses: Vec<StatusChoice>,
    pub payment_statuses: Vec<StatusChoice>,
}

pub async fn form_options(pool: &SqlitePool) -> Result<FormOptions, sqlx::Error> {
    let clients = sqlx::query_as::<_, Choice>(
        "SELECT id, full_name AS label FROM clients ORDER BY full_name",
    )
    .fetch_all(pool)
    .await?;
    let services = sqlx::query_as::<_, Choice>(
        "SELECT id, name AS label FROM services WHERE is_active = 1 ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(FormOptions {
        clients,
        services,
        statuses: AppointmentStatus::choices(),
        payment_statuses: PaymentStatus::choices(),
    })
}
