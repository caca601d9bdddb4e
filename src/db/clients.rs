use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    auth::new_id,
    clock,
    models::{AppointmentStatus, Client, ClientDraft},
};

const CLIENT_COLUMNS: &str =
    "id, full_name, email, phone, address, notes, created_at, updated_at";

pub async fn list(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<Client>, sqlx::Error> {
    let search = search.map(str::trim).filter(|term| !term.is_empty());
    match search {
        Some(term) => {
            let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
            sqlx::query_as::<_, Client>(&format!(
                r#"SELECT {CLIENT_COLUMNS} FROM clients
                   WHERE lower(full_name) LIKE ?1 ESCAPE '\'
                      OR lower(coalesce(email, '')) LIKE ?1 ESCAPE '\'
                      OR coalesce(phone, '') LIKE ?1 ESCAPE '\'
                   ORDER BY created_at DESC"#
            ))
            .bind(pattern)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Client>(&format!(
                "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY created_at DESC"
            ))
            .fetch_all(pool)
            .await
        }
    }
}

/// The search box is a plain substring match, so LIKE wildcards typed by the
/// admin are matched literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<Client>, sqlx::Error> {
    sqlx::query_as::<_, Client>(&format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert(pool: &SqlitePool, draft: &ClientDraft) -> Result<Client, sqlx::Error> {
    let id = new_id();
    let now = clock::now_timestamp();
    sqlx::query(
        r#"INSERT INTO clients (id, full_name, email, phone, address, notes, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&id)
    .bind(&draft.full_name)
    .bind(&draft.email)
    .bind(&draft.phone)
    .bind(&draft.address)
    .bind(&draft.notes)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    get(pool, &id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn update(
    pool: &SqlitePool,
    id: &str,
    draft: &ClientDraft,
) -> Result<Option<Client>, sqlx::Error> {
    let result = sqlx::query(
        r#"UPDATE clients
           SET full_name = ?, email = ?, phone = ?, address = ?, notes = ?, updated_at = ?
           WHERE id = ?"#,
    )
    .bind(&draft.full_name)
    .bind(&draft.email)
    .bind(&draft.phone)
    .bind(&draft.address)
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

/// Returns whether a row was removed. Appointments still pointing at the
/// client make the store refuse the delete.
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM clients WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClientAppointment {
    pub id: String,
    pub appointment_date: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub service_name: String,
    pub service_price: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientProfile {
    pub client: Client,
    pub appointments: Vec<ClientAppointment>,
    pub total_spent: f64,
    pub completed_count: usize,
    pub upcoming_count: usize,
}

impl ClientProfile {
    pub fn new(client: Client, appointments: Vec<ClientAppointment>) -> Self {
        let completed = appointments
            .iter()
            .filter(|appointment| appointment.status == AppointmentStatus::Completed);
        let total_spent = completed.clone().map(|appointment| appointment.service_price).sum();
        let completed_count = completed.count();
        let upcoming_count = appointments
            .iter()
            .filter(|appointment| {
                matches!(
                    appointment.status,
                    AppointmentStatus::Scheduled | AppointmentStatus::Confirmed
                )
            })
            .count();

        Self {
            client,
            appointments,
            total_spent,
            completed_count,
            upcoming_count,
        }
    }
}

pub async fn profile(pool: &SqlitePool, id: &str) -> Result<Option<ClientProfile>, sqlx::Error> {
    let Some(client) = get(pool, id).await? else {
        return Ok(None);
    };

    let appointments = sqlx::query_as::<_, ClientAppointment>(
        r#"SELECT a.id, a.appointment_date, a.status, a.notes,
                  s.name AS service_name, s.price AS service_price
           FROM appointments a
           JOIN services s ON s.id = a.service_id
           WHERE a.client_id = ?
           ORDER BY a.appointment_date DESC"#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(ClientProfile::new(client, appointments)))
}
