use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    clock,
    db::leads,
    models::{Lead, PaymentStatus},
};

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_clients: i64,
    pub total_services: i64,
    pub total_appointments: i64,
    pub today_appointments: i64,
    pub today_revenue: f64,
    pub monthly_revenue: f64,
    pub todays_follow_ups: Vec<Lead>,
}

pub async fn dashboard(
    pool: &SqlitePool,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<DashboardStats, sqlx::Error> {
    let (day_start, day_end) = clock::day_bounds(now, offset);
    let (month_start, month_end) = clock::month_bounds(now, offset);

    Ok(DashboardStats {
        total_clients: count(pool, "SELECT COUNT(*) FROM clients").await?,
        total_services: count(pool, "SELECT COUNT(*) FROM services").await?,
        total_appointments: count(pool, "SELECT COUNT(*) FROM appointments").await?,
        today_appointments: appointments_between(pool, day_start, day_end).await?,
        today_revenue: paid_revenue_between(pool, day_start, day_end).await?,
        monthly_revenue: paid_revenue_between(pool, month_start, month_end).await?,
        todays_follow_ups: leads::follow_ups_between(pool, day_start, day_end).await?,
    })
}

async fn count(pool: &SqlitePool, query: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(query).fetch_one(pool).await
}

async fn appointments_between(
    pool: &SqlitePool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM appointments WHERE appointment_date >= ? AND appointment_date < ?",
    )
    .bind(clock::to_db_timestamp(start))
    .bind(clock::to_db_timestamp(end))
    .fetch_one(pool)
    .await
}

/// Sum of `payment_amount` over paid appointments dated inside `[start, end)`.
async fn paid_revenue_between(
    pool: &SqlitePool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<f64, sqlx::Error> {
    sqlx::query_scalar::<_, f64>(
        r#"SELECT COALESCE(SUM(payment_amount), 0.0) FROM appointments
           WHERE payment_status = ? AND appointment_date >= ? AND appointment_date < ?"#,
    )
    .bind(PaymentStatus::Paid)
    .bind(clock::to_db_timestamp(start))
    .bind(clock::to_db_timestamp(end))
    .fetch_one(pool)
    .await
}
