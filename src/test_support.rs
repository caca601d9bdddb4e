use std::{path::Path, str::FromStr};

use chrono::FixedOffset;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::{
    config::{AdminSeed, Config},
    db,
    models::{AppointmentStatus, Client, ClientDraft, Service, ServiceDraft},
    state::AppState,
};

/// `admin:secret`, matching [`config`].
pub const ADMIN_BASIC_AUTH: (&str, &str) = ("Authorization", "Basic YWRtaW46c2VjcmV0");

pub async fn pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

pub fn config() -> Config {
    config_with_uploads(Path::new("./data/test-uploads"))
}

pub fn config_with_uploads(upload_dir: &Path) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        upload_dir: upload_dir.to_path_buf(),
        static_dir: "./static".into(),
        business_offset: FixedOffset::east_opt(330 * 60).unwrap(),
        max_upload_bytes: 1024,
        seed_catalog: true,
        admin: AdminSeed {
            username: "admin".to_string(),
            password: "secret".to_string(),
            display_name: "Test Admin".to_string(),
            email: None,
        },
    }
}

/// Migrated store with the administrator seeded and an empty catalogue.
pub async fn state_with(config: Config) -> AppState {
    let pool = pool().await;
    let mut seed = config.clone();
    seed.seed_catalog = false;
    db::seed_defaults(&pool, &seed).await.unwrap();
    AppState::new(pool, config)
}

pub async fn state() -> AppState {
    state_with(config()).await
}

pub async fn client(pool: &SqlitePool, name: &str) -> Client {
    db::clients::insert(
        pool,
        &ClientDraft {
            full_name: name.to_string(),
            email: None,
            phone: None,
            address: None,
            notes: None,
        },
    )
    .await
    .unwrap()
}

pub async fn service(pool: &SqlitePool, name: &str, price: f64) -> Service {
    db::services::insert(
        pool,
        &ServiceDraft {
            name: name.to_string(),
            description: None,
            duration_minutes: 60,
            price,
            original_price: None,
            category: None,
            image_url: None,
            is_active: true,
        },
    )
    .await
    .unwrap()
}

pub async fn appointment(
    pool: &SqlitePool,
    client_id: &str,
    service_id: &str,
    status: AppointmentStatus,
) -> String {
    let stored = db::appointments::insert(
        pool,
        &crate::models::AppointmentDraft {
            client_id: client_id.to_string(),
            service_id: service_id.to_string(),
            appointment_date: "2026-05-01T05:00:00Z".to_string(),
            status,
            payment_amount: 0.0,
            payment_status: Default::default(),
            notes: None,
        },
        None,
    )
    .await
    .unwrap();
    stored.appointment.id
}
