pub mod appointments;
pub mod banners;
pub mod clients;
pub mod leads;
pub mod reviews;
pub mod services;
pub mod stats;
pub mod users;

use std::{fs, path::Path, str::FromStr};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::{
    auth::{hash_password, new_id},
    clock,
    config::{AdminSeed, Config},
    models::Role,
};

pub async fn connect(config: &Config) -> Result<SqlitePool, Box<dyn std::error::Error>> {
    ensure_sqlite_dir(&config.database_url)?;

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

pub fn ensure_sqlite_dir(db_url: &str) -> std::io::Result<()> {
    let path = if let Some(path) = db_url.strip_prefix("sqlite://") {
        Some(path)
    } else if let Some(path) = db_url.strip_prefix("sqlite:") {
        Some(path)
    } else {
        None
    };

    let Some(path) = path else {
        return Ok(());
    };

    let path = path.split('?').next().unwrap_or(path);
    if path == ":memory:" || path.is_empty() {
        return Ok(());
    }

    let path = path.strip_prefix("file:").unwrap_or(path);
    let db_path = Path::new(path);
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub async fn seed_defaults(pool: &SqlitePool, config: &Config) -> Result<(), sqlx::Error> {
    seed_admin(pool, &config.admin).await?;
    if config.seed_catalog {
        seed_catalog(pool).await?;
    }
    Ok(())
}

async fn seed_admin(pool: &SqlitePool, seed: &AdminSeed) -> Result<(), sqlx::Error> {
    let existing = sqlx::query_as::<_, (String,)>(
        "SELECT user_id FROM user_roles WHERE role = ? LIMIT 1",
    )
    .bind(Role::Admin)
    .fetch_optional(pool)
    .await?;

    if existing.is_some() {
        return Ok(());
    }

    if seed.password == "admin" {
        log::warn!("ADMIN_PASSWORD not set. Using default password 'admin'. Set ADMIN_PASSWORD in production.");
    }

    let password_hash = hash_password(&seed.password)
        .map_err(|_| sqlx::Error::Protocol("password hash failed".into()))?;

    let user_id = users::create_profile(
        pool,
        users::NewProfile {
            username: &seed.username,
            full_name: Some(&seed.display_name),
            email: seed.email.as_deref(),
            password_hash: &password_hash,
        },
    )
    .await?;
    users::grant_role(pool, &user_id, Role::Admin).await?;

    log::info!("Seeded administrator account '{}'", seed.username);
    Ok(())
}

struct CatalogEntry {
    name: &'static str,
    description: &'static str,
    category: &'static str,
    duration_minutes: i64,
    price: f64,
}

const DEFAULT_CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        name: "Hair Styling",
        description: "Professional cuts, colouring, treatments and styling for every occasion.",
        category: "Hair",
        duration_minutes: 90,
        price: 800.0,
    },
    CatalogEntry {
        name: "Makeup Artistry",
        description: "Flawless makeup for parties, events and special occasions.",
        category: "Makeup",
        duration_minutes: 120,
        price: 1500.0,
    },
    CatalogEntry {
        name: "Skincare & Facials",
        description: "Rejuvenating treatments for glowing, healthy skin.",
        category: "Skin",
        duration_minutes: 60,
        price: 600.0,
    },
    CatalogEntry {
        name: "Bridal Package",
        description: "Complete bridal beauty for your special day, trial session included.",
        category: "Bridal",
        duration_minutes: 480,
        price: 15000.0,
    },
];

async fn seed_catalog(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let now = clock::now_timestamp();
    for entry in DEFAULT_CATALOG {
        sqlx::query(
            r#"INSERT INTO services
               (id, name, description, duration_minutes, price, original_price, category, image_url, is_active, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, NULL, ?, NULL, 1, ?, ?)"#,
        )
        .bind(new_id())
        .bind(entry.name)
        .bind(entry.description)
        .bind(entry.duration_minutes)
        .bind(entry.price)
        .bind(entry.category)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;
    }

    log::info!("Seeded {} catalogue services", DEFAULT_CATALOG.len());
    Ok(())
}
