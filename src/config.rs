use std::{env, path::PathBuf, str::FromStr};

use chrono::FixedOffset;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://./data/glow.db";
const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("BUSINESS_UTC_OFFSET_MINUTES out of range: {0}")]
    OffsetOutOfRange(i32),
}

#[derive(Clone, Debug)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub email: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    pub business_offset: FixedOffset,
    pub max_upload_bytes: usize,
    pub seed_catalog: bool,
    pub admin: AdminSeed,
}

impl Config {
    /// Reads the service configuration from the environment, after loading
    /// an optional `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let offset_minutes =
            parse_var("BUSINESS_UTC_OFFSET_MINUTES", "integer", DEFAULT_UTC_OFFSET_MINUTES)?;

        Ok(Self {
            database_url: string_var("DATABASE_URL", DEFAULT_DATABASE_URL),
            host: string_var("HOST", "0.0.0.0"),
            port: parse_var("PORT", "port number", 8080)?,
            upload_dir: PathBuf::from(string_var("UPLOAD_DIR", "./data/uploads")),
            static_dir: PathBuf::from(string_var("STATIC_DIR", "./static")),
            business_offset: offset_from_minutes(offset_minutes)?,
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", "byte count", DEFAULT_MAX_UPLOAD_BYTES)?,
            seed_catalog: parse_var("SEED_CATALOG", "boolean", true)?,
            admin: AdminSeed {
                username: string_var("ADMIN_USER", "admin"),
                password: string_var("ADMIN_PASSWORD", "admin"),
                display_name: string_var("ADMIN_DISPLAY_NAME", "Studio Admin"),
                email: env::var("ADMIN_EMAIL").ok().filter(|value| !value.trim().is_empty()),
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn offset_from_minutes(minutes: i32) -> Result<FixedOffset, ConfigError> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or(ConfigError::OffsetOutOfRange(minutes))
}

fn string_var(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
        Err(_) => Ok(default),
    }
}
