use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::Context;
use uuid::Uuid;

/// Id of the seeded `teaspoon` unit, see `migrations/0001_init.sql`.
pub const SEEDED_DEFAULT_UNIT_ID: &str = "994e5e0d-790d-48ac-8e77-2a8a089b3cf2";

#[derive(Debug, Clone)]
pub struct PaginationConfig {
    pub default_per_page: i64,
    pub max_per_page: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub pagination: PaginationConfig,
    pub default_random_recipes: i64,
    pub default_unit_id: Uuid,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let max_per_page = env_or("MAX_PER_PAGE", 50_i64).max(1);
        let default_per_page = env_or("DEFAULT_PER_PAGE", 20_i64).clamp(1, max_per_page);

        let default_unit_id = match std::env::var("DEFAULT_UNIT_ID") {
            Ok(raw) => Uuid::parse_str(raw.trim()).context("DEFAULT_UNIT_ID is not a valid uuid")?,
            Err(_) => Uuid::parse_str(SEEDED_DEFAULT_UNIT_ID)?,
        };

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 8080_u16),
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10_u32),
            pagination: PaginationConfig {
                default_per_page,
                max_per_page,
            },
            default_random_recipes: env_or("DEFAULT_RANDOM_RECIPES", 7_i64).max(1),
            default_unit_id,
        })
    }
}

impl AppConfig {
    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
