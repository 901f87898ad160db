use crate::core::{AppError, Result};
use serde::Deserialize;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which record-store implementation backs the repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mysql,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(StoreBackend::Mysql),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(AppError::Configuration(format!(
                "Invalid STORE_BACKEND: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    /// Required for the MySQL backend only
    pub url: Option<String>,
    pub pool_size: u32,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        Ok(DatabaseConfig {
            backend: env::var("STORE_BACKEND")
                .unwrap_or_else(|_| "mysql".to_string())
                .parse()?,
            url: env::var("DATABASE_URL").ok().filter(|u| !u.trim().is_empty()),
            pool_size: env::var("DATABASE_POOL_SIZE")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| {
                    AppError::Configuration("Invalid DATABASE_POOL_SIZE".to_string())
                })?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| {
                    AppError::Configuration("Invalid DATABASE_MAX_CONNECTIONS".to_string())
                })?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend == StoreBackend::Mysql && self.url.is_none() {
            return Err(AppError::Configuration(
                "DATABASE_URL not set (required when STORE_BACKEND=mysql)".to_string(),
            ));
        }

        if self.pool_size > self.max_connections {
            return Err(AppError::Configuration(
                "DATABASE_POOL_SIZE must not exceed DATABASE_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(())
    }

    /// Create a MySQL connection pool
    pub async fn create_pool(&self) -> Result<MySqlPool> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| AppError::Configuration("DATABASE_URL not set".to_string()))?;

        MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.pool_size)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .test_before_acquire(true)
            .connect(url)
            .await
            .map_err(AppError::Database)
    }
}
