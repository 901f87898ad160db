use crate::core::calendar::DEFAULT_UTC_OFFSET_HOURS;
use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;

pub mod database;
pub mod server;

pub use database::{DatabaseConfig, StoreBackend};
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_format: LogFormat,
    /// Business timezone used to decide "today" for due dates
    pub utc_offset_hours: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    pub url: String,
    pub api_key: String,
    /// Registration gate; hashed at startup
    pub access_code: String,
    pub admin_role: String,
    pub max_retries: u32,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("url", &self.url)
            .field("api_key", &"***")
            .field("access_code", &"***")
            .field("admin_role", &self.admin_role)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_format: match env::var("LOG_FORMAT")
                    .unwrap_or_else(|_| "pretty".to_string())
                    .to_ascii_lowercase()
                    .as_str()
                {
                    "pretty" => LogFormat::Pretty,
                    "json" => LogFormat::Json,
                    other => {
                        return Err(AppError::Configuration(format!(
                            "Invalid LOG_FORMAT: {}",
                            other
                        )))
                    }
                },
                utc_offset_hours: env::var("APP_UTC_OFFSET_HOURS")
                    .unwrap_or_else(|_| DEFAULT_UTC_OFFSET_HOURS.to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid APP_UTC_OFFSET_HOURS".to_string())
                    })?,
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            auth: AuthConfig {
                url: env::var("AUTH_URL")
                    .map_err(|_| AppError::Configuration("AUTH_URL not set".to_string()))?,
                api_key: env::var("AUTH_API_KEY")
                    .map_err(|_| AppError::Configuration("AUTH_API_KEY not set".to_string()))?,
                access_code: env::var("ACCESS_CODE")
                    .map_err(|_| AppError::Configuration("ACCESS_CODE not set".to_string()))?,
                admin_role: env::var("ADMIN_ROLE")
                    .unwrap_or_else(|_| "Administrador".to_string()),
                max_retries: env::var("AUTH_MAX_RETRIES")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid AUTH_MAX_RETRIES".to_string())
                    })?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(-12..=14).contains(&self.app.utc_offset_hours) {
            return Err(AppError::Configuration(format!(
                "APP_UTC_OFFSET_HOURS out of range: {}",
                self.app.utc_offset_hours
            )));
        }

        self.database.validate()?;

        if self.server.workers == 0 {
            return Err(AppError::Configuration(
                "SERVER_WORKERS must be greater than 0".to_string(),
            ));
        }

        if !self.auth.url.starts_with("http://") && !self.auth.url.starts_with("https://") {
            return Err(AppError::Configuration(format!(
                "AUTH_URL must be an http(s) URL: {}",
                self.auth.url
            )));
        }

        if self.auth.access_code.trim().is_empty() {
            return Err(AppError::Configuration("ACCESS_CODE must not be empty".to_string()));
        }

        if self.auth.admin_role.trim().is_empty() {
            return Err(AppError::Configuration("ADMIN_ROLE must not be empty".to_string()));
        }

        Ok(())
    }
}
