//! Runtime configuration loaded from the environment (and `.env` when present)

use std::env;

use crate::error::AppError;

/// Two weeks, matching a typical server-side session cookie age
const DEFAULT_SESSION_IDLE_SECS: u64 = 1_209_600;

const DEFAULT_SESSION_MAX_CAPACITY: u64 = 100_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub session_idle_secs: u64,
    pub session_max_capacity: u64,
    pub mail_from: String,
    pub run_migrations: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL must be set".to_string()))?;

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = parse_var("SERVER_PORT", 3000u16)?;
        let session_idle_secs = parse_var("SESSION_IDLE_SECS", DEFAULT_SESSION_IDLE_SECS)?;
        let session_max_capacity =
            parse_var("SESSION_MAX_CAPACITY", DEFAULT_SESSION_MAX_CAPACITY)?;
        let mail_from =
            env::var("MAIL_FROM").unwrap_or_else(|_| "noreply@storefront.local".to_string());
        let run_migrations = parse_var("RUN_MIGRATIONS", true)?;

        tracing::info!("Config loaded");

        Ok(Self {
            database_url,
            server_host,
            server_port,
            session_idle_secs,
            session_max_capacity,
            mail_from,
            run_migrations,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}
