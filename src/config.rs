//! Configuration module
//!
//! Runtime settings for the admin backend, loaded from environment
//! variables (a local `.env` is picked up by dotenvy in `main`).

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection URL for the catalog/orders database
    pub database_url: String,

    /// Maximum connections in the sqlx pool
    pub database_max_connections: u32,

    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Default and maximum page size for the cursor-paginated catalog and
    /// order list endpoints
    pub page_size: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let page_size = env::var("PAGE_SIZE")
            .unwrap_or_else(|_| "50".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PAGE_SIZE"))?;
        if page_size < 1 {
            return Err(ConfigError::InvalidValue("PAGE_SIZE"));
        }

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            page_size,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            database_url: "postgres://localhost/suppstore".to_string(),
            database_max_connections: 10,
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: "development".to_string(),
            page_size: 50,
        }
    }

    #[test]
    fn test_is_production() {
        let mut config = sample();
        assert!(!config.is_production());
        config.environment = "production".to_string();
        assert!(config.is_production());
    }
}
