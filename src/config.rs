use serde::{Deserialize, Serialize};

use crate::service::matcher::MatchOptions;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub matching: MatchOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgres://localhost/tender_match".to_string()),
            },
            matching: MatchOptions::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = MatchOptions::default();
        Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgres://localhost/tender_match".to_string()),
            },
            matching: MatchOptions {
                fuzzy_threshold: env_or("MATCH_FUZZY_THRESHOLD", defaults.fuzzy_threshold),
                low_confidence_threshold: env_or(
                    "MATCH_LOW_CONFIDENCE_THRESHOLD",
                    defaults.low_confidence_threshold,
                ),
                enable_fuzzy_matching: env_or(
                    "MATCH_ENABLE_FUZZY",
                    defaults.enable_fuzzy_matching,
                ),
                max_suggestions: env_or("MATCH_MAX_SUGGESTIONS", defaults.max_suggestions),
            },
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
