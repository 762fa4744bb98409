/// Configuration management for engagement-service
///
/// Loads configuration from environment variables.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Identity provider configuration
    pub identity: IdentityConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub http_port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Min connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Identity provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// OAuth token endpoint (password grant and code exchange)
    pub token_url: String,
    /// OAuth authorization endpoint (federated browser flow)
    pub authorize_url: String,
    /// Userinfo endpoint
    pub userinfo_url: String,
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret (absent for public clients)
    pub client_secret: Option<String>,
    /// Protected route handed back to the caller after sign-in
    #[serde(default = "default_post_login_route")]
    pub post_login_route: String,
}

// Default values
fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_post_login_route() -> String {
    "/dashboard".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8011),
        };

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .context("DATABASE_URL environment variable not set")?,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_max_connections),
            min_connections: std::env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_min_connections),
        };

        let identity = IdentityConfig {
            token_url: std::env::var("IDENTITY_TOKEN_URL")
                .context("IDENTITY_TOKEN_URL environment variable not set")?,
            authorize_url: std::env::var("IDENTITY_AUTHORIZE_URL")
                .context("IDENTITY_AUTHORIZE_URL environment variable not set")?,
            userinfo_url: std::env::var("IDENTITY_USERINFO_URL")
                .context("IDENTITY_USERINFO_URL environment variable not set")?,
            client_id: std::env::var("IDENTITY_CLIENT_ID")
                .context("IDENTITY_CLIENT_ID environment variable not set")?,
            client_secret: std::env::var("IDENTITY_CLIENT_SECRET").ok(),
            post_login_route: std::env::var("POST_LOGIN_ROUTE")
                .unwrap_or_else(|_| default_post_login_route()),
        };

        Ok(Config {
            app,
            database,
            identity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::set_var("IDENTITY_TOKEN_URL", "https://id.example.com/token");
        std::env::set_var("IDENTITY_AUTHORIZE_URL", "https://id.example.com/authorize");
        std::env::set_var("IDENTITY_USERINFO_URL", "https://id.example.com/userinfo");
        std::env::set_var("IDENTITY_CLIENT_ID", "test-client");

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.host, "0.0.0.0");
        assert_eq!(config.app.http_port, 8011);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.database.min_connections, 5);
        assert_eq!(config.identity.post_login_route, "/dashboard");
        assert_eq!(config.identity.client_id, "test-client");
    }
}
