/// Configuration management for the feed service.
///
/// Everything the service needs - signing secret, store backend, upload
/// directory - is loaded here and injected at construction; nothing reads
/// ambient process state later.
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub store: StoreConfig,
    pub assets: AssetConfig,
    pub feed: FeedConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Credential configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret for bearer tokens
    pub jwt_secret: String,
}

/// Document-store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend selector: "postgres" or "memory"
    pub backend: String,
    /// Database URL (postgres backend)
    pub database_url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Asset-store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Directory uploads are written to
    pub upload_dir: String,
    /// Public path prefix posts reference images under
    pub public_base: String,
    /// Reserved placeholder asset, never deleted
    pub placeholder: String,
}

/// Feed behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Posts per page
    pub page_size: i64,
    /// Broadcast channel capacity for mutation events
    pub event_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("FEED_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("FEED_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "*".to_string(),
                };

                if app_env.eq_ignore_ascii_case("production") && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            auth: {
                let jwt_secret = match std::env::var("JWT_SECRET") {
                    Ok(value) if !value.trim().is_empty() => value,
                    Ok(_) | Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("JWT_SECRET must be set in production".to_string())
                    }
                    _ => "feedline-dev-secret".to_string(),
                };

                AuthConfig { jwt_secret }
            },
            store: StoreConfig {
                backend: std::env::var("STORE_BACKEND").unwrap_or_else(|_| "postgres".to_string()),
                database_url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/feedline".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            assets: AssetConfig {
                upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "images".to_string()),
                public_base: std::env::var("ASSET_PUBLIC_BASE")
                    .unwrap_or_else(|_| "/image".to_string()),
                placeholder: std::env::var("PLACEHOLDER_IMAGE")
                    .unwrap_or_else(|_| "/image/dummy.png".to_string()),
            },
            feed: FeedConfig {
                page_size: std::env::var("PAGE_SIZE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(2),
                event_capacity: std::env::var("FEED_EVENT_CAPACITY")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(64),
            },
        })
    }
}
