/// Configuration management for Channel Service
///
/// Loads configuration from environment variables.
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub pagination: PaginationConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    pub http_port: u16,
    /// Allowed CORS origin; `None` allows any origin
    pub cors_origin: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    /// Required when `backend` is postgres
    pub url: Option<String>,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetBackend {
    Local,
    S3,
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: AssetBackend,
    /// Scratch directory for incoming multipart files
    pub upload_dir: String,
    /// Root directory of the local asset store
    pub local_root: String,
    /// Base URL local assets are served from
    pub local_base_url: String,
}

/// Token validation settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 shared secret
    pub jwt_secret: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_limit")]
    pub default_limit: u32,
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_page_limit(),
            max_page_limit: default_max_page_limit(),
        }
    }
}

// Default values
fn default_http_port() -> u16 {
    8010
}

fn default_page_limit() -> u32 {
    10
}

fn default_max_page_limit() -> u32 {
    100
}

fn default_upload_dir() -> String {
    std::env::temp_dir()
        .join("channel-service-uploads")
        .to_string_lossy()
        .into_owned()
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env_parse("PORT").unwrap_or_else(default_http_port),
            cors_origin: std::env::var("CORS_ORIGIN").ok().filter(|s| !s.is_empty()),
        };

        let backend = match std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            "postgres" => StoreBackend::Postgres,
            other => bail!("unsupported STORE_BACKEND: {}", other),
        };
        let url = std::env::var("DATABASE_URL").ok();
        if backend == StoreBackend::Postgres && url.is_none() {
            bail!("DATABASE_URL environment variable not set (required by STORE_BACKEND=postgres)");
        }
        let database = DatabaseConfig {
            backend,
            url,
            run_migrations: env_parse("RUN_MIGRATIONS").unwrap_or(true),
        };

        let storage = StorageConfig {
            backend: match std::env::var("ASSET_BACKEND")
                .unwrap_or_else(|_| "local".to_string())
                .to_lowercase()
                .as_str()
            {
                "local" => AssetBackend::Local,
                "s3" => AssetBackend::S3,
                other => bail!("unsupported ASSET_BACKEND: {}", other),
            },
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| default_upload_dir()),
            local_root: std::env::var("LOCAL_ASSET_ROOT").unwrap_or_else(|_| "./public/assets".to_string()),
            local_base_url: std::env::var("LOCAL_ASSET_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8010/assets".to_string()),
        };

        let auth = AuthConfig {
            jwt_secret: std::env::var("JWT_SECRET")
                .context("JWT_SECRET environment variable not set")?,
        };

        let pagination = PaginationConfig {
            default_limit: env_parse("PAGE_DEFAULT_LIMIT").unwrap_or_else(default_page_limit),
            max_page_limit: env_parse("PAGE_MAX_LIMIT").unwrap_or_else(default_max_page_limit),
        };

        Ok(Config {
            app,
            database,
            storage,
            auth,
            pagination,
        })
    }
}
