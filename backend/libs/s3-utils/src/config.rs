/// S3 configuration shared across services
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,
    /// AWS region
    pub region: String,
    /// Base URL objects are served from (CDN domain or bucket endpoint)
    pub base_url: String,
    /// Custom endpoint (MinIO, LocalStack); `None` uses AWS
    pub endpoint: Option<String>,
    /// Whether to use path-style addressing against the endpoint
    pub path_style: bool,
    /// Prefix prepended to every object key
    pub key_prefix: String,
}

impl S3Config {
    /// Load S3 configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bucket: std::env::var("S3_BUCKET").unwrap_or_else(|_| "channel-media".to_string()),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            base_url: std::env::var("S3_BASE_URL")
                .unwrap_or_else(|_| "https://channel-media.s3.amazonaws.com".to_string()),
            endpoint: std::env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            path_style: std::env::var("S3_PATH_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            key_prefix: std::env::var("S3_KEY_PREFIX").unwrap_or_else(|_| "uploads".to_string()),
        }
    }

    /// Full object key for a file name
    pub fn object_key(&self, name: &str) -> String {
        let prefix = self.key_prefix.trim_matches('/');
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", prefix, name)
        }
    }

    /// Public URL of an object
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Recover the object key from a URL produced by [`S3Config::object_url`].
    ///
    /// Returns `None` for URLs served from another origin or without a key.
    pub fn key_from_url(&self, url: &str) -> Option<String> {
        let base = self.base_url.trim_end_matches('/');
        let rest = url.strip_prefix(base)?.strip_prefix('/')?;
        let key = rest.split(['?', '#']).next().unwrap_or_default();
        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }
}
