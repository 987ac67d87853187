use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ApiIngressConfig {
    pub bind_addr: String,
    /// Serve the route catalog at `/openapi.json`.
    pub enable_docs: bool,
    pub cors_enabled: bool,
    /// HS256 secret for bearer tokens. A random per-process secret is used
    /// when empty, so tokens do not survive a restart.
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            enable_docs: false,
            cors_enabled: false,
            jwt_secret: String::new(),
            token_ttl_hours: 24 * 7,
            request_timeout_secs: 30,
            body_limit_bytes: 16 * 1024 * 1024,
        }
    }
}
