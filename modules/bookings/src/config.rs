use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookingsConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub razorpay: RazorpayConfig,
}

impl Default for BookingsConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            razorpay: RazorpayConfig::default(),
        }
    }
}

/// Credentials for the hosted payment API. Usually supplied through
/// `APP__MODULES__BOOKINGS__RAZORPAY__*` rather than the YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RazorpayConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub key_id: String,
    #[serde(default)]
    pub key_secret: String,
    /// Falls back to `key_secret` when unset.
    #[serde(default)]
    pub webhook_secret: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RazorpayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            key_id: String::new(),
            key_secret: String::new(),
            webhook_secret: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_base_url() -> String {
    "https://api.razorpay.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
