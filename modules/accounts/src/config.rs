use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountsConfig {
    #[serde(default = "default_otp_ttl_minutes")]
    pub otp_ttl_minutes: i64,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            otp_ttl_minutes: default_otp_ttl_minutes(),
            bcrypt_cost: default_bcrypt_cost(),
            min_password_len: default_min_password_len(),
        }
    }
}

fn default_otp_ttl_minutes() -> i64 {
    10
}

fn default_bcrypt_cost() -> u32 {
    10
}

fn default_min_password_len() -> usize {
    6
}
