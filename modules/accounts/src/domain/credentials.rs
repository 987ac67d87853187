//! Password hashing and one-time codes.
//!
//! bcrypt is CPU bound, so both directions run on the blocking pool.

use rand::Rng;

use crate::domain::error::DomainError;

pub const OTP_LEN: usize = 6;

pub async fn hash_password(plain: String, cost: u32) -> Result<String, DomainError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
        .await
        .map_err(|e| DomainError::credentials(e.to_string()))?
        .map_err(|e| DomainError::credentials(e.to_string()))
}

pub async fn verify_password(plain: String, hash: String) -> Result<bool, DomainError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash))
        .await
        .map_err(|e| DomainError::credentials(e.to_string()))?
        .map_err(|e| DomainError::credentials(e.to_string()))
}

/// Six decimal digits, never starting with zero.
pub fn generate_otp() -> String {
    rand::rng().random_range(100_000..1_000_000u32).to_string()
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
