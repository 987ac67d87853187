//! HMAC-SHA256 signatures as Razorpay computes them: lowercase hex.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub fn sign(secret: &str, payload: &[u8]) -> String {
    // HMAC takes keys of any length, so the error arm never runs.
    HmacSha256::new_from_slice(secret.as_bytes())
        .map(|mut mac| {
            mac.update(payload);
            hex::encode(mac.finalize().into_bytes())
        })
        .unwrap_or_default()
}

/// Constant-time comparison against a hex signature.
pub fn verify(secret: &str, payload: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

pub fn checkout_payload(order_id: &str, payment_id: &str) -> String {
    format!("{order_id}|{payment_id}")
}
