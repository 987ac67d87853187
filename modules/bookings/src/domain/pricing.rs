//! Package pricing and currency unit conversion.

use crate::domain::error::DomainError;

/// GST applied to every package.
pub const TAX_RATE: f64 = 0.18;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub base: f64,
    pub tax: f64,
    pub discount: f64,
    pub total: f64,
}

pub fn quote(base: f64, discount: f64) -> Result<Quote, DomainError> {
    if !base.is_finite() || base < 0.0 {
        return Err(DomainError::validation("price", "must be a non-negative amount"));
    }
    if !discount.is_finite() || discount < 0.0 {
        return Err(DomainError::validation(
            "discount_amount",
            "must be a non-negative amount",
        ));
    }
    let tax = round2(base * TAX_RATE);
    Ok(Quote {
        base,
        tax,
        discount,
        total: round2(base + tax - discount),
    })
}

/// Rupees to paise.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub fn from_minor_units(minor: i64) -> f64 {
    round2(minor as f64 / 100.0)
}
