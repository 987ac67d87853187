//! Unit enums stored as text columns.
//!
//! Status-like enums carry their wire names through serde
//! (`#[serde(rename_all = "snake_case")]`); the same names are what the
//! tables hold, so one mapping serves the API and the storage layer.

use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum TextEnumError {
    #[error("value does not serialize to a string")]
    NotText,
    #[error("unknown value '{0}'")]
    Unknown(String),
}

pub fn encode<T: Serialize>(value: &T) -> Result<String, TextEnumError> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => Ok(s),
        _ => Err(TextEnumError::NotText),
    }
}

pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, TextEnumError> {
    serde_json::from_value(serde_json::Value::String(raw.to_owned()))
        .map_err(|_| TextEnumError::Unknown(raw.to_owned()))
}
