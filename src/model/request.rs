//! Decoder endpoint request body

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// `{"name": "..."}`; a missing or null field decodes as an empty name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Rejection reasons; the message is what the client sees
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid JSON format")]
    InvalidJson,
    #[error("name must not be empty")]
    EmptyName,
}

impl NameRequest {
    /// Decode a request body and normalize the name
    pub fn parse(body: &[u8]) -> Result<Self, DecodeError> {
        let request: Self = serde_json::from_slice(body).map_err(|_| DecodeError::InvalidJson)?;
        let name = request.name.trim();
        if name.is_empty() {
            return Err(DecodeError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
        })
    }
}
