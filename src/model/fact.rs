//! Upstream payload shapes

use serde::{Deserialize, Serialize};

/// Payload returned by the fact endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalFact {
    pub fact: String,
    pub length: i64,
}

/// A fact as relayed to the caller, tagged with where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayedFact {
    pub src: String,
    pub fact: String,
    pub length: i64,
}

impl RelayedFact {
    pub fn new(src: &str, fact: ExternalFact) -> Self {
        Self {
            src: src.to_string(),
            fact: fact.fact,
            length: fact.length,
        }
    }
}

/// Status and leading characters of a raw upstream body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamPreview {
    pub url: String,
    pub status: u16,
    pub body: String,
}

/// First `limit` characters of `text`, never splitting a UTF-8 sequence
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    text.char_indices()
        .nth(limit)
        .map_or(text, |(idx, _)| &text[..idx])
}
