//! Response envelope
//!
//! Every JSON body the server writes is an [`Envelope`]: `{"ok": true, ...}`
//! with exactly one payload field and a `timeStamp`, or
//! `{"ok": false, "error": "..."}`.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use super::fact::{RelayedFact, UpstreamPreview};
use super::request::NameRequest;

/// Success payload, serialized under its own key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// `"message": "..."`
    Message(String),
    /// `"data": {"name": "..."}`
    Data(NameRequest),
    /// `"external": {"src", "fact", "length"}`
    External(RelayedFact),
    /// `"preview": {"url", "status", "body"}`
    Preview(UpstreamPreview),
}

impl Payload {
    const fn key(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Data(_) => "data",
            Self::External(_) => "external",
            Self::Preview(_) => "preview",
        }
    }
}

/// JSON response wrapper
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawEnvelope")]
pub enum Envelope {
    Success {
        payload: Payload,
        timestamp: DateTime<Utc>,
    },
    Failure {
        error: String,
    },
}

impl Envelope {
    /// Successful envelope stamped with the current UTC time
    pub fn success(payload: Payload) -> Self {
        Self::Success {
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success { payload, timestamp } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("ok", &true)?;
                match payload {
                    Payload::Message(message) => map.serialize_entry(payload.key(), message)?,
                    Payload::Data(data) => map.serialize_entry(payload.key(), data)?,
                    Payload::External(fact) => map.serialize_entry(payload.key(), fact)?,
                    Payload::Preview(preview) => map.serialize_entry(payload.key(), preview)?,
                }
                map.serialize_entry("timeStamp", timestamp)?;
                map.end()
            }
            Self::Failure { error } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("ok", &false)?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}

/// A JSON object that does not describe a valid envelope
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("successful envelope carries no payload")]
    MissingPayload,
    #[error("successful envelope carries more than one payload")]
    AmbiguousPayload,
    #[error("successful envelope carries no timeStamp")]
    MissingTimestamp,
    #[error("failed envelope carries no error message")]
    MissingError,
}

/// Wire shape accepted when decoding an envelope
#[derive(Deserialize)]
struct RawEnvelope {
    ok: bool,
    message: Option<String>,
    data: Option<NameRequest>,
    external: Option<RelayedFact>,
    preview: Option<UpstreamPreview>,
    error: Option<String>,
    #[serde(rename = "timeStamp")]
    timestamp: Option<DateTime<Utc>>,
}

impl TryFrom<RawEnvelope> for Envelope {
    type Error = EnvelopeError;

    fn try_from(raw: RawEnvelope) -> Result<Self, Self::Error> {
        if !raw.ok {
            let error = raw.error.ok_or(EnvelopeError::MissingError)?;
            return Ok(Self::Failure { error });
        }

        let mut payloads = [
            raw.message.map(Payload::Message),
            raw.data.map(Payload::Data),
            raw.external.map(Payload::External),
            raw.preview.map(Payload::Preview),
        ]
        .into_iter()
        .flatten();

        let payload = payloads.next().ok_or(EnvelopeError::MissingPayload)?;
        if payloads.next().is_some() {
            return Err(EnvelopeError::AmbiguousPayload);
        }
        let timestamp = raw.timestamp.ok_or(EnvelopeError::MissingTimestamp)?;

        Ok(Self::Success { payload, timestamp })
    }
}
