//! Request body reading with a size cap

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::HeaderMap;

/// Why a body could not be read
#[derive(Debug, PartialEq, Eq)]
pub enum BodyReadError {
    TooLarge,
    Failed(String),
}

/// Whether the declared `Content-Length` already exceeds the limit
///
/// Missing or unparsable headers are left to the streaming limit.
pub fn declared_length_exceeds(headers: &HeaderMap, max_body_size: u64) -> bool {
    headers
        .get(hyper::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .is_some_and(|size| size > max_body_size)
}

/// Read the whole body, failing once more than `max_body_size` bytes arrive
pub async fn read_limited<B>(body: B, max_body_size: u64) -> Result<Bytes, BodyReadError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(BodyReadError::TooLarge),
        Err(e) => Err(BodyReadError::Failed(e.to_string())),
    }
}
