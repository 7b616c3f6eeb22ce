use thiserror::Error;

/// Failure talking to the upstream API
///
/// Details are for the server log only; callers see a generic message.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned {0}")]
    Status(reqwest::StatusCode),
    #[error("upstream payload exceeds {0} bytes")]
    TooLarge(usize),
    #[error("upstream payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}
