use std::time::Duration;

use crate::config::UpstreamConfig;
use crate::logger;
use crate::model::{truncate_chars, ExternalFact, RelayedFact, UpstreamPreview};

use super::UpstreamError;

/// HTTP client bound to the configured upstream endpoints
///
/// One instance lives in `AppState` and is shared by every request; the
/// underlying `reqwest::Client` is cheap to use concurrently.
pub struct UpstreamClient {
    http: reqwest::Client,
    fact_url: String,
    fact_source: String,
    preview_url: String,
    preview_limit: usize,
    max_body_size: usize,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if config.timeout > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout));
        }

        Ok(Self {
            http: builder.build().map_err(UpstreamError::Build)?,
            fact_url: config.fact_url.clone(),
            fact_source: config.fact_source.clone(),
            preview_url: config.preview_url.clone(),
            preview_limit: config.preview_limit,
            max_body_size: config.max_body_size,
        })
    }

    /// GET `url`, treating any non-2xx status as a failure
    async fn get(&self, url: &str) -> Result<reqwest::Response, UpstreamError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }
        Ok(response)
    }

    /// Fetch one fact and tag it with the configured source label
    pub async fn fetch_fact(&self) -> Result<RelayedFact, UpstreamError> {
        let response = self.get(&self.fact_url).await?;
        let (body, truncated) = read_prefix(response, self.max_body_size).await?;
        if truncated {
            return Err(UpstreamError::TooLarge(self.max_body_size));
        }

        let fact: ExternalFact = serde_json::from_slice(&body)?;
        logger::log_debug(&format!(
            "Fetched fact ({} chars) from {}",
            fact.length, self.fact_url
        ));
        Ok(RelayedFact::new(&self.fact_source, fact))
    }

    /// Fetch the preview URL and keep the leading characters of its body
    ///
    /// Only enough of the body to hold `preview_limit` characters is read.
    pub async fn fetch_preview(&self) -> Result<UpstreamPreview, UpstreamError> {
        let response = self.get(&self.preview_url).await?;
        let status = response.status().as_u16();
        // A UTF-8 character is at most four bytes
        let (body, _) = read_prefix(response, self.preview_limit.saturating_mul(4)).await?;
        let text = String::from_utf8_lossy(&body);

        Ok(UpstreamPreview {
            url: self.preview_url.clone(),
            status,
            body: truncate_chars(&text, self.preview_limit).to_string(),
        })
    }
}

/// Read at most `cap` bytes of the body; the flag is set when more was sent
async fn read_prefix(
    mut response: reqwest::Response,
    cap: usize,
) -> Result<(Vec<u8>, bool), UpstreamError> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = cap - body.len();
        if chunk.len() > room {
            body.extend_from_slice(&chunk[..room]);
            return Ok((body, true));
        }
        body.extend_from_slice(&chunk);
    }
    Ok((body, false))
}
