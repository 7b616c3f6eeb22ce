// Application state module
// Immutable per-process state shared by every connection

use super::types::Config;
use crate::routing::Router;
use crate::upstream::{UpstreamClient, UpstreamError};

/// Application state
pub struct AppState {
    pub config: Config,
    /// Route table built once at startup
    pub router: Router,
    /// Outbound client for the proxy endpoints
    pub upstream: UpstreamClient,
}

impl AppState {
    /// Create `AppState` with the standard route table
    pub fn new(config: &Config) -> Result<Self, UpstreamError> {
        Ok(Self {
            config: config.clone(),
            router: Router::standard(),
            upstream: UpstreamClient::new(&config.upstream)?,
        })
    }

    /// Whether per-request access lines are written
    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
