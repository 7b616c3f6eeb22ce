// Configuration module entry point
// Manages application configuration and runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, UpstreamConfig};

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("RELAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "json-relay/0.1")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("upstream.fact_url", "https://catfact.ninja/fact")?
            .set_default("upstream.fact_source", "catfact.ninja")?
            .set_default(
                "upstream.preview_url",
                "https://jsonplaceholder.typicode.com/todos",
            )?
            .set_default("upstream.preview_limit", 250)?
            .set_default("upstream.max_body_size", 65_536)?
            .set_default("upstream.timeout", 10)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Defaults with both upstream URLs pointed at a local port nothing listens on
#[cfg(test)]
pub fn test_config() -> Config {
    let mut cfg = Config::load_from("tests/does-not-exist").expect("defaults must load");
    cfg.logging.access_log = false;
    cfg.upstream.fact_url = "http://127.0.0.1:1/fact".to_string();
    cfg.upstream.preview_url = "http://127.0.0.1:1/todos".to_string();
    cfg.upstream.timeout = 2;
    cfg
}
