//! Outbound calls to the fixed third-party API

mod client;
mod error;

pub use client::UpstreamClient;
pub use error::UpstreamError;

#[cfg(test)]
pub mod stub;
