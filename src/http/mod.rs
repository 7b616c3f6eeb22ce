//! HTTP protocol layer module
//!
//! Response builders and body reading, independent of any endpoint.

pub mod body;
pub mod response;

// Re-export commonly used items
pub use body::{declared_length_exceeds, read_limited, BodyReadError};
pub use response::{
    build_404_response, build_405_response, build_413_response, build_json_response,
    build_text_response,
};
