//! Routing module
//!
//! Explicit route table built by the startup routine and stored in
//! `AppState`; handlers never register routes globally.

mod table;

pub use table::{Endpoint, Resolution, Router};
