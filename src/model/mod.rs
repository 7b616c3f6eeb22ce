//! Wire types shared by the handlers and the upstream client

mod envelope;
mod fact;
mod request;

pub use envelope::{Envelope, Payload};
pub use fact::{truncate_chars, ExternalFact, RelayedFact, UpstreamPreview};
pub use request::NameRequest;
