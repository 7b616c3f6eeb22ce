//! Endpoint handlers
//!
//! Each function turns one routed request into exactly one response. Failures
//! never escape: they become an `{ok:false}` envelope with a 4xx status.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Response, StatusCode};

use crate::http::{self, BodyReadError};
use crate::logger;
use crate::model::{Envelope, NameRequest, Payload};
use crate::upstream::UpstreamClient;

pub const HELLO_GREETING: &str = "Hello from the JSON relay server!";
pub const STATUS_MESSAGE: &str = "JSON encode successful";
pub const FETCH_FAILED: &str = "failed to fetch data";
pub const BODY_READ_FAILED: &str = "failed to read request body";

pub fn hello() -> Response<Full<Bytes>> {
    http::build_text_response(StatusCode::OK, HELLO_GREETING)
}

/// Encoder endpoint: a fixed success envelope
pub fn status() -> Response<Full<Bytes>> {
    http::build_json_response(
        StatusCode::OK,
        &Envelope::success(Payload::Message(STATUS_MESSAGE.to_string())),
    )
}

pub fn health() -> Response<Full<Bytes>> {
    http::build_json_response(
        StatusCode::OK,
        &Envelope::success(Payload::Message("alive".to_string())),
    )
}

/// Decoder endpoint: read `{name}`, trim it, echo it back
pub async fn decode_name<B>(body: B, max_body_size: u64) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let bytes = match http::read_limited(body, max_body_size).await {
        Ok(bytes) => bytes,
        Err(BodyReadError::TooLarge) => return http::build_413_response(),
        Err(BodyReadError::Failed(e)) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return http::build_json_response(
                StatusCode::BAD_REQUEST,
                &Envelope::failure(BODY_READ_FAILED),
            );
        }
    };

    match NameRequest::parse(&bytes) {
        Ok(request) => {
            http::build_json_response(StatusCode::OK, &Envelope::success(Payload::Data(request)))
        }
        Err(e) => http::build_json_response(StatusCode::BAD_REQUEST, &Envelope::failure(e.to_string())),
    }
}

/// Proxy endpoint: relay one upstream fact
pub async fn external_fact(upstream: &UpstreamClient) -> Response<Full<Bytes>> {
    match upstream.fetch_fact().await {
        Ok(fact) => {
            http::build_json_response(StatusCode::OK, &Envelope::success(Payload::External(fact)))
        }
        Err(e) => fetch_failed(&e),
    }
}

/// Proxy endpoint: relay the status and leading characters of the preview URL
pub async fn external_preview(upstream: &UpstreamClient) -> Response<Full<Bytes>> {
    match upstream.fetch_preview().await {
        Ok(preview) => http::build_json_response(
            StatusCode::OK,
            &Envelope::success(Payload::Preview(preview)),
        ),
        Err(e) => fetch_failed(&e),
    }
}

/// Upstream detail stays in the server log
fn fetch_failed(error: &crate::upstream::UpstreamError) -> Response<Full<Bytes>> {
    logger::log_error(&format!("Upstream call failed: {error}"));
    http::build_json_response(StatusCode::BAD_REQUEST, &Envelope::failure(FETCH_FAILED))
}
