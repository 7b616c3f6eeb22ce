//! HTTP response building module
//!
//! Builders for the plain-text and envelope responses the handlers return.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::model::Envelope;

/// Body sent when an envelope cannot be serialized
const SERIALIZE_FALLBACK: &str = r#"{"ok":false,"error":"internal server error"}"#;

pub const NOT_FOUND: &str = "not found";
pub const METHOD_NOT_ALLOWED: &str = "method not allowed";
pub const PAYLOAD_TOO_LARGE: &str = "request body too large";

/// Build JSON response carrying an envelope
///
/// A serialization failure is logged and answered with a static 500 body;
/// nothing is retried.
pub fn build_json_response(status: StatusCode, envelope: &Envelope) -> Response<Full<Bytes>> {
    let (status, body) = match serde_json::to_vec(envelope) {
        Ok(json) => (status, Bytes::from(json)),
        Err(e) => {
            log_error(&format!("Failed to serialize response envelope: {e}"));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(SERIALIZE_FALLBACK.as_bytes()),
            )
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from_static(SERIALIZE_FALLBACK.as_bytes())))
        })
}

/// Build plain text response
pub fn build_text_response(status: StatusCode, text: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from_static(text.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from_static(text.as_bytes())))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_json_response(StatusCode::NOT_FOUND, &Envelope::failure(NOT_FOUND))
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &str) -> Response<Full<Bytes>> {
    let mut response = build_json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &Envelope::failure(METHOD_NOT_ALLOWED),
    );
    if let Ok(value) = allow.parse() {
        response.headers_mut().insert(hyper::header::ALLOW, value);
    }
    response
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_json_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        &Envelope::failure(PAYLOAD_TOO_LARGE),
    )
}

fn log_error(message: &str) {
    crate::logger::log_error(message);
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_405_has_allow_header() {
        let response = build_405_response("POST");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["allow"], "POST");
        assert_eq!(response.headers()["content-type"], "application/json");

        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_error_builders() {
        let not_found = build_404_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(not_found).await["error"], NOT_FOUND);

        let too_large = build_413_response();
        assert_eq!(too_large.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(too_large).await["ok"], false);
    }

    #[test]
    fn test_text_response() {
        let response = build_text_response(StatusCode::OK, "hi");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "text/plain; charset=utf-8"
        );
    }
}
