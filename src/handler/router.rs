//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for route lookup,
//! method validation, body size checks and dispatching.

use crate::config::AppState;
use crate::handler::endpoints;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::{Endpoint, Resolution};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::{Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let mut entry = AccessLogEntry::from_request(&peer_addr, &parts);

    let mut response = match state.router.resolve(&parts.method, parts.uri.path()) {
        Resolution::NotFound => http::build_404_response(),
        Resolution::MethodNotAllowed(rule) => {
            logger::log_warning(&format!(
                "Method not allowed: {} {}",
                parts.method,
                parts.uri.path()
            ));
            http::build_405_response(rule.allow_header())
        }
        Resolution::Matched(endpoint) => {
            // 1. Reject oversized bodies before reading anything
            if http::declared_length_exceeds(&parts.headers, state.config.http.max_body_size) {
                logger::log_warning(&format!(
                    "Request body too large for {} (max: {} bytes)",
                    parts.uri.path(),
                    state.config.http.max_body_size
                ));
                http::build_413_response()
            } else {
                // 2. Dispatch; the body is dropped unread by endpoints that ignore it
                dispatch(endpoint, body, &state).await
            }
        }
    };

    if let Ok(value) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, value);
    }

    if state.access_log_enabled() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch to the endpoint handler
async fn dispatch<B>(endpoint: Endpoint, body: B, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match endpoint {
        Endpoint::Hello => endpoints::hello(),
        Endpoint::Status => endpoints::status(),
        Endpoint::Health => endpoints::health(),
        Endpoint::DecodeName => {
            endpoints::decode_name(body, state.config.http.max_body_size).await
        }
        Endpoint::ExternalFact => endpoints::external_fact(&state.upstream).await,
        Endpoint::ExternalPreview => endpoints::external_preview(&state.upstream).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::handler::endpoints::{FETCH_FAILED, HELLO_GREETING, STATUS_MESSAGE};
    use crate::upstream::stub::{spawn_delayed_stub, spawn_stub, stub_config};
    use http_body_util::BodyExt;
    use hyper::{Method, StatusCode};
    use serde_json::Value;

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(&test_config()).unwrap())
    }

    async fn send(
        state: &Arc<AppState>,
        method: Method,
        path: &str,
        body: &'static str,
    ) -> (StatusCode, Bytes) {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap();
        let response = handle_request(req, Arc::clone(state), peer()).await.unwrap();
        let status = response.status();
        (status, response.into_body().collect().await.unwrap().to_bytes())
    }

    async fn send_json(
        state: &Arc<AppState>,
        method: Method,
        path: &str,
        body: &'static str,
    ) -> (StatusCode, Value) {
        let (status, bytes) = send(state, method, path, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_hello() {
        let (status, body) = send(&state(), Method::GET, "/hello", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, HELLO_GREETING.as_bytes());
    }

    #[tokio::test]
    async fn test_get_only_routes_reject_other_methods() {
        let state = state();
        for path in ["/hello", "/external", "/external/preview", "/healthz"] {
            for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
                let (status, body) = send_json(&state, method.clone(), path, "").await;
                assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {path}");
                assert_eq!(body["ok"], false);
                assert_eq!(body["error"], "method not allowed");
            }
        }
    }

    #[tokio::test]
    async fn test_status_accepts_any_method() {
        let state = state();
        for method in [Method::GET, Method::POST, Method::DELETE] {
            let (status, body) = send_json(&state, method, "/status", "").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["ok"], true);
            assert_eq!(body["message"], STATUS_MESSAGE);
            assert!(body["timeStamp"].is_string());
        }
    }

    #[tokio::test]
    async fn test_decode_trims_name() {
        let (status, body) = send_json(&state(), Method::POST, "/ok", r#"{"name":"  Ada  "}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["data"], serde_json::json!({"name": "Ada"}));
        let stamp = body["timeStamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
        assert_eq!(body.as_object().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_decode_rejects_malformed_json() {
        let state = state();
        for bad in ["not-json", "", "{", r#"{"name":1}"#] {
            let (status, body) = send(&state, Method::POST, "/ok", bad).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {bad:?}");
            assert_eq!(body, r#"{"ok":false,"error":"invalid JSON format"}"#.as_bytes());
        }
    }

    #[tokio::test]
    async fn test_decode_rejects_blank_name() {
        let state = state();
        for blank in [r#"{"name":""}"#, r#"{"name":"    "}"#, "{}", r#"{"name":null}"#] {
            let (status, body) = send_json(&state, Method::POST, "/ok", blank).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["ok"], false);
            assert_eq!(body["error"], "name must not be empty");
        }
    }

    #[tokio::test]
    async fn test_decode_requires_post() {
        let (status, body) = send_json(&state(), Method::GET, "/ok", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_decode_rejects_oversized_body() {
        let mut cfg = test_config();
        cfg.http.max_body_size = 8;
        let state = Arc::new(AppState::new(&cfg).unwrap());

        // No Content-Length on a Full body built by hand, so the streaming limit applies
        let (status, body) = send_json(&state, Method::POST, "/ok", r#"{"name":"Ada Lovelace"}"#).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["ok"], false);

        let req = Request::builder()
            .method(Method::POST)
            .uri("/ok")
            .header("content-length", "1000")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = handle_request(req, Arc::clone(&state), peer()).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let (status, body) = send_json(&state(), Method::GET, "/missing", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "not found");
    }

    #[tokio::test]
    async fn test_external_unreachable_upstream() {
        let (status, body) = send(&state(), Method::GET, "/external", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"ok":false,"error":"failed to fetch data"}"#.as_bytes());
    }

    #[tokio::test]
    async fn test_external_relays_fact() {
        let addr = spawn_stub(StatusCode::OK, r#"{"fact":"Cats have 32 muscles in each ear.","length":34}"#).await;
        let mut cfg = test_config();
        cfg.upstream = stub_config(addr);
        let state = Arc::new(AppState::new(&cfg).unwrap());

        let (status, body) = send_json(&state, Method::GET, "/external", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(
            body["external"],
            serde_json::json!({
                "src": "catfact.ninja",
                "fact": "Cats have 32 muscles in each ear.",
                "length": 34
            })
        );
        assert!(body["timeStamp"].is_string());
    }

    #[tokio::test]
    async fn test_external_hides_upstream_status() {
        let addr = spawn_stub(StatusCode::INTERNAL_SERVER_ERROR, r#"{"detail":"boom"}"#).await;
        let mut cfg = test_config();
        cfg.upstream = stub_config(addr);
        let state = Arc::new(AppState::new(&cfg).unwrap());

        for path in ["/external", "/external/preview"] {
            let (status, body) = send_json(&state, Method::GET, path, "").await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, serde_json::json!({"ok": false, "error": FETCH_FAILED}));
        }
    }

    #[tokio::test]
    async fn test_external_upstream_timeout() {
        let addr = spawn_delayed_stub(
            std::time::Duration::from_secs(5),
            StatusCode::OK,
            r#"{"fact":"Cats purr.","length":10}"#,
        )
        .await;
        let mut cfg = test_config();
        cfg.upstream = stub_config(addr);
        cfg.upstream.timeout = 1;
        let state = Arc::new(AppState::new(&cfg).unwrap());

        let started = Instant::now();
        let (status, body) = send(&state, Method::GET, "/external", "").await;
        assert!(started.elapsed() < std::time::Duration::from_secs(4));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"ok":false,"error":"failed to fetch data"}"#.as_bytes());
    }

    #[tokio::test]
    async fn test_external_preview() {
        let addr = spawn_stub(StatusCode::OK, r#"[{"userId":1,"id":1}]"#).await;
        let mut cfg = test_config();
        cfg.upstream = stub_config(addr);
        let state = Arc::new(AppState::new(&cfg).unwrap());

        let (status, body) = send_json(&state, Method::GET, "/external/preview", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["preview"]["status"], 200);
        assert_eq!(body["preview"]["body"], r#"[{"userId""#);
    }

    #[tokio::test]
    async fn test_server_header() {
        let req = Request::builder()
            .uri("/healthz")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = handle_request(req, state(), peer()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["server"], "json-relay/0.1");
        assert_eq!(response.headers()["content-type"], "application/json");
    }
}
