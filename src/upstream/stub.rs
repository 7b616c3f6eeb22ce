//! Throwaway upstream server for tests

use crate::config::UpstreamConfig;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

/// Serve every request with the same status and body on an ephemeral port
pub async fn spawn_stub(status: StatusCode, body: &'static str) -> SocketAddr {
    spawn_delayed_stub(Duration::ZERO, status, body).await
}

/// Like [`spawn_stub`], but each response is held back for `delay`
pub async fn spawn_delayed_stub(
    delay: Duration,
    status: StatusCode,
    body: &'static str,
) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let service = service_fn(move |_req: hyper::Request<hyper::body::Incoming>| async move {
                    tokio::time::sleep(delay).await;
                    Ok::<_, Infallible>(
                        Response::builder()
                            .status(status)
                            .header("Content-Type", "application/json")
                            .body(Full::new(Bytes::from_static(body.as_bytes())))
                            .unwrap(),
                    )
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    addr
}

pub fn stub_config(addr: SocketAddr) -> UpstreamConfig {
    UpstreamConfig {
        fact_url: format!("http://{addr}/fact"),
        fact_source: "catfact.ninja".to_string(),
        preview_url: format!("http://{addr}/todos"),
        preview_limit: 10,
        max_body_size: 4096,
        timeout: 2,
    }
}
