// Server loop module
// Accepts connections until shutdown is requested, then drains

use hyper_util::server::graceful::GracefulShutdown;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use super::shutdown::drain_connections;
use crate::config::AppState;
use crate::logger;

/// Accept loop for the relay server
///
/// Must run inside a `LocalSet`: every connection is served on a
/// `spawn_local` task. Returns once `shutdown` is notified and in-flight
/// connections have finished or the write timeout has elapsed.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) -> Result<(), Box<dyn std::error::Error>> {
    let graceful = GracefulShutdown::new();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections, &graceful);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => {
                logger::log_info("Shutdown requested, no longer accepting connections");
                break;
            }
        }
    }

    // Stop accepting before waiting on the remaining connections
    drop(listener);

    // Idle keep-alive connections close at once, busy ones after their current response
    tokio::task::spawn_local(graceful.shutdown());

    let grace = Duration::from_secs(state.config.performance.write_timeout);
    drain_connections(&active_connections, grace).await;
    Ok(())
}
