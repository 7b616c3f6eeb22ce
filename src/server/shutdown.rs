// Shutdown drain module
// Waits for in-flight connections after the listener is closed

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::logger;

/// How often the active-connection counter is re-checked
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Wait until no connection is active or `grace` has elapsed.
///
/// Returns the number of connections still open when the wait ended; those
/// are abandoned when the runtime stops.
pub async fn drain_connections(active_connections: &AtomicUsize, grace: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + grace;

    loop {
        let remaining = active_connections.load(Ordering::SeqCst);
        if remaining == 0 {
            logger::log_info("All connections closed");
            return 0;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Drain window of {}s elapsed with {remaining} connection(s) still open",
                grace.as_secs()
            ));
            return remaining;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
