//! Reader loop - drains controller output and fans it out to observers
//!
//! Runs for the life of the process, independent of request handling. A
//! cycle's failure never kills the loop: drain errors (and even a panicked
//! drain task) become a `SERIAL_ERR:` status update and the next cycle runs.
//! The watch channel exists so tests and shutdown can stop it
//! deterministically.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};
use usher_core::ObserverRegistry;

use crate::session::SerialSession;

/// Sleep between drain cycles; bounds CPU usage and port contention with
/// request-driven writers.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the reader loop until `shutdown` fires (or its sender is dropped).
///
/// Each cycle drains buffered lines off the session; every non-empty line
/// becomes the session's last status and is broadcast to all observers in
/// arrival order before the cycle proceeds.
pub async fn run(
    session: Arc<SerialSession>,
    observers: Arc<ObserverRegistry>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Serial reader loop started");
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
        }

        // drain_incoming holds the session lock; a handler may be holding it
        // across a blocking write, so keep the runtime workers free.
        let drained = {
            let session = Arc::clone(&session);
            tokio::task::spawn_blocking(move || session.drain_incoming()).await
        };

        match drained {
            Ok(Ok(lines)) => {
                for line in lines.into_iter().filter(|l| !l.is_empty()) {
                    debug!(line = %line, "Controller status");
                    session.set_status(&line);
                    observers.broadcast(&line);
                }
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Serial drain failed");
                session.set_status(&format!("SERIAL_ERR: {e}"));
            }
            Err(e) => {
                warn!(error = %e, "Drain task failed");
                session.set_status(&format!("SERIAL_ERR: {e}"));
            }
        }
    }
    info!("Serial reader loop stopped");
}
