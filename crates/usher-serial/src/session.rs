//! Serial session - the single managed connection to the controller
//!
//! Lifecycle: closed until the first explicit `connect` or implicit
//! connect-on-send, then open until the process exits. Read/write errors do
//! NOT invalidate the handle; it is only ever replaced by a later connect.
//! That mirrors the controller's own tolerance for transient link glitches
//! and is flagged as a design review item in DESIGN.md.
//!
//! One mutex guards the handle and the pending read buffer for the whole
//! duration of connect/send/drain, so command bytes can never interleave on
//! the wire and a drain can never race a connect-on-send.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};
use usher_core::{CartError, CartResult, ConfigStore};

use crate::link::{LinkFactory, SerialLink};

/// Settle delay after opening: typical controller boards reset when the host
/// opens the port and drop anything sent while they boot.
const SETTLE_DELAY: Duration = Duration::from_secs(2);

const READ_CHUNK: usize = 256;

struct Inner {
    link: Option<Box<dyn SerialLink>>,
    /// Bytes drained off the wire that do not yet form a complete line
    pending: Vec<u8>,
}

/// The session owning the physical link
pub struct SerialSession {
    inner: Mutex<Inner>,
    /// Most recent human-readable event: a connection milestone, an inbound
    /// controller line, or an error description. A slot, not a log.
    status: RwLock<String>,
    config: Arc<ConfigStore>,
    factory: Box<dyn LinkFactory>,
    settle_delay: Duration,
}

impl SerialSession {
    pub fn new(config: Arc<ConfigStore>, factory: Box<dyn LinkFactory>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                link: None,
                pending: Vec::new(),
            }),
            status: RwLock::new("DISCONNECTED".to_string()),
            config,
            factory,
            settle_delay: SETTLE_DELAY,
        }
    }

    /// Override the post-open settle delay (tests use zero)
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Open the link. No-op when already open. Resolves the port from config
    /// or discovery, persists whatever it resolved, opens at the configured
    /// baud, then waits out the device settle delay.
    pub fn connect(&self) -> CartResult<()> {
        let mut inner = self.inner.lock();
        self.connect_locked(&mut inner)
    }

    fn connect_locked(&self, inner: &mut Inner) -> CartResult<()> {
        if inner.link.is_some() {
            return Ok(());
        }

        let cfg = self.config.snapshot();
        let port = if cfg.serial_port.is_empty() {
            self.factory.discover().ok_or(CartError::NoPortFound)?
        } else {
            cfg.serial_port.clone()
        };

        // Future restarts reuse the resolved port without re-scanning
        self.config.set_serial_port(&port)?;

        let link = self.factory.open(&port, cfg.baud)?;
        inner.link = Some(link);
        inner.pending.clear();

        std::thread::sleep(self.settle_delay);

        info!(port = %port, baud = cfg.baud, "Controller connected");
        self.set_status(&format!("CONNECTED {port}"));
        Ok(())
    }

    /// Send one command line: trimmed, newline-terminated, written whole
    /// under the session lock. Connects first when the link is closed;
    /// connection errors propagate to the caller.
    pub fn send(&self, line: &str) -> CartResult<()> {
        let mut inner = self.inner.lock();
        if inner.link.is_none() {
            self.connect_locked(&mut inner)?;
        }
        let link = match inner.link.as_mut() {
            Some(link) => link,
            None => return Err(CartError::Io("link closed".to_string())),
        };

        let mut framed = line.trim().to_string();
        framed.push('\n');
        debug!(command = line.trim(), "Sending to controller");
        link.write_all(framed.as_bytes())
            .map_err(|e| CartError::Io(e.to_string()))
    }

    /// Drain every complete line the driver has already buffered, in arrival
    /// order, trailing whitespace trimmed. Returns an empty vec when the link
    /// is closed. Never blocks waiting for more bytes: only what
    /// `bytes_available` reports is read, and a partial trailing line stays
    /// pending for the next drain.
    pub fn drain_incoming(&self) -> CartResult<Vec<String>> {
        let mut inner = self.inner.lock();
        let Inner { link, pending } = &mut *inner;
        let link = match link.as_mut() {
            Some(link) => link,
            None => return Ok(Vec::new()),
        };

        let mut buf = [0u8; READ_CHUNK];
        loop {
            let avail = link.bytes_available().map_err(|e| CartError::Io(e.to_string()))?;
            if avail == 0 {
                break;
            }
            let want = avail.min(READ_CHUNK);
            let n = link
                .read(&mut buf[..want])
                .map_err(|e| CartError::Io(e.to_string()))?;
            if n == 0 {
                break;
            }
            pending.extend_from_slice(&buf[..n]);
        }

        let mut lines = Vec::new();
        while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&raw).trim_end().to_string());
        }
        Ok(lines)
    }

    /// Most recent status line
    pub fn last_status(&self) -> String {
        self.status.read().clone()
    }

    pub fn set_status(&self, status: &str) {
        *self.status.write() = status.to_string();
    }
}
