//! Mock link and factory for testing
//!
//! Every link opened by a [`MockFactory`] shares one pair of byte buffers, so
//! a test can inject controller output and inspect written commands through
//! the factory's [`MockLinkHandle`] regardless of reconnects.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use usher_core::{CartError, CartResult};

use crate::link::{LinkFactory, SerialLink};

#[derive(Default)]
struct Shared {
    /// Bytes the controller has "sent" but the session has not drained yet
    incoming: Mutex<Vec<u8>>,
    /// Everything the session wrote to the wire
    written: Mutex<Vec<u8>>,
    /// When set, every link operation fails
    fail_io: AtomicBool,
    /// (port, baud) of every successful open
    opened: Mutex<Vec<(String, u32)>>,
}

/// Test-side view of the mock wire
#[derive(Clone)]
pub struct MockLinkHandle {
    shared: Arc<Shared>,
}

impl MockLinkHandle {
    /// Queue controller output for the next drain (newlines included as-is)
    pub fn inject_incoming(&self, text: &str) {
        self.shared.incoming.lock().extend_from_slice(text.as_bytes());
    }

    pub fn written_bytes(&self) -> Vec<u8> {
        self.shared.written.lock().clone()
    }

    /// Complete newline-terminated commands written so far
    pub fn written_lines(&self) -> Vec<String> {
        let bytes = self.shared.written.lock();
        String::from_utf8_lossy(&bytes)
            .split('\n')
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn set_fail_io(&self, fail: bool) {
        self.shared.fail_io.store(fail, Ordering::SeqCst);
    }

    pub fn open_count(&self) -> usize {
        self.shared.opened.lock().len()
    }

    pub fn opened(&self) -> Vec<(String, u32)> {
        self.shared.opened.lock().clone()
    }
}

struct MockLink {
    shared: Arc<Shared>,
}

impl MockLink {
    fn check_io(&self) -> io::Result<()> {
        if self.shared.fail_io.load(Ordering::SeqCst) {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock link failure"))
        } else {
            Ok(())
        }
    }
}

impl SerialLink for MockLink {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.check_io()?;
        self.shared.written.lock().extend_from_slice(buf);
        Ok(())
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        self.check_io()?;
        Ok(self.shared.incoming.lock().len())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check_io()?;
        let mut incoming = self.shared.incoming.lock();
        let n = buf.len().min(incoming.len());
        buf[..n].copy_from_slice(&incoming[..n]);
        incoming.drain(..n);
        Ok(n)
    }
}

/// Factory producing mock links; discovery result is configurable
pub struct MockFactory {
    shared: Arc<Shared>,
    discovered: Option<String>,
    fail_open: AtomicBool,
}

impl MockFactory {
    /// Discovery finds `/dev/mock0`
    pub fn new() -> Self {
        Self::with_discovered(Some("/dev/mock0".to_string()))
    }

    /// Discovery yields exactly `discovered` (use `None` for a bare host)
    pub fn with_discovered(discovered: Option<String>) -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            discovered,
            fail_open: AtomicBool::new(false),
        }
    }

    pub fn handle(&self) -> MockLinkHandle {
        MockLinkHandle {
            shared: self.shared.clone(),
        }
    }

    pub fn set_fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }
}

impl Default for MockFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkFactory for MockFactory {
    fn open(&self, port: &str, baud: u32) -> CartResult<Box<dyn SerialLink>> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(CartError::Io(format!("mock refused to open {port}")));
        }
        self.shared.opened.lock().push((port.to_string(), baud));
        Ok(Box::new(MockLink {
            shared: self.shared.clone(),
        }))
    }

    fn discover(&self) -> Option<String> {
        self.discovered.clone()
    }
}
