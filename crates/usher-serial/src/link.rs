//! Physical link abstraction
//!
//! [`SerialSession`](crate::session::SerialSession) talks to the wire through
//! these traits. The real implementation wraps the `serialport` crate; tests
//! use [`mock`](crate::mock).

use std::io;
use std::time::Duration;

use tracing::info;
use usher_core::{CartError, CartResult};

use crate::discovery;

/// Read timeout on the physical handle. Drain only ever reads bytes that are
/// already buffered, so this is a backstop, not a pacing mechanism.
const READ_TIMEOUT: Duration = Duration::from_millis(1000);

/// One open byte-oriented link to the controller
pub trait SerialLink: Send {
    /// Write the whole buffer; the caller serializes writes.
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Bytes already buffered by the driver, available without blocking
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Read up to `buf.len()` buffered bytes
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Opens links and discovers candidate ports
pub trait LinkFactory: Send + Sync {
    fn open(&self, port: &str, baud: u32) -> CartResult<Box<dyn SerialLink>>;

    /// Best-guess controller port, or `None` when nothing is attached
    fn discover(&self) -> Option<String>;
}

struct SystemLink(Box<dyn serialport::SerialPort>);

impl SerialLink for SystemLink {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        io::Write::write_all(&mut self.0, buf)
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        self.0
            .bytes_to_read()
            .map(|n| n as usize)
            .map_err(io::Error::from)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut self.0, buf)
    }
}

/// Factory backed by the host's real serial devices
#[derive(Default)]
pub struct SystemLinkFactory;

impl SystemLinkFactory {
    pub fn new() -> Self {
        Self
    }
}

impl LinkFactory for SystemLinkFactory {
    fn open(&self, port: &str, baud: u32) -> CartResult<Box<dyn SerialLink>> {
        let handle = serialport::new(port, baud)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| CartError::Io(format!("failed to open {port}: {e}")))?;
        info!(port = %port, baud, "Opened serial link");
        Ok(Box::new(SystemLink(handle)))
    }

    fn discover(&self) -> Option<String> {
        discovery::discover()
    }
}
