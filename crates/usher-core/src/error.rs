//! Common error types for the cart service

use thiserror::Error;

/// Result type for cart operations
pub type CartResult<T> = Result<T, CartError>;

/// Errors that can occur while driving the cart
#[derive(Debug, Error)]
pub enum CartError {
    /// No candidate serial device at connect time (user-actionable)
    #[error("no serial port found; plug in the controller and try again")]
    NoPortFound,

    /// Seat string does not match `<row><optional letter>`
    #[error("invalid seat format: {0:?} (use e.g. 12B)")]
    InvalidSeat(String),

    /// Config update rejected by validation
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Physical-link open/read/write failure
    #[error("serial I/O error: {0}")]
    Io(String),

    /// Config could not be written to stable storage
    #[error("failed to persist config: {0}")]
    Persistence(String),
}

impl From<std::io::Error> for CartError {
    fn from(err: std::io::Error) -> Self {
        CartError::Io(err.to_string())
    }
}
