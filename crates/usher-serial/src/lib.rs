//! usher-serial - the serial-link session manager
//!
//! Owns the single physical connection to the motion controller: lifecycle
//! (closed, connecting, open), thread-safe line send, non-blocking line
//! receive, device auto-discovery, and the perpetual reader loop that fans
//! inbound status lines out to dashboard observers.
//!
//! The physical handle sits behind the [`SerialLink`] trait so tests run
//! against [`mock::MockFactory`] instead of real hardware.

pub mod discovery;
pub mod link;
pub mod mock;
pub mod reader;
pub mod session;

pub use discovery::{discover, pick_controller_port, PortCandidate};
pub use link::{LinkFactory, SerialLink, SystemLinkFactory};
pub use session::SerialSession;
