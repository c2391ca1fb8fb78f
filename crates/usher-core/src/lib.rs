//! usher-core - Core types for the seat-finder cart service
//!
//! Holds everything that is plain data and arithmetic: the error taxonomy,
//! the persisted cart configuration, seat parsing / distance conversion, and
//! the observer registry that fans controller status lines out to dashboards.
//! Serial and HTTP concerns live in `usher-serial` and `usher-api`.

pub mod config;
pub mod error;
pub mod observers;
pub mod seat;

pub use config::{CartConfig, ConfigStore};
pub use error::{CartError, CartResult};
pub use observers::{ObserverId, ObserverRegistry, CONNECT_ACK};
pub use seat::{distance_cm, go_command, parse_row};
