//! Request handlers for the cart API

pub mod cart;
pub mod config;
pub mod stream;
