//! usher-api - HTTP and WebSocket surface for the cart service
//!
//! Thin translation layer: seat strings become wire commands through the
//! session, config reads/updates delegate to the store, and the `/ws`
//! endpoint bridges the observer registry to dashboard clients.
//!
//! # Usage
//!
//! ```ignore
//! use usher_api::{create_router, AppState};
//!
//! let state = AppState::new(config, session, observers);
//! let router = create_router(state);
//! ```

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the cart REST/WebSocket router with the given application state
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Config
        .route(
            "/api/config",
            get(handlers::config::get_config).post(handlers::config::update_config),
        )
        // Cart commands
        .route("/api/call", post(handlers::cart::call_cart))
        .route("/api/stop", post(handlers::cart::stop_cart))
        // Dashboard stream
        .route("/ws", get(handlers::stream::dashboard_ws))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
