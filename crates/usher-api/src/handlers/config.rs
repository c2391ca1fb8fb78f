//! Config read/update handlers

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use usher_core::CartConfig;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ConfigResponse {
    pub seat_spacing_cm: f64,
    pub home_row: u32,
    pub serial_port: String,
    pub baud: u32,
    /// Most recent session event: connection milestone, controller line, or
    /// error description
    pub last_status: String,
}

#[derive(Deserialize)]
pub struct ConfigUpdateRequest {
    pub seat_spacing_cm: f64,
    /// Signed so a negative value reaches validation instead of failing
    /// deserialization
    pub home_row: i64,
}

#[derive(Serialize)]
pub struct ConfigUpdateResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub config: CartConfig,
}

/// GET /api/config
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let cfg = state.config().snapshot();
    Json(ConfigResponse {
        seat_spacing_cm: cfg.seat_spacing_cm,
        home_row: cfg.home_row,
        serial_port: cfg.serial_port,
        baud: cfg.baud,
        last_status: state.session().last_status(),
    })
}

/// POST /api/config
/// Validate and persist new physical parameters
pub async fn update_config(
    State(state): State<AppState>,
    Json(body): Json<ConfigUpdateRequest>,
) -> Result<Json<ConfigUpdateResponse>, ApiError> {
    let config = state
        .config()
        .update(body.seat_spacing_cm, body.home_row)?;
    Ok(Json(ConfigUpdateResponse { ok: true, config }))
}
