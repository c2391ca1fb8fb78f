//! Seat-call and stop handlers

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use usher_core::{distance_cm, go_command, parse_row};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SeatRequest {
    pub seat: String,
}

#[derive(Serialize)]
pub struct CallResponse {
    pub ok: bool,
    pub seat: String,
    pub row: u32,
    pub distance_cm: f64,
}

#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// POST /api/call
/// Convert a seat identifier to a travel distance and send the cart
pub async fn call_cart(
    State(state): State<AppState>,
    Json(req): Json<SeatRequest>,
) -> Result<Json<CallResponse>, ApiError> {
    let row = parse_row(&req.seat)?;
    let cfg = state.config().snapshot();
    let distance = distance_cm(row, cfg.home_row, cfg.seat_spacing_cm);

    let command = go_command(distance);
    state.with_session(move |s| s.send(&command)).await?;

    info!(seat = %req.seat, row, distance_cm = distance, "Seat call dispatched");
    Ok(Json(CallResponse {
        ok: true,
        seat: req.seat,
        row,
        distance_cm: distance,
    }))
}

/// POST /api/stop
pub async fn stop_cart(State(state): State<AppState>) -> Result<Json<OkResponse>, ApiError> {
    state.with_session(|s| s.send("STOP")).await?;
    info!("Stop dispatched");
    Ok(Json(OkResponse { ok: true }))
}
