//! Dashboard WebSocket endpoint
//!
//! A pure listen channel: on open the client receives the registry's
//! `WS_CONNECTED` ack, then broadcast status lines as they arrive. Anything
//! the client sends is treated as a keepalive and ignored. The observer is
//! unregistered on disconnect or first failed push.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use tracing::debug;

use crate::state::AppState;

/// GET /ws
pub async fn dashboard_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| serve_dashboard(socket, state))
}

async fn serve_dashboard(mut socket: WebSocket, state: AppState) {
    let (id, mut lines) = state.observers().register();

    loop {
        tokio::select! {
            line = lines.recv() => match line {
                Some(line) => {
                    if socket.send(Message::Text(line.into())).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            msg = socket.recv() => match msg {
                // Keepalives; content is irrelevant
                Some(Ok(_)) => {}
                Some(Err(_)) | None => break,
            },
        }
    }

    state.observers().unregister(id);
    debug!("Dashboard connection closed");
}
