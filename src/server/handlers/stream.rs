//! Viewer WebSocket stream.
//!
//! Every published block is pushed to each connected viewer as one JSON text
//! message. Each viewer message is acknowledged, and with recall enabled the
//! most recent image is re-sent to all viewers so a freshly opened page can
//! catch up.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use super::super::state::AppState;

/// Handle GET /stream - upgrade to a viewer WebSocket.
pub async fn stream(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| viewer_session(socket, state))
}

/// Reply sent to a viewer for every message it sends.
pub fn acknowledgement() -> String {
    serde_json::json!({"type": "message", "message": "Hello from server!"}).to_string()
}

async fn viewer_session(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut blocks = state.subscribe();

    log::info!("Viewer connected");

    loop {
        tokio::select! {
            published = blocks.recv() => match published {
                Ok(payload) => {
                    if sender.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Viewer lagging, skipped {} blocks", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(Message::Text(_))) | Some(Ok(Message::Binary(_))) => {
                    if sender.send(Message::Text(acknowledgement())).await.is_err() {
                        break;
                    }
                    // Reaches this viewer through its own subscription.
                    if state.config.recall {
                        state.recall();
                    }
                }
                Some(Ok(_)) => {}
            },
        }
    }

    log::info!("Viewer disconnected");
}
