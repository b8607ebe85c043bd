//! ePOS-Print endpoint.
//!
//! Each request body is an independent stream: it is decoded with a fresh
//! [`Assembler`] and every block is published to the viewers.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::epos;
use crate::protocol::Assembler;

use super::super::state::AppState;

/// Handle POST /cgi-bin/epos/service.cgi - decode an ePOS-Print job.
pub async fn service(State(state): State<Arc<AppState>>, body: String) -> Response {
    let bytes = match epos::extract_commands(&body) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Rejected ePOS request: {}", e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    log::info!("ePOS request with {} bytes of commands", bytes.len());

    let finish = Assembler::decode_all(&bytes);
    for block in &finish.blocks {
        state.publish(block);
    }
    if let Some(remainder) = finish.remainder {
        log::warn!("ePOS request: {}", remainder);
    }

    (
        [(header::CONTENT_TYPE, "text/xml")],
        epos::RESPONSE_ENVELOPE,
    )
        .into_response()
}
