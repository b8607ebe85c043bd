//! HTTP handlers for the server.

pub mod epos;
pub mod stream;

/// Handle GET /health - liveness probe.
pub async fn health() -> &'static str {
    "OK"
}
