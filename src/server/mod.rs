//! # Virtual Printer Server
//!
//! Accepts print jobs the way a networked receipt printer would and streams
//! the decoded blocks to browser viewers.
//!
//! ## Usage
//!
//! ```bash
//! virtual-printer serve --http-port 8080 --escpos-port 9100 --recall
//! ```
//!
//! ## Endpoints
//!
//! | Listener | Path | Purpose |
//! |----------|------|---------|
//! | HTTP | `GET /health` | Liveness probe, answers `OK` |
//! | HTTP | `GET /stream` | WebSocket, one JSON message per block |
//! | HTTP | `POST /cgi-bin/epos/service.cgi` | Epson ePOS-Print jobs |
//! | TCP | `:9100` | Raw ESC/POS bytes |

mod handlers;
mod state;

pub use state::{AppState, ServerConfig};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::epos::SERVICE_PATH;
use crate::error::PrinterError;
use crate::transport::EscPosListener;

/// Start the HTTP server and the raw ESC/POS listener.
///
/// ## Example
///
/// ```no_run
/// use virtual_printer::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), virtual_printer::PrinterError> {
/// let config = ServerConfig {
///     http_port: 8080,
///     recall: true,
///     ..ServerConfig::default()
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), PrinterError> {
    let app_state = Arc::new(AppState::new(config.clone()));

    let escpos = EscPosListener::bind(&config.escpos_addr(), config.max_buffer).await?;
    log::info!("Listening to ESC/POS on {}", escpos.local_addr()?);

    let publisher = app_state.clone();
    tokio::spawn(async move {
        if let Err(e) = escpos.run(move |block| publisher.publish(&block)).await {
            log::error!("ESC/POS listener stopped: {}", e);
        }
    });

    let listener = tokio::net::TcpListener::bind(config.http_addr())
        .await
        .map_err(|e| {
            PrinterError::Transport(format!("Failed to bind to {}: {}", config.http_addr(), e))
        })?;
    log::info!("Listening to ePOS on http://{}{}", config.http_addr(), SERVICE_PATH);
    log::info!("Viewer stream at ws://{}/stream", config.http_addr());
    if config.recall {
        log::info!("Recall enabled: viewer messages replay the last image");
    }

    axum::serve(listener, router(app_state))
        .await
        .map_err(|e| PrinterError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}

/// Build the HTTP router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/stream", get(handlers::stream::stream))
        .route(
            SERVICE_PATH,
            post(handlers::epos::service).layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn epos_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(SERVICE_PATH)
            .header(header::CONTENT_TYPE, "text/xml")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(Arc::new(AppState::new(ServerConfig::default())));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn test_epos_job_is_published() {
        let state = Arc::new(AppState::new(ServerConfig::default()));
        let mut viewer = state.subscribe();
        let app = router(state);

        // ESC @, "Hi", LF, GS V 1
        let body = "<epos-print><command>1b4048690a1d5601</command></epos-print>";
        let response = app.oneshot(epos_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/xml"
        );
        assert_eq!(body_text(response).await, crate::epos::RESPONSE_ENVELOPE);

        let mut names = Vec::new();
        while let Ok(payload) = viewer.try_recv() {
            let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
            names.push(
                value["name"]
                    .as_str()
                    .or(value["content"].as_str())
                    .unwrap()
                    .to_string(),
            );
        }
        assert_eq!(names, ["Initialize Printer", "Hi", "\n", "Cut Paper"]);
    }

    #[tokio::test]
    async fn test_epos_trailing_fragment_keeps_decoded_blocks() {
        let state = Arc::new(AppState::new(ServerConfig::default()));
        let mut viewer = state.subscribe();
        let app = router(state);

        // ESC @, "Hi", then a dangling ESC
        let body = "<epos-print><command>1b4048691b</command></epos-print>";
        let response = app.oneshot(epos_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let mut payloads = Vec::new();
        while let Ok(payload) = viewer.try_recv() {
            payloads.push(payload);
        }
        assert_eq!(payloads.len(), 2);
        assert!(payloads[1].contains(r#""content":"Hi""#));
    }

    #[tokio::test]
    async fn test_epos_bad_request() {
        let app = router(Arc::new(AppState::new(ServerConfig::default())));
        let response = app
            .oneshot(epos_request("<epos-print></epos-print>"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_epos_cors_preflight() {
        let app = router(Arc::new(AppState::new(ServerConfig::default())));
        let request = Request::builder()
            .method("OPTIONS")
            .uri(SERVICE_PATH)
            .header(header::ORIGIN, "http://till.local")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
