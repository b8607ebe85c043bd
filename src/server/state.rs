//! Server state and configuration.

use std::sync::{PoisonError, RwLock};

use tokio::sync::broadcast;

use crate::preview::WireBlock;
use crate::protocol::Block;

/// Pending payloads per viewer before it starts lagging.
const CHANNEL_CAPACITY: usize = 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind both listeners to (e.g., "0.0.0.0")
    pub hostname: String,
    /// Port for the ePOS-Print HTTP endpoint and viewer stream
    pub http_port: u16,
    /// Port for raw ESC/POS connections
    pub escpos_port: u16,
    /// Re-send the most recent image to all viewers when one sends a message
    pub recall: bool,
    /// Per-connection cap on buffered incomplete input
    pub max_buffer: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hostname: "0.0.0.0".to_string(),
            http_port: 80,
            escpos_port: crate::transport::tcp::DEFAULT_PORT,
            recall: false,
            max_buffer: None,
        }
    }
}

impl ServerConfig {
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.hostname, self.http_port)
    }

    pub fn escpos_addr(&self) -> String {
        format!("{}:{}", self.hostname, self.escpos_port)
    }
}

/// Application state shared across handlers and the ESC/POS listener.
pub struct AppState {
    pub config: ServerConfig,
    viewers: broadcast::Sender<String>,
    last_image: RwLock<Option<String>>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let (viewers, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            config,
            viewers,
            last_image: RwLock::new(None),
        }
    }

    /// Serialize a block and send it to every connected viewer.
    ///
    /// Image payloads are also kept for [`AppState::recall`]. Blocks that
    /// cannot be encoded are logged and skipped.
    pub fn publish(&self, block: &Block) {
        let payload = match WireBlock::from_block(block).and_then(|wire| wire.to_json()) {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("Dropping block that failed to encode: {}", e);
                return;
            }
        };

        log::debug!("Publishing {}", payload);
        if matches!(block, Block::Image(_)) {
            *self
                .last_image
                .write()
                .unwrap_or_else(PoisonError::into_inner) = Some(payload.clone());
        }

        self.broadcast(payload);
    }

    /// Re-send the most recent image to every connected viewer.
    ///
    /// Returns `false` when no image has been printed yet.
    pub fn recall(&self) -> bool {
        match self.last_image() {
            Some(payload) => {
                self.broadcast(payload);
                true
            }
            None => false,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.viewers.subscribe()
    }

    /// Most recently published image payload, if any.
    pub fn last_image(&self) -> Option<String> {
        self.last_image
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn broadcast(&self, payload: String) {
        // No receivers is not an error: blocks printed with no viewer open are dropped.
        let _ = self.viewers.send(payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PrinterState;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr(), "0.0.0.0:80");
        assert_eq!(config.escpos_addr(), "0.0.0.0:9100");
        assert!(!config.recall);
        assert_eq!(config.max_buffer, None);
    }

    #[test]
    fn test_publish_reaches_subscribers() {
        let state = AppState::new(ServerConfig::default());
        let mut first = state.subscribe();
        let mut second = state.subscribe();

        state.publish(&Block::command("Cut Paper"));

        let expected = r#"{"type":"command","name":"Cut Paper"}"#;
        assert_eq!(first.try_recv().unwrap(), expected);
        assert_eq!(second.try_recv().unwrap(), expected);
    }

    fn one_pixel() -> Block {
        Block::Image(crate::protocol::Image {
            width: 8,
            height: 1,
            bitmap: vec![1, 0, 0, 0, 0, 0, 0, 0],
        })
    }

    #[test]
    fn test_recall_keeps_last_image_not_last_block() {
        let state = AppState::new(ServerConfig::default());
        assert_eq!(state.last_image(), None);

        state.publish(&one_pixel());
        state.publish(&Block::text("one", &PrinterState::new()));
        state.publish(&Block::command("Cut Paper"));

        let image = state.last_image().unwrap();
        assert!(image.starts_with(r#"{"type":"image","width":8,"height":1,"#));
    }

    #[test]
    fn test_recall_reaches_every_viewer() {
        let state = AppState::new(ServerConfig::default());
        let mut first = state.subscribe();
        let mut second = state.subscribe();

        assert!(!state.recall());
        assert!(first.try_recv().is_err());

        state.publish(&one_pixel());
        state.publish(&Block::command("Cut Paper"));
        let image = first.try_recv().unwrap();
        first.try_recv().unwrap();
        second.try_recv().unwrap();
        second.try_recv().unwrap();

        assert!(state.recall());
        assert_eq!(first.try_recv().unwrap(), image);
        assert_eq!(second.try_recv().unwrap(), image);
    }

    #[test]
    fn test_unencodable_block_is_skipped() {
        let state = AppState::new(ServerConfig::default());
        let mut viewer = state.subscribe();

        state.publish(&Block::Image(crate::protocol::Image {
            width: 0,
            height: 4,
            bitmap: Vec::new(),
        }));

        assert!(viewer.try_recv().is_err());
        assert_eq!(state.last_image(), None);
    }
}
