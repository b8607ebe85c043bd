//! Decoded output blocks.
//!
//! A block is a value handed to the caller. Text blocks carry a snapshot of
//! the printer modes that were active when they were decoded, so a renderer
//! never needs to replay commands to style them.

use serde::Serialize;
use serde_json::{Map, Value};

use super::state::{Alignment, PrinterState};

/// Command parameters worth surfacing, in insertion order.
pub type Details = Map<String, Value>;

/// Build a [`Details`] map from key/value pairs.
pub fn details<const N: usize>(pairs: [(&str, Value); N]) -> Details {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// One unit of decoded printer output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    #[serde(rename_all = "camelCase")]
    Text {
        content: String,
        alignment: Alignment,
        emphasized: bool,
        underline: u8,
        char_size: u8,
        reverse_printing: bool,
    },
    Command {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<Details>,
    },
    Image(Image),
}

/// Monochrome bitmap, row-major, one entry per pixel (0 = white, 1 = black).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub bitmap: Vec<u8>,
}

impl Image {
    /// Pixel at `(x, y)`; `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.bitmap
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

impl Block {
    /// Text block stamped with the current printer modes.
    pub fn text(content: impl Into<String>, state: &PrinterState) -> Self {
        Block::Text {
            content: content.into(),
            alignment: state.alignment,
            emphasized: state.emphasized,
            underline: state.underline,
            char_size: state.char_size,
            reverse_printing: state.reverse_printing,
        }
    }

    /// Command block without parameters.
    pub fn command(name: &str) -> Self {
        Block::Command {
            name: name.to_string(),
            details: None,
        }
    }

    /// Command block with parameters.
    pub fn command_with(name: &str, details: Details) -> Self {
        Block::Command {
            name: name.to_string(),
            details: Some(details),
        }
    }

    /// Text content, if this is a text block.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Block::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Command name, if this is a command block.
    pub fn command_name(&self) -> Option<&str> {
        match self {
            Block::Command { name, .. } => Some(name),
            _ => None,
        }
    }
}
