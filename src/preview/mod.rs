//! # Block Preview Encoding
//!
//! Converts decoded blocks into the form viewers consume.
//!
//! ## Architecture
//!
//! ```text
//! Block ──► WireBlock ──► JSON payload ──► viewers
//!             │
//!             └─ Image: bitmap → grayscale PNG → base64
//! ```
//!
//! Text and command blocks are forwarded unchanged. Images are re-encoded
//! as PNG so a browser can show them directly.
//!
//! ## Example
//!
//! ```
//! use virtual_printer::preview::WireBlock;
//! use virtual_printer::protocol::{Block, Image};
//!
//! let block = Block::Image(Image { width: 8, height: 1, bitmap: vec![1, 0, 0, 0, 0, 0, 0, 0] });
//! let json = WireBlock::from_block(&block).unwrap().to_json().unwrap();
//! assert!(json.starts_with(r#"{"type":"image","width":8,"height":1,"base64":""#));
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{GrayImage, ImageEncoder, Luma};
use serde::Serialize;

use crate::error::PrinterError;
use crate::protocol::{Block, Image};

/// A block as sent to viewers.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WireBlock<'a> {
    /// Text and command blocks, serialized as decoded
    Block(&'a Block),
    Image(WireImage),
}

/// Image block with its bitmap replaced by a base64 PNG.
#[derive(Debug, Serialize)]
pub struct WireImage {
    #[serde(rename = "type")]
    kind: &'static str,
    pub width: u32,
    pub height: u32,
    pub base64: String,
}

impl<'a> WireBlock<'a> {
    /// Prepare a block for viewers, encoding images as PNG.
    pub fn from_block(block: &'a Block) -> Result<Self, PrinterError> {
        match block {
            Block::Image(image) => Ok(WireBlock::Image(WireImage {
                kind: "image",
                width: image.width,
                height: image.height,
                base64: STANDARD.encode(encode_png(image)?),
            })),
            other => Ok(WireBlock::Block(other)),
        }
    }

    pub fn to_json(&self) -> Result<String, PrinterError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Render a decoded bitmap as an 8-bit grayscale PNG (black = 0, white = 255).
pub fn encode_png(image: &Image) -> Result<Vec<u8>, PrinterError> {
    if image.width == 0 || image.height == 0 {
        return Err(PrinterError::Image(format!(
            "cannot encode empty {}x{} image",
            image.width, image.height
        )));
    }

    let img = GrayImage::from_fn(image.width, image.height, |x, y| {
        let black = image.pixel(x, y).unwrap_or(0) != 0;
        Luma([if black { 0u8 } else { 255u8 }])
    });

    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder
        .write_image(
            img.as_raw(),
            image.width,
            image.height,
            image::ExtendedColorType::L8,
        )
        .map_err(|e: image::ImageError| PrinterError::Image(e.to_string()))?;

    Ok(png_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PrinterState;
    use serde_json::{Value, json};

    fn sample_image() -> Image {
        Image {
            width: 8,
            height: 2,
            bitmap: vec![1, 0, 0, 0, 0, 0, 0, 1, 0, 1, 1, 1, 1, 1, 1, 0],
        }
    }

    #[test]
    fn test_png_round_trip_pixels() {
        let png = encode_png(&sample_image()).unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let decoded = image::load_from_memory(&png).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (8, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [0]);
        assert_eq!(decoded.get_pixel(1, 0).0, [255]);
        assert_eq!(decoded.get_pixel(7, 0).0, [0]);
        assert_eq!(decoded.get_pixel(0, 1).0, [255]);
        assert_eq!(decoded.get_pixel(1, 1).0, [0]);
    }

    #[test]
    fn test_empty_image_is_an_error() {
        let image = Image {
            width: 0,
            height: 3,
            bitmap: Vec::new(),
        };
        assert!(matches!(encode_png(&image), Err(PrinterError::Image(_))));
    }

    #[test]
    fn test_wire_image_shape() {
        let block = Block::Image(sample_image());
        let json = WireBlock::from_block(&block).unwrap().to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["type"], "image");
        assert_eq!(value["width"], 8);
        assert_eq!(value["height"], 2);
        let png = STANDARD.decode(value["base64"].as_str().unwrap()).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        assert!(value.get("bitmap").is_none());
    }

    #[test]
    fn test_wire_text_passthrough() {
        let block = Block::text("Hi", &PrinterState::new());
        let json = WireBlock::from_block(&block).unwrap().to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, serde_json::to_value(&block).unwrap());
        assert_eq!(value["type"], json!("text"));
    }
}
