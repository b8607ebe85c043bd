//! # Raster Bit Image Decoding
//!
//! Unpacks `GS v 0` monochrome raster data into a per-pixel bitmap.
//!
//! ## Layout
//!
//! ```text
//! 1D 76 30 m xL xH yL yH d1 ... dk
//! └──opcode─┘ │ └width┘ └height┘ └── k = width_bytes × height
//!             └ scale mode (ignored)
//! ```
//!
//! ## Bit Packing
//!
//! Each byte holds 8 horizontal dots, most significant bit first:
//!
//! ```text
//! 0x80 = 10000000 = █░░░░░░░
//! 0x0F = 00001111 = ░░░░████
//! ```

use super::block::Image;
use super::commands::le_u16;

/// Bytes before the payload of `GS v 0`.
pub const RASTER_HEADER_LEN: usize = 8;

/// Bytes before the payload of `ESC *`.
pub const BIT_IMAGE_HEADER_LEN: usize = 5;

/// Decode a complete `GS v 0` command at the start of `window`.
///
/// Returns the image and the number of bytes it occupies, or `None` while
/// the header or payload is still incomplete. The caller has already
/// checked the `1D 76 30` prefix.
pub fn decode_raster(window: &[u8]) -> Option<(Image, usize)> {
    if window.len() < RASTER_HEADER_LEN {
        return None;
    }

    let width_bytes = le_u16(window[4], window[5]) as usize;
    let height = le_u16(window[6], window[7]) as usize;
    let payload_len = width_bytes * height;
    let total = RASTER_HEADER_LEN + payload_len;

    let payload = window.get(RASTER_HEADER_LEN..total)?;
    Some((unpack(width_bytes, height, payload), total))
}

/// Expand packed rows into one 0/1 entry per pixel.
///
/// `data` must hold `width_bytes × height` bytes.
pub fn unpack(width_bytes: usize, height: usize, data: &[u8]) -> Image {
    let width = width_bytes * 8;
    let mut bitmap = Vec::with_capacity(width * height);

    for row in data.chunks_exact(width_bytes.max(1)).take(height) {
        for &byte in row {
            for bit in (0..8).rev() {
                bitmap.push((byte >> bit) & 1);
            }
        }
    }

    Image {
        width: width as u32,
        height: height as u32,
        bitmap,
    }
}

/// Total length of an `ESC * m nL nH d…` command, once its header is present.
///
/// Modes 32 and 33 (24-dot) carry 3 bytes per column, the 8-dot modes 1.
pub fn bit_image_len(window: &[u8]) -> Option<usize> {
    if window.len() < BIT_IMAGE_HEADER_LEN {
        return None;
    }
    let mode = window[2];
    let width_dots = le_u16(window[3], window[4]) as usize;
    let bytes_per_column = match mode {
        32 | 33 => 3,
        _ => 1,
    };
    Some(BIT_IMAGE_HEADER_LEN + width_dots * bytes_per_column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_byte_msb_first() {
        let window = [0x1D, 0x76, 0x30, 0x00, 0x01, 0x00, 0x01, 0x00, 0b1000_0000];
        let (image, consumed) = decode_raster(&window).unwrap();
        assert_eq!(consumed, 9);
        assert_eq!(image.width, 8);
        assert_eq!(image.height, 1);
        assert_eq!(image.bitmap, vec![1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_two_rows_two_bytes() {
        let data = [0xF0, 0x0F, 0xAA, 0x01];
        let image = unpack(2, 2, &data);
        assert_eq!(image.width, 16);
        assert_eq!(image.height, 2);
        assert_eq!(
            &image.bitmap[..16],
            &[1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1]
        );
        assert_eq!(
            &image.bitmap[16..],
            &[1, 0, 1, 0, 1, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1]
        );
    }

    #[test]
    fn test_incomplete_header() {
        assert!(decode_raster(&[0x1D, 0x76, 0x30]).is_none());
        assert!(decode_raster(&[0x1D, 0x76, 0x30, 0x00, 0x01, 0x00, 0x01]).is_none());
    }

    #[test]
    fn test_incomplete_payload() {
        // 2 bytes wide, 2 rows = 4 payload bytes, only 3 present
        let window = [0x1D, 0x76, 0x30, 0x00, 0x02, 0x00, 0x02, 0x00, 0xFF, 0xFF, 0xFF];
        assert!(decode_raster(&window).is_none());
    }

    #[test]
    fn test_ignores_trailing_bytes() {
        let window = [0x1D, 0x76, 0x30, 0x00, 0x01, 0x00, 0x01, 0x00, 0xFF, b'A', b'B'];
        let (image, consumed) = decode_raster(&window).unwrap();
        assert_eq!(consumed, 9);
        assert_eq!(image.bitmap, vec![1; 8]);
    }

    #[test]
    fn test_height_uses_high_byte() {
        // 1 byte wide, 256 rows
        let mut window = vec![0x1D, 0x76, 0x30, 0x00, 0x01, 0x00, 0x00, 0x01];
        window.extend(std::iter::repeat_n(0x00, 256));
        let (image, consumed) = decode_raster(&window).unwrap();
        assert_eq!(image.height, 256);
        assert_eq!(consumed, 8 + 256);
    }

    #[test]
    fn test_empty_raster() {
        let window = [0x1D, 0x76, 0x30, 0x00, 0x00, 0x00, 0x05, 0x00];
        let (image, consumed) = decode_raster(&window).unwrap();
        assert_eq!(consumed, 8);
        assert_eq!(image.width, 0);
        assert_eq!(image.height, 5);
        assert!(image.bitmap.is_empty());
    }

    #[test]
    fn test_bit_image_len() {
        assert_eq!(bit_image_len(&[0x1B, 0x2A, 0x00, 0x0A]), None);
        assert_eq!(bit_image_len(&[0x1B, 0x2A, 0x00, 0x0A, 0x00]), Some(15));
        assert_eq!(bit_image_len(&[0x1B, 0x2A, 33, 0x0A, 0x00]), Some(35));
        assert_eq!(bit_image_len(&[0x1B, 0x2A, 32, 0x00, 0x01]), Some(5 + 768));
    }
}
