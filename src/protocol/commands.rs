//! # ESC/POS Command Bytes
//!
//! Lead-byte constants for the recognized subset of ESC/POS, plus builders
//! that produce the exact byte sequences the decoder understands. The
//! builders are what the `demo` command and the tests use to talk to the
//! decoder like a real till would.
//!
//! ## Escape Sequence Structure
//!
//! - Single byte: `LF`
//! - Two bytes: `ESC @`, `ESC i`, `GS V`
//! - Fixed parameters: `ESC a n`, `GS L nL nH`, `ESC p m t1 t2`
//! - Variable payload: `ESC * m nL nH d…`, `GS k m d… NUL`, `GS v 0 m xL xH yL yH d…`
//!
//! ## Byte Order
//!
//! Multi-byte integers are **little-endian**: `n = nL + nH × 256`.

use super::cp852;
use super::state::Alignment;

// ============================================================================
// LEAD BYTES
// ============================================================================

/// LF (Line Feed) - print buffer and advance one line
pub const LF: u8 = 0x0A;

/// ESC (Escape) - standard command prefix
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - extended command prefix (graphics, sizes, cut)
pub const GS: u8 = 0x1D;

/// FS (File Separator) - Kanji/Chinese character mode prefix
pub const FS: u8 = 0x1C;

/// NUL - terminates variable-length barcode data
pub const NUL: u8 = 0x00;

/// Bytes that switch the decoder out of plain-text mode.
pub const LEAD_BYTES: [u8; 4] = [LF, ESC, GS, FS];

/// Returns `true` if `byte` starts a command rather than text.
#[inline]
pub const fn is_lead_byte(byte: u8) -> bool {
    matches!(byte, LF | ESC | GS | FS)
}

/// Paper cut variant selected by the trailing byte of `GS V n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutType {
    Full,
    Partial,
}

impl CutType {
    /// Interpret a `GS V` parameter byte. Unknown values fall back to a full cut.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x01 | 0x31 => CutType::Partial,
            _ => CutType::Full,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CutType::Full => "Full",
            CutType::Partial => "Partial",
        }
    }
}

// ============================================================================
// SETUP
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
///
/// Resets alignment, character size, margins, emphasis, underline and
/// reverse printing.
///
/// ```
/// use virtual_printer::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// Select character code table (ESC t n).
#[inline]
pub fn code_table(n: u8) -> Vec<u8> {
    vec![ESC, b't', n]
}

// ============================================================================
// TEXT
// ============================================================================

/// Encode `s` as CP852 text bytes.
pub fn text(s: &str) -> Vec<u8> {
    cp852::encode(s)
}

/// # Set Alignment (ESC a n)
///
/// | n | Alignment |
/// |---|-----------|
/// | 0 / 48 | Left |
/// | 1 / 49 | Center |
/// | 2 / 50 | Right |
#[inline]
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

/// Turn emphasized (bold) mode on or off (ESC E n).
#[inline]
pub fn emphasized(on: bool) -> Vec<u8> {
    vec![ESC, b'E', on as u8]
}

/// Set underline thickness (ESC - n). 0 = off, 1 = thin, 2 = thick.
#[inline]
pub fn underline(level: u8) -> Vec<u8> {
    vec![ESC, b'-', level]
}

/// # Set Character Size (GS ! n)
///
/// High nibble is the width multiplier minus one, low nibble the height
/// multiplier minus one. `0x11` is double width and double height.
#[inline]
pub fn char_size(n: u8) -> Vec<u8> {
    vec![GS, b'!', n]
}

/// Turn white/black reverse printing on or off (GS B n).
#[inline]
pub fn reverse(on: bool) -> Vec<u8> {
    vec![GS, b'B', on as u8]
}

// ============================================================================
// LAYOUT
// ============================================================================

/// Set left margin in dots (GS L nL nH).
#[inline]
pub fn left_margin(dots: u16) -> Vec<u8> {
    let [lo, hi] = u16_le(dots);
    vec![GS, b'L', lo, hi]
}

/// Set print area width in dots (GS W nL nH).
#[inline]
pub fn print_area_width(dots: u16) -> Vec<u8> {
    let [lo, hi] = u16_le(dots);
    vec![GS, b'W', lo, hi]
}

/// Print buffer and feed `dots` (ESC J n).
#[inline]
pub fn feed(dots: u8) -> Vec<u8> {
    vec![ESC, b'J', dots]
}

// ============================================================================
// PAPER AND PERIPHERALS
// ============================================================================

/// # Cut Paper (GS V n)
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS V n |
/// | Hex     | 1D 56 n |
///
/// `n = 0` full cut, `n = 1` partial cut.
#[inline]
pub fn cut(cut_type: CutType) -> Vec<u8> {
    let n = match cut_type {
        CutType::Full => 0x00,
        CutType::Partial => 0x01,
    };
    vec![GS, b'V', n]
}

/// # Generate Pulse (ESC p m t1 t2)
///
/// Kicks the cash drawer connected to pin `m` (0 or 1). The pulse is on for
/// `t1 × 2` ms and off for `t2 × 2` ms.
#[inline]
pub fn pulse(pin: u8, t1: u8, t2: u8) -> Vec<u8> {
    vec![ESC, b'p', pin, t1, t2]
}

// ============================================================================
// BARCODES AND GRAPHICS
// ============================================================================

/// Set barcode height in dots (GS h n).
#[inline]
pub fn barcode_height(dots: u8) -> Vec<u8> {
    vec![GS, b'h', dots]
}

/// # Print Barcode (GS k m d1…dk NUL)
///
/// NUL-terminated form. `data` must not contain NUL.
pub fn barcode(kind: u8, data: &[u8]) -> Vec<u8> {
    debug_assert!(!data.contains(&NUL), "barcode data must not contain NUL");

    let mut cmd = Vec::with_capacity(4 + data.len());
    cmd.extend_from_slice(&[GS, b'k', kind]);
    cmd.extend_from_slice(data);
    cmd.push(NUL);
    cmd
}

/// # Print Raster Bit Image (GS v 0 m xL xH yL yH d1…dk)
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS v 0 m xL xH yL yH d1…dk |
/// | Hex     | 1D 76 30 m xL xH yL yH d1…dk |
///
/// - `width_bytes`: bytes per row (8 dots each)
/// - `height`: rows
/// - `data`: `width_bytes × height` bytes, MSB = leftmost dot
///
/// ```
/// use virtual_printer::protocol::commands;
///
/// let cmd = commands::raster(1, 1, &[0x80]);
/// assert_eq!(cmd, vec![0x1D, 0x76, 0x30, 0x00, 0x01, 0x00, 0x01, 0x00, 0x80]);
/// ```
pub fn raster(width_bytes: u16, height: u16, data: &[u8]) -> Vec<u8> {
    debug_assert!(
        data.len() == width_bytes as usize * height as usize,
        "Raster data must be exactly width_bytes * height bytes. Expected {}, got {}",
        width_bytes as usize * height as usize,
        data.len()
    );

    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(height);
    let mut cmd = Vec::with_capacity(8 + data.len());
    cmd.extend_from_slice(&[GS, b'v', b'0', 0, xl, xh, yl, yh]);
    cmd.extend_from_slice(data);
    cmd
}

/// Select bit-image mode (ESC * m nL nH d1…dk).
///
/// Modes 32 and 33 take 3 bytes per column, the others 1.
pub fn bit_image(mode: u8, width_dots: u16, data: &[u8]) -> Vec<u8> {
    let [lo, hi] = u16_le(width_dots);
    let mut cmd = Vec::with_capacity(5 + data.len());
    cmd.extend_from_slice(&[ESC, b'*', mode, lo, hi]);
    cmd.extend_from_slice(data);
    cmd
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Encode a u16 value as little-endian bytes `[low, high]`.
///
/// ```
/// use virtual_printer::protocol::commands::u16_le;
///
/// assert_eq!(u16_le(384), [0x80, 0x01]);
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

/// Read a little-endian `nL nH` pair.
#[inline]
pub const fn le_u16(lo: u8, hi: u8) -> u16 {
    lo as u16 | (hi as u16) << 8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_align() {
        assert_eq!(align(Alignment::Left), vec![0x1B, 0x61, 0x00]);
        assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
        assert_eq!(align(Alignment::Right), vec![0x1B, 0x61, 0x02]);
    }

    #[test]
    fn test_cut() {
        assert_eq!(cut(CutType::Full), vec![0x1D, 0x56, 0x00]);
        assert_eq!(cut(CutType::Partial), vec![0x1D, 0x56, 0x01]);
    }

    #[test]
    fn test_cut_type_from_byte() {
        assert_eq!(CutType::from_byte(0x00), CutType::Full);
        assert_eq!(CutType::from_byte(0x30), CutType::Full);
        assert_eq!(CutType::from_byte(0x01), CutType::Partial);
        assert_eq!(CutType::from_byte(0x31), CutType::Partial);
        assert_eq!(CutType::from_byte(0x42), CutType::Full);
    }

    #[test]
    fn test_margins() {
        assert_eq!(left_margin(10), vec![0x1D, 0x4C, 0x0A, 0x00]);
        assert_eq!(print_area_width(384), vec![0x1D, 0x57, 0x80, 0x01]);
    }

    #[test]
    fn test_barcode() {
        assert_eq!(barcode(4, b"AB"), vec![0x1D, 0x6B, 0x04, b'A', b'B', 0x00]);
    }

    #[test]
    fn test_lead_bytes() {
        for b in LEAD_BYTES {
            assert!(is_lead_byte(b));
        }
        assert!(!is_lead_byte(b'A'));
        assert!(!is_lead_byte(0x00));
        assert!(!is_lead_byte(0x10));
    }

    #[test]
    fn test_le_round_trip() {
        assert_eq!(le_u16(0x80, 0x01), 384);
        assert_eq!(u16_le(0x1234), [0x34, 0x12]);
    }
}
