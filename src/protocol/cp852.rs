//! # Code Page 852 Text Codec
//!
//! Till software talking ESC/POS sends receipt text in the printer's legacy
//! single-byte code page. The senders this crate serves use CP852 (Central
//! European), so text runs are always decoded through this table.
//!
//! ASCII (0x00–0x7F) passes through unchanged. The upper half is a fixed
//! 128-entry table.

/// CP852 upper half: byte `0x80 + i` decodes to `UPPER_HALF[i]`.
const UPPER_HALF: [char; 128] = [
    // 0x80–0x8F
    'Ç', 'ü', 'é', 'â', 'ä', 'ů', 'ć', 'ç', 'ł', 'ë', 'Ő', 'ő', 'î', 'Ź', 'Ä', 'Ć',
    // 0x90–0x9F
    'É', 'Ĺ', 'ĺ', 'ô', 'ö', 'Ľ', 'ľ', 'Ś', 'ś', 'Ö', 'Ü', 'Ť', 'ť', 'Ł', '×', 'č',
    // 0xA0–0xAF
    'á', 'í', 'ó', 'ú', 'Ą', 'ą', 'Ž', 'ž', 'Ę', 'ę', '¬', 'ź', 'Č', 'ş', '«', '»',
    // 0xB0–0xBF: shades, box drawing, capitals
    '░', '▒', '▓', '│', '┤', 'Á', 'Â', 'Ě', 'Ş', '╣', '║', '╗', '╝', 'Ż', 'ż', '┐',
    // 0xC0–0xCF
    '└', '┴', '┬', '├', '─', '┼', 'Ă', 'ă', '╚', '╔', '╩', '╦', '╠', '═', '╬', '¤',
    // 0xD0–0xDF
    'đ', 'Đ', 'Ď', 'Ë', 'ď', 'Ň', 'Í', 'Î', 'ě', '┘', '┌', '█', '▄', 'Ţ', 'Ů', '▀',
    // 0xE0–0xEF
    'Ó', 'ß', 'Ô', 'Ń', 'ń', 'ň', 'Š', 'š', 'Ŕ', 'Ú', 'ŕ', 'Ű', 'ý', 'Ý', 'ţ', '´',
    // 0xF0–0xFF: 0xF0 is SHY, 0xFF is NBSP
    '\u{AD}', '˝', '˛', 'ˇ', '˘', '§', '÷', '¸', '°', '¨', '˙', 'ű', 'Ř', 'ř', '■', '\u{A0}',
];

/// Decode CP852 bytes into a Unicode string.
///
/// Every byte has a mapping, so this never fails.
///
/// ## Example
///
/// ```
/// use virtual_printer::protocol::cp852;
///
/// assert_eq!(cp852::decode(b"Dva obr\xA0zky"), "Dva obrázky");
/// ```
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| decode_byte(b)).collect()
}

/// Decode a single CP852 byte.
#[inline]
pub fn decode_byte(byte: u8) -> char {
    if byte < 0x80 {
        byte as char
    } else {
        UPPER_HALF[(byte - 0x80) as usize]
    }
}

/// Encode a Unicode string as CP852 bytes.
///
/// Characters with no CP852 representation are replaced with `?` and
/// logged.
pub fn encode(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        if (ch as u32) < 0x80 {
            out.push(ch as u8);
        } else if let Some(byte) = unicode_to_cp852(ch) {
            out.push(byte);
        } else {
            log::warn!(
                "cp852: unmapped character '{}' (U+{:04X}), replacing with '?'",
                ch,
                ch as u32
            );
            out.push(b'?');
        }
    }
    out
}

fn unicode_to_cp852(ch: char) -> Option<u8> {
    UPPER_HALF
        .iter()
        .position(|&c| c == ch)
        .map(|i| 0x80 + i as u8)
}
