//! # ePOS-Print Ingestion
//!
//! Epson's ePOS-Print clients POST a SOAP envelope whose `<command>` element
//! carries the raw ESC/POS stream as hex text. This module extracts and
//! decodes that payload so it can be fed to an [`Assembler`] like any other
//! stream.
//!
//! ```text
//! <epos-print …><command>1b401b6101…</command></epos-print>
//!                        └─ hex ─► 1B 40 1B 61 01 …
//! ```
//!
//! [`Assembler`]: crate::protocol::Assembler

use std::sync::LazyLock;

use regex::Regex;

use crate::error::PrinterError;

/// HTTP path ePOS-Print clients post to.
pub const SERVICE_PATH: &str = "/cgi-bin/epos/service.cgi";

/// Success response expected by ePOS-Print clients.
pub const RESPONSE_ENVELOPE: &str = concat!(
    r#"<?xml version="1.0" encoding="utf-8"?>"#,
    r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">"#,
    r#"<s:Header><parameter xmlns="http://www.epson-pos.com/schemas/2011/03/epos-print">"#,
    r#"<devid>local_printer</devid><printjobid></printjobid></parameter></s:Header>"#,
    r#"<s:Body><response success="true" code="" status="251658262" battery="0" "#,
    r#"xmlns="http://www.epson-pos.com/schemas/2011/03/epos-print"></response></s:Body>"#,
    r#"</s:Envelope>"#,
);

static COMMAND_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<command>(.*?)</command>").expect("command element pattern is valid")
});

/// Extract and hex-decode the `<command>` payload of an ePOS-Print request.
///
/// ## Example
///
/// ```
/// use virtual_printer::epos;
///
/// let body = "<epos-print><command>1b40 0a</command></epos-print>";
/// assert_eq!(epos::extract_commands(body).unwrap(), vec![0x1B, 0x40, 0x0A]);
/// ```
pub fn extract_commands(body: &str) -> Result<Vec<u8>, PrinterError> {
    let hex = COMMAND_ELEMENT
        .captures(body)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| PrinterError::Epos("missing <command> element".to_string()))?;

    decode_hex(hex.as_str())
}

/// Decode hex text, ignoring whitespace.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, PrinterError> {
    let digits: Vec<u8> = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    if digits.len() % 2 != 0 {
        return Err(PrinterError::Epos(format!(
            "odd number of hex digits ({})",
            digits.len()
        )));
    }

    digits
        .chunks_exact(2)
        .map(|pair| -> Result<u8, PrinterError> {
            Ok((hex_value(pair[0])? << 4) | hex_value(pair[1])?)
        })
        .collect()
}

fn hex_value(digit: u8) -> Result<u8, PrinterError> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        other => Err(PrinterError::Epos(format!(
            "invalid hex digit {:?}",
            other as char
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_soap_body() {
        let body = r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>
<epos-print xmlns="http://www.epson-pos.com/schemas/2011/03/epos-print"><command>1B401D5601</command></epos-print>
</s:Body></s:Envelope>"#;
        assert_eq!(
            extract_commands(body).unwrap(),
            vec![0x1B, 0x40, 0x1D, 0x56, 0x01]
        );
    }

    #[test]
    fn test_command_spanning_lines() {
        let body = "<command>\n1b40\n48 69\n</command>";
        assert_eq!(extract_commands(body).unwrap(), vec![0x1B, 0x40, b'H', b'i']);
    }

    #[test]
    fn test_missing_command() {
        let err = extract_commands("<epos-print></epos-print>").unwrap_err();
        assert!(matches!(err, PrinterError::Epos(_)));
    }

    #[test]
    fn test_odd_length() {
        assert!(matches!(decode_hex("1b4"), Err(PrinterError::Epos(_))));
    }

    #[test]
    fn test_invalid_digit() {
        let err = decode_hex("1g").unwrap_err();
        assert_eq!(err.to_string(), "ePOS request error: invalid hex digit 'g'");
    }

    #[test]
    fn test_empty_command() {
        assert_eq!(extract_commands("<command></command>").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_response_envelope() {
        assert!(RESPONSE_ENVELOPE.starts_with("<?xml"));
        assert!(RESPONSE_ENVELOPE.contains(r#"success="true""#));
        assert!(RESPONSE_ENVELOPE.ends_with("</s:Envelope>"));
    }
}
