//! # Command Grammar
//!
//! Recognizes at most one command (or one text run) at the start of a byte
//! window and reports how many bytes it occupies.
//!
//! ## Dispatch
//!
//! | Lead byte | Meaning |
//! |-----------|---------|
//! | `0A` | Line feed, emitted as a `"\n"` text block |
//! | `1B` | ESC command |
//! | `1D` | GS command |
//! | `1C` | FS command |
//! | anything else | Text run up to the next lead byte |
//!
//! ## Incomplete Input
//!
//! When the command at offset 0 needs more bytes than the window holds the
//! outcome is [`ParseOutcome::INCOMPLETE`] and the printer state is left
//! untouched. The caller appends more input and asks again.
//!
//! ## Unknown Opcodes
//!
//! Unrecognized sub-commands become an `Unknown … Command` block that
//! consumes the 2-byte header. This always makes progress, but an opcode
//! with a longer payload than that will leak its parameters into the
//! following text.

use serde_json::Value;

use super::block::{Block, details};
use super::commands::{CutType, ESC, FS, GS, LF, NUL, is_lead_byte, le_u16};
use super::cp852;
use super::raster::{bit_image_len, decode_raster};
use super::state::{Alignment, PrinterState};

/// Result of one grammar invocation.
///
/// `consumed == 0` exactly when `block` is `None` and no progress was made.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub block: Option<Block>,
    pub consumed: usize,
}

impl ParseOutcome {
    /// Nothing decodable yet.
    pub const INCOMPLETE: ParseOutcome = ParseOutcome {
        block: None,
        consumed: 0,
    };

    fn emit(block: Block, consumed: usize) -> Self {
        Self {
            block: Some(block),
            consumed,
        }
    }

    pub fn is_incomplete(&self) -> bool {
        self.consumed == 0
    }
}

/// Whether more input may still follow the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// More bytes may arrive. Decodes whose result depends on what follows
    /// the window (an unterminated text run, a bare `GS V`) wait.
    Partial,
    /// The window is all there is.
    Final,
}

/// Decode one command at the start of `window`.
///
/// The window is treated as final: a text run that reaches the end of the
/// window is emitted as-is and a bare `GS V` is a full cut.
///
/// ## Example
///
/// ```
/// use virtual_printer::protocol::{grammar, Alignment, PrinterState};
///
/// let mut state = PrinterState::new();
/// let outcome = grammar::decode(&[0x1B, 0x61, 0x01], &mut state);
/// assert_eq!(outcome.consumed, 3);
/// assert_eq!(state.alignment, Alignment::Center);
/// ```
pub fn decode(window: &[u8], state: &mut PrinterState) -> ParseOutcome {
    decode_with(window, state, Completion::Final)
}

/// Decode one command at the start of `window` under the given completion mode.
pub fn decode_with(
    window: &[u8],
    state: &mut PrinterState,
    completion: Completion,
) -> ParseOutcome {
    let Some(&lead) = window.first() else {
        return ParseOutcome::INCOMPLETE;
    };

    let outcome = match lead {
        LF => Some(ParseOutcome::emit(Block::text("\n", state), 1)),
        ESC => decode_esc(window, state),
        GS => decode_gs(window, state, completion),
        FS => decode_fs(window),
        _ => decode_text(window, state, completion),
    };

    outcome.unwrap_or(ParseOutcome::INCOMPLETE)
}

fn decode_text(
    window: &[u8],
    state: &PrinterState,
    completion: Completion,
) -> Option<ParseOutcome> {
    let end = match window.iter().position(|&b| is_lead_byte(b)) {
        Some(end) => end,
        None if completion == Completion::Final => window.len(),
        None => return None,
    };
    let content = cp852::decode(&window[..end]);
    Some(ParseOutcome::emit(Block::text(content, state), end))
}

// ============================================================================
// ESC
// ============================================================================

fn decode_esc(window: &[u8], state: &mut PrinterState) -> Option<ParseOutcome> {
    let sub = *window.get(1)?;

    let outcome = match sub {
        b'@' => {
            state.reset_to_defaults();
            ParseOutcome::emit(Block::command("Initialize Printer"), 2)
        }
        b'a' => {
            let n = *window.get(2)?;
            let block = match Alignment::from_byte(n) {
                Some(alignment) => {
                    state.alignment = alignment;
                    Block::command_with(
                        "Set Alignment",
                        details([("alignment", alignment.name().into())]),
                    )
                }
                None => Block::command_with(
                    "Set Alignment (unknown)",
                    details([("byte", n.into())]),
                ),
            };
            ParseOutcome::emit(block, 3)
        }
        b'E' => {
            let n = *window.get(2)?;
            state.emphasized = n != 0;
            ParseOutcome::emit(
                Block::command_with(
                    "Set Emphasized",
                    details([("emphasized", state.emphasized.into())]),
                ),
                3,
            )
        }
        b'-' => {
            let n = *window.get(2)?;
            state.underline = n;
            ParseOutcome::emit(
                Block::command_with("Set Underline", details([("underline", n.into())])),
                3,
            )
        }
        b'M' => param_command(window, "Select Font", "font")?,
        b' ' => param_command(window, "Char Spacing", "spacing")?,
        b'!' => param_command(window, "Set Font Size/Style", "byte")?,
        b'$' => {
            let (lo, hi) = (*window.get(2)?, *window.get(3)?);
            ParseOutcome::emit(
                Block::command_with(
                    "Absolute Print Position",
                    details([("position", le_u16(lo, hi).into())]),
                ),
                4,
            )
        }
        b'p' => {
            let params = window.get(2..5)?;
            ParseOutcome::emit(
                Block::command_with(
                    "Generate Pulse",
                    details([
                        ("mode", params[0].into()),
                        ("t1", params[1].into()),
                        ("t2", params[2].into()),
                    ]),
                ),
                5,
            )
        }
        b'i' => ParseOutcome::emit(cut_block("ESC i", CutType::Full), 2),
        b'J' => param_command(window, "Print & Feed", "dots")?,
        b't' => param_command(window, "Select Code Table", "table")?,
        b'*' => {
            let total = bit_image_len(window)?;
            if window.len() < total {
                return None;
            }
            ParseOutcome::emit(
                Block::command_with(
                    "Bit Image",
                    details([
                        ("mode", window[2].into()),
                        ("width", le_u16(window[3], window[4]).into()),
                    ]),
                ),
                total,
            )
        }
        other => unknown("ESC", other),
    };

    Some(outcome)
}

// ============================================================================
// GS
// ============================================================================

fn decode_gs(
    window: &[u8],
    state: &mut PrinterState,
    completion: Completion,
) -> Option<ParseOutcome> {
    let sub = *window.get(1)?;

    let outcome = match sub {
        b'!' => {
            let n = *window.get(2)?;
            state.char_size = n;
            ParseOutcome::emit(
                Block::command_with("Set Char Size", details([("size", n.into())])),
                3,
            )
        }
        b'L' => {
            let (lo, hi) = (*window.get(2)?, *window.get(3)?);
            state.left_margin = le_u16(lo, hi);
            ParseOutcome::emit(
                Block::command_with(
                    "Set Left Margin",
                    details([("margin", state.left_margin.into())]),
                ),
                4,
            )
        }
        b'W' => {
            let (lo, hi) = (*window.get(2)?, *window.get(3)?);
            state.print_area_width = le_u16(lo, hi);
            ParseOutcome::emit(
                Block::command_with(
                    "Set Print Area Width",
                    details([("width", state.print_area_width.into())]),
                ),
                4,
            )
        }
        b'B' => {
            let n = *window.get(2)?;
            state.reverse_printing = n != 0;
            ParseOutcome::emit(
                Block::command_with(
                    "Reverse Printing",
                    details([("reverse", state.reverse_printing.into())]),
                ),
                3,
            )
        }
        b'h' => param_command(window, "Barcode Height", "height")?,
        b'k' => {
            let kind = *window.get(2)?;
            let end = 3 + window.get(3..)?.iter().position(|&b| b == NUL)?;
            let data = cp852::decode(&window[3..end]);
            ParseOutcome::emit(
                Block::command_with(
                    "Print Barcode",
                    details([("type", kind.into()), ("data", data.into())]),
                ),
                end + 1,
            )
        }
        b'V' => match window.get(2) {
            Some(&n) => ParseOutcome::emit(cut_block("GS V n", CutType::from_byte(n)), 3),
            None if completion == Completion::Final => {
                ParseOutcome::emit(cut_block("GS V", CutType::Full), 2)
            }
            None => return None,
        },
        b'v' => {
            let mode = *window.get(2)?;
            if mode != b'0' {
                log::debug!("unknown GS v mode 0x{mode:02X}");
                ParseOutcome::emit(
                    Block::command_with("Unknown GS v Command", details([("byte", mode.into())])),
                    3,
                )
            } else {
                let (image, consumed) = decode_raster(window)?;
                ParseOutcome::emit(Block::Image(image), consumed)
            }
        }
        other => unknown("GS", other),
    };

    Some(outcome)
}

// ============================================================================
// FS
// ============================================================================

fn decode_fs(window: &[u8]) -> Option<ParseOutcome> {
    let sub = *window.get(1)?;

    let outcome = match sub {
        b'.' => ParseOutcome::emit(Block::command("Cancel Chinese Character Mode"), 2),
        other => unknown("FS", other),
    };

    Some(outcome)
}

// ============================================================================
// HELPERS
// ============================================================================

/// Informational 3-byte command surfacing its single parameter.
fn param_command(window: &[u8], name: &str, key: &str) -> Option<ParseOutcome> {
    let n = *window.get(2)?;
    Some(ParseOutcome::emit(
        Block::command_with(name, details([(key, n.into())])),
        3,
    ))
}

fn cut_block(command: &str, cut_type: CutType) -> Block {
    Block::command_with(
        "Cut Paper",
        details([
            ("command", Value::from(command)),
            ("cutType", cut_type.name().into()),
        ]),
    )
}

fn unknown(prefix: &str, byte: u8) -> ParseOutcome {
    log::debug!("unknown {prefix} command 0x{byte:02X}");
    ParseOutcome::emit(
        Block::command_with(
            &format!("Unknown {prefix} Command"),
            details([("byte", byte.into())]),
        ),
        2,
    )
}
