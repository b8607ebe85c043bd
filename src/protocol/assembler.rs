//! # Stream Assembler
//!
//! Turns an unbounded sequence of byte chunks into an ordered sequence of
//! blocks. Bytes are appended to an accumulation buffer; the grammar is run
//! against the buffer head until it stops making progress, and whatever is
//! left waits for the next chunk.
//!
//! ```text
//! chunk ─► buffer ─► grammar ─► block, block, …
//!            ▲          │
//!            └──────────┘ incomplete: wait for more
//! ```
//!
//! Block order always matches byte order. Where a chunk boundary splits a
//! command, text run or bare `GS V`, the assembler holds it back, so feeding
//! a stream byte by byte yields the same blocks as feeding it whole.
//!
//! ## Example
//!
//! ```
//! use virtual_printer::protocol::Assembler;
//!
//! let mut assembler = Assembler::new();
//! assert!(assembler.on_chunk(b"Hel").is_empty());
//! let blocks = assembler.on_chunk(b"lo\n");
//! assert_eq!(blocks[0].as_text(), Some("Hello"));
//! assert_eq!(blocks[1].as_text(), Some("\n"));
//! ```

use std::fmt;

use super::block::Block;
use super::grammar::{Completion, decode_with};
use super::state::PrinterState;

/// Per-session decoder: accumulation buffer plus printer state.
#[derive(Debug, Default)]
pub struct Assembler {
    buffer: Vec<u8>,
    state: PrinterState,
    limit: Option<usize>,
    discarded: usize,
}

/// Result of [`Assembler::on_end`].
#[derive(Debug, Clone, PartialEq)]
pub struct Finish {
    pub blocks: Vec<Block>,
    /// Undecodable bytes left at the end of the stream
    pub remainder: Option<Remainder>,
}

/// Trailing bytes that never formed a complete command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remainder {
    pub bytes: Vec<u8>,
}

impl fmt::Display for Remainder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "incomplete command at end of stream ({} bytes:", self.bytes.len())?;
        for byte in self.bytes.iter().take(16) {
            write!(f, " {byte:02X}")?;
        }
        if self.bytes.len() > 16 {
            write!(f, " …")?;
        }
        write!(f, ")")
    }
}

impl Assembler {
    /// Unbounded assembler with default printer state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembler that discards its buffer once a stalled command holds more
    /// than `max_bytes`.
    pub fn with_limit(max_bytes: usize) -> Self {
        Self {
            limit: Some(max_bytes),
            ..Self::default()
        }
    }

    /// Decode a complete stream in one go.
    pub fn decode_all(bytes: &[u8]) -> Finish {
        let mut assembler = Self::new();
        let mut blocks = assembler.on_chunk(bytes);
        let mut finish = assembler.on_end();
        blocks.append(&mut finish.blocks);
        finish.blocks = blocks;
        finish
    }

    /// Current printer modes.
    pub fn state(&self) -> &PrinterState {
        &self.state
    }

    /// Bytes buffered and waiting for more input.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Total bytes dropped because the buffer limit was exceeded.
    pub fn discarded_bytes(&self) -> usize {
        self.discarded
    }

    /// Feed the next chunk; returns every block that became decodable.
    pub fn on_chunk(&mut self, bytes: &[u8]) -> Vec<Block> {
        self.buffer.extend_from_slice(bytes);

        let mut blocks = Vec::new();
        self.drain(Completion::Partial, &mut blocks);

        if let Some(limit) = self.limit {
            if self.buffer.len() > limit {
                self.enforce_limit(limit, &mut blocks);
            }
        }

        blocks
    }

    /// Signal end of stream: drains what is left and reports any remainder.
    pub fn on_end(&mut self) -> Finish {
        let mut blocks = Vec::new();
        self.drain(Completion::Final, &mut blocks);

        let remainder = if self.buffer.is_empty() {
            None
        } else {
            let remainder = Remainder {
                bytes: std::mem::take(&mut self.buffer),
            };
            log::warn!("{remainder}");
            Some(remainder)
        };

        Finish { blocks, remainder }
    }

    fn drain(&mut self, completion: Completion, blocks: &mut Vec<Block>) {
        let mut offset = 0;
        while offset < self.buffer.len() {
            let outcome = decode_with(&self.buffer[offset..], &mut self.state, completion);
            if outcome.is_incomplete() {
                break;
            }
            blocks.extend(outcome.block);
            offset += outcome.consumed;
        }
        self.buffer.drain(..offset);
    }

    fn enforce_limit(&mut self, limit: usize, blocks: &mut Vec<Block>) {
        // An over-long text run only needs flushing; a stalled command goes.
        self.drain(Completion::Final, blocks);
        if self.buffer.len() > limit {
            log::warn!(
                "discarding {} buffered bytes: stalled command exceeds the {} byte limit",
                self.buffer.len(),
                limit
            );
            self.discarded += self.buffer.len();
            self.buffer.clear();
        }
    }
}
