//! # ESC/POS Protocol Decoder
//!
//! This module turns the byte stream a till sends to its receipt printer
//! back into structured output: text runs, printer commands and raster
//! images, with the printer's formatting modes tracked along the way.
//!
//! ## Module Structure
//!
//! - [`grammar`]: recognizes one command at the head of a byte window
//! - [`assembler`]: buffers chunked input and drives the grammar
//! - [`raster`]: unpacks `GS v 0` raster images
//! - [`state`]: persistent printer modes (alignment, emphasis, sizes…)
//! - [`block`]: decoded output values
//! - [`commands`]: lead bytes and command builders
//! - [`cp852`]: text code page
//!
//! ## Usage Example
//!
//! ```
//! use virtual_printer::protocol::{commands, Assembler, Block};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(commands::emphasized(true));
//! data.extend(commands::text("Total: 12,50\n"));
//!
//! let finish = Assembler::decode_all(&data);
//! assert!(finish.remainder.is_none());
//! assert!(matches!(
//!     &finish.blocks[2],
//!     Block::Text { content, emphasized: true, .. } if content == "Total: 12,50"
//! ));
//! ```
//!
//! ## Supported Commands
//!
//! Only a fixed subset of ESC/POS is recognized; see [`grammar`] for the
//! table. Everything else degrades to an `Unknown … Command` block.

pub mod assembler;
pub mod block;
pub mod commands;
pub mod cp852;
pub mod grammar;
pub mod raster;
pub mod state;

pub use assembler::{Assembler, Finish, Remainder};
pub use block::{Block, Details, Image};
pub use grammar::{Completion, ParseOutcome, decode};
pub use state::{Alignment, PrinterState};
