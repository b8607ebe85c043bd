//! # Virtual Printer - ESC/POS Receipt Printer Emulator
//!
//! Virtual Printer poses as a networked receipt printer and turns the ESC/POS
//! byte stream a till sends into structured blocks a viewer can render. It
//! provides:
//!
//! - **Decoder**: incremental ESC/POS parsing with printer state tracking
//! - **Text**: CP852 (Central European) decoding and encoding
//! - **Images**: GS v 0 raster bitmaps, re-encoded as PNG for viewers
//! - **Ingest**: raw TCP on port 9100 and Epson ePOS-Print over HTTP
//!
//! ## Quick Start
//!
//! ```
//! use virtual_printer::protocol::{commands, Alignment, Assembler, Block};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(commands::align(Alignment::Center));
//! data.extend(commands::text("Dva obrázky\n"));
//!
//! let mut assembler = Assembler::new();
//! let mut blocks = assembler.on_chunk(&data[..5]);
//! blocks.extend(assembler.on_chunk(&data[5..]));
//! blocks.extend(assembler.on_end().blocks);
//!
//! assert_eq!(blocks[0].command_name(), Some("Initialize Printer"));
//! assert_eq!(blocks[2].as_text(), Some("Dva obrázky"));
//! assert!(matches!(&blocks[2], Block::Text { alignment: Alignment::Center, .. }));
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | Decoder, printer state, command builders |
//! | [`preview`] | Wire encoding for viewers (PNG images) |
//! | [`epos`] | ePOS-Print request handling |
//! | [`transport`] | Raw ESC/POS TCP listener |
//! | [`server`] | HTTP endpoints and viewer stream |
//! | [`error`] | Error types |

pub mod epos;
pub mod error;
pub mod preview;
pub mod protocol;
pub mod server;
pub mod transport;

// Re-exports for convenience
pub use error::PrinterError;
pub use protocol::{Assembler, Block};
