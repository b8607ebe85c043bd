//! # Printer Transport Layer
//!
//! This module provides the ingest side of the virtual printer: the
//! connections a till opens when it believes it is talking to a printer.
//!
//! ## Available Transports
//!
//! - [`tcp`]: raw ESC/POS over TCP ("port 9100" / JetDirect style)
//!
//! The ePOS-Print HTTP path lives in the server, see [`crate::epos`].

pub mod tcp;

pub use tcp::EscPosListener;
