//! # Printer State
//!
//! Persistent formatting modes that apply to every subsequent text run until
//! a command changes them or `ESC @` resets them. One instance belongs to one
//! session; the grammar receives it as `&mut` and mutates it in place.

use serde::{Deserialize, Serialize};

/// Text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

impl Alignment {
    /// Interpret an `ESC a n` parameter. Accepts both binary and ASCII digits.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 | b'0' => Some(Alignment::Left),
            1 | b'1' => Some(Alignment::Center),
            2 | b'2' => Some(Alignment::Right),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Alignment::Left => "Left",
            Alignment::Center => "Center",
            Alignment::Right => "Right",
        }
    }
}

/// Printer modes tracked across commands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrinterState {
    pub alignment: Alignment,
    /// Raw `GS ! n` value (width multiplier in the high nibble, height in the low)
    pub char_size: u8,
    /// Left margin in dots
    pub left_margin: u16,
    /// Print area width in dots (0 = printer default)
    pub print_area_width: u16,
    pub emphasized: bool,
    /// Underline thickness, 0 = off
    pub underline: u8,
    pub reverse_printing: bool,
}

impl PrinterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return to power-on defaults (`ESC @`).
    pub fn reset_to_defaults(&mut self) {
        *self = Self::default();
    }
}
