//! Four-entry colour table for bitplane compositing.
//!
//! Index `2 * plane1 + plane0` selects the colour. Palette files hold one
//! hexadecimal RGB value per line.

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const PALETTE_SIZE: usize = 4;

/// Black, dark grey, light grey, near white
pub const DEFAULT_COLORS: [u32; PALETTE_SIZE] = [0x000000, 0x545454, 0xA8A8A8, 0xFCFCFC];

#[derive(thiserror::Error, Debug)]
pub enum PaletteError {
    #[error("line {line}: {text:?} is not a hexadecimal RGB colour")]
    InvalidColor { line: usize, text: String },
    #[error("Failed to read palette file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// 0xRRGGBB per entry
    colors: [u32; PALETTE_SIZE],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS,
        }
    }
}

impl Palette {
    pub fn new(colors: [u32; PALETTE_SIZE]) -> Self {
        Self {
            colors: colors.map(|c| c & 0xFF_FFFF),
        }
    }

    /// Default palette overlaid with the colours in a palette file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PaletteError> {
        let text = std::fs::read_to_string(path)?;
        let mut palette = Self::default();
        palette.parse_into(&text)?;
        Ok(palette)
    }

    /// Assign colours from `text` in order, starting at index 0.
    ///
    /// Blank lines are skipped and anything past the fourth colour is
    /// ignored. Entries not named keep their current value. On error the
    /// palette is left unchanged. Returns the number of entries assigned.
    pub fn parse_into(&mut self, text: &str) -> Result<usize, PaletteError> {
        let mut parsed = Vec::with_capacity(PALETTE_SIZE);

        for (index, raw) in text.lines().enumerate() {
            if parsed.len() == PALETTE_SIZE {
                break;
            }
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            let digits = line.strip_prefix('#').unwrap_or(line);
            match u32::from_str_radix(digits, 16) {
                Ok(color) if color <= 0xFF_FFFF => parsed.push(color),
                _ => {
                    return Err(PaletteError::InvalidColor {
                        line: index + 1,
                        text: line.to_string(),
                    })
                }
            }
        }

        self.colors[..parsed.len()].copy_from_slice(&parsed);
        Ok(parsed.len())
    }

    /// 0xRRGGBB for a colour index (masked to 0..4)
    pub fn rgb(&self, index: u8) -> u32 {
        self.colors[(index & 0b11) as usize]
    }

    /// Opaque 0xAARRGGBB for a colour index
    pub fn argb(&self, index: u8) -> u32 {
        0xFF00_0000 | self.rgb(index)
    }

    pub fn colors(&self) -> &[u32; PALETTE_SIZE] {
        &self.colors
    }
}
