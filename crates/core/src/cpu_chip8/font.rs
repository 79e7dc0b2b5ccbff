//! Built-in glyph tables loaded into low memory on initialization.

/// Address of the 4x5 hexadecimal glyphs (0-F), 5 bytes each
pub const SMALL_FONT_ADDR: u16 = 0x000;
/// Address of the SUPER-CHIP 8x10 decimal glyphs (0-9), 10 bytes each
pub const LARGE_FONT_ADDR: u16 = 0x050;

pub const SMALL_GLYPH_BYTES: u16 = 5;
pub const LARGE_GLYPH_BYTES: u16 = 10;

/// Both tables back to back, as they sit at address 0
pub const FONT: [u8; 180] = [
    // 4x5 glyphs 0-F
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
    // 8x10 glyphs 0-9
    0x3C, 0x7E, 0xE7, 0xC3, 0xC3, 0xC3, 0xC3, 0xE7, 0x7E, 0x3C, // 0
    0x18, 0x38, 0x58, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x3C, // 1
    0x3E, 0x7F, 0xC3, 0x06, 0x0C, 0x18, 0x30, 0x60, 0xFF, 0xFF, // 2
    0x3C, 0x7E, 0xC3, 0x03, 0x0E, 0x0E, 0x03, 0xC3, 0x7E, 0x3C, // 3
    0x06, 0x0E, 0x1E, 0x36, 0x66, 0xC6, 0xFF, 0xFF, 0x06, 0x06, // 4
    0xFF, 0xFF, 0xC0, 0xC0, 0xFC, 0xFE, 0x03, 0xC3, 0x7E, 0x3C, // 5
    0x3E, 0x7C, 0xC0, 0xC0, 0xFC, 0xFE, 0xC3, 0xC3, 0x7E, 0x3C, // 6
    0xFF, 0xFF, 0x03, 0x06, 0x0C, 0x18, 0x30, 0x60, 0x60, 0x60, // 7
    0x3C, 0x7E, 0xC3, 0xC3, 0x7E, 0x7E, 0xC3, 0xC3, 0x7E, 0x3C, // 8
    0x3C, 0x7E, 0xC3, 0xC3, 0x7F, 0x3F, 0x03, 0x03, 0x3E, 0x7C, // 9
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_contiguous() {
        assert_eq!(LARGE_FONT_ADDR, 16 * SMALL_GLYPH_BYTES);
        assert_eq!(FONT.len() as u16, LARGE_FONT_ADDR + 10 * LARGE_GLYPH_BYTES);
    }

    #[test]
    fn test_glyph_f_and_large_zero() {
        let f = (0xF * SMALL_GLYPH_BYTES) as usize;
        assert_eq!(&FONT[f..f + 5], &[0xF0, 0x80, 0xF0, 0x80, 0x80]);
        let zero = LARGE_FONT_ADDR as usize;
        assert_eq!(FONT[zero], 0x3C);
        assert_eq!(FONT[zero + 9], 0x3C);
    }
}
