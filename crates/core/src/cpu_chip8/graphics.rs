//! Two-bitplane framebuffer: sprite blits, scrolling, resolution switching.
//!
//! Both planes are always 128x64. Low resolution (64x32) is drawn by writing
//! every logical pixel as a 2x2 block into the same grid.

use serde::{Deserialize, Serialize};

pub const PLANE_WIDTH: usize = 128;
pub const PLANE_HEIGHT: usize = 64;
pub const PLANE_PIXELS: usize = PLANE_WIDTH * PLANE_HEIGHT;

/// Plane-select mask for both planes (XO-CHIP multicolour drawing)
pub const BOTH_PLANES: u8 = 0b11;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Display {
    planes: [Vec<bool>; 2],
    /// Bit 0 selects plane 0, bit 1 selects plane 1
    plane_select: u8,
    hires: bool,
    redraw: bool,
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

impl Display {
    pub fn new() -> Self {
        Self {
            planes: [vec![false; PLANE_PIXELS], vec![false; PLANE_PIXELS]],
            plane_select: 0b01,
            hires: false,
            redraw: true,
        }
    }

    /// Power-on state: both planes blank, plane 0 selected, low resolution
    pub fn reset(&mut self) {
        for plane in &mut self.planes {
            plane.fill(false);
        }
        self.plane_select = 0b01;
        self.hires = false;
        self.redraw = true;
    }

    pub fn is_well_formed(&self) -> bool {
        self.planes.iter().all(|plane| plane.len() == PLANE_PIXELS) && self.plane_select <= 0xF
    }

    pub fn plane(&self, index: usize) -> &[bool] {
        &self.planes[index & 1]
    }

    pub fn pixel(&self, plane: usize, x: usize, y: usize) -> bool {
        x < PLANE_WIDTH && y < PLANE_HEIGHT && self.planes[plane & 1][y * PLANE_WIDTH + x]
    }

    /// Palette index for a canvas pixel: 2 * plane1 + plane0
    pub fn color_index(&self, x: usize, y: usize) -> u8 {
        (self.pixel(1, x, y) as u8) << 1 | self.pixel(0, x, y) as u8
    }

    pub fn plane_select(&self) -> u8 {
        self.plane_select
    }

    /// FN01: store N as given. Bits above plane 1 select nothing, and the
    /// split multicolour layout only applies when the value is exactly 3.
    pub fn select_planes(&mut self, mask: u8) {
        self.plane_select = mask & 0xF;
    }

    pub fn is_hires(&self) -> bool {
        self.hires
    }

    pub fn needs_redraw(&self) -> bool {
        self.redraw
    }

    /// Returns the redraw flag and clears it
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    fn selected_planes(&mut self) -> impl Iterator<Item = &mut Vec<bool>> {
        let select = self.plane_select;
        self.planes
            .iter_mut()
            .enumerate()
            .filter(move |(index, _)| select & (1 << index) != 0)
            .map(|(_, plane)| plane)
    }

    /// 00E0: blank the selected planes
    pub fn clear(&mut self) {
        for plane in self.selected_planes() {
            plane.fill(false);
        }
        self.redraw = true;
    }

    /// 00FE/00FF
    pub fn set_hires(&mut self, hires: bool, clear: bool) {
        if clear {
            for plane in &mut self.planes {
                plane.fill(false);
            }
        }
        self.hires = hires;
        self.redraw = true;
    }

    /// Rows move towards higher y; the top `rows` rows come in blank.
    pub fn scroll_down(&mut self, rows: usize) {
        let shift = rows.min(PLANE_HEIGHT) * PLANE_WIDTH;
        for plane in self.selected_planes() {
            plane.copy_within(0..PLANE_PIXELS - shift, shift);
            plane[..shift].fill(false);
        }
        self.redraw = true;
    }

    /// Rows move towards lower y; the bottom `rows` rows come in blank.
    pub fn scroll_up(&mut self, rows: usize) {
        let shift = rows.min(PLANE_HEIGHT) * PLANE_WIDTH;
        for plane in self.selected_planes() {
            plane.copy_within(shift.., 0);
            plane[PLANE_PIXELS - shift..].fill(false);
        }
        self.redraw = true;
    }

    /// Columns move towards lower x within each row; the rightmost `cols` come in blank.
    pub fn scroll_left(&mut self, cols: usize) {
        let shift = cols.min(PLANE_WIDTH);
        for plane in self.selected_planes() {
            for row in plane.chunks_exact_mut(PLANE_WIDTH) {
                row.copy_within(shift.., 0);
                row[PLANE_WIDTH - shift..].fill(false);
            }
        }
        self.redraw = true;
    }

    /// Columns move towards higher x within each row; the leftmost `cols` come in blank.
    pub fn scroll_right(&mut self, cols: usize) {
        let shift = cols.min(PLANE_WIDTH);
        for plane in self.selected_planes() {
            for row in plane.chunks_exact_mut(PLANE_WIDTH) {
                row.copy_within(..PLANE_WIDTH - shift, shift);
                row[..shift].fill(false);
            }
        }
        self.redraw = true;
    }

    /// Number of sprite bytes DXYN consumes from memory under the current plane selection.
    pub fn sprite_len(&self, n: u8) -> usize {
        let per_plane = if n == 0 { 32 } else { n as usize };
        if self.plane_select == BOTH_PLANES {
            per_plane * 2
        } else {
            per_plane
        }
    }

    /// DXYN: XOR a sprite onto the selected planes. Returns true on collision.
    ///
    /// `n == 0` draws 16x16 (two bytes per row), otherwise 8xN. With plane
    /// select exactly 3 the sprite data holds plane 0's rows followed by
    /// plane 1's rows.
    pub fn draw_sprite(&mut self, x: u8, y: u8, n: u8, data: &[u8], wrap: bool) -> bool {
        let (width, rows) = if n == 0 { (16, 16) } else { (8, n as usize) };
        let per_plane = rows * width / 8;

        let mut collision = false;
        if self.plane_select == BOTH_PLANES {
            collision |= self.blit(x, y, width, rows, data, 0b01, wrap);
            collision |= self.blit(x, y, width, rows, data.get(per_plane..).unwrap_or(&[]), 0b10, wrap);
        } else {
            collision |= self.blit(x, y, width, rows, data, self.plane_select, wrap);
        }

        self.redraw = true;
        collision
    }

    fn blit(
        &mut self,
        x: u8,
        y: u8,
        width: usize,
        rows: usize,
        data: &[u8],
        mask: u8,
        wrap: bool,
    ) -> bool {
        let scale = if self.hires { 1 } else { 2 };
        let byte = |i: usize| data.get(i).copied().unwrap_or(0) as u16;

        let mut collision = false;
        for row in 0..rows {
            let bits = if width == 16 {
                byte(2 * row) << 8 | byte(2 * row + 1)
            } else {
                byte(row) << 8
            };
            let sy = (y as usize + row) * scale;

            for col in 0..width {
                if bits & (0x8000 >> col) == 0 {
                    continue;
                }
                let sx = (x as usize + col) * scale;
                if !wrap && (sx >= PLANE_WIDTH || sy >= PLANE_HEIGHT) {
                    continue;
                }
                let (px, py) = (sx % PLANE_WIDTH, sy % PLANE_HEIGHT);
                for dy in 0..scale {
                    for dx in 0..scale {
                        collision |= self.toggle(mask, px + dx, py + dy);
                    }
                }
            }
        }
        collision
    }

    /// XOR one canvas pixel on the masked planes; true if a lit pixel was turned off.
    fn toggle(&mut self, mask: u8, x: usize, y: usize) -> bool {
        let addr = y * PLANE_WIDTH + x;
        let mut collision = false;
        for (index, plane) in self.planes.iter_mut().enumerate() {
            if mask & (1 << index) != 0 {
                collision |= plane[addr];
                plane[addr] ^= true;
            }
        }
        collision
    }
}
