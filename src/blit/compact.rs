//! Compact RLE sprite drawing
//!
//! Each control byte packs a transparent skip in the low nibble and an opaque
//! run length in the high nibble; the run's pixels follow it. A run length of
//! 0 ends the row, `0x0F` ends the sprite. Rows are `COMPACT_ROW_WIDTH` wide.

use super::{plot, BlendMode};
use crate::sprite::{
    SpriteSheet, COMPACT_CELL_HEIGHT, COMPACT_END, COMPACT_ROW_WIDTH, COMPACT_SHEET_COLUMNS,
};
use crate::surface::IndexedSurface;

#[inline]
fn split(control: u8) -> (isize, usize) {
    ((control & 0x0F) as isize, (control >> 4) as usize)
}

/// Draw with no horizontal clipping, bounded by the surface's linear extent
pub(crate) fn draw(
    surface: &mut IndexedSurface<'_>,
    x: i32,
    y: i32,
    stream: &[u8],
    mode: BlendMode,
) {
    let pitch = surface.pitch() as isize;
    let upper = surface.upper_limit() as isize;
    let pixels = surface.pixels_mut();

    let mut pos = y as isize * pitch + x as isize;
    let mut i = 0;

    while let Some(&control) = stream.get(i) {
        if control == COMPACT_END {
            break;
        }
        let (skip, count) = split(control);
        pos += skip;

        if count == 0 {
            pos += pitch - COMPACT_ROW_WIDTH as isize;
        } else {
            let start = (i + 1).min(stream.len());
            let run = &stream[start..(start + count).min(stream.len())];

            if pos >= 0 && pos + run.len() as isize <= upper {
                let at = pos as usize;
                mode.combine_run(&mut pixels[at..at + run.len()], run);
            } else {
                for (k, &value) in run.iter().enumerate() {
                    let at = pos + k as isize;
                    if at >= upper {
                        return;
                    }
                    plot(pixels, at, value, mode);
                }
            }

            pos += count as isize;
            i += count;
        }
        i += 1;
    }
}

/// Draw clipped to the visible rectangle. Stops as soon as the cursor row
/// passes the bottom edge.
pub(crate) fn draw_clipped(
    surface: &mut IndexedSurface<'_>,
    x: i32,
    y: i32,
    stream: &[u8],
    mode: BlendMode,
) {
    let width = surface.width() as isize;
    let height = surface.height() as isize;
    let pitch = surface.pitch() as isize;
    let pixels = surface.pixels_mut();

    let (mut x, mut y) = (x as isize, y as isize);
    let mut i = 0;

    while let Some(&control) = stream.get(i) {
        if control == COMPACT_END {
            break;
        }
        if y >= height {
            return;
        }
        let (skip, count) = split(control);
        x += skip;

        if count == 0 {
            y += 1;
            x -= COMPACT_ROW_WIDTH as isize;
        } else {
            if y >= 0 {
                let start = (i + 1).min(stream.len());
                let run = &stream[start..(start + count).min(stream.len())];
                for (k, &value) in run.iter().enumerate() {
                    let col = x + k as isize;
                    if (0..width).contains(&col) {
                        let dst = &mut pixels[(y * pitch + col) as usize];
                        *dst = mode.combine(*dst, value);
                    }
                }
            }
            x += count as isize;
            i += count;
        }
        i += 1;
    }
}

impl SpriteSheet {
    fn blittable(&self, index: usize) -> Option<&[u8]> {
        let stream = self.stream(index);
        debug_assert!(
            stream.is_some(),
            "sprite {} is outside a sheet of {}",
            index,
            self.len()
        );
        stream
    }

    /// Draw 1-based sprite `index` with its top-left corner at (`x`, `y`),
    /// wrapping horizontally like the indexed-array blit.
    pub fn blit(
        &self,
        surface: &mut IndexedSurface<'_>,
        x: i32,
        y: i32,
        index: usize,
        mode: BlendMode,
    ) {
        if let Some(stream) = self.blittable(index) {
            draw(surface, x, y, stream, mode);
        }
    }

    pub fn blit_clipped(
        &self,
        surface: &mut IndexedSurface<'_>,
        x: i32,
        y: i32,
        index: usize,
        mode: BlendMode,
    ) {
        if let Some(stream) = self.blittable(index) {
            draw_clipped(surface, x, y, stream, mode);
        }
    }

    /// Draw the 24x28 composite whose top-left cell is `index`: the cell to
    /// its right, and the two cells one sheet row below.
    pub fn blit_2x2(
        &self,
        surface: &mut IndexedSurface<'_>,
        x: i32,
        y: i32,
        index: usize,
        mode: BlendMode,
        clip: bool,
    ) {
        const W: i32 = COMPACT_ROW_WIDTH as i32;
        const H: i32 = COMPACT_CELL_HEIGHT as i32;
        let cells = [
            (0, 0, index),
            (W, 0, index + 1),
            (0, H, index + COMPACT_SHEET_COLUMNS),
            (W, H, index + COMPACT_SHEET_COLUMNS + 1),
        ];

        for (dx, dy, cell) in cells {
            if clip {
                self.blit_clipped(surface, x + dx, y + dy, cell, mode);
            } else {
                self.blit(surface, x + dx, y + dy, cell, mode);
            }
        }
    }
}
