//! Indexed-array sprite drawing
//!
//! Stream grammar, read left to right with a column counter `x_offset`:
//! - `255 n`: skip `n` pixels
//! - `254`: skip to the end of the row
//! - `253`: skip one pixel
//! - anything else: one opaque pixel
//!
//! Whenever `x_offset` reaches the sprite width the cursor wraps to the start
//! of the next surface row.

use super::{plot, BlendMode};
use crate::sprite::{SpriteTables, TableId, NEXT_ROW, SKIP_ONE, SKIP_RUN};
use crate::surface::IndexedSurface;

/// Draw without horizontal clipping. Writes land only inside the surface's
/// linear extent; pixels past its right edge wrap into the next row. Drawing
/// stops at the first opaque pixel that falls below the surface.
pub(crate) fn draw(
    surface: &mut IndexedSurface<'_>,
    x: i32,
    y: i32,
    data: &[u8],
    width: usize,
    mode: BlendMode,
) {
    let pitch = surface.pitch() as isize;
    let upper = surface.upper_limit() as isize;
    let width = width as isize;
    let pixels = surface.pixels_mut();

    let mut pos = y as isize * pitch + x as isize;
    let mut x_offset: isize = 0;
    let mut i = 0;

    while i < data.len() {
        match data[i] {
            SKIP_RUN => {
                i += 1;
                let run = data.get(i).copied().unwrap_or(0) as isize;
                pos += run;
                x_offset += run;
            },
            NEXT_ROW => {
                pos += width - x_offset;
                x_offset = width;
            },
            SKIP_ONE => {
                pos += 1;
                x_offset += 1;
            },
            value => {
                if pos >= upper {
                    return;
                }
                plot(pixels, pos, value, mode);
                pos += 1;
                x_offset += 1;

                // Stay on the opaque run while it lasts
                while x_offset < width {
                    match data.get(i + 1) {
                        Some(&next) if next < SKIP_ONE => {
                            if pos >= upper {
                                return;
                            }
                            i += 1;
                            plot(pixels, pos, next, mode);
                            pos += 1;
                            x_offset += 1;
                        },
                        _ => break,
                    }
                }
            },
        }

        if x_offset >= width {
            pos += pitch - x_offset;
            x_offset = 0;
        }
        i += 1;
    }
}

/// Draw with per-pixel clipping against the visible rectangle. Rows wrap to
/// the sprite's own next row instead of spilling across the surface edge.
pub(crate) fn draw_clipped(
    surface: &mut IndexedSurface<'_>,
    x: i32,
    y: i32,
    data: &[u8],
    width: usize,
    mode: BlendMode,
) {
    let surface_width = surface.width() as isize;
    let surface_height = surface.height() as isize;
    let pitch = surface.pitch() as isize;
    let width = width as isize;
    let pixels = surface.pixels_mut();

    let mut row = y as isize;
    let mut x_offset: isize = 0;
    let mut i = 0;

    while i < data.len() {
        match data[i] {
            SKIP_RUN => {
                i += 1;
                x_offset += data.get(i).copied().unwrap_or(0) as isize;
            },
            NEXT_ROW => x_offset = width,
            SKIP_ONE => x_offset += 1,
            value => {
                if row >= surface_height {
                    return;
                }
                let col = x as isize + x_offset;
                if row >= 0 && (0..surface_width).contains(&col) {
                    let dst = &mut pixels[(row * pitch + col) as usize];
                    *dst = mode.combine(*dst, value);
                }
                x_offset += 1;
            },
        }

        if x_offset >= width {
            row += 1;
            x_offset = 0;
        }
        i += 1;
    }
}

impl SpriteTables {
    fn blittable(&self, table: TableId, index: usize) -> Option<(&[u8], usize)> {
        let found = self
            .sprite(table, index)
            .and_then(|sprite| sprite.data().map(|data| (data, sprite.width as usize)));
        debug_assert!(
            found.is_some(),
            "sprite {} of table {} is not loaded",
            index,
            table.index()
        );
        found
    }

    /// Draw sprite `index` of `table` with its top-left corner at (`x`, `y`).
    ///
    /// No horizontal clipping: sprites crossing the right edge wrap onto the
    /// next row. Use `blit_clipped` for sprites that may leave the screen.
    pub fn blit(
        &self,
        surface: &mut IndexedSurface<'_>,
        x: i32,
        y: i32,
        table: TableId,
        index: usize,
        mode: BlendMode,
    ) {
        if let Some((data, width)) = self.blittable(table, index) {
            draw(surface, x, y, data, width, mode);
        }
    }

    /// Same as `blit`, clipped to the visible rectangle on every side
    pub fn blit_clipped(
        &self,
        surface: &mut IndexedSurface<'_>,
        x: i32,
        y: i32,
        table: TableId,
        index: usize,
        mode: BlendMode,
    ) {
        if let Some((data, width)) = self.blittable(table, index) {
            draw_clipped(surface, x, y, data, width, mode);
        }
    }
}
