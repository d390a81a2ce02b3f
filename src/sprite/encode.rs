//! Encoders for both sprite formats, used to build assets in memory.
//!
//! `None` is a transparent pixel, `Some(v)` an opaque palette index.

use super::{Sprite, COMPACT_ROW_WIDTH};
use crate::error::SpriteError;

/// Indexed-array control codes
pub(crate) const SKIP_RUN: u8 = 255;
pub(crate) const NEXT_ROW: u8 = 254;
pub(crate) const SKIP_ONE: u8 = 253;

/// Compact RLE end-of-sprite marker
pub(crate) const COMPACT_END: u8 = 0x0F;

const COMPACT_MAX_RUN: usize = 0x0F;

fn check_grid(width: usize, height: usize, len: usize) -> Result<(), SpriteError> {
    if width * height != len {
        return Err(SpriteError::BadGrid { width, height, len });
    }
    Ok(())
}

fn push_skip(out: &mut Vec<u8>, mut run: usize) {
    while run > 0 {
        if run == 1 {
            out.push(SKIP_ONE);
            run = 0;
        } else {
            let step = run.min(u8::MAX as usize);
            out.push(SKIP_RUN);
            out.push(step as u8);
            run -= step;
        }
    }
}

impl Sprite {
    /// Encode a `width` x `height` grid (row-major) into the indexed-array
    /// format. Opaque values must stay below the control codes.
    ///
    /// Trailing transparent pixels of a row become a row advance, rows that
    /// end on an opaque pixel rely on the implicit wrap, and transparent rows
    /// after the last opaque pixel are dropped.
    pub fn encode(width: u16, height: u16, pixels: &[Option<u8>]) -> Result<Self, SpriteError> {
        let (w, h) = (width as usize, height as usize);
        check_grid(w, h, pixels.len())?;

        if let Some(value) = pixels.iter().flatten().find(|&&v| v >= SKIP_ONE) {
            return Err(SpriteError::ReservedPixel { value: *value });
        }

        let rows: Vec<&[Option<u8>]> = if w == 0 { Vec::new() } else { pixels.chunks(w).collect() };
        let Some(last_row) = rows.iter().rposition(|row| row.iter().any(Option::is_some)) else {
            // Nothing to draw, a lone row advance keeps the sprite populated.
            return Ok(Self::new(width, height, vec![NEXT_ROW]));
        };

        let mut out = Vec::new();
        for (y, row) in rows.iter().enumerate().take(last_row + 1) {
            let end = row.iter().rposition(Option::is_some).map_or(0, |x| x + 1);

            let mut x = 0;
            while x < end {
                match row[x] {
                    Some(value) => {
                        out.push(value);
                        x += 1;
                    },
                    None => {
                        let run = row[x..end].iter().take_while(|p| p.is_none()).count();
                        push_skip(&mut out, run);
                        x += run;
                    },
                }
            }

            if end < w && y != last_row {
                out.push(NEXT_ROW);
            }
        }

        Ok(Self::new(width, height, out))
    }
}

/// Encode a 12-pixel-wide cell of `height` rows into one compact RLE stream,
/// terminator included.
pub fn encode_compact(height: usize, pixels: &[Option<u8>]) -> Result<Vec<u8>, SpriteError> {
    check_grid(COMPACT_ROW_WIDTH, height, pixels.len())?;

    let mut out = Vec::new();
    for row in pixels.chunks(COMPACT_ROW_WIDTH) {
        let mut x = 0;
        loop {
            let skip = row[x..].iter().take_while(|p| p.is_none()).count();
            x += skip;
            if x == COMPACT_ROW_WIDTH {
                // count 0: consume the trailing skip and move to the next row
                out.push(skip as u8);
                break;
            }

            let run: Vec<u8> = row[x..]
                .iter()
                .map_while(|p| *p)
                .take(COMPACT_MAX_RUN)
                .collect();
            out.push(((run.len() as u8) << 4) | skip as u8);
            out.extend_from_slice(&run);
            x += run.len();
        }
    }
    out.push(COMPACT_END);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexed_rows_use_skip_codes_and_row_advance() {
        let o = Some;
        let grid = [
            o(1), None, o(2), None, //
            None, None, None, None, //
            o(3), o(4), o(5), o(6),
        ];
        let sprite = Sprite::encode(4, 3, &grid).unwrap();
        assert_eq!(
            sprite.data(),
            Some(&[1, SKIP_ONE, 2, NEXT_ROW, NEXT_ROW, 3, 4, 5, 6][..])
        );
    }

    #[test]
    fn long_skips_are_split() {
        let mut grid = vec![None; 300];
        grid.push(Some(7));
        let sprite = Sprite::encode(301, 1, &grid).unwrap();
        assert_eq!(sprite.data(), Some(&[SKIP_RUN, 255, SKIP_RUN, 45, 7][..]));

        let mut grid = vec![None; 256];
        grid.push(Some(7));
        let sprite = Sprite::encode(257, 1, &grid).unwrap();
        assert_eq!(sprite.data(), Some(&[SKIP_RUN, 255, SKIP_ONE, 7][..]));
    }

    #[test]
    fn reserved_values_are_rejected() {
        let err = Sprite::encode(1, 1, &[Some(253)]).unwrap_err();
        assert!(matches!(err, SpriteError::ReservedPixel { value: 253 }));
    }

    #[test]
    fn grid_size_must_match() {
        assert!(matches!(
            Sprite::encode(2, 2, &[None; 3]),
            Err(SpriteError::BadGrid { .. })
        ));
        assert!(encode_compact(1, &[None; 11]).is_err());
    }

    #[test]
    fn compact_rows_end_with_newline_controls() {
        let mut grid = vec![None; COMPACT_ROW_WIDTH * 2];
        grid[2] = Some(9);
        grid[3] = Some(8);
        for pixel in &mut grid[COMPACT_ROW_WIDTH..] {
            *pixel = Some(1);
        }
        let stream = encode_compact(2, &grid).unwrap();
        let mut expected = vec![0x22, 9, 8, 8];
        expected.push(0xC0);
        expected.extend_from_slice(&[1; 12]);
        expected.push(0x00);
        expected.push(COMPACT_END);
        assert_eq!(stream, expected);
    }
}
