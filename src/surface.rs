//! Borrowed pixel views with explicit pitch
//!
//! The presentation layer owns framebuffer memory; everything in this crate
//! works through a `Surface` that borrows it for the duration of one call.
//! `pitch` is counted in elements of `T`, so for an indexed surface it is the
//! byte stride and for a truecolor surface it is the pixel stride.

use crate::error::SurfaceError;

/// 8-bit palette-indexed surface (blit target, scaler source)
pub type IndexedSurface<'a> = Surface<'a, u8>;

/// 32-bit packed `0x00RRGGBB` surface (scaler and anti-alias target)
pub type TrueColorSurface<'a> = Surface<'a, u32>;

pub struct Surface<'a, T> {
    pixels: &'a mut [T],
    width: usize,
    height: usize,
    pitch: usize,
}

impl<'a, T: Copy> Surface<'a, T> {
    /// Wrap `pixels` as a `width` x `height` surface whose rows start every
    /// `pitch` elements.
    pub fn new(
        pixels: &'a mut [T],
        width: usize,
        height: usize,
        pitch: usize,
    ) -> Result<Self, SurfaceError> {
        if pitch < width {
            return Err(SurfaceError::PitchTooSmall { pitch, width });
        }
        let required = pitch * height;
        if pixels.len() < required {
            return Err(SurfaceError::BufferTooSmall {
                len: pixels.len(),
                required,
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
            pitch,
        })
    }

    /// Tightly packed surface (`pitch == width`)
    pub fn packed(pixels: &'a mut [T], width: usize, height: usize) -> Result<Self, SurfaceError> {
        Self::new(pixels, width, height, width)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// One past the last element any operation may touch
    #[inline]
    pub fn upper_limit(&self) -> usize {
        self.height * self.pitch
    }

    #[inline]
    pub fn pixels(&self) -> &[T] {
        &self.pixels[..self.upper_limit()]
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [T] {
        let upper = self.upper_limit();
        &mut self.pixels[..upper]
    }

    /// The `width` visible pixels of row `y`
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.pitch;
        &self.pixels[start..start + self.width]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.pitch;
        &mut self.pixels[start..start + self.width]
    }

    /// Read a pixel (bounds checked against width/height, not pitch)
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.pitch + x])
        } else {
            None
        }
    }

    /// Reborrow the top-left `width` x `height` corner, clamped to this surface
    pub fn region(&mut self, width: usize, height: usize) -> Surface<'_, T> {
        Surface {
            pixels: &mut *self.pixels,
            width: width.min(self.width),
            height: height.min(self.height),
            pitch: self.pitch,
        }
    }

    /// Fill the visible area, leaving any pitch padding untouched
    pub fn fill(&mut self, value: T) {
        for y in 0..self.height {
            self.row_mut(y).fill(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_pitch() {
        let mut buf = [0u8; 16];
        let err = Surface::new(&mut buf, 4, 2, 3).err();
        assert_eq!(err, Some(SurfaceError::PitchTooSmall { pitch: 3, width: 4 }));
    }

    #[test]
    fn rejects_short_buffer() {
        let mut buf = [0u8; 15];
        let err = Surface::new(&mut buf, 4, 2, 8).err();
        assert_eq!(
            err,
            Some(SurfaceError::BufferTooSmall {
                len: 15,
                required: 16
            })
        );
    }

    #[test]
    fn fill_leaves_padding_alone() {
        let mut buf = [9u8; 12];
        let mut surface = Surface::new(&mut buf, 2, 2, 6).unwrap();
        surface.fill(1);
        assert_eq!(surface.get(1, 1), Some(1));
        assert_eq!(surface.get(2, 1), None);
        assert_eq!(buf, [1, 1, 9, 9, 9, 9, 1, 1, 9, 9, 9, 9]);
    }

    #[test]
    fn region_is_clamped_and_shares_pitch() {
        let mut buf = [0u32; 20];
        let mut surface = Surface::packed(&mut buf, 5, 4).unwrap();
        let mut corner = surface.region(2, 9);
        assert_eq!((corner.width(), corner.height(), corner.pitch()), (2, 4, 5));
        corner.fill(7);
        assert_eq!(surface.row(3), &[7, 7, 0, 0, 0]);
    }
}
