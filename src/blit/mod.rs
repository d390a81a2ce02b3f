//! Sprite Blitting
//!
//! Draws indexed-array and compact RLE sprites onto an `IndexedSurface`.
//! Palette indices are read as a high nibble hue and a low nibble value; every
//! blend mode is a per-pixel combine of the destination and source byte.
//!
//! Unclipped blits clip only against the linear extent of the surface and
//! wrap horizontally. The clipped variants check each pixel against the
//! visible rectangle.

mod compact;
mod indexed;

/// Per-pixel combine rule for a blit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source replaces destination
    #[default]
    Opaque,
    /// Source hue, value averaged with the destination
    Blend,
    /// Recolour to `hue` and shift the value by `value` with no clamping
    HueValueUnchecked { hue: u8, value: i8 },
    /// Recolour to `hue` and shift the value by `value`, clamped to a nibble
    HueValue { hue: u8, value: i8 },
    /// `HueValue`, then averaged with the destination value
    HueValueBlend { hue: u8, value: i8 },
    /// Shadow: halves the destination value, or writes black
    Darken { black: bool },
    /// Keep the source value, force the hue bits to `filter`
    Filter { filter: u8 },
}

/// Clamp a shifted value back into a nibble. Slight overflow saturates to
/// `0x0F`, anything at or past `0x1F` (including negative wraparound) is
/// treated as underflow and goes to 0.
#[inline]
pub fn clamp_value(value: u8) -> u8 {
    if value > 0x0F {
        if value >= 0x1F {
            0
        } else {
            0x0F
        }
    } else {
        value
    }
}

#[inline]
fn shifted_value(src: u8, value: i8) -> u8 {
    ((src & 0x0F) as i16 + value as i16) as u8
}

impl BlendMode {
    #[inline]
    pub fn combine(self, dst: u8, src: u8) -> u8 {
        match self {
            Self::Opaque => src,
            Self::Blend => (src & 0xF0) | (((dst & 0x0F) + (src & 0x0F)) / 2),
            Self::HueValueUnchecked { hue, value } => (hue << 4) | shifted_value(src, value),
            Self::HueValue { hue, value } => (hue << 4) | clamp_value(shifted_value(src, value)),
            Self::HueValueBlend { hue, value } => {
                let value = clamp_value(shifted_value(src, value));
                (hue << 4) | (((dst & 0x0F) + value) / 2)
            },
            Self::Darken { black: true } => 0,
            Self::Darken { black: false } => (dst & 0xF0) | ((dst & 0x0F) / 2),
            Self::Filter { filter } => filter | (src & 0x0F),
        }
    }

    /// Combine a run of source pixels into an equally long destination run
    #[inline]
    pub fn combine_run(self, dst: &mut [u8], src: &[u8]) {
        debug_assert_eq!(dst.len(), src.len());
        match self {
            Self::Opaque => dst.copy_from_slice(src),
            _ => {
                for (d, &s) in dst.iter_mut().zip(src) {
                    *d = self.combine(*d, s);
                }
            },
        }
    }
}

/// Write one combined pixel at a linear position, ignoring anything outside
/// `0..pixels.len()`.
#[inline]
fn plot(pixels: &mut [u8], pos: isize, src: u8, mode: BlendMode) {
    if pos < 0 {
        return;
    }
    if let Some(dst) = pixels.get_mut(pos as usize) {
        *dst = mode.combine(*dst, src);
    }
}
