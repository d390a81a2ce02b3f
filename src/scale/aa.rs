//! Edge-directed anti-aliasing
//!
//! Post-process for already upscaled truecolor frames. Each interior pixel is
//! compared with its 3x3 neighbourhood in luminance; where the contrast is
//! high enough it is blended along the dominant edge direction. All reads come
//! from a snapshot of the frame, so rows are filtered in parallel.

use log::warn;
use rayon::prelude::*;

use crate::palette::{blue, green, red, rgb};
use crate::surface::TrueColorSurface;

/// Below this local contrast a pixel is left alone
const CONTRAST_THRESHOLD: f32 = 0.05;

/// One axis must beat the other by this factor to count as the edge direction
const DIRECTION_BIAS: f32 = 1.2;

#[inline]
fn luminance(color: u32) -> f32 {
    (red(color) as f32 * 0.299 + green(color) as f32 * 0.587 + blue(color) as f32 * 0.114) / 255.0
}

#[inline]
fn clamp_channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

fn lerp_color(a: u32, b: u32, t: f32) -> u32 {
    let mix = |ca: u8, cb: u8| clamp_channel((ca as f32 * (1.0 - t) + cb as f32 * t) as i32);
    rgb(
        mix(red(a), red(b)),
        mix(green(a), green(b)),
        mix(blue(a), blue(b)),
    )
}

/// Blend `center` towards both ends of an edge, then average the two
#[inline]
fn blend_across(center: u32, a: u32, b: u32, blend: f32) -> u32 {
    lerp_color(lerp_color(center, a, blend), lerp_color(center, b, blend), 0.5)
}

/// 3x3 neighbourhood, compass named
#[derive(Debug, Clone, Copy)]
struct Neighborhood {
    c: u32,
    n: u32,
    s: u32,
    e: u32,
    w: u32,
    nw: u32,
    ne: u32,
    sw: u32,
    se: u32,
}

fn filter_pixel(px: &Neighborhood) -> u32 {
    let lum_c = luminance(px.c);
    let lum_n = luminance(px.n);
    let lum_s = luminance(px.s);
    let lum_e = luminance(px.e);
    let lum_w = luminance(px.w);

    let lum_min = lum_c.min(lum_n.min(lum_s).min(lum_e.min(lum_w)));
    let lum_max = lum_c.max(lum_n.max(lum_s).max(lum_e.max(lum_w)));
    let contrast = lum_max - lum_min;

    if contrast < CONTRAST_THRESHOLD {
        return px.c;
    }

    let edge_horz = ((lum_n + lum_s) - 2.0 * lum_c).abs();
    let edge_vert = ((lum_e + lum_w) - 2.0 * lum_c).abs();
    let edge_diag1 = ((luminance(px.nw) + luminance(px.se)) - 2.0 * lum_c).abs();
    let edge_diag2 = ((luminance(px.ne) + luminance(px.sw)) - 2.0 * lum_c).abs();
    let edge_axis = edge_horz.max(edge_vert);

    if edge_horz > edge_vert * DIRECTION_BIAS {
        // horizontal edge, blend vertically
        blend_across(px.c, px.n, px.s, (contrast * 0.5).min(0.5))
    } else if edge_vert > edge_horz * DIRECTION_BIAS {
        blend_across(px.c, px.e, px.w, (contrast * 0.5).min(0.5))
    } else if edge_diag1 > edge_axis {
        blend_across(px.c, px.nw, px.se, (contrast * 0.4).min(0.4))
    } else if edge_diag2 > edge_axis {
        blend_across(px.c, px.ne, px.sw, (contrast * 0.4).min(0.4))
    } else {
        // No clear direction: small pull towards the 4-neighbour average
        let blend = (contrast * 0.25).min(0.25);
        let spread = |get: fn(u32) -> u8| {
            let center = get(px.c) as i32;
            let around = get(px.n) as i32 + get(px.s) as i32 + get(px.e) as i32 + get(px.w) as i32;
            clamp_channel(center + ((around - 4 * center) as f32 * blend) as i32)
        };
        rgb(spread(red), spread(green), spread(blue))
    }
}

/// Anti-alias filter with a snapshot buffer that persists across frames.
/// The buffer only ever grows, so resolution changes reuse it.
#[derive(Debug, Default)]
pub struct AntiAliaser {
    snapshot: Vec<u32>,
}

impl AntiAliaser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pixels the snapshot can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.snapshot.len()
    }

    fn ensure_snapshot(&mut self, required: usize) -> bool {
        if self.snapshot.len() >= required {
            return true;
        }
        let extra = required - self.snapshot.len();
        if self.snapshot.try_reserve_exact(extra).is_err() {
            return false;
        }
        self.snapshot.resize(required, 0);
        true
    }

    /// Filter `frame` in place. The outermost ring of pixels is never
    /// modified. Returns `false` if the frame was skipped because the snapshot
    /// could not be allocated.
    pub fn apply(&mut self, frame: &mut TrueColorSurface<'_>) -> bool {
        let (width, height, pitch) = (frame.width(), frame.height(), frame.pitch());
        let required = width * height;

        if !self.ensure_snapshot(required) {
            warn!(
                "Anti-aliasing skipped: could not allocate {}x{} snapshot",
                width, height
            );
            return false;
        }

        for (y, line) in self.snapshot[..required]
            .chunks_exact_mut(width.max(1))
            .enumerate()
            .take(height)
        {
            line.copy_from_slice(frame.row(y));
        }

        if width < 3 || height < 3 {
            return true;
        }

        let snapshot = &self.snapshot[..required];
        frame
            .pixels_mut()
            .par_chunks_mut(pitch)
            .enumerate()
            .skip(1)
            .take(height - 2)
            .for_each(|(y, row)| {
                let above = &snapshot[(y - 1) * width..y * width];
                let here = &snapshot[y * width..(y + 1) * width];
                let below = &snapshot[(y + 1) * width..(y + 2) * width];

                for x in 1..width - 1 {
                    row[x] = filter_pixel(&Neighborhood {
                        c: here[x],
                        n: above[x],
                        s: below[x],
                        e: here[x + 1],
                        w: here[x - 1],
                        nw: above[x - 1],
                        ne: above[x + 1],
                        sw: below[x - 1],
                        se: below[x + 1],
                    });
                }
            });

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(c: u32) -> Neighborhood {
        Neighborhood {
            c,
            n: c,
            s: c,
            e: c,
            w: c,
            nw: c,
            ne: c,
            sw: c,
            se: c,
        }
    }

    #[test]
    fn low_contrast_returns_center() {
        let mut px = uniform(rgb(100, 100, 100));
        px.n = rgb(105, 105, 105);
        assert_eq!(filter_pixel(&px), px.c);
    }

    #[test]
    fn horizontal_edge_blends_vertically() {
        let black = rgb(0, 0, 0);
        let white = rgb(255, 255, 255);
        let mut px = uniform(black);
        px.n = white;
        px.nw = white;
        px.ne = white;

        // contrast 1.0 -> blend 0.5: lerp(C, N) = 127, lerp(C, S) = 0, mean 63
        assert_eq!(filter_pixel(&px), rgb(63, 63, 63));
    }

    #[test]
    fn vertical_edge_blends_horizontally() {
        let black = rgb(0, 0, 0);
        let white = rgb(255, 255, 255);
        let mut px = uniform(black);
        px.e = white;
        px.ne = white;
        px.se = white;
        assert_eq!(filter_pixel(&px), rgb(63, 63, 63));
    }

    #[test]
    fn lerp_truncates_and_clamps() {
        assert_eq!(lerp_color(rgb(0, 0, 0), rgb(255, 255, 255), 0.5), rgb(127, 127, 127));
        assert_eq!(lerp_color(rgb(10, 20, 30), rgb(90, 90, 90), 0.0), rgb(10, 20, 30));
        assert_eq!(lerp_color(rgb(0, 0, 0), rgb(200, 0, 0), 1.5), rgb(255, 0, 0));
    }

    fn frame_with_square(size: usize) -> Vec<u32> {
        let mut buf = vec![rgb(0, 0, 0); size * size];
        for y in size / 4..size * 3 / 4 {
            for x in size / 4..size * 3 / 4 {
                buf[y * size + x] = rgb(255, 255, 255);
            }
        }
        buf
    }

    #[test]
    fn uniform_frame_is_unchanged() {
        let mut buf = vec![rgb(40, 80, 120); 16 * 16];
        let mut frame = TrueColorSurface::packed(&mut buf, 16, 16).unwrap();
        let mut aa = AntiAliaser::new();
        assert!(aa.apply(&mut frame));
        assert!(buf.iter().all(|&c| c == rgb(40, 80, 120)));
    }

    #[test]
    fn edges_are_softened_and_border_kept() {
        let original = frame_with_square(16);
        let mut buf = original.clone();
        let mut frame = TrueColorSurface::packed(&mut buf, 16, 16).unwrap();
        AntiAliaser::new().apply(&mut frame);

        assert_ne!(buf, original);
        for i in 0..16 {
            assert_eq!(buf[i], original[i]);
            assert_eq!(buf[15 * 16 + i], original[15 * 16 + i]);
            assert_eq!(buf[i * 16], original[i * 16]);
            assert_eq!(buf[i * 16 + 15], original[i * 16 + 15]);
        }
        // flat interior of the square stays white
        assert_eq!(buf[8 * 16 + 8], rgb(255, 255, 255));
    }

    #[test]
    fn pitch_padding_is_untouched() {
        let mut buf = vec![0xFF00_0000u32; 24 * 8];
        for y in 0..8 {
            for x in 0..8 {
                buf[y * 24 + x] = if x < 4 { rgb(0, 0, 0) } else { rgb(255, 255, 255) };
            }
        }
        let mut frame = TrueColorSurface::new(&mut buf, 8, 8, 24).unwrap();
        AntiAliaser::new().apply(&mut frame);

        for y in 0..8 {
            assert!(buf[y * 24 + 8..y * 24 + 24].iter().all(|&c| c == 0xFF00_0000));
        }
        assert_ne!(buf[3 * 24 + 3], rgb(0, 0, 0));
    }

    #[test]
    fn snapshot_grows_but_never_shrinks() {
        let mut aa = AntiAliaser::new();
        let mut big = vec![0u32; 32 * 32];
        aa.apply(&mut TrueColorSurface::packed(&mut big, 32, 32).unwrap());
        assert_eq!(aa.capacity(), 32 * 32);

        let mut small = vec![0u32; 8 * 8];
        aa.apply(&mut TrueColorSurface::packed(&mut small, 8, 8).unwrap());
        assert_eq!(aa.capacity(), 32 * 32);
    }

    #[test]
    fn tiny_frames_are_left_alone() {
        let mut buf = vec![rgb(0, 0, 0), rgb(255, 255, 255)];
        let mut frame = TrueColorSurface::packed(&mut buf, 2, 1).unwrap();
        assert!(AntiAliaser::new().apply(&mut frame));
        assert_eq!(buf, vec![rgb(0, 0, 0), rgb(255, 255, 255)]);
    }
}
