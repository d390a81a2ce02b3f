//! Upscaling
//!
//! Turns an indexed frame into a truecolor frame `scale` times larger in both
//! directions. Every source pixel becomes one solid `scale x scale` block, so
//! each block row can be produced once and copied to the rest of the block.
//!
//! `nearest` copies palette colors as-is. `smooth` first runs an edge
//! preserving bilateral filter over the 3x3 neighbourhood of each source
//! pixel. Anti-aliasing lives in `aa` and runs after `nearest`.

mod aa;

use serde::{Deserialize, Serialize};

pub use aa::AntiAliaser;

use crate::palette::{blue, green, red, rgb, Palette};
use crate::surface::{IndexedSurface, TrueColorSurface};

// ============================================================================
// Scaler Selection
// ============================================================================

/// Post-processing applied when presenting a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerKind {
    /// Palette expansion only, 1:1
    None,
    Nearest { scale: usize },
    Smooth { scale: usize, strength: i32 },
    AntiAliased { scale: usize },
}

/// Largest magnification accepted from names and config files
pub const MAX_SCALE: usize = 16;

impl Default for ScalerKind {
    fn default() -> Self {
        ScalerKind::Nearest { scale: 3 }
    }
}

/// Smoothing strength tuned for each preset scale
pub fn smooth_strength(scale: usize) -> i32 {
    match scale {
        0..=5 => 3,
        6 | 7 => 4,
        8 | 9 => 5,
        10 | 11 => 6,
        _ => 7,
    }
}

const PRESET_SCALES: [usize; 6] = [5, 6, 7, 8, 10, 12];
const AA_SCALES: [usize; 8] = [3, 4, 5, 6, 7, 8, 10, 12];

impl ScalerKind {
    /// Integer magnification, 1 for `None`
    pub fn scale(&self) -> usize {
        match *self {
            ScalerKind::None => 1,
            ScalerKind::Nearest { scale }
            | ScalerKind::Smooth { scale, .. }
            | ScalerKind::AntiAliased { scale } => scale,
        }
    }

    /// `false` for a zero scale or one above `MAX_SCALE`
    pub fn is_valid(&self) -> bool {
        matches!(self, ScalerKind::None) || (1..=MAX_SCALE).contains(&self.scale())
    }

    /// Every named preset, in menu order
    pub fn presets() -> Vec<ScalerKind> {
        let mut presets = vec![ScalerKind::None];
        presets.extend(PRESET_SCALES.iter().map(|&scale| ScalerKind::Nearest { scale }));
        presets.extend(PRESET_SCALES.iter().map(|&scale| ScalerKind::Smooth {
            scale,
            strength: smooth_strength(scale),
        }));
        presets.extend(AA_SCALES.iter().map(|&scale| ScalerKind::AntiAliased { scale }));
        presets
    }

    /// Parse a preset name (`"None"`, `"6x"`, `"Smooth 7x"`, `"AA 3x"`).
    /// Scales from 1 to `MAX_SCALE` are accepted, smoothing strength follows
    /// the preset table.
    pub fn from_name(name: &str) -> Option<ScalerKind> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("none") {
            return Some(ScalerKind::None);
        }

        let parse_scale = |s: &str| -> Option<usize> {
            let scale: usize = s.trim().strip_suffix(['x', 'X'])?.parse().ok()?;
            (1..=MAX_SCALE).contains(&scale).then_some(scale)
        };

        let lower = name.to_ascii_lowercase();
        if let Some(rest) = lower.strip_prefix("smooth") {
            let scale = parse_scale(rest)?;
            Some(ScalerKind::Smooth {
                scale,
                strength: smooth_strength(scale),
            })
        } else if let Some(rest) = lower.strip_prefix("aa") {
            Some(ScalerKind::AntiAliased {
                scale: parse_scale(rest)?,
            })
        } else {
            Some(ScalerKind::Nearest {
                scale: parse_scale(&lower)?,
            })
        }
    }

    pub fn name(&self) -> String {
        match *self {
            ScalerKind::None => "None".to_string(),
            ScalerKind::Nearest { scale } => format!("{}x", scale),
            ScalerKind::Smooth { scale, .. } => format!("Smooth {}x", scale),
            ScalerKind::AntiAliased { scale } => format!("AA {}x", scale),
        }
    }
}

// ============================================================================
// Block Magnification
// ============================================================================

/// Fill the destination with one `scale x scale` block per source pixel,
/// colored by `color(x, y)`. Output is clipped to the destination size.
fn magnify<F>(
    src_width: usize,
    src_height: usize,
    scale: usize,
    dst: &mut TrueColorSurface<'_>,
    mut color: F,
) where
    F: FnMut(usize, usize) -> u32,
{
    if scale == 0 {
        return;
    }
    let out_width = src_width.saturating_mul(scale).min(dst.width());
    let pitch = dst.pitch();

    for y in 0..src_height {
        let first = y.saturating_mul(scale);
        if first >= dst.height() {
            break;
        }

        let row = dst.row_mut(first);
        for x in 0..src_width {
            let start = x.saturating_mul(scale);
            if start >= out_width {
                break;
            }
            let end = start.saturating_add(scale).min(out_width);
            row[start..end].fill(color(x, y));
        }

        let rows = scale.min(dst.height() - first);
        let pixels = dst.pixels_mut();
        let from = first * pitch;
        for k in 1..rows {
            pixels.copy_within(from..from + out_width, from + k * pitch);
        }
    }
}

/// Nearest-neighbour upscale with palette expansion
pub fn nearest(
    src: &IndexedSurface<'_>,
    palette: &Palette,
    scale: usize,
    dst: &mut TrueColorSurface<'_>,
) {
    let colors = palette.as_array();
    magnify(src.width(), src.height(), scale, dst, |x, y| {
        colors[src.row(y)[x] as usize]
    });
}

/// Upscale with bilateral smoothing. Neighbours close in luminance to the
/// center pixel are averaged in, neighbours across an edge are ignored.
pub fn smooth(
    src: &IndexedSurface<'_>,
    palette: &Palette,
    scale: usize,
    strength: i32,
    dst: &mut TrueColorSurface<'_>,
) {
    let (width, height) = (src.width(), src.height());
    if width == 0 || height == 0 {
        return;
    }
    let colors = palette.as_array();
    let at = |x: usize, y: usize| colors[src.row(y)[x] as usize];

    magnify(width, height, scale, dst, |x, y| {
        let left = x.saturating_sub(1);
        let right = (x + 1).min(width - 1);
        let up = y.saturating_sub(1);
        let down = (y + 1).min(height - 1);

        // Raster order: the first four (NW, N, NE, W) carry the heavier weight
        let neighbors = [
            at(left, up),
            at(x, up),
            at(right, up),
            at(left, y),
            at(right, y),
            at(left, down),
            at(x, down),
            at(right, down),
        ];
        bilateral(at(x, y), &neighbors, strength)
    });
}

#[inline]
fn luma(color: u32) -> i32 {
    (red(color) as i32 * 299 + green(color) as i32 * 587 + blue(color) as i32 * 114) / 1000
}

/// Weighted average of `center` and its `neighbors` (raster order). The first
/// four neighbours weigh 3, the rest 2.
/// Neighbours within half the threshold count fully, up to the threshold at
/// half weight, and past it not at all.
fn bilateral(center: u32, neighbors: &[u32; 8], strength: i32) -> u32 {
    let strength = strength.max(1);
    let threshold = 20 + strength * 2;
    let center_luma = luma(center);

    let mut sum = [
        red(center) as i32 * strength,
        green(center) as i32 * strength,
        blue(center) as i32 * strength,
    ];
    let mut total = strength;

    for (i, &n) in neighbors.iter().enumerate() {
        let diff = (luma(n) - center_luma).abs();
        if diff >= threshold {
            continue;
        }

        let mut weight = if i < 4 { 3 } else { 2 };
        if diff > threshold / 2 {
            weight /= 2;
        }

        sum[0] += red(n) as i32 * weight;
        sum[1] += green(n) as i32 * weight;
        sum[2] += blue(n) as i32 * weight;
        total += weight;
    }

    rgb(
        (sum[0] / total) as u8,
        (sum[1] / total) as u8,
        (sum[2] / total) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_palette() -> Palette {
        let mut palette = Palette::new();
        for i in 0..=255u8 {
            palette.set(i, rgb(i, 255 - i, i / 2));
        }
        palette
    }

    #[test]
    fn nearest_blocks_match_source_colors() {
        let palette = ramp_palette();
        let mut src_buf: Vec<u8> = (0..12).map(|i| i * 20).collect();
        let src = IndexedSurface::packed(&mut src_buf, 4, 3).unwrap();

        let scale = 3;
        let mut dst_buf = vec![0u32; 12 * 9];
        let mut dst = TrueColorSurface::packed(&mut dst_buf, 12, 9).unwrap();
        nearest(&src, &palette, scale, &mut dst);

        for y in 0..9 {
            for x in 0..12 {
                let index = src.get(x / scale, y / scale).unwrap();
                assert_eq!(dst.get(x, y), Some(palette.get(index)), "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn nearest_respects_destination_pitch_and_size() {
        let palette = ramp_palette();
        let mut src_buf = vec![1u8, 2, 3, 4];
        let src = IndexedSurface::packed(&mut src_buf, 2, 2).unwrap();

        // Destination smaller than 4x4 output, with padding
        let mut dst_buf = vec![0xFFFF_FFFFu32; 8 * 3];
        let mut dst = TrueColorSurface::new(&mut dst_buf, 3, 3, 8).unwrap();
        nearest(&src, &palette, 2, &mut dst);

        assert_eq!(dst.row(0), &[palette.get(1), palette.get(1), palette.get(2)]);
        assert_eq!(dst.row(2), &[palette.get(3), palette.get(3), palette.get(4)]);
        assert!(dst_buf[3..8].iter().all(|&c| c == 0xFFFF_FFFF));
        assert!(dst_buf[8 + 3..16].iter().all(|&c| c == 0xFFFF_FFFF));
    }

    #[test]
    fn smooth_leaves_uniform_image_unchanged() {
        let mut palette = Palette::new();
        palette.set(7, rgb(90, 120, 200));
        let mut src_buf = vec![7u8; 5 * 4];
        let src = IndexedSurface::packed(&mut src_buf, 5, 4).unwrap();

        let mut dst_buf = vec![0u32; 25 * 20];
        let mut dst = TrueColorSurface::packed(&mut dst_buf, 25, 20).unwrap();
        smooth(&src, &palette, 5, smooth_strength(5), &mut dst);
        assert!(dst_buf.iter().all(|&c| c == rgb(90, 120, 200)));
    }

    #[test]
    fn smooth_preserves_hard_edges() {
        let mut palette = Palette::new();
        palette.set(0, rgb(0, 0, 0));
        palette.set(1, rgb(255, 255, 255));
        let mut src_buf = vec![0u8, 0, 1, 1, 0, 0, 1, 1];
        let src = IndexedSurface::packed(&mut src_buf, 4, 2).unwrap();

        let mut dst_buf = vec![0u32; 8 * 4];
        let mut dst = TrueColorSurface::packed(&mut dst_buf, 8, 4).unwrap();
        smooth(&src, &palette, 2, 3, &mut dst);
        assert_eq!(dst.get(3, 0), Some(rgb(0, 0, 0)));
        assert_eq!(dst.get(4, 3), Some(rgb(255, 255, 255)));
    }

    #[test]
    fn bilateral_averages_similar_neighbours() {
        let center = rgb(100, 100, 100);
        let near = rgb(104, 104, 104);
        let neighbors = [near; 8];
        // weights: center 3, first four 4 * 3, last four 4 * 2
        let expected = (100 * 3 + 104 * 20) / 23;
        let out = bilateral(center, &neighbors, 3);
        assert_eq!(red(out) as i32, expected);
    }

    #[test]
    fn bilateral_halves_weight_near_threshold() {
        let center = rgb(0, 0, 0);
        // luma 20 with threshold 26: counted at half weight
        let mut neighbors = [center; 8];
        neighbors[0] = rgb(20, 20, 20);
        let out = bilateral(center, &neighbors, 3);
        // 3 + 3*3 + 4*2 = 20 without the edge neighbour, +1 for it
        assert_eq!(red(out), 0);
        assert_eq!(red(bilateral(rgb(10, 10, 10), &[rgb(30, 30, 30); 8], 3)), 24);
    }

    #[test]
    fn smooth_weights_neighbours_in_raster_order() {
        let mut palette = Palette::new();
        for i in 0..=255u8 {
            palette.set(i, rgb(i, i, i));
        }
        let mut frame = vec![100u8, 104, 108, 110, 114, 118, 120, 124, 128];
        let src = IndexedSurface::packed(&mut frame, 3, 3).unwrap();
        let mut out = vec![0u32; 9];
        let mut dst = TrueColorSurface::packed(&mut out, 3, 3).unwrap();
        smooth(&src, &palette, 1, 3, &mut dst);

        // NW 1, N 3, NE 3, W 3, E 2, SW 2, S 2, SE 1, center 3:
        // 2260 / 20
        assert_eq!(out[4], rgb(113, 113, 113));
    }

    #[test]
    fn oversized_scale_is_clipped_not_overflowed() {
        let mut frame = vec![7u8; 4];
        let src = IndexedSurface::packed(&mut frame, 2, 2).unwrap();
        let palette = ramp_palette();
        let mut out = vec![0u32; 4 * 4];
        let mut dst = TrueColorSurface::packed(&mut out, 4, 4).unwrap();
        nearest(&src, &palette, usize::MAX, &mut dst);
        assert!(out.iter().all(|&c| c == palette.get(7)));
    }

    #[test]
    fn scale_limits() {
        assert!(ScalerKind::Nearest { scale: MAX_SCALE }.is_valid());
        assert!(!ScalerKind::Nearest { scale: MAX_SCALE + 1 }.is_valid());
        assert!(!ScalerKind::AntiAliased { scale: 0 }.is_valid());
        assert!(ScalerKind::None.is_valid());
        assert_eq!(ScalerKind::from_name("17x"), None);
        assert_eq!(ScalerKind::from_name("AA 16x"), Some(ScalerKind::AntiAliased { scale: 16 }));
    }

    #[test]
    fn preset_names_round_trip() {
        for preset in ScalerKind::presets() {
            assert_eq!(ScalerKind::from_name(&preset.name()), Some(preset));
        }
        assert_eq!(
            ScalerKind::from_name("Smooth 10x"),
            Some(ScalerKind::Smooth {
                scale: 10,
                strength: 6
            })
        );
        assert_eq!(ScalerKind::from_name("aa 4x"), Some(ScalerKind::AntiAliased { scale: 4 }));
        assert_eq!(ScalerKind::from_name("0x"), None);
        assert_eq!(ScalerKind::from_name("huge"), None);
    }

    #[test]
    fn preset_strengths() {
        let strengths: Vec<i32> = PRESET_SCALES.iter().map(|&s| smooth_strength(s)).collect();
        assert_eq!(strengths, vec![3, 4, 4, 5, 6, 7]);
    }

    #[test]
    fn scaler_kind_serializes_tagged() {
        let json = serde_json::to_string(&ScalerKind::Smooth {
            scale: 6,
            strength: 4,
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"smooth","scale":6,"strength":4}"#);
        let back: ScalerKind = serde_json::from_str(r#"{"kind":"anti_aliased","scale":3}"#).unwrap();
        assert_eq!(back, ScalerKind::AntiAliased { scale: 3 });
    }
}
