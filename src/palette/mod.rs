//! Palette Expansion
//!
//! Converts an 8-bit indexed frame into packed `0x00RRGGBB` truecolor through
//! a 256-entry palette. The fastest tier the CPU supports is picked once, the
//! scalar loop handles whatever the vector loops leave over.

#[cfg(target_arch = "x86_64")]
mod x86;

use crate::cpu::CpuFeatures;

// ============================================================================
// Color Packing
// ============================================================================

#[inline]
pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline]
pub const fn red(color: u32) -> u8 {
    (color >> 16) as u8
}

#[inline]
pub const fn green(color: u32) -> u8 {
    (color >> 8) as u8
}

#[inline]
pub const fn blue(color: u32) -> u8 {
    color as u8
}

// ============================================================================
// Palette
// ============================================================================

/// 256 packed truecolor entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [u32; 256],
}

impl Palette {
    /// All black
    pub const fn new() -> Self {
        Self { colors: [0; 256] }
    }

    /// Build from 8-bit RGB triples; missing entries stay black
    pub fn from_rgb(entries: &[[u8; 3]]) -> Self {
        let mut palette = Self::new();
        for (slot, &[r, g, b]) in palette.colors.iter_mut().zip(entries) {
            *slot = rgb(r, g, b);
        }
        palette
    }

    /// Build from 6-bit VGA DAC triples (`0..=63` per channel)
    pub fn from_vga(entries: &[[u8; 3]]) -> Self {
        let widen = |c: u8| {
            let c = c & 0x3F;
            (c << 2) | (c >> 4)
        };
        let mut palette = Self::new();
        for (slot, &[r, g, b]) in palette.colors.iter_mut().zip(entries) {
            *slot = rgb(widen(r), widen(g), widen(b));
        }
        palette
    }

    #[inline]
    pub fn set(&mut self, index: u8, color: u32) {
        self.colors[index as usize] = color & 0x00FF_FFFF;
    }

    #[inline]
    pub fn get(&self, index: u8) -> u32 {
        self.colors[index as usize]
    }

    #[inline]
    pub fn as_array(&self) -> &[u32; 256] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Expansion Tiers
// ============================================================================

/// Signature shared by every tier. Both slices have the same length.
type ExpandFn = fn(&[u8], &[u32; 256], &mut [u32]);

/// Palette expansion code path, fastest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// 64 pixels per step (AVX-512F + BW gathers)
    Avx512,
    /// 32 pixels per step (AVX2 gathers)
    Avx2,
    Scalar,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Avx512, Tier::Avx2, Tier::Scalar];

    /// Whether this build and this CPU can run the tier
    pub fn is_supported(self, cpu: &CpuFeatures) -> bool {
        match self {
            Tier::Avx512 => {
                cfg!(all(feature = "avx512", target_arch = "x86_64")) && cpu.has_avx512()
            },
            Tier::Avx2 => cfg!(target_arch = "x86_64") && cpu.has_avx2(),
            Tier::Scalar => true,
        }
    }

    /// Fastest supported tier
    pub fn select(cpu: &CpuFeatures) -> Tier {
        Self::available(cpu).next().unwrap_or(Tier::Scalar)
    }

    pub fn available(cpu: &CpuFeatures) -> impl Iterator<Item = Tier> + '_ {
        Self::ALL.into_iter().filter(move |tier| tier.is_supported(cpu))
    }

    pub fn name(self) -> &'static str {
        match self {
            Tier::Avx512 => "AVX-512",
            Tier::Avx2 => "AVX2",
            Tier::Scalar => "scalar",
        }
    }

    /// Only call for a tier that passed `is_supported`
    fn function(self) -> ExpandFn {
        match self {
            #[cfg(all(feature = "avx512", target_arch = "x86_64"))]
            Tier::Avx512 => x86::expand_avx512,
            #[cfg(target_arch = "x86_64")]
            Tier::Avx2 => x86::expand_avx2,
            _ => expand_scalar,
        }
    }
}

/// Reference implementation, also used for vector loop tails
pub fn expand_scalar(src: &[u8], palette: &[u32; 256], dst: &mut [u32]) {
    for (out, &index) in dst.iter_mut().zip(src) {
        *out = palette[index as usize];
    }
}

/// Palette expander bound to one tier. Constructed only through a
/// `CpuFeatures` check, so the vector tiers never run on a CPU without them.
#[derive(Clone, Copy)]
pub struct PaletteExpander {
    tier: Tier,
    expand: ExpandFn,
}

impl PaletteExpander {
    /// Fastest tier for `cpu`
    pub fn new(cpu: &CpuFeatures) -> Self {
        let tier = Tier::select(cpu);
        Self {
            tier,
            expand: tier.function(),
        }
    }

    pub fn scalar() -> Self {
        Self {
            tier: Tier::Scalar,
            expand: expand_scalar,
        }
    }

    /// A specific tier, or `None` if `cpu` cannot run it
    pub fn with_tier(tier: Tier, cpu: &CpuFeatures) -> Option<Self> {
        tier.is_supported(cpu).then(|| Self {
            tier,
            expand: tier.function(),
        })
    }

    #[inline]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Expand `src` into `dst`. Expects `dst` to be at least as long as `src`;
    /// only the common prefix is written.
    pub fn expand(&self, src: &[u8], palette: &Palette, dst: &mut [u32]) {
        debug_assert!(
            dst.len() >= src.len(),
            "destination holds {} pixels, source has {}",
            dst.len(),
            src.len()
        );
        let n = src.len().min(dst.len());
        (self.expand)(&src[..n], palette.as_array(), &mut dst[..n]);
    }
}

impl std::fmt::Debug for PaletteExpander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaletteExpander")
            .field("tier", &self.tier)
            .finish()
    }
}
