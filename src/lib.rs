//! vgacore
//!
//! Software rendering core for 8-bit palette-indexed games:
//! - RLE sprite storage and blitting with hue/value blend modes (`sprite`, `blit`)
//! - palette expansion to 32-bit truecolor with SIMD tiers (`palette`)
//! - integer upscaling with optional smoothing and anti-aliasing (`scale`)
//! - a frame pipeline and optional SDL2 window (`display`)
//!
//! All drawing works on borrowed `Surface` views; the caller owns the pixels.

pub mod blit;
pub mod config;
pub mod cpu;
pub mod display;
pub mod error;
pub mod palette;
pub mod scale;
pub mod sprite;
pub mod surface;

pub use blit::BlendMode;
pub use config::RenderConfig;
pub use cpu::CpuFeatures;
pub use display::FramePipeline;
pub use error::{ConfigError, SpriteError, SurfaceError};
pub use palette::{Palette, PaletteExpander, Tier};
pub use scale::{AntiAliaser, ScalerKind};
pub use sprite::{Sprite, SpriteSheet, SpriteTables, TableId};
pub use surface::{IndexedSurface, Surface, TrueColorSurface};
