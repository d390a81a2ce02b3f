use log::info;

use crate::config::RenderConfig;
use crate::cpu::CpuFeatures;
use crate::palette::{Palette, PaletteExpander};
use crate::scale::{self, AntiAliaser, ScalerKind};
use crate::surface::{IndexedSurface, TrueColorSurface};

/// Turns the indexed game frame into the truecolor frame that gets presented.
/// Holds the selected palette tier and the anti-alias snapshot between frames.
#[derive(Debug)]
pub struct FramePipeline {
    expander: PaletteExpander,
    scaler: ScalerKind,
    anti_aliaser: AntiAliaser,
}

impl FramePipeline {
    pub fn new(cpu: &CpuFeatures, config: &RenderConfig) -> Self {
        let expander = if config.force_scalar {
            PaletteExpander::scalar()
        } else {
            PaletteExpander::new(cpu)
        };
        info!(
            "Frame pipeline: {} scaler, {} palette expansion",
            config.scaler.name(),
            expander.tier().name()
        );

        Self {
            expander,
            scaler: config.scaler,
            anti_aliaser: AntiAliaser::new(),
        }
    }

    #[inline]
    pub fn scaler(&self) -> ScalerKind {
        self.scaler
    }

    pub fn set_scaler(&mut self, scaler: ScalerKind) {
        info!("Scaler: {}", scaler.name());
        self.scaler = scaler;
    }

    #[inline]
    pub fn expander(&self) -> &PaletteExpander {
        &self.expander
    }

    /// Output dimensions for a `width` x `height` source
    pub fn output_size(&self, width: usize, height: usize) -> (usize, usize) {
        let scale = self.scaler.scale();
        (width.saturating_mul(scale), height.saturating_mul(scale))
    }

    /// Render one frame. Output beyond `dst`'s size is clipped.
    pub fn render(
        &mut self,
        src: &IndexedSurface<'_>,
        palette: &Palette,
        dst: &mut TrueColorSurface<'_>,
    ) {
        match self.scaler {
            ScalerKind::None => self.expand(src, palette, dst),
            ScalerKind::Nearest { scale } => scale::nearest(src, palette, scale, dst),
            ScalerKind::Smooth { scale, strength } => {
                scale::smooth(src, palette, scale, strength, dst);
            },
            ScalerKind::AntiAliased { scale } => {
                scale::nearest(src, palette, scale, dst);
                let (width, height) = self.output_size(src.width(), src.height());
                self.anti_aliaser.apply(&mut dst.region(width, height));
            },
        }
    }

    fn expand(&self, src: &IndexedSurface<'_>, palette: &Palette, dst: &mut TrueColorSurface<'_>) {
        let width = src.width().min(dst.width());
        let height = src.height().min(dst.height());

        let packed = src.pitch() == width && dst.pitch() == width;
        if packed {
            let len = width * height;
            self.expander
                .expand(&src.pixels()[..len], palette, &mut dst.pixels_mut()[..len]);
        } else {
            for y in 0..height {
                self.expander
                    .expand(&src.row(y)[..width], palette, &mut dst.row_mut(y)[..width]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blit::BlendMode;
    use crate::palette::rgb;
    use crate::sprite::{Sprite, SpriteTables, TableId};

    fn palette() -> Palette {
        let mut palette = Palette::new();
        for i in 0..=255u8 {
            palette.set(i, rgb(i, i, 255 - i));
        }
        palette
    }

    fn config(scaler: ScalerKind) -> RenderConfig {
        RenderConfig {
            scaler,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn output_size_follows_scaler() {
        let cpu = CpuFeatures::none();
        let pipeline = FramePipeline::new(&cpu, &config(ScalerKind::Smooth { scale: 6, strength: 4 }));
        assert_eq!(pipeline.output_size(320, 200), (1920, 1200));
        let pipeline = FramePipeline::new(&cpu, &config(ScalerKind::None));
        assert_eq!(pipeline.output_size(320, 200), (320, 200));
    }

    #[test]
    fn output_size_saturates() {
        let pipeline = FramePipeline::new(
            &CpuFeatures::none(),
            &config(ScalerKind::Nearest { scale: usize::MAX }),
        );
        assert_eq!(pipeline.output_size(320, 200), (usize::MAX, usize::MAX));
    }

    #[test]
    fn force_scalar_overrides_detection() {
        let cfg = RenderConfig {
            force_scalar: true,
            ..RenderConfig::default()
        };
        let pipeline = FramePipeline::new(&CpuFeatures::detect(), &cfg);
        assert_eq!(pipeline.expander().tier(), crate::palette::Tier::Scalar);
    }

    #[test]
    fn blit_then_expand_end_to_end() {
        let mut tables = SpriteTables::new();
        let id = TableId::new(0).unwrap();
        let sprite = Sprite::encode(2, 2, &[Some(10), None, None, Some(20)]).unwrap();
        tables.set_table(id, vec![sprite]).unwrap();

        // Indexed frame with pitch padding
        let mut frame = vec![0u8; 8 * 4];
        let mut indexed = IndexedSurface::new(&mut frame, 6, 4, 8).unwrap();
        indexed.fill(1);
        tables.blit(&mut indexed, 2, 1, id, 0, BlendMode::Opaque);

        let palette = palette();
        let mut out = vec![0u32; 6 * 4];
        let mut truecolor = TrueColorSurface::packed(&mut out, 6, 4).unwrap();
        let mut pipeline = FramePipeline::new(&CpuFeatures::detect(), &config(ScalerKind::None));
        pipeline.render(&indexed, &palette, &mut truecolor);

        assert_eq!(out[6 + 2], palette.get(10));
        assert_eq!(out[2 * 6 + 3], palette.get(20));
        assert_eq!(out[6 + 3], palette.get(1));
        assert_eq!(out.iter().filter(|&&c| c == palette.get(1)).count(), 22);
    }

    #[test]
    fn two_by_two_sprite_stream_expands_to_truecolor() {
        const RED: u32 = 0xFF0000;
        const GREEN: u32 = 0x00FF00;
        const BLUE: u32 = 0x0000FF;

        let mut tables = SpriteTables::new();
        let id = TableId::new(0).unwrap();
        tables
            .set_table(id, vec![Sprite::new(2, 2, vec![1, 254, 3, 255, 1])])
            .unwrap();

        let mut frame = vec![0u8; 20 * 20];
        let mut indexed = IndexedSurface::packed(&mut frame, 20, 20).unwrap();
        tables.blit(&mut indexed, 10, 10, id, 0, BlendMode::Opaque);

        let mut palette = Palette::new();
        palette.set(1, RED);
        palette.set(2, GREEN);
        palette.set(3, BLUE);

        let mut out = vec![0xFF00_0000u32; 20 * 20];
        let mut truecolor = TrueColorSurface::packed(&mut out, 20, 20).unwrap();
        let mut pipeline = FramePipeline::new(&CpuFeatures::detect(), &config(ScalerKind::None));
        pipeline.render(&indexed, &palette, &mut truecolor);

        for y in 0..20 {
            for x in 0..20 {
                let expected = match (x, y) {
                    (10, 10) => RED,
                    (10, 11) => BLUE,
                    _ => 0,
                };
                assert_eq!(out[y * 20 + x], expected, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn every_scaler_fills_output() {
        let mut frame: Vec<u8> = (0..16 * 10).map(|i| (i % 7) as u8 * 30).collect();
        let indexed = IndexedSurface::packed(&mut frame, 16, 10).unwrap();
        let palette = palette();

        for scaler in [
            ScalerKind::None,
            ScalerKind::Nearest { scale: 2 },
            ScalerKind::Smooth { scale: 3, strength: 3 },
            ScalerKind::AntiAliased { scale: 3 },
        ] {
            let mut pipeline = FramePipeline::new(&CpuFeatures::detect(), &config(scaler));
            let (w, h) = pipeline.output_size(16, 10);
            let mut out = vec![0xFF00_0000u32; w * h];
            let mut truecolor = TrueColorSurface::packed(&mut out, w, h).unwrap();
            pipeline.render(&indexed, &palette, &mut truecolor);
            assert!(out.iter().all(|&c| c & 0xFF00_0000 == 0), "{}", scaler.name());
        }
    }

    #[test]
    fn anti_aliasing_only_touches_scaled_area() {
        let mut frame = vec![0u8, 255, 0, 255];
        let indexed = IndexedSurface::packed(&mut frame, 2, 2).unwrap();
        let mut pipeline = FramePipeline::new(
            &CpuFeatures::none(),
            &config(ScalerKind::AntiAliased { scale: 3 }),
        );

        let mut out = vec![0xFF00_0000u32; 8 * 8];
        let mut truecolor = TrueColorSurface::packed(&mut out, 8, 8).unwrap();
        pipeline.render(&indexed, &palette(), &mut truecolor);

        for y in 0..8 {
            for x in 0..8 {
                let untouched = out[y * 8 + x] == 0xFF00_0000;
                assert_eq!(untouched, x >= 6 || y >= 6, "({}, {})", x, y);
            }
        }
    }
}
