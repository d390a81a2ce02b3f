//! Demo Scene
//!
//! Procedural sprites bouncing over a banded background, plus a row showing
//! every blend mode side by side. Sprites come from a shape archive when one
//! is given, otherwise they are generated with the encoders.

use std::f32::consts::TAU;

use vgacore::blit::BlendMode;
use vgacore::palette::Palette;
use vgacore::sprite::{
    encode_compact, load_main_shapes, Sprite, SpriteSheet, SpriteTables, TableId,
    COMPACT_CELL_HEIGHT, COMPACT_ROW_WIDTH, COMPACT_SHEET_COLUMNS,
};
use vgacore::surface::IndexedSurface;
use vgacore::SpriteError;

use crate::util::{hsv_to_rgb, Rng};

/// Number of bouncing sprites
const NUM_BOBS: usize = 12;

/// Cells in the generated compact sheet
const SHEET_CELLS: usize = 40;

/// Table the generated sprites are stored in
const DEMO_TABLE: TableId = match TableId::new(0) {
    Some(id) => id,
    None => panic!("table 0 is always in range"),
};

/// Every blend mode, in showcase order
const SHOWCASE: [BlendMode; 7] = [
    BlendMode::Opaque,
    BlendMode::Blend,
    BlendMode::HueValueUnchecked { hue: 7, value: 2 },
    BlendMode::HueValue { hue: 3, value: -4 },
    BlendMode::HueValueBlend { hue: 12, value: 3 },
    BlendMode::Darken { black: false },
    BlendMode::Filter { filter: 0xA0 },
];

/// 16 hue banks of 16 values each; bank 0 is grey
pub fn banked_palette() -> Palette {
    let mut entries = [[0u8; 3]; 256];
    for (i, entry) in entries.iter_mut().enumerate() {
        let (bank, value) = (i / 16, i % 16);
        let saturation = if bank == 0 { 0.0 } else { 0.85 };
        let hue = bank.saturating_sub(1) as f32 * 24.0;
        *entry = hsv_to_rgb(hue, saturation, value as f32 / 15.0);
    }
    Palette::from_rgb(&entries)
}

#[inline]
fn color(bank: u8, value: u8) -> u8 {
    (bank << 4) | value.min(15)
}

fn grid(
    width: usize,
    height: usize,
    pixel: impl Fn(f32, f32) -> Option<u8>,
) -> Vec<Option<u8>> {
    (0..width * height)
        .map(|i| pixel((i % width) as f32, (i / width) as f32))
        .collect()
}

/// Shaded disc, brightest at the center
fn orb(bank: u8, radius: f32) -> impl Fn(f32, f32) -> Option<u8> {
    move |x, y| {
        let (dx, dy) = (x + 0.5 - radius, y + 0.5 - radius);
        let dist = (dx * dx + dy * dy).sqrt();
        (dist <= radius).then(|| color(bank, 15 - (dist / radius * 10.0) as u8))
    }
}

fn ring(bank: u8, radius: f32, thickness: f32) -> impl Fn(f32, f32) -> Option<u8> {
    move |x, y| {
        let (dx, dy) = (x + 0.5 - radius, y + 0.5 - radius);
        let dist = (dx * dx + dy * dy).sqrt();
        (dist <= radius && dist >= radius - thickness).then(|| color(bank, 13))
    }
}

/// 24x28 arrow-shaped ship split over a 2x2 block of cells
fn ship(x: f32, y: f32) -> Option<u8> {
    let half_width = y * 11.0 / 27.0;
    let dx = (x + 0.5 - 12.0).abs();
    if dx > half_width + 0.5 {
        return None;
    }
    if (6.0..12.0).contains(&y) && dx < 2.0 {
        return Some(color(3, 15));
    }
    Some(color(9, 6 + (y / 4.0) as u8))
}

pub struct Assets {
    pub tables: SpriteTables,
    pub table: TableId,
    /// Populated sprite indices of `table`
    pub sprites: Vec<usize>,
    pub sheet: SpriteSheet,
}

impl Assets {
    pub fn generated() -> Result<Self, SpriteError> {
        let sprites = vec![
            Sprite::encode(16, 16, &grid(16, 16, orb(2, 8.0)))?,
            Sprite::encode(16, 16, &grid(16, 16, orb(6, 8.0)))?,
            Sprite::encode(20, 20, &grid(20, 20, ring(11, 10.0, 3.0)))?,
            Sprite::encode(12, 12, &grid(12, 12, orb(13, 6.0)))?,
        ];
        let count = sprites.len();

        let mut tables = SpriteTables::new();
        tables.set_table(DEMO_TABLE, sprites)?;

        let (cell_w, cell_h) = (COMPACT_ROW_WIDTH, COMPACT_CELL_HEIGHT);
        let mut streams = Vec::with_capacity(SHEET_CELLS);
        for i in 0..SHEET_CELLS {
            let bank = 1 + (i % 14) as u8;
            streams.push(encode_compact(cell_h, &grid(cell_w, cell_h, orb(bank, 5.5)))?);
        }
        let quadrants = [
            (0, 0, 0),
            (1, cell_w, 0),
            (COMPACT_SHEET_COLUMNS, 0, cell_h),
            (COMPACT_SHEET_COLUMNS + 1, cell_w, cell_h),
        ];
        for (slot, ox, oy) in quadrants {
            let cell = grid(cell_w, cell_h, |x, y| ship(x + ox as f32, y + oy as f32));
            streams[slot] = encode_compact(cell_h, &cell)?;
        }

        Ok(Self {
            tables,
            table: DEMO_TABLE,
            sprites: (0..count).collect(),
            sheet: SpriteSheet::from_streams(&streams)?,
        })
    }

    /// Use the first populated table and the first non-empty sheet of a
    /// main shape archive
    pub fn from_archive(bytes: &[u8]) -> Result<Self, SpriteError> {
        let mut tables = SpriteTables::new();
        let sheets = load_main_shapes(&mut tables, bytes)?;

        let (table, sprites) = TableId::all()
            .map(|id| {
                let populated: Vec<usize> = (0..tables.table(id).count())
                    .filter(|&i| tables.sprite(id, i).is_some())
                    .collect();
                (id, populated)
            })
            .find(|(_, populated)| !populated.is_empty())
            .ok_or(SpriteError::Truncated {
                what: "populated sprite table",
            })?;

        let sheet = sheets
            .into_iter()
            .find(|sheet| !sheet.is_empty())
            .unwrap_or_default();

        Ok(Self {
            tables,
            table,
            sprites,
            sheet,
        })
    }

    fn sprite(&self, n: usize) -> usize {
        self.sprites[n % self.sprites.len()]
    }
}

struct Bob {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    sprite: usize,
}

pub struct DemoScene {
    time: f32,
    bobs: Vec<Bob>,
    width: f32,
    height: f32,
}

impl DemoScene {
    pub fn new(width: usize, height: usize) -> Self {
        let mut rng = Rng::new(0x5EED);
        let bobs = (0..NUM_BOBS)
            .map(|i| {
                let angle = i as f32 / NUM_BOBS as f32 * TAU;
                let speed = rng.range_i32(40, 110) as f32;
                Bob {
                    x: rng.range_i32(0, width as i32) as f32,
                    y: rng.range_i32(0, height as i32 / 2) as f32,
                    vx: angle.cos() * speed,
                    vy: angle.sin() * speed,
                    sprite: i,
                }
            })
            .collect();

        Self {
            time: 0.0,
            bobs,
            width: width as f32,
            height: height as f32,
        }
    }

    /// Bobs bounce a little past the edges so the clipped blits get exercised
    pub fn update(&mut self, dt: f32) {
        const OVERSHOOT: f32 = 12.0;
        self.time += dt;

        for bob in &mut self.bobs {
            bob.x += bob.vx * dt;
            bob.y += bob.vy * dt;

            if bob.x < -OVERSHOOT || bob.x > self.width - 4.0 {
                bob.vx = -bob.vx;
                bob.x = bob.x.clamp(-OVERSHOOT, self.width - 4.0);
            }
            if bob.y < -OVERSHOOT || bob.y > self.height - 4.0 {
                bob.vy = -bob.vy;
                bob.y = bob.y.clamp(-OVERSHOOT, self.height - 4.0);
            }
        }
    }

    pub fn render(&self, assets: &Assets, frame: &mut IndexedSurface<'_>) {
        let height = frame.height();

        // Banded background in the grey bank, scrolling slowly
        let scroll = (self.time * 8.0) as usize;
        for y in 0..height {
            let value = ((y + scroll) / 6 % 12) as u8;
            frame.row_mut(y).fill(color(0, value));
        }

        // Shadows first so every bob sits above all of them
        for bob in &self.bobs {
            let sprite = assets.sprite(bob.sprite);
            assets.tables.blit_clipped(
                frame,
                bob.x as i32 + 4,
                bob.y as i32 + 4,
                assets.table,
                sprite,
                BlendMode::Darken { black: false },
            );
        }
        for bob in &self.bobs {
            assets.tables.blit_clipped(
                frame,
                bob.x as i32,
                bob.y as i32,
                assets.table,
                assets.sprite(bob.sprite),
                BlendMode::Opaque,
            );
        }

        // Blend mode showcase along the bottom
        let row_y = height as i32 - 40;
        for (i, &mode) in SHOWCASE.iter().enumerate() {
            assets
                .tables
                .blit(frame, 16 + i as i32 * 42, row_y, assets.table, assets.sprite(0), mode);
        }

        self.render_sheet(assets, frame);
    }

    fn render_sheet(&self, assets: &Assets, frame: &mut IndexedSurface<'_>) {
        let sheet = &assets.sheet;

        // Strip of single cells across the top, tinted through the filter mode
        let cells = sheet.len().min(12);
        for index in 1..=cells {
            let x = 8 + (index as i32 - 1) * 16;
            let bob = ((self.time * 3.0 + index as f32).sin() * 4.0) as i32;
            sheet.blit(frame, x, 8 + bob, index, BlendMode::Filter { filter: 0x50 });
        }

        // The 2x2 composite sweeps across and off the screen edges
        if sheet.len() > COMPACT_SHEET_COLUMNS + 1 {
            let x = (self.time * 0.4).sin() * (self.width * 0.5 + 20.0) + self.width * 0.5 - 12.0;
            let y = (self.time * 0.9).cos() * 30.0 + self.height * 0.45;
            sheet.blit_2x2(frame, x as i32, y as i32, 1, BlendMode::Opaque, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_assets_render_without_faults() {
        let assets = Assets::generated().unwrap();
        assert_eq!(assets.table, DEMO_TABLE);
        assert_eq!(assets.sprites, vec![0, 1, 2, 3]);
        let mut scene = DemoScene::new(320, 200);
        let mut frame = vec![0u8; 320 * 200];
        for _ in 0..200 {
            scene.update(1.0 / 30.0);
            let mut surface = IndexedSurface::packed(&mut frame, 320, 200).unwrap();
            scene.render(&assets, &mut surface);
        }
        assert!(frame.iter().any(|&v| v >> 4 == 9));
    }

    #[test]
    fn palette_banks_are_graded() {
        let palette = banked_palette();
        assert_eq!(palette.get(0x00), 0);
        assert_eq!(palette.get(0x0F), 0x00FF_FFFF);
        assert!(palette.get(0x3F) > palette.get(0x31));
    }
}
