//! Sprite Store
//!
//! Owns decoded sprite bytes for the two sprite formats:
//! - indexed-array tables: fixed-capacity tables of independently sized sprites
//! - compact RLE sheets: one contiguous buffer, many 12-pixel-wide cells
//!
//! Tables live in a `SpriteTables` arena addressed by `TableId`.

mod archive;
mod encode;
mod parser;
mod sheet;

use std::path::Path;

use log::debug;

use crate::error::SpriteError;

pub use archive::{load_main_shapes, ShapeArchive, ARCHIVE_TABLE_SECTIONS};
pub use encode::encode_compact;
pub(crate) use encode::{COMPACT_END, NEXT_ROW, SKIP_ONE, SKIP_RUN};
pub use sheet::SpriteSheet;

/// Number of tables in the arena
pub const SPRITE_TABLES_MAX: usize = 8;

/// Capacity of a single table
pub const SPRITES_PER_TABLE_MAX: usize = 152;

/// Fixed row width of every compact RLE cell
pub const COMPACT_ROW_WIDTH: usize = 12;

/// Row height of a compact RLE cell, used when stitching 2x2 blocks
pub const COMPACT_CELL_HEIGHT: usize = 14;

/// Sprites per row of a compact sheet, used when stitching 2x2 blocks
pub const COMPACT_SHEET_COLUMNS: usize = 19;

/// Opaque handle to one table of the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(u8);

impl TableId {
    pub const fn new(index: usize) -> Option<Self> {
        if index < SPRITE_TABLES_MAX {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub fn all() -> impl Iterator<Item = TableId> {
        (0..SPRITE_TABLES_MAX).map(|i| Self(i as u8))
    }
}

/// One sprite of an indexed-array table. `data` is present iff the
/// encoded stream is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sprite {
    pub width: u16,
    pub height: u16,
    data: Option<Box<[u8]>>,
}

impl Sprite {
    pub fn new(width: u16, height: u16, data: Vec<u8>) -> Self {
        let data = if data.is_empty() {
            None
        } else {
            Some(data.into_boxed_slice())
        };
        Self {
            width,
            height,
            data,
        }
    }

    /// Encoded byte length
    #[inline]
    pub fn size(&self) -> u32 {
        self.data.as_ref().map_or(0, |d| d.len() as u32)
    }

    #[inline]
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    #[inline]
    pub fn exists(&self) -> bool {
        self.data.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpriteTable {
    sprites: Vec<Sprite>,
}

impl SpriteTable {
    /// Number of slots declared by the last load
    #[inline]
    pub fn count(&self) -> usize {
        self.sprites.len()
    }

    pub fn get(&self, index: usize) -> Option<&Sprite> {
        self.sprites.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.iter()
    }
}

/// Arena of `SPRITE_TABLES_MAX` indexed-array tables
#[derive(Debug, Clone)]
pub struct SpriteTables {
    tables: [SpriteTable; SPRITE_TABLES_MAX],
}

impl SpriteTables {
    pub fn new() -> Self {
        Self {
            tables: std::array::from_fn(|_| SpriteTable::default()),
        }
    }

    /// Replace the contents of `table` with the table encoded at the start of
    /// `bytes`. Returns the number of bytes consumed.
    ///
    /// The table is cleared first, so on error it is left empty.
    pub fn load_table(&mut self, table: TableId, bytes: &[u8]) -> Result<usize, SpriteError> {
        self.free_table(table);

        let (rest, sprites) = parser::parse_table(bytes)?;
        let consumed = bytes.len() - rest.len();

        debug!(
            "Loaded sprite table {}: {} slots, {} populated, {} bytes",
            table.index(),
            sprites.len(),
            sprites.iter().filter(|s| s.exists()).count(),
            consumed
        );

        self.tables[table.index()].sprites = sprites;
        Ok(consumed)
    }

    pub fn load_table_file(
        &mut self,
        table: TableId,
        path: impl AsRef<Path>,
    ) -> Result<(), SpriteError> {
        self.free_table(table);
        let bytes = std::fs::read(path)?;
        self.load_table(table, &bytes).map(|_| ())
    }

    /// Install an already decoded set of sprites
    pub fn set_table(&mut self, table: TableId, sprites: Vec<Sprite>) -> Result<(), SpriteError> {
        if sprites.len() > SPRITES_PER_TABLE_MAX {
            return Err(SpriteError::TooManySprites {
                count: sprites.len(),
                max: SPRITES_PER_TABLE_MAX,
            });
        }
        self.tables[table.index()].sprites = sprites;
        Ok(())
    }

    /// Release every sprite of `table`. Safe to call on an empty table.
    pub fn free_table(&mut self, table: TableId) {
        self.tables[table.index()].sprites = Vec::new();
    }

    pub fn free_all(&mut self) {
        for table in TableId::all() {
            self.free_table(table);
        }
    }

    #[inline]
    pub fn table(&self, table: TableId) -> &SpriteTable {
        &self.tables[table.index()]
    }

    /// A populated sprite, or `None` for out-of-range or empty slots
    pub fn sprite(&self, table: TableId, index: usize) -> Option<&Sprite> {
        self.table(table).get(index).filter(|s| s.exists())
    }
}

impl Default for SpriteTables {
    fn default() -> Self {
        Self::new()
    }
}
