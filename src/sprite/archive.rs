use log::info;

use super::{parser, SpriteSheet, SpriteTables, TableId};
use crate::error::SpriteError;

/// Leading archive sections that hold indexed-array tables; the rest are sheets
pub const ARCHIVE_TABLE_SECTIONS: usize = 7;

/// Section view over a shape archive: `count: u16`, `count` `i32` offsets,
/// then the section bodies. A section ends where the next one starts, the last
/// one at the end of the archive.
#[derive(Debug, Clone)]
pub struct ShapeArchive<'a> {
    sections: Vec<&'a [u8]>,
}

impl<'a> ShapeArchive<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self, SpriteError> {
        let (_, offsets) = parser::parse_archive_header(bytes)?;

        let mut sections = Vec::with_capacity(offsets.len());
        for (index, &start) in offsets.iter().enumerate() {
            let end = offsets
                .get(index + 1)
                .copied()
                .unwrap_or(bytes.len() as i32);

            let bad = || SpriteError::BadSection {
                index,
                start: start.max(0) as usize,
                end: end.max(0) as usize,
            };
            let start = usize::try_from(start).map_err(|_| bad())?;
            let end = usize::try_from(end).map_err(|_| bad())?;
            sections.push(bytes.get(start..end).ok_or_else(bad)?);
        }

        Ok(Self { sections })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, index: usize) -> Option<&'a [u8]> {
        self.sections.get(index).copied()
    }

    pub fn sections(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        self.sections.iter().copied()
    }
}

/// Load a main shape archive: the first `ARCHIVE_TABLE_SECTIONS` sections go
/// to tables `0..7`, every remaining section becomes a sprite sheet.
pub fn load_main_shapes(
    tables: &mut SpriteTables,
    bytes: &[u8],
) -> Result<Vec<SpriteSheet>, SpriteError> {
    let archive = ShapeArchive::parse(bytes)?;
    if archive.len() < ARCHIVE_TABLE_SECTIONS {
        return Err(SpriteError::Truncated {
            what: "shape archive tables",
        });
    }

    for (index, section) in archive.sections().take(ARCHIVE_TABLE_SECTIONS).enumerate() {
        let Some(table) = TableId::new(index) else {
            break;
        };
        tables.load_table(table, section)?;
    }

    let sheets = archive
        .sections()
        .skip(ARCHIVE_TABLE_SECTIONS)
        .map(|section| {
            let mut sheet = SpriteSheet::new();
            sheet.load(section, section.len())?;
            Ok(sheet)
        })
        .collect::<Result<Vec<_>, SpriteError>>()?;

    info!(
        "Loaded shape archive: {} tables, {} sheets",
        ARCHIVE_TABLE_SECTIONS,
        sheets.len()
    );
    Ok(sheets)
}
