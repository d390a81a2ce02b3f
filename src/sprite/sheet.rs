use std::path::Path;

use log::debug;

use crate::error::SpriteError;

/// One compact RLE sprite sheet: a little-endian `u16` offset table followed
/// by the concatenated sprite streams.
///
/// Sprite indices are 1-based. Sprite `i` spans `offset[i - 1]..offset[i]`,
/// the last one runs to the end of the buffer.
#[derive(Debug, Clone, Default)]
pub struct SpriteSheet {
    data: Option<Box<[u8]>>,
}

impl SpriteSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the first `size` bytes of `bytes` into the sheet.
    ///
    /// Loading into a sheet that already holds data is a caller bug.
    pub fn load(&mut self, bytes: &[u8], size: usize) -> Result<(), SpriteError> {
        debug_assert!(self.data.is_none(), "sprite sheet loaded twice");
        if self.data.is_some() {
            return Err(SpriteError::SheetInUse);
        }

        let data = bytes.get(..size).ok_or(SpriteError::Truncated {
            what: "sprite sheet",
        })?;
        self.data = Some(data.into());

        debug!("Loaded sprite sheet: {} bytes, {} sprites", size, self.len());
        Ok(())
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), SpriteError> {
        let bytes = std::fs::read(path)?;
        self.load(&bytes, bytes.len())
    }

    /// Build a sheet from already encoded streams, in sprite order
    pub fn from_streams(streams: &[Vec<u8>]) -> Result<Self, SpriteError> {
        let table_len = streams.len() * 2;
        let total = table_len + streams.iter().map(Vec::len).sum::<usize>();

        let mut data = Vec::with_capacity(total);
        let mut offset = table_len;
        for stream in streams {
            let entry = u16::try_from(offset).map_err(|_| SpriteError::StreamTooLong { len: total })?;
            data.extend_from_slice(&entry.to_le_bytes());
            offset += stream.len();
        }
        for stream in streams {
            data.extend_from_slice(stream);
        }

        let mut sheet = Self::new();
        sheet.load(&data, data.len())?;
        Ok(sheet)
    }

    /// Release the buffer. Safe to call on an empty sheet.
    pub fn free(&mut self) {
        self.data = None;
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    /// Buffer length in bytes
    #[inline]
    pub fn size(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.len())
    }

    /// Sprite count, derived from the first offset entry
    pub fn len(&self) -> usize {
        self.offset(0).map_or(0, |first| first / 2)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn offset(&self, slot: usize) -> Option<usize> {
        let data = self.data.as_deref()?;
        let entry = data.get(slot * 2..slot * 2 + 2)?;
        Some(u16::from_le_bytes([entry[0], entry[1]]) as usize)
    }

    /// The encoded stream of 1-based sprite `index`
    pub fn stream(&self, index: usize) -> Option<&[u8]> {
        let len = self.len();
        if index == 0 || index > len {
            return None;
        }

        let data = self.data.as_deref()?;
        let start = self.offset(index - 1)?;
        let end = if index < len {
            self.offset(index)?
        } else {
            data.len()
        };
        data.get(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streams_are_bounded_by_next_offset() {
        let sheet = SpriteSheet::from_streams(&[vec![1, 2, 3], vec![], vec![4, 5]]).unwrap();
        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.size(), 6 + 5);
        assert_eq!(sheet.stream(1), Some(&[1u8, 2, 3][..]));
        assert_eq!(sheet.stream(2), Some(&[][..]));
        assert_eq!(sheet.stream(3), Some(&[4u8, 5][..]));
    }

    #[test]
    fn out_of_range_indices_have_no_stream() {
        let sheet = SpriteSheet::from_streams(&[vec![0x0F]]).unwrap();
        assert!(sheet.stream(0).is_none());
        assert!(sheet.stream(2).is_none());
        assert!(SpriteSheet::new().stream(1).is_none());
    }

    #[test]
    fn load_copies_only_requested_prefix() {
        let mut sheet = SpriteSheet::new();
        sheet.load(&[2, 0, 0x0F, 0xEE, 0xEE], 3).unwrap();
        assert_eq!(sheet.size(), 3);
        assert_eq!(sheet.stream(1), Some(&[0x0Fu8][..]));
    }

    #[test]
    fn load_past_end_is_truncated() {
        let mut sheet = SpriteSheet::new();
        assert!(matches!(
            sheet.load(&[2, 0], 4),
            Err(SpriteError::Truncated { .. })
        ));
        assert!(!sheet.is_loaded());
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "loaded twice"))]
    fn double_load_is_rejected() {
        let mut sheet = SpriteSheet::new();
        sheet.load(&[2, 0, 0x0F], 3).unwrap();
        assert!(matches!(
            sheet.load(&[2, 0, 0x0F], 3),
            Err(SpriteError::SheetInUse)
        ));
    }

    #[test]
    fn free_then_reload() {
        let mut sheet = SpriteSheet::new();
        sheet.free();
        sheet.load(&[2, 0, 0x0F], 3).unwrap();
        sheet.free();
        sheet.free();
        assert!(!sheet.is_loaded());
        assert!(sheet.is_empty());
        sheet.load(&[2, 0, 0x1F, 0x0F], 4).unwrap();
        assert_eq!(sheet.stream(1), Some(&[0x1Fu8, 0x0F][..]));
    }
}
