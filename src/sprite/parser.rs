use nom::{
    bytes::complete::take,
    multi::count,
    number::complete::{le_i32, le_u16, le_u8},
    IResult as _IResult, Parser,
};

use super::{Sprite, SPRITES_PER_TABLE_MAX};
use crate::error::SpriteError;

pub type IResult<'a, T> = _IResult<&'a [u8], T>;

/// Map a nom failure onto a truncation error naming the field being read
fn truncated<'a, T>(
    res: IResult<'a, T>,
    what: &'static str,
) -> Result<(&'a [u8], T), SpriteError> {
    res.map_err(|_| SpriteError::Truncated { what })
}

/// `populated: u8`, then `width, height, size: u16` and `size` bytes if set
pub fn parse_sprite(i: &'_ [u8]) -> IResult<'_, Sprite> {
    let (i, populated) = le_u8(i)?;
    if populated == 0 {
        return Ok((i, Sprite::default()));
    }

    let (i, (width, height, size)) = (le_u16, le_u16, le_u16).parse(i)?;
    let (i, data) = take(size as usize).parse(i)?;

    Ok((i, Sprite::new(width, height, data.to_vec())))
}

/// `count: u16` followed by `count` sprite slots
pub fn parse_table(i: &'_ [u8]) -> Result<(&'_ [u8], Vec<Sprite>), SpriteError> {
    let (i, slots) = truncated(le_u16(i), "sprite count")?;
    let slots = slots as usize;

    if slots > SPRITES_PER_TABLE_MAX {
        return Err(SpriteError::TooManySprites {
            count: slots,
            max: SPRITES_PER_TABLE_MAX,
        });
    }

    truncated(count(parse_sprite, slots).parse(i), "sprite slot")
}

/// `count: u16` followed by `count` little-endian `i32` section offsets
pub fn parse_archive_header(i: &'_ [u8]) -> Result<(&'_ [u8], Vec<i32>), SpriteError> {
    let (i, sections) = truncated(le_u16(i), "archive section count")?;
    truncated(count(le_i32, sections as usize).parse(i), "archive offsets")
}
