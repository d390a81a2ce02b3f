//! Error types for loading sprite data, building surfaces and reading config.

#[derive(Debug, thiserror::Error)]
pub enum SpriteError {
    #[error("Sprite table declares {count} sprites, capacity is {max}")]
    TooManySprites { count: usize, max: usize },
    #[error("Unexpected end of data while reading {what}")]
    Truncated { what: &'static str },
    #[error("Sprite sheet is already loaded")]
    SheetInUse,
    #[error("Shape archive section {index} has invalid bounds {start}..{end}")]
    BadSection {
        index: usize,
        start: usize,
        end: usize,
    },
    #[error("Pixel value {value:#04x} collides with a control code")]
    ReservedPixel { value: u8 },
    #[error("Sprite of {width}x{height} does not match {len} pixels")]
    BadGrid {
        width: usize,
        height: usize,
        len: usize,
    },
    #[error("Encoded stream of {len} bytes does not fit the format")]
    StreamTooLong { len: usize },
    #[error("IOError: {source}")]
    IOError {
        #[from]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("Pitch {pitch} is smaller than width {width}")]
    PitchTooSmall { pitch: usize, width: usize },
    #[error("Buffer holds {len} elements, surface needs {required}")]
    BufferTooSmall { len: usize, required: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Error reading config: {source}")]
    IOError {
        #[from]
        source: std::io::Error,
    },
    #[error("Error parsing config: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("Scale {scale} is outside 1..={max}")]
    BadScale { scale: usize, max: usize },
}
