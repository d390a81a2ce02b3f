//! Presentation
//!
//! `FramePipeline` converts the indexed game frame into truecolor. With the
//! `sdl` feature, `Display` owns the window and uploads finished frames.

mod pipeline;
#[cfg(feature = "sdl")]
mod window;

pub use pipeline::FramePipeline;
#[cfg(feature = "sdl")]
pub use window::{Display, InputEvent, RenderTarget};

/// Logical size of the classic indexed frame
pub const VGA_WIDTH: usize = 320;
pub const VGA_HEIGHT: usize = 200;
