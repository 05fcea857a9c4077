//! Types shared across the preset, preprocess, reflect and runtime crates.

mod format;
mod size;
mod viewport;

pub use format::{FilterMode, ImageFormat, WrapMode};
pub use size::Size;
pub use viewport::Viewport;

/// Direction the frame counter advances. Either `1` or `-1`; exposed
/// as a distinct type so callers can't accidentally pass an arbitrary `i32`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameDirection(i32);

impl FrameDirection {
    pub const FORWARD: FrameDirection = FrameDirection(1);
    pub const BACKWARD: FrameDirection = FrameDirection(-1);

    pub fn as_i32(self) -> i32 {
        self.0
    }
}

impl Default for FrameDirection {
    fn default() -> Self {
        FrameDirection::FORWARD
    }
}

/// A raw RGBA8 image decoded from disk or captured from a render target.
///
/// Loading from a path is an external collaborator's job (file I/O is out of
/// scope per the spec); this type is the shape the rest of the system agrees
/// on once bytes exist in memory.
#[derive(Debug, Clone)]
pub struct Image {
    pub size: Size<u32>,
    pub pixels: Vec<u8>,
}

impl Image {
    pub fn new(size: Size<u32>, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), size.width as usize * size.height as usize * 4);
        Image { size, pixels }
    }
}
