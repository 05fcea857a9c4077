use slangfx_common::{ImageFormat, Size};

/// Always stored as RGBA8 regardless of the declared [`ImageFormat`]; real
/// pixel-format conversion is out of scope for this reference backend
/// (spec §1).
#[derive(Debug, Clone)]
pub struct CpuTexture {
    pub size: Size<u32>,
    pub format: ImageFormat,
    pub pixels: Vec<u8>,
}

impl CpuTexture {
    pub fn new(size: Size<u32>, format: ImageFormat) -> Self {
        let len = size.width.max(1) as usize * size.height.max(1) as usize * 4;
        CpuTexture { size, format, pixels: vec![0u8; len] }
    }
}
