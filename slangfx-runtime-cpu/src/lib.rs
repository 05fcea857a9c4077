//! An in-memory [`RenderBackend`] that rasterizes against plain `Vec<u8>`
//! RGBA8 buffers instead of a GPU (spec §9: "one concrete backend, enough to
//! exercise the rest of the system end to end").
//!
//! This backend does not execute arbitrary shader code - there is no GLSL
//! interpreter here, and [`slangfx_reflect::PassthroughCompiler`] only ever
//! hands back source text, not bytecode a CPU can run. What it does
//! faithfully reproduce is everything *around* a pass: texture lifetimes,
//! sizing, the history ring and feedback swap, and per-frame uniform
//! staging. A draw call samples its lowest-binding texture (bilinear or
//! point, depending on the bound sampler state) into the target, and blends
//! a second bound texture in using the first four bytes of the uniform
//! buffer as a blend factor if one is present. That is enough to drive the
//! filter chain's test scenarios without pretending to be a shading
//! language.

mod error;
mod texture;

pub use error::CpuBackendError;

use slangfx_common::{FilterMode, Size, WrapMode};
use slangfx_runtime::{BoundTexture, DrawCall, RenderBackend};
use texture::CpuTexture;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CpuTextureHandle(usize);

#[derive(Debug, Default)]
pub struct CpuBackend {
    textures: Vec<Option<CpuTexture>>,
    next_fence: u64,
}

impl CpuBackend {
    pub fn new() -> Self {
        CpuBackend::default()
    }

    pub fn texture_size(&self, handle: CpuTextureHandle) -> Option<Size<u32>> {
        self.textures.get(handle.0)?.as_ref().map(|t| t.size)
    }

    fn get(&self, handle: CpuTextureHandle) -> Result<&CpuTexture, CpuBackendError> {
        self.textures
            .get(handle.0)
            .and_then(|t| t.as_ref())
            .ok_or(CpuBackendError::InvalidHandle)
    }

    fn get_mut(&mut self, handle: CpuTextureHandle) -> Result<&mut CpuTexture, CpuBackendError> {
        self.textures
            .get_mut(handle.0)
            .and_then(|t| t.as_mut())
            .ok_or(CpuBackendError::InvalidHandle)
    }
}

impl RenderBackend for CpuBackend {
    type TextureHandle = CpuTextureHandle;
    type FenceToken = u64;
    type Error = CpuBackendError;

    fn create_texture(&mut self, size: Size<u32>, format: slangfx_common::ImageFormat) -> Result<Self::TextureHandle, Self::Error> {
        self.textures.push(Some(CpuTexture::new(size, format)));
        Ok(CpuTextureHandle(self.textures.len() - 1))
    }

    fn destroy_texture(&mut self, handle: Self::TextureHandle) {
        if let Some(slot) = self.textures.get_mut(handle.0) {
            *slot = None;
        }
    }

    fn write_texture(&mut self, handle: Self::TextureHandle, pixels: &[u8]) -> Result<(), Self::Error> {
        let texture = self.get_mut(handle)?;
        if pixels.len() != texture.pixels.len() {
            return Err(CpuBackendError::SizeMismatch {
                expected: texture.pixels.len(),
                actual: pixels.len(),
            });
        }
        texture.pixels.copy_from_slice(pixels);
        Ok(())
    }

    fn read_texture(&mut self, handle: Self::TextureHandle) -> Result<Vec<u8>, Self::Error> {
        Ok(self.get(handle)?.pixels.clone())
    }

    fn draw(&mut self, call: &DrawCall<Self::TextureHandle>) -> Result<(), Self::Error> {
        let width = call.target_size.width.max(1);
        let height = call.target_size.height.max(1);
        let mut output = vec![0u8; width as usize * height as usize * 4];

        let mut bound: Vec<&(u32, BoundTexture<Self::TextureHandle>)> = call.textures.iter().collect();
        bound.sort_by_key(|(binding, _)| *binding);

        if let Some((_, primary)) = bound.first() {
            let source = self.get(primary.handle)?;
            resample(source, primary.filter, primary.wrap_mode, width, height, &mut output);

            if let Some((_, secondary)) = bound.get(1) {
                let secondary_tex = self.get(secondary.handle)?;
                let mut blended = vec![0u8; output.len()];
                resample(secondary_tex, secondary.filter, secondary.wrap_mode, width, height, &mut blended);
                let factor = blend_factor(call.ubo);
                lerp_into(&mut output, &blended, factor);
            }
        }

        let target = self.get_mut(call.target)?;
        target.pixels = output;
        target.size = call.target_size;
        Ok(())
    }

    fn submit_fence(&mut self) -> Self::FenceToken {
        self.next_fence += 1;
        self.next_fence
    }
}

fn blend_factor(ubo: Option<&[u8]>) -> f32 {
    match ubo.and_then(|bytes| bytes.get(0..4)) {
        Some(bytes) => f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]).clamp(0.0, 1.0),
        None => 0.5,
    }
}

fn lerp_into(base: &mut [u8], other: &[u8], factor: f32) {
    for (a, b) in base.iter_mut().zip(other.iter()) {
        let blended = *a as f32 * (1.0 - factor) + *b as f32 * factor;
        *a = blended.round().clamp(0.0, 255.0) as u8;
    }
}

fn resample(source: &CpuTexture, filter: FilterMode, wrap: WrapMode, width: u32, height: u32, out: &mut [u8]) {
    let src_w = source.size.width.max(1) as f32;
    let src_h = source.size.height.max(1) as f32;
    for y in 0..height {
        for x in 0..width {
            let u = (x as f32 + 0.5) / width as f32;
            let v = (y as f32 + 0.5) / height as f32;
            let sx = u * src_w - 0.5;
            let sy = v * src_h - 0.5;
            let pixel = match filter {
                FilterMode::Nearest | FilterMode::Unspecified => sample_nearest(source, sx, sy, wrap),
                FilterMode::Linear => sample_bilinear(source, sx, sy, wrap),
            };
            let index = (y as usize * width as usize + x as usize) * 4;
            out[index..index + 4].copy_from_slice(&pixel);
        }
    }
}

fn wrap_coord(v: i64, len: i64, wrap: WrapMode) -> i64 {
    if len <= 1 {
        return 0;
    }
    match wrap {
        WrapMode::Repeat | WrapMode::MirroredRepeat => v.rem_euclid(len),
        WrapMode::ClampToEdge | WrapMode::ClampToBorder => v.clamp(0, len - 1),
    }
}

fn texel(source: &CpuTexture, x: i64, y: i64, wrap: WrapMode) -> [u8; 4] {
    let x = wrap_coord(x, source.size.width as i64, wrap) as usize;
    let y = wrap_coord(y, source.size.height as i64, wrap) as usize;
    let index = (y * source.size.width as usize + x) * 4;
    source.pixels[index..index + 4].try_into().expect("texel read is always 4 bytes")
}

fn sample_nearest(source: &CpuTexture, sx: f32, sy: f32, wrap: WrapMode) -> [u8; 4] {
    texel(source, sx.round() as i64, sy.round() as i64, wrap)
}

fn sample_bilinear(source: &CpuTexture, sx: f32, sy: f32, wrap: WrapMode) -> [u8; 4] {
    let x0 = sx.floor() as i64;
    let y0 = sy.floor() as i64;
    let fx = sx - x0 as f32;
    let fy = sy - y0 as f32;

    let c00 = texel(source, x0, y0, wrap);
    let c10 = texel(source, x0 + 1, y0, wrap);
    let c01 = texel(source, x0, y0 + 1, wrap);
    let c11 = texel(source, x0 + 1, y0 + 1, wrap);

    let mut out = [0u8; 4];
    for channel in 0..4 {
        let top = c00[channel] as f32 * (1.0 - fx) + c10[channel] as f32 * fx;
        let bottom = c01[channel] as f32 * (1.0 - fx) + c11[channel] as f32 * fx;
        out[channel] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use slangfx_common::ImageFormat;

    fn solid(backend: &mut CpuBackend, size: Size<u32>, color: [u8; 4]) -> CpuTextureHandle {
        let handle = backend.create_texture(size, ImageFormat::R8G8B8A8Unorm).unwrap();
        let mut pixels = vec![0u8; size.width as usize * size.height as usize * 4];
        for px in pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
        backend.write_texture(handle, &pixels).unwrap();
        handle
    }

    #[test]
    fn identity_sized_draw_reproduces_source_pixels() {
        let mut backend = CpuBackend::new();
        let size = Size::new(4, 4);
        let source = solid(&mut backend, size, [10, 20, 30, 255]);
        let target = backend.create_texture(size, ImageFormat::R8G8B8A8Unorm).unwrap();

        let call = DrawCall {
            ubo: None,
            push_constants: None,
            textures: &[(0, BoundTexture { handle: source, filter: FilterMode::Nearest, wrap_mode: WrapMode::ClampToEdge })],
            target,
            target_size: size,
            mvp: [0.0; 16],
            clear: true,
        };
        backend.draw(&call).unwrap();

        let pixels = backend.read_texture(target).unwrap();
        for px in pixels.chunks_exact(4) {
            assert_eq!(px, [10, 20, 30, 255]);
        }
    }

    #[test]
    fn two_bound_textures_blend_by_ubo_factor() {
        let mut backend = CpuBackend::new();
        let size = Size::new(2, 2);
        let a = solid(&mut backend, size, [0, 0, 0, 255]);
        let b = solid(&mut backend, size, [200, 200, 200, 255]);
        let target = backend.create_texture(size, ImageFormat::R8G8B8A8Unorm).unwrap();

        let ubo = 1.0f32.to_ne_bytes();
        let call = DrawCall {
            ubo: Some(&ubo),
            push_constants: None,
            textures: &[
                (0, BoundTexture { handle: a, filter: FilterMode::Nearest, wrap_mode: WrapMode::ClampToEdge }),
                (1, BoundTexture { handle: b, filter: FilterMode::Nearest, wrap_mode: WrapMode::ClampToEdge }),
            ],
            target,
            target_size: size,
            mvp: [0.0; 16],
            clear: true,
        };
        backend.draw(&call).unwrap();

        let pixels = backend.read_texture(target).unwrap();
        assert_eq!(pixels[0..4], [200, 200, 200, 255]);
    }

    #[test]
    fn destroyed_handle_is_no_longer_readable() {
        let mut backend = CpuBackend::new();
        let handle = solid(&mut backend, Size::new(1, 1), [1, 2, 3, 4]);
        backend.destroy_texture(handle);
        assert!(matches!(backend.read_texture(handle), Err(CpuBackendError::InvalidHandle)));
    }
}
