//! The collaborator trait a concrete GPU API implements against this crate's
//! core (spec §6/§9: out-of-scope platform/GPU concerns, specified only at
//! their interface to the core).

use slangfx_common::{FilterMode, ImageFormat, Size, WrapMode};

/// One resolved texture read by a draw call, alongside the sampler state the
/// declaring pass or LUT requested.
#[derive(Debug, Clone, Copy)]
pub struct BoundTexture<H> {
    pub handle: H,
    pub filter: FilterMode,
    pub wrap_mode: WrapMode,
}

/// Everything one pass needs to execute: the staged uniform bytes (already
/// laid out at the offsets reflection decided), the resolved texture
/// bindings in declaration order, and the destination.
pub struct DrawCall<'a, H> {
    pub ubo: Option<&'a [u8]>,
    pub push_constants: Option<&'a [u8]>,
    pub textures: &'a [(u32, BoundTexture<H>)],
    pub target: H,
    pub target_size: Size<u32>,
    pub mvp: [f32; 16],
    pub clear: bool,
}

/// The GPU-API boundary (spec §6). `slangfx-runtime-cpu` is the one concrete
/// implementation shipped in this workspace; a real GPU backend (GL, Vulkan,
/// Metal, D3D) implements the same trait against its own command submission.
pub trait RenderBackend {
    type TextureHandle: Copy + Eq;
    type FenceToken;
    type Error: std::error::Error + Send + Sync + 'static;

    fn create_texture(
        &mut self,
        size: Size<u32>,
        format: ImageFormat,
    ) -> Result<Self::TextureHandle, Self::Error>;

    fn destroy_texture(&mut self, handle: Self::TextureHandle);

    fn write_texture(&mut self, handle: Self::TextureHandle, pixels: &[u8]) -> Result<(), Self::Error>;

    fn read_texture(&mut self, handle: Self::TextureHandle) -> Result<Vec<u8>, Self::Error>;

    fn draw(&mut self, call: &DrawCall<Self::TextureHandle>) -> Result<(), Self::Error>;

    /// Number of uniform-staging slots the backend wants kept in flight
    /// (spec §5; typically the swapchain/command-buffer depth). A software
    /// backend with no asynchrony returns 1.
    fn frames_in_flight(&self) -> usize {
        1
    }

    /// Submit the fence for the frame just encoded; the core never blocks
    /// on this directly, only recycles the staging slot once the backend
    /// reports it done via [`RenderBackend::wait_fence`].
    fn submit_fence(&mut self) -> Self::FenceToken;

    fn wait_fence(&mut self, _token: Self::FenceToken) {}
}
