//! The shader-model façade (spec §2 component G, §4.G): a read-only
//! description of a parsed preset — its passes, LUTs and parameters — built
//! without touching a [`slangfx_runtime::backend::RenderBackend`], plus a
//! thin re-export of the runtime crate for callers who want to drive a
//! chain directly.

mod shader;

pub use shader::{Parameter, ParameterGroup, ShaderLut, ShaderPass, SlangShader, SlangShaderError};

pub use slangfx_common::{FilterMode, FrameDirection, Image, ImageFormat, Size, WrapMode};
pub use slangfx_presets::{Scale2D, ScaleType};
pub use slangfx_runtime::{
    backend, BoundTexture, DrawCall, FilterChain, FilterChainError, FilterChainOptions, FrameOptions,
    LutLoader, NullLutLoader, RenderBackend, RuntimeParameter, RuntimeParameters,
};
