//! A single pass's fully built state: preset config, preprocessed source,
//! reflected bindings and compiled output, plus the render-target slots it
//! owns at runtime.

use crate::arena::TextureSlot;
use slangfx_common::Size;
use slangfx_presets::ShaderPassConfig;
use slangfx_preprocess::ShaderSource;
use slangfx_reflect::{CompiledPass, ShaderIr, ShaderReflection};

pub struct PassState {
    pub config: ShaderPassConfig,
    pub source: ShaderSource,
    pub vertex_ir: ShaderIr,
    pub fragment_ir: ShaderIr,
    pub reflection: ShaderReflection,
    pub compiled: CompiledPass,
    pub size: Size<u32>,
    pub output: TextureSlot,
    pub feedback: Option<TextureSlot>,
}
