//! Parser for the `.slangp` preset format (spec §4.A).
//!
//! A preset is a flat `key = value` text file. Per-pass settings are encoded
//! as `<key><N>` where `N` is the zero-based pass index; LUTs and parameter
//! overrides are declared via a `textures = NAME1 NAME2 ...` /
//! `parameters = NAME1 NAME2 ...` indirection, one `NAME_subkey` line per
//! item.

mod error;
mod parse;
mod scale;

pub use error::ParsePresetError;
pub use scale::{Scale2D, ScaleType};

use slangfx_common::{FilterMode, WrapMode};
use std::path::{Path, PathBuf};

/// A single pass's preset-declared configuration. Everything here is a
/// *request*; the reflection engine may still override `format` via
/// `#pragma format` when the pass leaves it `Unknown`.
#[derive(Debug, Clone)]
pub struct ShaderPassConfig {
    pub id: usize,
    pub name: PathBuf,
    pub alias: Option<String>,
    pub filter: FilterMode,
    pub wrap_mode: WrapMode,
    pub frame_count_mod: u32,
    pub scaling: Scale2D,
    pub is_mipmap: bool,
    pub is_float_framebuffer: bool,
    pub is_srgb_framebuffer: bool,
    pub is_feedback: bool,
}

#[derive(Debug, Clone)]
pub struct TextureConfig {
    pub name: String,
    pub path: PathBuf,
    pub wrap_mode: WrapMode,
    pub filter_mode: FilterMode,
    pub mipmap: bool,
}

#[derive(Debug, Clone)]
pub struct ParameterOverride {
    pub name: String,
    pub value: f32,
}

#[derive(Debug, Clone, Default)]
pub struct ShaderPreset {
    pub shaders: Vec<ShaderPassConfig>,
    pub textures: Vec<TextureConfig>,
    pub parameters: Vec<ParameterOverride>,
}

impl ShaderPreset {
    /// Parse the preset at `path`. All relative paths inside the preset
    /// (pass sources, LUTs) are resolved against `path`'s parent directory.
    pub fn try_parse(path: impl AsRef<Path>) -> Result<ShaderPreset, ParsePresetError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ParsePresetError::Io(path.to_path_buf(), e.to_string()))?;
        let base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        parse::parse(&text, &base)
    }

    /// Parse preset text already in memory, resolving relative paths against
    /// `base`. Exposed so tests and embedders don't need a real filesystem.
    pub fn parse_str(text: &str, base: impl AsRef<Path>) -> Result<ShaderPreset, ParsePresetError> {
        parse::parse(text, base.as_ref())
    }
}
