//! `SlangShader`: the immutable, backend-free description of a parsed
//! preset (spec §3 `Preset`, §4.G). Constructing one runs the same
//! parse → preprocess → reflect pipeline a [`slangfx_runtime::FilterChain`]
//! runs when loading a shader, so `history_count` and each pass's resolved
//! `alias`/feedback wiring are exactly what a runtime would build against -
//! without needing a `RenderBackend` to ask.

use std::path::{Path, PathBuf};

use slangfx_common::{FilterMode, ImageFormat, WrapMode};
use slangfx_presets::{ParsePresetError, Scale2D, ShaderPreset};
use slangfx_preprocess::{PreprocessError, ShaderSource};
use slangfx_reflect::{
    front::glsl, insert_lut_semantics, insert_parameter_semantic, insert_pass_semantics, reflect,
    ReflectError, ReflectSemantics, TextureSemantics,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlangShaderError {
    #[error("preset error: {0}")]
    Preset(#[from] ParsePresetError),

    #[error("preprocess error: {0}")]
    Preprocess(#[from] PreprocessError),

    #[error("reflect error: {0}")]
    Reflect(#[from] ReflectError),
}

/// A single pass's preset-declared configuration, independent of any
/// runtime allocation (spec §3 `ShaderPass`).
#[derive(Debug, Clone)]
pub struct ShaderPass {
    pub source: PathBuf,
    pub alias: Option<String>,
    pub frame_count_mod: u32,
    pub scaling: Scale2D,
    pub filter: FilterMode,
    pub wrap_mode: WrapMode,
    pub format: ImageFormat,
    pub is_mipmap: bool,
    pub is_feedback: bool,
    pub is_float: bool,
    pub is_srgb: bool,
    /// Always `true`: a `SlangShader` only exists if every pass parsed,
    /// preprocessed and reflected without error (spec §7 "fatal to the
    /// load" — there is no partially-valid shader to report).
    pub valid: bool,
}

#[derive(Debug, Clone)]
pub struct ShaderLut {
    pub path: PathBuf,
    pub name: String,
    pub wrap_mode: WrapMode,
    pub filter: FilterMode,
    pub is_mipmap: bool,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub id: String,
    pub description: String,
    pub group: Option<String>,
    pub minimum: f32,
    pub initial: f32,
    pub maximum: f32,
    pub step: f32,
}

/// A named collection of parameters a UI may fold together (spec §3),
/// populated from `#pragma parameter_group NAME "DESC"` declarations.
/// Indexes into [`SlangShader::parameters`]; a parameter with no group
/// attachment (`Parameter::group` is `None`) belongs to none of these and
/// stays in the implicit default group instead.
#[derive(Debug, Clone)]
pub struct ParameterGroup {
    pub name: String,
    pub description: String,
    /// Always `false`: the pragma grammar this workspace parses carries no
    /// visibility toggle.
    pub hidden: bool,
    pub parameters: Vec<usize>,
}

/// An immutable, parsed-and-reflected preset (spec §3 `Preset`/`SlangShader`).
#[derive(Debug, Clone)]
pub struct SlangShader {
    pub passes: Vec<ShaderPass>,
    pub luts: Vec<ShaderLut>,
    pub parameters: Vec<Parameter>,
    pub parameter_groups: Vec<ParameterGroup>,
    pub history_count: usize,
}

impl SlangShader {
    /// Parse the preset at `path` and run it through preprocessing and
    /// reflection, exactly as [`slangfx_runtime::FilterChain::set_shader`]
    /// would, but without allocating any texture.
    pub fn load(path: impl AsRef<Path>) -> Result<SlangShader, SlangShaderError> {
        let preset = ShaderPreset::try_parse(path)?;

        let sources = preset
            .shaders
            .iter()
            .map(|config| ShaderSource::load(&config.name))
            .collect::<Result<Vec<_>, _>>()?;

        let mut semantics = ReflectSemantics::default();
        for config in &preset.shaders {
            insert_pass_semantics(&mut semantics, config);
        }
        insert_lut_semantics(&mut semantics, &preset.textures);
        for source in &sources {
            for param in &source.parameters {
                insert_parameter_semantic(&mut semantics, &param.id);
            }
        }

        let mut history_count = 0;
        let mut passes = Vec::with_capacity(preset.shaders.len());
        let mut parameters: Vec<Parameter> = Vec::new();
        let mut group_descriptions: Vec<(String, String)> = Vec::new();

        for (index, (config, source)) in preset.shaders.iter().zip(&sources).enumerate() {
            let vertex_ir = glsl::scan(&source.vertex)?;
            let fragment_ir = glsl::scan(&source.fragment)?;
            let reflection = reflect(index, &vertex_ir, &fragment_ir, &semantics)?;

            for map in reflection
                .meta
                .texture_meta
                .keys()
                .chain(reflection.meta.texture_size_meta.keys())
            {
                if map.semantics == TextureSemantics::OriginalHistory {
                    history_count = history_count.max(map.index);
                }
            }

            for decl in &source.parameter_groups {
                if !group_descriptions.iter().any(|(name, _)| name == &decl.name) {
                    group_descriptions.push((decl.name.clone(), decl.description.clone()));
                }
            }

            for param in &source.parameters {
                if parameters.iter().any(|existing| existing.id == param.id) {
                    continue;
                }
                parameters.push(Parameter {
                    id: param.id.clone(),
                    description: param.description.clone(),
                    group: param.group.clone(),
                    minimum: param.minimum,
                    initial: param.initial,
                    maximum: param.maximum,
                    step: param.step,
                });
            }

            passes.push(ShaderPass {
                source: config.name.clone(),
                alias: config.alias.clone(),
                frame_count_mod: config.frame_count_mod,
                scaling: config.scaling,
                filter: config.filter,
                wrap_mode: config.wrap_mode,
                format: source.format,
                is_mipmap: config.is_mipmap,
                is_feedback: config.is_feedback,
                is_float: config.is_float_framebuffer,
                is_srgb: config.is_srgb_framebuffer,
                valid: true,
            });
        }

        let luts = preset
            .textures
            .iter()
            .map(|texture| ShaderLut {
                path: texture.path.clone(),
                name: texture.name.clone(),
                wrap_mode: texture.wrap_mode,
                filter: texture.filter_mode,
                is_mipmap: texture.mipmap,
            })
            .collect();

        for over in &preset.parameters {
            if let Some(p) = parameters.iter_mut().find(|p| p.id == over.name) {
                p.initial = over.value;
            }
        }

        let parameter_groups = group_descriptions
            .into_iter()
            .map(|(name, description)| ParameterGroup {
                parameters: parameters
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.group.as_deref() == Some(name.as_str()))
                    .map(|(index, _)| index)
                    .collect(),
                name,
                description,
                hidden: false,
            })
            .collect();

        Ok(SlangShader {
            passes,
            luts,
            parameters,
            parameter_groups,
            history_count,
        })
    }
}
