//! The fixed semantic vocabulary a pass's uniforms and textures are matched
//! against (spec §4.D). Kept as small `Copy` enums and bitflags rather than
//! hash-keyed strings on the hot (per-frame) path; only shader *load* does
//! string matching (spec §9).

use crate::error::ReflectError;
use bitflags::bitflags;
use rustc_hash::FxHashMap;
use slangfx_presets::{ShaderPassConfig, TextureConfig};

/// Scalar/vector uniforms addressed by a single well-known name, not an
/// indexed family.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Hash)]
pub enum VariableSemantics {
    Mvp,
    Output,
    FinalViewport,
    FrameCount,
    FrameDirection,
    FloatParameter,
}

/// Indexed texture families (spec §3/§4.D table).
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Hash)]
pub enum TextureSemantics {
    Original,
    Source,
    OriginalHistory,
    PassOutput,
    PassFeedback,
    User,
}

/// A semantic plus the index that disambiguates it within its family
/// (`0` for non-indexed families such as `Original`/`Source`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SemanticMap<T> {
    pub semantics: T,
    pub index: usize,
}

bitflags! {
    /// Which stage(s) a binding is read from.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
    pub struct BindingStage: u8 {
        const VERTEX = 0b01;
        const FRAGMENT = 0b10;
    }
}

/// What a preset-supplied name means: either a scalar/variable semantic
/// (including a specific parameter's `FloatParameter` slot) or a texture's
/// `*Size` companion uniform.
#[derive(Debug, Clone)]
pub enum UniformSemantic {
    Variable(VariableSemantics),
    Texture(SemanticMap<TextureSemantics>),
}

/// The name -> semantic maps built once per preset load from pass aliases,
/// LUT names and declared parameters (spec §4.D rule 2).
#[derive(Debug, Clone, Default)]
pub struct ReflectSemantics {
    pub uniform_semantics: FxHashMap<String, UniformSemantic>,
    pub texture_semantics: FxHashMap<String, SemanticMap<TextureSemantics>>,
    /// Indices of passes declared `is_feedback` in the preset; a
    /// `PassFeedbackK` reference is only valid when `K` is in this set.
    pub feedback_passes: std::collections::HashSet<usize>,
}

/// Byte offset of a resolved uniform within either the UBO or the push
/// constant block (spec §3 `PassReflection`).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MemberOffset {
    Ubo(usize),
    PushConstant(usize),
}

impl MemberOffset {
    pub fn offset(self) -> usize {
        match self {
            MemberOffset::Ubo(o) | MemberOffset::PushConstant(o) => o,
        }
    }
}

/// The key under which a runtime looks up "what fills this slot": either a
/// named user parameter, a fixed scalar semantic, or a texture's size
/// companion uniform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UniformBinding {
    Parameter(String),
    SemanticVariable(VariableSemantics),
    TextureSize(SemanticMap<TextureSemantics>),
}

/// Register a pass's `alias` (and, if it is a feedback pass, its implicit
/// feedback slot) into the semantic maps. Mirrors the real loader's
/// `insert_pass_semantics`: every alias gets a `PassOutputK`/`PassFeedbackK`
/// texture semantic plus an `AliasSize`/`*Size` uniform semantic.
pub fn insert_pass_semantics(semantics: &mut ReflectSemantics, pass: &ShaderPassConfig) {
    let output = SemanticMap {
        semantics: TextureSemantics::PassOutput,
        index: pass.id,
    };

    if let Some(alias) = &pass.alias {
        semantics.texture_semantics.insert(alias.clone(), output);
        semantics.uniform_semantics.insert(
            format!("{alias}Size"),
            UniformSemantic::Texture(output),
        );
    }

    if pass.is_feedback {
        semantics.feedback_passes.insert(pass.id);
        let feedback = SemanticMap {
            semantics: TextureSemantics::PassFeedback,
            index: pass.id,
        };
        if let Some(alias) = &pass.alias {
            semantics
                .texture_semantics
                .insert(format!("{alias}Feedback"), feedback);
            semantics.uniform_semantics.insert(
                format!("{alias}FeedbackSize"),
                UniformSemantic::Texture(feedback),
            );
        }
    }
}

/// Register every preset-declared LUT as a `User` texture semantic, keyed by
/// its preset name.
pub fn insert_lut_semantics(semantics: &mut ReflectSemantics, textures: &[TextureConfig]) {
    for (index, texture) in textures.iter().enumerate() {
        let map = SemanticMap {
            semantics: TextureSemantics::User,
            index,
        };
        semantics.texture_semantics.insert(texture.name.clone(), map);
        semantics
            .uniform_semantics
            .insert(format!("{}Size", texture.name), UniformSemantic::Texture(map));
    }
}

/// Register a preset-declared parameter's `FloatParameter` slot so its name
/// resolves like any other uniform.
pub fn insert_parameter_semantic(semantics: &mut ReflectSemantics, name: &str) {
    semantics
        .uniform_semantics
        .entry(name.to_string())
        .or_insert(UniformSemantic::Variable(VariableSemantics::FloatParameter));
}

/// Split a trailing run of ASCII digits off `s`, returning `(prefix, index)`.
/// Returns `None` if `s` has no trailing digits.
fn split_trailing_index(s: &str) -> Option<(&str, usize)> {
    let digit_start = s.find(|c: char| c.is_ascii_digit())?;
    // Require the digits to run to the end, so "History2Foo" doesn't match.
    if !s[digit_start..].bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index: usize = s[digit_start..].parse().ok()?;
    Some((&s[..digit_start], index))
}

/// Resolve a texture sampler's declared name to a semantic, given the pass
/// it appears in (spec §4.D). `PassOutputK`/`PassFeedbackK` references are
/// bounds-checked against `pass_index` here because the semantic maps alone
/// don't carry that information.
pub fn resolve_texture_semantic(
    name: &str,
    semantics: &ReflectSemantics,
    pass_index: usize,
) -> Result<SemanticMap<TextureSemantics>, ReflectError> {
    match name {
        "Original" => {
            return Ok(SemanticMap {
                semantics: TextureSemantics::Original,
                index: 0,
            })
        }
        "Source" => {
            return Ok(SemanticMap {
                semantics: TextureSemantics::Source,
                index: 0,
            })
        }
        _ => {}
    }

    if let Some(rest) = name.strip_prefix("OriginalHistory") {
        if let Ok(index) = rest.parse::<usize>() {
            return Ok(SemanticMap {
                semantics: TextureSemantics::OriginalHistory,
                index,
            });
        }
    }

    if let Some(rest) = name.strip_prefix("PassOutput") {
        if let Ok(index) = rest.parse::<usize>() {
            if index >= pass_index {
                return Err(ReflectError::ForwardPassReference {
                    pass_index,
                    referenced: index,
                });
            }
            return Ok(SemanticMap {
                semantics: TextureSemantics::PassOutput,
                index,
            });
        }
    }

    if let Some(rest) = name.strip_prefix("PassFeedback") {
        if let Ok(index) = rest.parse::<usize>() {
            if index > pass_index || !semantics.feedback_passes.contains(&index) {
                return Err(ReflectError::InvalidFeedbackReference {
                    pass_index,
                    referenced: index,
                });
            }
            return Ok(SemanticMap {
                semantics: TextureSemantics::PassFeedback,
                index,
            });
        }
    }

    semantics
        .texture_semantics
        .get(name)
        .copied()
        .ok_or_else(|| ReflectError::UnknownTextureSemantic(name.to_string()))
}

/// Resolve a uniform's declared name to a binding (spec §4.D). Handles the
/// fixed scalar semantics, the `*Size` companions of every texture family
/// (including the deliberate `OriginalSizeK` naming for history textures,
/// rather than `OriginalHistorySizeK`), and falls back to the preset's
/// declared parameters and LUTs.
pub fn resolve_uniform_name(
    name: &str,
    semantics: &ReflectSemantics,
    pass_index: usize,
) -> Result<UniformBinding, ReflectError> {
    match name {
        "MVP" => return Ok(UniformBinding::SemanticVariable(VariableSemantics::Mvp)),
        "OutputSize" => return Ok(UniformBinding::SemanticVariable(VariableSemantics::Output)),
        "FinalViewportSize" => {
            return Ok(UniformBinding::SemanticVariable(
                VariableSemantics::FinalViewport,
            ))
        }
        "FrameCount" => {
            return Ok(UniformBinding::SemanticVariable(
                VariableSemantics::FrameCount,
            ))
        }
        "FrameDirection" => {
            return Ok(UniformBinding::SemanticVariable(
                VariableSemantics::FrameDirection,
            ))
        }
        "OriginalSize" => {
            return Ok(UniformBinding::TextureSize(SemanticMap {
                semantics: TextureSemantics::Original,
                index: 0,
            }))
        }
        "SourceSize" => {
            return Ok(UniformBinding::TextureSize(SemanticMap {
                semantics: TextureSemantics::Source,
                index: 0,
            }))
        }
        _ => {}
    }

    if let Some((prefix, index)) = split_trailing_index(name) {
        let family = match prefix {
            "OriginalSize" => Some(TextureSemantics::OriginalHistory),
            "PassOutputSize" => Some(TextureSemantics::PassOutput),
            "PassFeedbackSize" => Some(TextureSemantics::PassFeedback),
            _ => None,
        };
        if let Some(semantics_kind) = family {
            if semantics_kind == TextureSemantics::PassOutput && index >= pass_index {
                return Err(ReflectError::ForwardPassReference {
                    pass_index,
                    referenced: index,
                });
            }
            if semantics_kind == TextureSemantics::PassFeedback
                && (index > pass_index || !semantics.feedback_passes.contains(&index))
            {
                return Err(ReflectError::InvalidFeedbackReference {
                    pass_index,
                    referenced: index,
                });
            }
            return Ok(UniformBinding::TextureSize(SemanticMap {
                semantics: semantics_kind,
                index,
            }));
        }
    }

    match semantics.uniform_semantics.get(name) {
        Some(UniformSemantic::Variable(VariableSemantics::FloatParameter)) => {
            Ok(UniformBinding::Parameter(name.to_string()))
        }
        Some(UniformSemantic::Variable(other)) => Ok(UniformBinding::SemanticVariable(*other)),
        Some(UniformSemantic::Texture(map)) => Ok(UniformBinding::TextureSize(*map)),
        None => Err(ReflectError::UnknownUniformSemantic(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slangfx_common::{FilterMode, WrapMode};
    use std::path::PathBuf;

    fn pass(id: usize, alias: Option<&str>, is_feedback: bool) -> ShaderPassConfig {
        ShaderPassConfig {
            id,
            name: PathBuf::from(format!("pass{id}.slang")),
            alias: alias.map(str::to_string),
            filter: FilterMode::Unspecified,
            wrap_mode: WrapMode::ClampToBorder,
            frame_count_mod: 0,
            scaling: Default::default(),
            is_mipmap: false,
            is_float_framebuffer: false,
            is_srgb_framebuffer: false,
            is_feedback,
        }
    }

    #[test]
    fn resolves_fixed_names() {
        let semantics = ReflectSemantics::default();
        assert_eq!(
            resolve_uniform_name("MVP", &semantics, 0).unwrap(),
            UniformBinding::SemanticVariable(VariableSemantics::Mvp)
        );
        assert_eq!(
            resolve_texture_semantic("Source", &semantics, 0).unwrap(),
            SemanticMap {
                semantics: TextureSemantics::Source,
                index: 0
            }
        );
    }

    #[test]
    fn resolves_history_by_oddly_named_size_uniform() {
        let semantics = ReflectSemantics::default();
        let binding = resolve_uniform_name("OriginalSize3", &semantics, 4).unwrap();
        assert_eq!(
            binding,
            UniformBinding::TextureSize(SemanticMap {
                semantics: TextureSemantics::OriginalHistory,
                index: 3
            })
        );
    }

    #[test]
    fn rejects_forward_pass_reference() {
        let semantics = ReflectSemantics::default();
        let err = resolve_texture_semantic("PassOutput2", &semantics, 2).unwrap_err();
        assert!(matches!(err, ReflectError::ForwardPassReference { .. }));
    }

    #[test]
    fn feedback_reference_requires_declared_feedback_pass() {
        let mut semantics = ReflectSemantics::default();
        insert_pass_semantics(&mut semantics, &pass(0, Some("Pass0"), true));
        insert_pass_semantics(&mut semantics, &pass(1, Some("Pass1"), false));

        assert!(resolve_texture_semantic("PassFeedback0", &semantics, 1).is_ok());
        let err = resolve_texture_semantic("PassFeedback1", &semantics, 1).unwrap_err();
        assert!(matches!(err, ReflectError::InvalidFeedbackReference { .. }));
    }

    #[test]
    fn alias_resolves_to_pass_output_and_its_size() {
        let mut semantics = ReflectSemantics::default();
        insert_pass_semantics(&mut semantics, &pass(0, Some("Warp"), false));

        assert_eq!(
            resolve_texture_semantic("Warp", &semantics, 1).unwrap(),
            SemanticMap {
                semantics: TextureSemantics::PassOutput,
                index: 0
            }
        );
        assert_eq!(
            resolve_uniform_name("WarpSize", &semantics, 1).unwrap(),
            UniformBinding::TextureSize(SemanticMap {
                semantics: TextureSemantics::PassOutput,
                index: 0
            })
        );
    }

    #[test]
    fn unknown_names_are_rejected() {
        let semantics = ReflectSemantics::default();
        assert!(matches!(
            resolve_uniform_name("Nonsense", &semantics, 0),
            Err(ReflectError::UnknownUniformSemantic(_))
        ));
        assert!(matches!(
            resolve_texture_semantic("Nonsense", &semantics, 0),
            Err(ReflectError::UnknownTextureSemantic(_))
        ));
    }
}
