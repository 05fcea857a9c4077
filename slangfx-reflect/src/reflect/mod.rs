//! The reflection engine (spec §4.D): given a pass's two compiled
//! [`ShaderIr`]s and the preset-derived [`ReflectSemantics`], resolve every
//! declared uniform and sampler to a semantic, unify their layout across
//! stages, and produce the [`ShaderReflection`] a runtime binds against.

use std::collections::HashMap;

use rustc_hash::FxHashMap;

use crate::error::ReflectError;
use crate::ir::{BlockKind, ShaderIr};
use crate::semantics::{
    resolve_texture_semantic, resolve_uniform_name, BindingStage, MemberOffset, ReflectSemantics,
    SemanticMap, TextureSemantics, UniformBinding, VariableSemantics,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableMeta {
    pub offset: MemberOffset,
    pub size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureMeta {
    pub binding: u32,
    pub stage_mask: BindingStage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSizeMeta {
    pub offset: MemberOffset,
}

#[derive(Debug, Clone, Default)]
pub struct ReflectMeta {
    pub parameter_meta: FxHashMap<String, VariableMeta>,
    pub variable_meta: FxHashMap<VariableSemantics, VariableMeta>,
    pub texture_meta: FxHashMap<SemanticMap<TextureSemantics>, TextureMeta>,
    pub texture_size_meta: FxHashMap<SemanticMap<TextureSemantics>, TextureSizeMeta>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UboReflection {
    pub binding: u32,
    pub size: u32,
    pub stage_mask: BindingStage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushReflection {
    pub size: u32,
    pub stage_mask: BindingStage,
}

#[derive(Debug, Clone, Default)]
pub struct ShaderReflection {
    pub ubo: Option<UboReflection>,
    pub push_constant: Option<PushReflection>,
    pub meta: ReflectMeta,
}

struct ResolvedMember {
    binding: UniformBinding,
    offset: MemberOffset,
    size: u32,
    stage_mask: BindingStage,
}

/// Walk one stage's uniform block, resolving and merging its members into
/// `merged`, keyed by declared name. A name seen in both stages must resolve
/// to the same offset and size, or the layouts have diverged and reflection
/// fails (spec §4.D "unify across stages").
fn merge_block(
    merged: &mut HashMap<String, ResolvedMember>,
    block: &crate::ir::UniformBlock,
    stage: BindingStage,
    semantics: &ReflectSemantics,
    pass_index: usize,
) -> Result<(), ReflectError> {
    let offset_kind = match block.kind {
        BlockKind::Ubo => MemberOffset::Ubo,
        BlockKind::PushConstant => MemberOffset::PushConstant,
    };

    for member in &block.members {
        let binding = resolve_uniform_name(&member.name, semantics, pass_index)?;
        let (_, size) = crate::ir::member_align_and_size(member.components);
        let offset = offset_kind(member.offset as usize);

        match merged.get_mut(&member.name) {
            Some(existing) => {
                if existing.offset != offset || existing.size != size {
                    return Err(ReflectError::LinkError {
                        name: member.name.clone(),
                    });
                }
                existing.stage_mask |= stage;
            }
            None => {
                merged.insert(
                    member.name.clone(),
                    ResolvedMember {
                        binding,
                        offset,
                        size,
                        stage_mask: stage,
                    },
                );
            }
        }
    }
    Ok(())
}

/// Reflect a single pass's vertex and fragment IR into a [`ShaderReflection`]
/// (spec §4.D). `pass_index` bounds-checks `PassOutputK`/`PassFeedbackK`
/// texture references.
pub fn reflect(
    pass_index: usize,
    vertex: &ShaderIr,
    fragment: &ShaderIr,
    semantics: &ReflectSemantics,
) -> Result<ShaderReflection, ReflectError> {
    let mut merged: HashMap<String, ResolvedMember> = HashMap::new();

    if let Some(block) = vertex.ubo() {
        merge_block(&mut merged, block, BindingStage::VERTEX, semantics, pass_index)?;
    }
    if let Some(block) = fragment.ubo() {
        merge_block(&mut merged, block, BindingStage::FRAGMENT, semantics, pass_index)?;
    }
    if let Some(block) = vertex.push_constant() {
        merge_block(&mut merged, block, BindingStage::VERTEX, semantics, pass_index)?;
    }
    if let Some(block) = fragment.push_constant() {
        merge_block(&mut merged, block, BindingStage::FRAGMENT, semantics, pass_index)?;
    }

    let mut meta = ReflectMeta::default();
    for resolved in merged.values() {
        let var_meta = VariableMeta {
            offset: resolved.offset,
            size: resolved.size,
        };
        match &resolved.binding {
            UniformBinding::Parameter(name) => {
                meta.parameter_meta.insert(name.clone(), var_meta);
            }
            UniformBinding::SemanticVariable(semantic) => {
                meta.variable_meta.insert(*semantic, var_meta);
            }
            UniformBinding::TextureSize(map) => {
                meta.texture_size_meta
                    .insert(*map, TextureSizeMeta { offset: resolved.offset });
            }
        }
    }

    let ubo = unify_block(vertex.ubo(), fragment.ubo())?.map(|(binding, size, mask)| UboReflection {
        binding,
        size,
        stage_mask: mask,
    });
    let push_constant =
        unify_block(vertex.push_constant(), fragment.push_constant())?.map(|(_, size, mask)| PushReflection {
            size,
            stage_mask: mask,
        });

    for (stage, ir) in [(BindingStage::VERTEX, vertex), (BindingStage::FRAGMENT, fragment)] {
        for sampler in &ir.samplers {
            let map = resolve_texture_semantic(&sampler.name, semantics, pass_index)?;
            meta.texture_meta
                .entry(map)
                .and_modify(|existing| existing.stage_mask |= stage)
                .or_insert(TextureMeta {
                    binding: sampler.binding,
                    stage_mask: stage,
                });
        }
    }

    Ok(ShaderReflection {
        ubo,
        push_constant,
        meta,
    })
}

fn unify_block(
    vertex: Option<&crate::ir::UniformBlock>,
    fragment: Option<&crate::ir::UniformBlock>,
) -> Result<Option<(u32, u32, BindingStage)>, ReflectError> {
    match (vertex, fragment) {
        (None, None) => Ok(None),
        (Some(b), None) => Ok(Some((b.binding, b.size, BindingStage::VERTEX))),
        (None, Some(b)) => Ok(Some((b.binding, b.size, BindingStage::FRAGMENT))),
        (Some(v), Some(f)) => {
            if v.binding != f.binding {
                return Err(ReflectError::LinkError {
                    name: "<block binding>".to_string(),
                });
            }
            let size = v.size.max(f.size);
            Ok(Some((v.binding, size, BindingStage::VERTEX | BindingStage::FRAGMENT)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::front::glsl;
    use crate::semantics::insert_pass_semantics;
    use slangfx_common::{FilterMode, WrapMode};
    use slangfx_presets::ShaderPassConfig;
    use std::path::PathBuf;

    fn pass(id: usize) -> ShaderPassConfig {
        ShaderPassConfig {
            id,
            name: PathBuf::from(format!("p{id}.slang")),
            alias: None,
            filter: FilterMode::Unspecified,
            wrap_mode: WrapMode::ClampToBorder,
            frame_count_mod: 0,
            scaling: Default::default(),
            is_mipmap: false,
            is_float_framebuffer: false,
            is_srgb_framebuffer: false,
            is_feedback: false,
        }
    }

    #[test]
    fn reflects_matching_ubo_across_stages() {
        let mut semantics = ReflectSemantics::default();
        insert_pass_semantics(&mut semantics, &pass(0));

        let vertex = glsl::scan(
            "layout(std140, binding = 0) uniform UBO { mat4 MVP; vec2 OutputSize; } global;\n",
        )
        .unwrap();
        let fragment = glsl::scan(
            "layout(std140, binding = 0) uniform UBO { mat4 MVP; vec2 OutputSize; } global;\n\
             layout(binding = 1) uniform sampler2D Source;\n",
        )
        .unwrap();

        let reflection = reflect(0, &vertex, &fragment, &semantics).unwrap();
        let ubo = reflection.ubo.unwrap();
        assert_eq!(ubo.binding, 0);
        assert!(ubo.stage_mask.contains(BindingStage::VERTEX | BindingStage::FRAGMENT));
        assert!(reflection.meta.variable_meta.contains_key(&VariableSemantics::Mvp));
        assert!(reflection
            .meta
            .variable_meta
            .contains_key(&VariableSemantics::Output));

        let source_map = SemanticMap {
            semantics: TextureSemantics::Source,
            index: 0,
        };
        assert!(reflection.meta.texture_meta.contains_key(&source_map));
    }

    #[test]
    fn diverging_offsets_across_stages_is_a_link_error() {
        let semantics = ReflectSemantics::default();
        let vertex = glsl::scan("layout(binding = 0) uniform UBO { mat4 MVP; } g;\n").unwrap();
        let fragment =
            glsl::scan("layout(binding = 0) uniform UBO { vec4 Filler; mat4 MVP; } g;\n").unwrap();

        let err = reflect(0, &vertex, &fragment, &semantics).unwrap_err();
        assert!(matches!(err, ReflectError::LinkError { .. }));
    }

    #[test]
    fn parameter_uniforms_land_in_parameter_meta() {
        let mut semantics = ReflectSemantics::default();
        crate::semantics::insert_parameter_semantic(&mut semantics, "Brightness");

        let fragment =
            glsl::scan("layout(push_constant) uniform Push { float Brightness; } p;\n").unwrap();
        let vertex = ShaderIr::default();

        let reflection = reflect(0, &vertex, &fragment, &semantics).unwrap();
        assert!(reflection.meta.parameter_meta.contains_key("Brightness"));
        assert!(reflection.push_constant.is_some());
    }
}
