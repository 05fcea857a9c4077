//! Shader reflection and semantic binding resolution (spec §4.C/§4.D).
//!
//! A preset's passes are preprocessed GLSL source plus a handful of
//! conventional uniform/sampler names (`MVP`, `Source`, `PassOutput2`, a
//! declared parameter's own name, ...). This crate turns those names into
//! concrete binding offsets a runtime can fill every frame without doing any
//! string matching on the hot path (spec §9).

pub mod back;
pub mod error;
pub mod front;
pub mod ir;
pub mod reflect;
pub mod semantics;

pub use back::{CompiledPass, PassthroughCompiler, TargetCompiler};
pub use error::ReflectError;
pub use ir::{BlockKind, SamplerDecl, ShaderIr, UniformBlock, UniformMember};
pub use reflect::{
    reflect, PushReflection, ReflectMeta, ShaderReflection, TextureMeta, TextureSizeMeta, UboReflection,
    VariableMeta,
};
pub use semantics::{
    insert_lut_semantics, insert_parameter_semantic, insert_pass_semantics, resolve_texture_semantic,
    resolve_uniform_name, BindingStage, MemberOffset, ReflectSemantics, SemanticMap, TextureSemantics,
    UniformBinding, UniformSemantic, VariableSemantics,
};
