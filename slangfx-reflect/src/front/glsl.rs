//! The one shipped [`crate::ir::ShaderIr`] frontend: a hand-written scanner
//! over preprocessed GLSL source text (spec §4.C). It recognizes exactly the
//! declaration shapes a `.slang` pass uses:
//!
//! ```glsl
//! layout(std140, set = 0, binding = 0) uniform UBO { ... } global;
//! layout(push_constant) uniform PushConstants { ... } params;
//! layout(set = 0, binding = 1) uniform sampler2D Source;
//! ```
//!
//! It does not implement general GLSL parsing (expressions, control flow,
//! macros beyond plain substitution are out of scope); a real target
//! compiler would reflect off compiled SPIR-V instead.

use crate::error::ReflectError;
use crate::ir::{align_up, member_align_and_size, BlockKind, SamplerDecl, ShaderIr, UniformBlock, UniformMember};

/// Scan `source` for uniform block and sampler declarations.
pub fn scan(source: &str) -> Result<ShaderIr, ReflectError> {
    let mut ir = ShaderIr::default();
    let mut pos = 0usize;
    while let Some(rest) = source.get(pos..) {
        if rest.is_empty() {
            break;
        }
        if let Some(layout_start) = rest.find("layout(") {
            let abs_layout = pos + layout_start;
            let close = source[abs_layout..]
                .find(')')
                .map(|i| abs_layout + i)
                .ok_or_else(|| {
                    ReflectError::MalformedBlock("layout".into(), "unterminated layout(...)".into())
                })?;
            let layout_args = &source[abs_layout + "layout(".len()..close];

            let after_layout = &source[close + 1..];
            let trimmed = after_layout.trim_start();
            if let Some(uniform_rest) = trimmed.strip_prefix("uniform") {
                let uniform_rest = uniform_rest.trim_start();
                if let Some(brace) = uniform_rest.find('{') {
                    let name_part = uniform_rest[..brace].trim();
                    let block_end = uniform_rest.find('}').ok_or_else(|| {
                        ReflectError::MalformedBlock(name_part.to_string(), "unterminated block".into())
                    })?;
                    let body = &uniform_rest[brace + 1..block_end];
                    let kind = if layout_args.contains("push_constant") {
                        BlockKind::PushConstant
                    } else {
                        BlockKind::Ubo
                    };
                    let binding = parse_binding(layout_args).unwrap_or(0);
                    let block = scan_block(kind, binding, body);
                    ir.blocks.push(block);

                    let consumed = brace + block_end + 1;
                    pos = (uniform_rest.as_ptr() as usize - source.as_ptr() as usize) + consumed;
                    continue;
                } else if let Some(sampler_name) = parse_sampler_decl(uniform_rest) {
                    ir.samplers.push(SamplerDecl {
                        name: sampler_name.to_string(),
                        binding: parse_binding(layout_args).unwrap_or(0),
                    });
                    pos = abs_layout + "layout(".len();
                    continue;
                }
            }
            pos = abs_layout + "layout(".len();
            continue;
        }
        break;
    }

    Ok(ir)
}

fn parse_binding(layout_args: &str) -> Option<u32> {
    for part in layout_args.split(',') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix("binding") {
            let value = value.trim_start().strip_prefix('=')?.trim();
            return value.parse().ok();
        }
    }
    None
}

fn parse_sampler_decl(rest: &str) -> Option<&str> {
    let rest = rest.trim_start().strip_prefix("sampler2D")?;
    let rest = rest.trim_start();
    let end = rest.find(|c: char| c == ';' || c.is_whitespace())?;
    Some(&rest[..end])
}

/// Scan a uniform block's member list (`TYPE name;` lines), computing
/// std140-like offsets in declaration order.
fn scan_block(kind: BlockKind, binding: u32, body: &str) -> UniformBlock {
    let mut members = Vec::new();
    let mut offset = 0u32;

    for decl in body.split(';') {
        let decl = decl.trim();
        if decl.is_empty() {
            continue;
        }
        let mut tokens = decl.split_whitespace();
        let ty = match tokens.next() {
            Some(t) => t,
            None => continue,
        };
        let name = match tokens.next() {
            Some(n) => n.trim_end_matches(|c: char| c == '[' || c == ']'),
            None => continue,
        };
        let components = glsl_type_components(ty);
        let (align, size) = member_align_and_size(components);
        offset = align_up(offset, align);
        members.push(UniformMember {
            name: name.to_string(),
            components,
            offset,
        });
        offset += size;
    }

    UniformBlock {
        kind,
        binding,
        size: offset,
        members,
    }
}

fn glsl_type_components(ty: &str) -> u32 {
    match ty {
        "float" | "int" | "uint" | "bool" => 1,
        "vec2" | "ivec2" => 2,
        "vec3" | "ivec3" => 3,
        "vec4" | "ivec4" => 4,
        "mat4" => 16,
        _ => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_ubo_and_push_constant_and_sampler() {
        let source = "\
            layout(std140, set = 0, binding = 0) uniform UBO { mat4 MVP; vec4 OutputSize; } global;\n\
            layout(push_constant) uniform Push { float Brightness; } params;\n\
            layout(set = 0, binding = 1) uniform sampler2D Source;\n";
        let ir = scan(source).unwrap();
        let ubo = ir.ubo().unwrap();
        assert_eq!(ubo.members[0].name, "MVP");
        assert_eq!(ubo.members[0].offset, 0);
        assert_eq!(ubo.members[1].name, "OutputSize");
        assert_eq!(ubo.members[1].offset, 64);

        let push = ir.push_constant().unwrap();
        assert_eq!(push.members[0].name, "Brightness");

        assert_eq!(ir.samplers.len(), 1);
        assert_eq!(ir.samplers[0].name, "Source");
        assert_eq!(ir.samplers[0].binding, 1);
    }
}
