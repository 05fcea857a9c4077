//! Integration tests for `FilterChain` exercised against the in-memory CPU
//! backend. These live here (rather than as unit tests in `chain.rs`)
//! because `slangfx-runtime-cpu` depends on `slangfx-runtime`; pulling it in
//! as a dev-dependency of `slangfx-runtime` itself would make cargo build
//! two distinct copies of `slangfx-runtime` (one under test, one as the
//! cpu backend's normal dependency), which breaks trait-bound resolution
//! between them.
use std::path::Path;

use slangfx_common::{ImageFormat, Size};
use slangfx_runtime::luts::NullLutLoader;
use slangfx_runtime::{FilterChain, RenderBackend};
use slangfx_runtime_cpu::CpuBackend;
use std::fs;

fn scratch_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("slangfx-runtime-chain-test-{tag}-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn new_chain() -> FilterChain<CpuBackend> {
    FilterChain::new(CpuBackend::new(), Box::new(NullLutLoader))
}

fn solid_pixels(size: Size<u32>, color: [u8; 4]) -> Vec<u8> {
    let mut pixels = vec![0u8; size.width as usize * size.height as usize * 4];
    for px in pixels.chunks_exact_mut(4) {
        px.copy_from_slice(&color);
    }
    pixels
}

const IDENTITY_PASS: &str = "\
    #version 450\n\
    #pragma name Identity\n\
    layout(set = 0, binding = 0) uniform sampler2D Source;\n\
    layout(location = 0) out vec4 FragColor;\n\
    #pragma stage vertex\n\
    void vmain() {}\n\
    #pragma stage fragment\n\
    void main() { FragColor = texture(Source, vec2(0.0)); }\n";

#[test]
fn identity_pass_reproduces_source_pixels() {
    let dir = scratch_dir("identity");
    write(&dir, "pass0.slang", IDENTITY_PASS);
    let preset = write(&dir, "identity.slangp", "shaders = 1\nshader0 = pass0.slang\n");

    let mut chain = new_chain();
    chain.set_shader(&preset, None).unwrap();

    let size = Size::new(2, 2);
    chain.set_source_rect(size).unwrap();
    chain.set_drawable_size(size).unwrap();

    let color = [10u8, 20, 30, 255];
    let source = chain.backend_mut().create_texture(size, ImageFormat::R8G8B8A8Unorm).unwrap();
    chain.backend_mut().write_texture(source, &solid_pixels(size, color)).unwrap();
    chain.set_source_texture(source);

    let target = chain.backend_mut().create_texture(size, ImageFormat::R8G8B8A8Unorm).unwrap();
    chain.render(target, None).unwrap();

    let out = chain.backend_mut().read_texture(target).unwrap();
    for px in out.chunks_exact(4) {
        assert_eq!(px, color);
    }
}

#[test]
fn failed_reload_preserves_previously_loaded_shader() {
    let dir = scratch_dir("reload");
    write(&dir, "pass0.slang", IDENTITY_PASS);
    let good = write(&dir, "good.slangp", "shaders = 1\nshader0 = pass0.slang\n");

    let mut chain = new_chain();
    chain.set_shader(&good, None).unwrap();

    let missing = dir.join("missing.slangp");
    assert!(chain.set_shader(&missing, None).is_err());

    let size = Size::new(1, 1);
    chain.set_source_rect(size).unwrap();
    chain.set_drawable_size(size).unwrap();
    let color = [9u8, 9, 9, 255];
    let source = chain.backend_mut().create_texture(size, ImageFormat::R8G8B8A8Unorm).unwrap();
    chain.backend_mut().write_texture(source, &color).unwrap();
    chain.set_source_texture(source);
    let target = chain.backend_mut().create_texture(size, ImageFormat::R8G8B8A8Unorm).unwrap();
    chain.render(target, None).unwrap();

    let out = chain.backend_mut().read_texture(target).unwrap();
    assert_eq!(out, color);
}

/// Blends the current frame against `OriginalHistory1` (the frame before
/// last) with a parameter-controlled factor, proving the history ring
/// keeps the previous Original separate from the current one rather than
/// aliasing the same texture.
const HISTORY_BLEND_PASS: &str = "\
    #version 450\n\
    #pragma name HistoryBlend\n\
    #pragma parameter Mix \"Mix Factor\" 0.5 0.0 1.0 0.1\n\
    layout(std140, binding = 0) uniform UBO { float Mix; } global;\n\
    layout(set = 0, binding = 1) uniform sampler2D Source;\n\
    layout(set = 0, binding = 2) uniform sampler2D OriginalHistory1;\n\
    layout(location = 0) out vec4 FragColor;\n\
    #pragma stage vertex\n\
    void vmain() {}\n\
    #pragma stage fragment\n\
    void main() {\n\
        FragColor = mix(texture(Source, vec2(0.0)), texture(OriginalHistory1, vec2(0.0)), Mix);\n\
    }\n";

#[test]
fn history_ring_keeps_previous_frame_distinct_from_current() {
    let dir = scratch_dir("history");
    write(&dir, "pass0.slang", HISTORY_BLEND_PASS);
    let preset = write(&dir, "history.slangp", "shaders = 1\nshader0 = pass0.slang\n");

    let mut chain = new_chain();
    chain.set_shader(&preset, None).unwrap();
    assert!(chain.set_parameter("Mix", 1.0));

    let size = Size::new(1, 1);
    chain.set_source_rect(size).unwrap();
    chain.set_drawable_size(size).unwrap();
    let source = chain.backend_mut().create_texture(size, ImageFormat::R8G8B8A8Unorm).unwrap();
    chain.set_source_texture(source);

    let color_a = [100u8, 100, 100, 255];
    let color_b = [50u8, 60, 70, 255];

    // Frame 1: OriginalHistory1 has never been written, so it reads as
    // the backend's zero-initialized default.
    chain.backend_mut().write_texture(source, &color_a).unwrap();
    let target1 = chain.backend_mut().create_texture(size, ImageFormat::R8G8B8A8Unorm).unwrap();
    chain.render(target1, None).unwrap();
    assert_eq!(chain.backend_mut().read_texture(target1).unwrap(), vec![0, 0, 0, 0]);

    // Frame 2: OriginalHistory1 now holds frame 1's Original (color_a),
    // distinct from this frame's Source (color_b).
    chain.backend_mut().write_texture(source, &color_b).unwrap();
    let target2 = chain.backend_mut().create_texture(size, ImageFormat::R8G8B8A8Unorm).unwrap();
    chain.render(target2, None).unwrap();
    assert_eq!(chain.backend_mut().read_texture(target2).unwrap(), color_a);
}

const FEEDBACK_ACCUM_PASS: &str = "\
    #version 450\n\
    #pragma name Accumulate\n\
    layout(set = 0, binding = 0) uniform sampler2D Source;\n\
    layout(set = 0, binding = 1) uniform sampler2D PassFeedback0;\n\
    layout(location = 0) out vec4 FragColor;\n\
    #pragma stage vertex\n\
    void vmain() {}\n\
    #pragma stage fragment\n\
    void main() {\n\
        FragColor = texture(Source, vec2(0.0)) * 0.5 + texture(PassFeedback0, vec2(0.0)) * 0.5;\n\
    }\n";

const COPY_PASS: &str = "\
    #version 450\n\
    #pragma name Copy\n\
    layout(set = 0, binding = 0) uniform sampler2D Source;\n\
    layout(location = 0) out vec4 FragColor;\n\
    #pragma stage vertex\n\
    void vmain() {}\n\
    #pragma stage fragment\n\
    void main() { FragColor = texture(Source, vec2(0.0)); }\n";

#[test]
fn feedback_accumulator_converges_toward_steady_state() {
    let dir = scratch_dir("feedback");
    write(&dir, "pass0.slang", FEEDBACK_ACCUM_PASS);
    write(&dir, "pass1.slang", COPY_PASS);
    let preset = write(
        &dir,
        "feedback.slangp",
        "shaders = 2\nshader0 = pass0.slang\nshader1 = pass1.slang\nfeedback_pass0 = true\n",
    );

    let mut chain = new_chain();
    chain.set_shader(&preset, None).unwrap();

    let size = Size::new(1, 1);
    chain.set_source_rect(size).unwrap();
    chain.set_drawable_size(size).unwrap();
    let color = [200u8, 200, 200, 255];
    let source = chain.backend_mut().create_texture(size, ImageFormat::R8G8B8A8Unorm).unwrap();
    chain.backend_mut().write_texture(source, &color).unwrap();
    chain.set_source_texture(source);

    // value_n = 0.5*source + 0.5*value_{n-1}, value_0 = 0: 100, 150, 175, 188 (round-half-away-from-zero).
    let expected_red = [100u8, 150, 175, 188];
    for &expected in &expected_red {
        let target = chain.backend_mut().create_texture(size, ImageFormat::R8G8B8A8Unorm).unwrap();
        chain.render(target, None).unwrap();
        let pixels = chain.backend_mut().read_texture(target).unwrap();
        assert_eq!(pixels[0], expected);
    }
}
