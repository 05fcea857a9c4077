//! The filter chain (spec §4.F): owns the pass sequence, the texture graph,
//! and per-frame execution.

use std::path::Path;

use rustc_hash::FxHashMap;

use slangfx_common::{FilterMode, FrameDirection, Image, ImageFormat, Size};
use slangfx_presets::{ShaderPassConfig, ShaderPreset};
use slangfx_preprocess::ShaderSource;
use slangfx_reflect::{
    self as reflect, front::glsl, insert_lut_semantics, insert_parameter_semantic, insert_pass_semantics,
    MemberOffset, PassthroughCompiler, ReflectSemantics, SemanticMap, TargetCompiler, TextureSemantics,
    VariableSemantics,
};

use crate::arena::{TextureArena, TextureSlot};
use crate::backend::{BoundTexture, DrawCall, RenderBackend};
use crate::error::{FilterChainError, Result};
use crate::history::HistoryRing;
use crate::luts::LutLoader;
use crate::options::{FilterChainOptions, FrameOptions};
use crate::parameters::{RuntimeParameter, RuntimeParameters};
use crate::pass::PassState;
use crate::scale::compute_pass_size;

const IDENTITY_MVP: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

struct LutState {
    slot: TextureSlot,
    size: Size<u32>,
    filter: FilterMode,
    wrap_mode: slangfx_common::WrapMode,
}

pub struct FilterChain<B: RenderBackend> {
    backend: B,
    lut_loader: Box<dyn LutLoader>,
    arena: TextureArena<B::TextureHandle>,
    passes: Vec<PassState>,
    history: Option<HistoryRing<B::TextureHandle>>,
    luts: Vec<LutState>,
    parameters: RuntimeParameters,
    source_texture: Option<B::TextureHandle>,
    source_size: Size<u32>,
    drawable_size: Size<u32>,
    frame_count: u64,
    frame_direction: FrameDirection,
    default_filter: FilterMode,
    default_wrap_mode: slangfx_common::WrapMode,
    last_output: Option<B::TextureHandle>,
}

impl<B: RenderBackend> FilterChain<B> {
    pub fn new(backend: B, lut_loader: Box<dyn LutLoader>) -> Self {
        FilterChain {
            backend,
            lut_loader,
            arena: TextureArena::new(),
            passes: Vec::new(),
            history: None,
            luts: Vec::new(),
            parameters: RuntimeParameters::default(),
            source_texture: None,
            source_size: Size::new(1, 1),
            drawable_size: Size::new(1, 1),
            frame_count: 0,
            frame_direction: FrameDirection::FORWARD,
            default_filter: FilterMode::Linear,
            default_wrap_mode: slangfx_common::WrapMode::ClampToEdge,
            last_output: None,
        }
    }

    pub fn parameters(&self) -> &RuntimeParameters {
        &self.parameters
    }

    /// Parse, preprocess, reflect and compile every pass of the preset at
    /// `path`, and (re)allocate the texture graph at the chain's current
    /// sizes. On failure the previously loaded shader, if any, is left
    /// untouched (spec §7 "fatal to the load"). `options` of `None` keeps
    /// the chain's current defaults.
    pub fn set_shader(&mut self, path: impl AsRef<Path>, options: Option<&FilterChainOptions>) -> Result<()> {
        let path = path.as_ref();
        log::info!("loading shader preset from {}", path.display());
        let preset = ShaderPreset::try_parse(path)?;
        self.load_preset(preset, options)
    }

    pub fn set_shader_preset(&mut self, preset: ShaderPreset, options: Option<&FilterChainOptions>) -> Result<()> {
        self.load_preset(preset, options)
    }

    fn load_preset(&mut self, preset: ShaderPreset, options: Option<&FilterChainOptions>) -> Result<()> {
        let options = options.copied().unwrap_or_default();
        log::debug!(
            "building filter chain: {} pass(es), use_cache={}",
            preset.shaders.len(),
            options.use_cache,
        );

        let sources = preset
            .shaders
            .iter()
            .map(|config| ShaderSource::load(&config.name))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        check_parameter_consistency(&sources)?;

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

        let compiler = PassthroughCompiler;
        let mut built = Vec::with_capacity(preset.shaders.len());
        for (index, (config, source)) in preset.shaders.iter().cloned().zip(sources).enumerate() {
            let vertex_ir = glsl::scan(&source.vertex)?;
            let fragment_ir = glsl::scan(&source.fragment)?;
            let reflection = reflect::reflect(index, &vertex_ir, &fragment_ir, &semantics)?;
            let compiled = compiler
                .compile(&source.vertex, &source.fragment, &vertex_ir, &fragment_ir, &reflection)
                .unwrap_or_else(|never| match never {});
            built.push((config, source, vertex_ir, fragment_ir, reflection, compiled));
        }

        let history_count = built
            .iter()
            .flat_map(|(.., reflection, _)| {
                reflection
                    .meta
                    .texture_meta
                    .keys()
                    .chain(reflection.meta.texture_size_meta.keys())
            })
            .filter(|map| map.semantics == TextureSemantics::OriginalHistory)
            .map(|map| map.index)
            .max()
            .unwrap_or(0);

        let mut parameters = Vec::new();
        for (index, (_, source, ..)) in built.iter().enumerate() {
            for p in &source.parameters {
                if parameters.iter().any(|existing: &RuntimeParameter| existing.name == p.id) {
                    continue;
                }
                parameters.push(RuntimeParameter {
                    name: p.id.clone(),
                    description: p.description.clone(),
                    value: p.initial,
                    minimum: p.minimum,
                    initial: p.initial,
                    maximum: p.maximum,
                    step: p.step,
                    pass: index,
                });
            }
        }
        let mut runtime_parameters = RuntimeParameters::new(parameters);
        runtime_parameters.apply_overrides(&preset.parameters);

        let mut arena = TextureArena::new();
        let mut passes = Vec::with_capacity(built.len());
        for (config, source, vertex_ir, fragment_ir, reflection, compiled) in built {
            let format = resolve_pass_format(&config, source.format);
            let output = arena.alloc(self.backend.create_texture(Size::new(1, 1), format).map_err(backend_err)?);
            let feedback = if config.is_feedback {
                Some(arena.alloc(self.backend.create_texture(Size::new(1, 1), format).map_err(backend_err)?))
            } else {
                None
            };
            passes.push(PassState {
                config,
                source,
                vertex_ir,
                fragment_ir,
                reflection,
                compiled,
                size: Size::new(1, 1),
                output,
                feedback,
            });
        }

        let mut history_slots = Vec::with_capacity(history_count + 1);
        for _ in 0..=history_count {
            history_slots.push(self.backend.create_texture(Size::new(1, 1), ImageFormat::R8G8B8A8Unorm).map_err(backend_err)?);
        }

        let mut luts = Vec::with_capacity(preset.textures.len());
        for texture in &preset.textures {
            let image = self
                .lut_loader
                .load(&texture.path)
                .map_err(|e| FilterChainError::LutLoad(texture.name.clone(), e))?;
            let handle = self
                .backend
                .create_texture(image.size, ImageFormat::R8G8B8A8Unorm)
                .map_err(backend_err)?;
            self.backend.write_texture(handle, &image.pixels).map_err(backend_err)?;
            luts.push(LutState {
                slot: arena.alloc(handle),
                size: image.size,
                filter: texture.filter_mode,
                wrap_mode: texture.wrap_mode,
            });
        }

        self.arena = arena;
        self.passes = passes;
        self.history = Some(HistoryRing::new(history_slots));
        self.luts = luts;
        self.parameters = runtime_parameters;
        self.default_filter = options.default_filter;
        self.default_wrap_mode = options.default_wrap_mode;
        self.frame_count = 0;
        self.last_output = None;

        log::info!(
            "shader preset loaded: {} pass(es), history depth {}, {} parameter(s)",
            self.passes.len(),
            history_count,
            self.parameters.len(),
        );

        self.reallocate_for_current_sizes()?;
        Ok(())
    }

    pub fn set_source_rect(&mut self, size: Size<u32>) -> Result<()> {
        self.source_size = size;
        self.reallocate_for_current_sizes()
    }

    pub fn set_drawable_size(&mut self, size: Size<u32>) -> Result<()> {
        self.drawable_size = size;
        self.reallocate_for_current_sizes()
    }

    pub fn set_source_texture(&mut self, texture: B::TextureHandle) {
        self.source_texture = Some(texture);
    }

    pub fn set_frame_direction(&mut self, direction: FrameDirection) {
        self.frame_direction = direction;
    }

    pub fn set_default_filter(&mut self, linear: bool) {
        self.default_filter = if linear { FilterMode::Linear } else { FilterMode::Nearest };
    }

    pub fn set_parameter(&mut self, name: &str, value: f32) -> bool {
        self.parameters.set_by_name(name, value)
    }

    pub fn get_parameter(&self, name: &str) -> Option<f32> {
        self.parameters.get_by_name(name)
    }

    /// Reach the owned backend directly, e.g. to create the texture a caller
    /// will hand back via [`FilterChain::set_source_texture`] or
    /// [`FilterChain::render`]'s target. A real GPU backend's handles are
    /// typically meaningful context-wide (a GL name, a Vulkan image); this
    /// CPU backend's handles are only meaningful relative to the specific
    /// instance owned by this chain, so callers need this accessor rather
    /// than constructing a second, unrelated backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn reallocate_for_current_sizes(&mut self) -> Result<()> {
        if self.passes.is_empty() {
            return Ok(());
        }

        log::debug!(
            "reallocating filter chain textures: source {:?}, drawable {:?}",
            self.source_size,
            self.drawable_size,
        );

        let mut prev_size = self.source_size;
        let last = self.passes.len() - 1;
        for (index, pass) in self.passes.iter_mut().enumerate() {
            let size = if index == last {
                self.drawable_size
            } else {
                compute_pass_size(&pass.config.scaling, prev_size, self.drawable_size)
            };
            pass.size = size;
            prev_size = size;

            let format = resolve_pass_format(&pass.config, pass.source.format);
            let handle = self.backend.create_texture(size, format).map_err(backend_err)?;
            self.arena.set(pass.output, handle);
            if let Some(feedback) = pass.feedback {
                let handle = self.backend.create_texture(size, format).map_err(backend_err)?;
                self.arena.set(feedback, handle);
            }
        }

        if let Some(history) = &mut self.history {
            let capacity = history.capacity();
            let mut slots = Vec::with_capacity(capacity);
            for _ in 0..capacity {
                slots.push(
                    self.backend
                        .create_texture(self.source_size, ImageFormat::R8G8B8A8Unorm)
                        .map_err(backend_err)?,
                );
            }
            *history = HistoryRing::new(slots);
        }

        Ok(())
    }

    /// Execute passes `0..n-1` (every pass but the last).
    pub fn render_offscreen_passes(&mut self, options: Option<&FrameOptions>) -> Result<()> {
        if self.passes.is_empty() {
            return Ok(());
        }
        let source_texture = match self.source_texture {
            Some(texture) => texture,
            None => {
                log::warn!("render called before set_source_texture; no frame produced");
                return Err(FilterChainError::Uninitialized);
            }
        };
        if options.map(|o| o.clear_history).unwrap_or(false) {
            self.clear_history_ring()?;
        }
        let history = self.history.as_mut().expect("shader loaded implies history ring exists");
        let slot_handle = history.begin_frame();
        let pixels = self.backend.read_texture(source_texture).map_err(backend_err)?;
        self.backend.write_texture(slot_handle, &pixels).map_err(backend_err)?;

        for index in 0..self.passes.len() - 1 {
            self.render_pass(index, None)?;
        }
        Ok(())
    }

    /// Execute the last pass into `target`.
    pub fn render_final_pass(&mut self, target: B::TextureHandle) -> Result<()> {
        if self.passes.is_empty() {
            return Ok(());
        }
        let last = self.passes.len() - 1;
        self.render_pass(last, Some(target))?;
        self.last_output = Some(target);

        for pass in &self.passes {
            if let Some(feedback) = pass.feedback {
                self.arena.swap(pass.output, feedback);
            }
        }
        self.frame_count += 1;
        Ok(())
    }

    pub fn render(&mut self, target: B::TextureHandle, options: Option<&FrameOptions>) -> Result<()> {
        self.render_offscreen_passes(options)?;
        self.render_final_pass(target)
    }

    /// Zero every history-ring slot's backing texture (spec §6 `FrameOptions::clear_history`).
    fn clear_history_ring(&mut self) -> Result<()> {
        let history = self.history.as_ref().expect("shader loaded implies history ring exists");
        let handles: Vec<_> = (0..history.capacity()).map(|k| history.get(k)).collect();
        let zeroed = vec![0u8; self.source_size.width as usize * self.source_size.height as usize * 4];
        for handle in handles {
            self.backend.write_texture(handle, &zeroed).map_err(backend_err)?;
        }
        Ok(())
    }

    fn render_pass(&mut self, index: usize, target_override: Option<B::TextureHandle>) -> Result<()> {
        let history = self.history.as_ref().expect("shader loaded implies history ring exists");

        let texture_sizes = self.texture_size_lookup(index, history);
        let ubo_size = self.passes[index].reflection.ubo.map(|u| u.size as usize).unwrap_or(0);
        let push_size = self.passes[index].reflection.push_constant.map(|p| p.size as usize).unwrap_or(0);
        let mut ubo_bytes = vec![0u8; ubo_size];
        let mut push_bytes = vec![0u8; push_size];

        let frame_count_mod = self.passes[index].config.frame_count_mod;
        let effective_frame_count = if frame_count_mod > 0 {
            self.frame_count % frame_count_mod as u64
        } else {
            self.frame_count
        };
        let pass_size = self.passes[index].size;
        let drawable_size = self.drawable_size;
        let frame_direction = self.frame_direction.as_i32();
        // The final/viewport pass gets a real orthographic projection;
        // offscreen passes render into pass-local space and stay identity
        // (spec §4.F "identity for offscreen passes").
        let mvp = if target_override.is_some() { orthographic_mvp(drawable_size) } else { IDENTITY_MVP };
        let output_vec = pass_size.to_vec4();
        let viewport_vec = drawable_size.to_vec4();

        for (semantic, meta) in self.passes[index].reflection.meta.variable_meta.clone() {
            match semantic {
                VariableSemantics::Mvp => {
                    write_member(&mut ubo_bytes, &mut push_bytes, meta.offset, bytemuck_f32_slice(&mvp));
                }
                VariableSemantics::Output => {
                    write_member(&mut ubo_bytes, &mut push_bytes, meta.offset, bytemuck_f32_slice(&output_vec));
                }
                VariableSemantics::FinalViewport => {
                    write_member(&mut ubo_bytes, &mut push_bytes, meta.offset, bytemuck_f32_slice(&viewport_vec));
                }
                VariableSemantics::FrameCount => {
                    write_member(&mut ubo_bytes, &mut push_bytes, meta.offset, &(effective_frame_count as u32).to_ne_bytes());
                }
                VariableSemantics::FrameDirection => {
                    write_member(&mut ubo_bytes, &mut push_bytes, meta.offset, &frame_direction.to_ne_bytes());
                }
                VariableSemantics::FloatParameter => unreachable!("FloatParameter is routed through parameter_meta"),
            }
        }

        for (name, meta) in self.passes[index].reflection.meta.parameter_meta.clone() {
            let value = self.parameters.get_by_name(&name).unwrap_or(0.0);
            write_member(&mut ubo_bytes, &mut push_bytes, meta.offset, &value.to_ne_bytes());
        }

        for (map, meta) in self.passes[index].reflection.meta.texture_size_meta.clone() {
            let size = texture_sizes.get(&map).copied().unwrap_or(Size::new(1, 1));
            write_member(&mut ubo_bytes, &mut push_bytes, meta.offset, bytemuck_f32_slice(&size.to_vec4()));
        }

        let default_filter = self.default_filter;
        let mut textures = Vec::with_capacity(self.passes[index].reflection.meta.texture_meta.len());
        let texture_meta = self.passes[index].reflection.meta.texture_meta.clone();
        for (map, meta) in texture_meta {
            let handle = self.resolve_texture_handle(index, map, history)?;
            let (filter, wrap_mode) = self.sampler_state_for(index, map, default_filter);
            textures.push((meta.binding, BoundTexture { handle, filter, wrap_mode }));
        }

        let target = match target_override {
            Some(t) => t,
            None => self.arena.get(self.passes[index].output),
        };
        let target_size = if target_override.is_some() { drawable_size } else { pass_size };

        let call = DrawCall {
            ubo: if ubo_size > 0 { Some(&ubo_bytes) } else { None },
            push_constants: if push_size > 0 { Some(&push_bytes) } else { None },
            textures: &textures,
            target,
            target_size,
            mvp,
            clear: true,
        };
        self.backend.draw(&call).map_err(backend_err)?;
        Ok(())
    }

    fn texture_size_lookup(
        &self,
        pass_index: usize,
        history: &HistoryRing<B::TextureHandle>,
    ) -> FxHashMap<SemanticMap<TextureSemantics>, Size<u32>> {
        let mut map = FxHashMap::default();
        map.insert(SemanticMap { semantics: TextureSemantics::Original, index: 0 }, self.source_size);
        map.insert(
            SemanticMap { semantics: TextureSemantics::Source, index: 0 },
            if pass_index == 0 { self.source_size } else { self.passes[pass_index - 1].size },
        );
        for k in 0..history.capacity() {
            map.insert(SemanticMap { semantics: TextureSemantics::OriginalHistory, index: k }, self.source_size);
        }
        for (i, pass) in self.passes.iter().enumerate() {
            map.insert(SemanticMap { semantics: TextureSemantics::PassOutput, index: i }, pass.size);
            if pass.feedback.is_some() {
                map.insert(SemanticMap { semantics: TextureSemantics::PassFeedback, index: i }, pass.size);
            }
        }
        for (i, lut) in self.luts.iter().enumerate() {
            map.insert(SemanticMap { semantics: TextureSemantics::User, index: i }, lut.size);
        }
        map
    }

    fn resolve_texture_handle(
        &self,
        pass_index: usize,
        map: SemanticMap<TextureSemantics>,
        history: &HistoryRing<B::TextureHandle>,
    ) -> Result<B::TextureHandle> {
        Ok(match map.semantics {
            TextureSemantics::Original => history.get(0),
            TextureSemantics::Source => {
                if pass_index == 0 {
                    history.get(0)
                } else {
                    self.arena.get(self.passes[pass_index - 1].output)
                }
            }
            TextureSemantics::OriginalHistory => history.get(map.index),
            TextureSemantics::PassOutput => self.arena.get(self.passes[map.index].output),
            TextureSemantics::PassFeedback => {
                let feedback = self.passes[map.index]
                    .feedback
                    .expect("reflection validated this pass is a feedback pass");
                self.arena.get(feedback)
            }
            TextureSemantics::User => self.arena.get(self.luts[map.index].slot),
        })
    }

    fn sampler_state_for(
        &self,
        pass_index: usize,
        map: SemanticMap<TextureSemantics>,
        default_filter: FilterMode,
    ) -> (FilterMode, slangfx_common::WrapMode) {
        let resolve_filter = |filter: FilterMode| if filter == FilterMode::Unspecified { default_filter } else { filter };
        // `ClampToBorder` is the preset parser's fallback when a pass
        // doesn't declare its own `wrap_mode` (spec §4.A), so it doubles
        // as this chain's "unspecified, use the chain default" sentinel.
        let resolve_wrap = |wrap: slangfx_common::WrapMode| {
            if wrap == slangfx_common::WrapMode::ClampToBorder {
                self.default_wrap_mode
            } else {
                wrap
            }
        };
        match map.semantics {
            TextureSemantics::User => {
                let lut = &self.luts[map.index];
                (resolve_filter(lut.filter), lut.wrap_mode)
            }
            TextureSemantics::PassOutput | TextureSemantics::PassFeedback => {
                let pass = &self.passes[map.index];
                (resolve_filter(pass.config.filter), resolve_wrap(pass.config.wrap_mode))
            }
            TextureSemantics::Original | TextureSemantics::OriginalHistory => {
                let pass = &self.passes[0];
                (resolve_filter(pass.config.filter), resolve_wrap(pass.config.wrap_mode))
            }
            TextureSemantics::Source => {
                let pass = &self.passes[pass_index];
                (resolve_filter(pass.config.filter), resolve_wrap(pass.config.wrap_mode))
            }
        }
    }

    pub fn capture_source_image(&mut self) -> Result<Image> {
        let history = self.history.as_ref().ok_or(FilterChainError::Uninitialized)?;
        let handle = history.get(0);
        let pixels = self.backend.read_texture(handle).map_err(backend_err)?;
        Ok(Image::new(self.source_size, pixels))
    }

    pub fn capture_output_image(&mut self) -> Result<Image> {
        let handle = self.last_output.ok_or(FilterChainError::Uninitialized)?;
        let pixels = self.backend.read_texture(handle).map_err(backend_err)?;
        Ok(Image::new(self.drawable_size, pixels))
    }
}

/// Standard top-left-origin orthographic projection mapping `(0, 0)..size`
/// to clip space, for the final/viewport pass's `Mvp` uniform and draw call.
fn orthographic_mvp(size: Size<u32>) -> [f32; 16] {
    let w = size.width.max(1) as f32;
    let h = size.height.max(1) as f32;
    [
        2.0 / w, 0.0, 0.0, 0.0, //
        0.0, -2.0 / h, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        -1.0, 1.0, 0.0, 1.0,
    ]
}

fn backend_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> FilterChainError {
    FilterChainError::Backend(Box::new(e))
}

fn resolve_pass_format(config: &ShaderPassConfig, declared: ImageFormat) -> ImageFormat {
    if config.is_float_framebuffer {
        ImageFormat::R16G16B16A16Sfloat
    } else if declared != ImageFormat::Unknown {
        declared
    } else if config.is_srgb_framebuffer {
        ImageFormat::R8G8B8A8Srgb
    } else {
        ImageFormat::R8G8B8A8Unorm
    }
}

fn write_member(ubo: &mut [u8], push: &mut [u8], offset: MemberOffset, value: &[u8]) {
    let (buf, start) = match offset {
        MemberOffset::Ubo(o) => (ubo, o),
        MemberOffset::PushConstant(o) => (push, o),
    };
    let end = start + value.len();
    if end <= buf.len() {
        buf[start..end].copy_from_slice(value);
    }
}

fn bytemuck_f32_slice(values: &[f32]) -> &[u8] {
    // Safety: `f32` has no padding and every bit pattern is valid, so
    // reinterpreting a `&[f32]` as `&[u8]` is always sound.
    unsafe { std::slice::from_raw_parts(values.as_ptr().cast::<u8>(), std::mem::size_of_val(values)) }
}

fn check_parameter_consistency(sources: &[ShaderSource]) -> Result<()> {
    let mut seen: FxHashMap<&str, &slangfx_preprocess::Parameter> = FxHashMap::default();
    for source in sources {
        for param in &source.parameters {
            match seen.get(param.id.as_str()) {
                Some(existing) => {
                    if existing.initial != param.initial
                        || existing.minimum != param.minimum
                        || existing.maximum != param.maximum
                        || existing.step != param.step
                    {
                        return Err(FilterChainError::PassBuild {
                            pass_index: 0,
                            file: std::path::PathBuf::new(),
                            message: format!("parameter `{}` declared with conflicting bounds across passes", param.id),
                        });
                    }
                }
                None => {
                    seen.insert(param.id.as_str(), param);
                }
            }
        }
    }
    Ok(())
}
