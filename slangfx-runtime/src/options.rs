//! Caller-tunable knobs for building and driving a [`crate::chain::FilterChain`]
//! (spec §6 `set_shader(url, options)`), grounded on the teacher's per-backend
//! `options.rs` modules (`librashader-runtime-gl46`'s `FilterChainOptions`/
//! `FrameOptions`, threaded through `load_from_preset`/`frame` as `Option<&T>`
//! so a caller who wants the defaults can just pass `None`).

use slangfx_common::{FilterMode, WrapMode};

/// Passed to [`crate::chain::FilterChain::set_shader`] /
/// [`crate::chain::FilterChain::set_shader_preset`]. `None` keeps the
/// chain's current defaults (or the stock ones below, on first load).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterChainOptions {
    /// Skip recompiling a pass whose source and declared format haven't
    /// changed since the previous load. This workspace's `PassthroughCompiler`
    /// has nothing expensive to cache yet, so the flag is a no-op today; it's
    /// carried so a real target compiler can key off it without an API break.
    pub use_cache: bool,
    pub default_filter: FilterMode,
    pub default_wrap_mode: WrapMode,
}

impl Default for FilterChainOptions {
    fn default() -> Self {
        FilterChainOptions {
            use_cache: true,
            default_filter: FilterMode::Linear,
            default_wrap_mode: WrapMode::ClampToEdge,
        }
    }
}

/// Passed to [`crate::chain::FilterChain::render`] /
/// [`crate::chain::FilterChain::render_offscreen_passes`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOptions {
    /// Zero every history-ring slot before this frame runs, so passes
    /// reading `Original`/`OriginalHistoryK` see black instead of whatever
    /// the chain last held there.
    pub clear_history: bool,
}
