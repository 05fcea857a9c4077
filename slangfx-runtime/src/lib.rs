//! The backend-agnostic filter chain execution engine (spec §4.F).
//!
//! This crate owns the parts of the system that are the same no matter which
//! GPU API ends up drawing the pixels: per-pass sizing, the texture arena,
//! the original-history ring, per-frame uniform staging and the load
//! pipeline that turns a parsed preset into something a [`backend::RenderBackend`]
//! can draw. A concrete backend (the `slangfx-runtime-cpu` crate in this
//! workspace, or a real GPU backend elsewhere) supplies the `RenderBackend`
//! impl; everything else here is shared.

pub mod arena;
pub mod backend;
pub mod chain;
pub mod error;
pub mod history;
pub mod luts;
pub mod options;
pub mod parameters;
pub mod pass;
pub mod scale;

pub use arena::{TextureArena, TextureSlot};
pub use backend::{BoundTexture, DrawCall, RenderBackend};
pub use chain::FilterChain;
pub use error::{FilterChainError, Result};
pub use history::HistoryRing;
pub use luts::{LutLoader, NullLutLoader};
pub use options::{FilterChainOptions, FrameOptions};
pub use parameters::{RuntimeParameter, RuntimeParameters};
pub use pass::PassState;
pub use scale::{compute_pass_size, round_banker};
