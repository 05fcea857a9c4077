//! Cumulative error type for a filter chain.

use slangfx_presets::ParsePresetError;
use slangfx_preprocess::PreprocessError;
use slangfx_reflect::ReflectError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterChainError {
    #[error("shader preset parse error")]
    Preset(#[from] ParsePresetError),

    #[error("shader preprocess error")]
    Preprocess(#[from] PreprocessError),

    #[error("shader reflect error")]
    Reflect(#[from] ReflectError),

    #[error("LUT `{0}` could not be loaded: {1}")]
    LutLoad(String, String),

    #[error("pass {pass_index} ({file}): {message}")]
    PassBuild {
        pass_index: usize,
        file: std::path::PathBuf,
        message: String,
    },

    #[error("render backend error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync>),

    #[error("image capture failed: {0}")]
    ImageCaptureFailed(String),

    #[error("no shader has been loaded")]
    Uninitialized,
}

pub type Result<T> = std::result::Result<T, FilterChainError>;
