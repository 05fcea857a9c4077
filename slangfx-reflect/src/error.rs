use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReflectError {
    #[error("preset error: {0}")]
    Preset(#[from] slangfx_presets::ParsePresetError),

    #[error("preprocess error: {0}")]
    Preprocess(#[from] slangfx_preprocess::PreprocessError),

    #[error("uniform `{name}` has incompatible layout between vertex and fragment stages")]
    LinkError { name: String },

    #[error("texture semantic `{0}` is not a known name, alias or LUT")]
    UnknownTextureSemantic(String),

    #[error("uniform `{0}` is not a known semantic, texture size, or declared parameter")]
    UnknownUniformSemantic(String),

    #[error("pass {pass_index} references PassOutput{referenced}, which has not run yet")]
    ForwardPassReference { pass_index: usize, referenced: usize },

    #[error("pass {pass_index} references PassFeedback{referenced}, which is not a feedback pass")]
    InvalidFeedbackReference { pass_index: usize, referenced: usize },

    #[error("LUT `{0}` is not declared in the preset's `textures` list")]
    MissingLut(String),

    #[error("malformed uniform block `{0}`: {1}")]
    MalformedBlock(String, String),
}
