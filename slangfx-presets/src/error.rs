use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParsePresetError {
    #[error("failed to read preset {0}: {1}")]
    Io(std::path::PathBuf, String),
    #[error("preset is missing required key `shaders`")]
    MissingShaderCount,
    #[error("preset declares {declared} shaders but is missing `shader{missing}`")]
    MissingShaderSource { declared: usize, missing: usize },
    #[error("key `{key}` has invalid boolean value `{value}`")]
    InvalidBool { key: String, value: String },
    #[error("key `{key}` has invalid integer value `{value}`")]
    InvalidInt { key: String, value: String },
    #[error("key `{key}` has invalid float value `{value}`")]
    InvalidFloat { key: String, value: String },
    #[error("key `{key}` has invalid scale type `{value}`")]
    InvalidScaleType { key: String, value: String },
    #[error("key `{key}` has invalid wrap mode `{value}`")]
    InvalidWrapMode { key: String, value: String },
    #[error("parameter `{0}` is declared more than once with conflicting min/initial/max/step")]
    ConflictingParameter(String),
    #[error("unterminated quoted value for key `{0}`")]
    UnterminatedQuote(String),
}
