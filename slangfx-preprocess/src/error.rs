use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("failed to read shader source {0}: {1}")]
    Io(PathBuf, String),
    #[error("include cycle detected: {0} includes itself (via {1})")]
    IncludeCycle(PathBuf, PathBuf),
    #[error("could not resolve #include \"{0}\" from {1}")]
    IncludeNotFound(String, PathBuf),
    #[error("shader {0} is missing a #version directive")]
    MissingVersion(PathBuf),
    #[error("shader {0} declares #pragma name more than once")]
    MultipleNamePragma(PathBuf),
    #[error("shader {0} declares #pragma format more than once")]
    MultipleFormatPragma(PathBuf),
    #[error("shader {0} has an unrecognized #pragma format token `{1}`")]
    InvalidFormatPragma(PathBuf, String),
    #[error("shader {0} has a malformed #pragma parameter line: {1}")]
    InvalidParameterPragma(PathBuf, String),
    #[error("shader {0} redeclares parameter `{1}` with different min/initial/max/step")]
    DuplicateParameterPragma(PathBuf, String),
    #[error("shader {0} has a malformed #pragma parameter_group line: {1}")]
    InvalidParameterGroupPragma(PathBuf, String),
    #[error("shader {0} has an unrecognized #pragma stage token `{1}`")]
    InvalidStagePragma(PathBuf, String),
}
