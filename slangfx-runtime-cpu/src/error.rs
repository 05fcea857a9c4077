use thiserror::Error;

#[derive(Debug, Error)]
pub enum CpuBackendError {
    #[error("texture handle does not refer to a live texture")]
    InvalidHandle,

    #[error("texture write expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}
