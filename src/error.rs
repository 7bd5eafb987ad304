#[cfg(feature = "serde")]
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// Input trailing dimension disagrees with the width a linear stage expects.
    #[error("shape mismatch: expected {expected} input features, got {got}")]
    ShapeMismatch { expected: usize, got: usize },
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[cfg(feature = "serde")]
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
