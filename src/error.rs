use thiserror::Error;

/// User-facing failure kinds. Transport and subprocess failures ride
/// through as plain `anyhow` errors with context attached.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot derive owner/repo from `{0}`")]
    Config(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("empty comment body")]
    EmptyInput,
}
