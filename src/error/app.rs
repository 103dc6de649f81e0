use thiserror::Error;

use super::{
    ConfigError, CurlError, ExecutorError, HttpError, MappingError, SourceError, ValidationError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("CLI error: {source}")]
    Clap {
        #[from]
        source: clap::Error,
    },
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("Join error: {source}")]
    Join {
        #[from]
        source: tokio::task::JoinError,
    },
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),
    #[error("Document source error: {0}")]
    Source(#[from] SourceError),
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),
    #[error("Curl error: {0}")]
    Curl(#[from] CurlError),
    #[error("Executor error: {0}")]
    Executor(#[from] ExecutorError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation<E>(error: E) -> Self
    where
        E: Into<ValidationError>,
    {
        error.into().into()
    }

    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }

    /// Whether the error is a run-level configuration problem that aborts a
    /// load test before any iteration starts.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::Config(_)
                | AppError::Mapping(MappingError::InvalidFieldPath { .. })
        )
    }
}
