use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid header '{name}'.")]
    InvalidHeader { name: String },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to read response body: {source}")]
    ReadBody {
        #[source]
        source: reqwest::Error,
    },
    #[error("Request timed out after {timeout_ms}ms.")]
    Timeout { timeout_ms: u64 },
    #[error("Transport failed: {message}")]
    Other { message: String },
}
