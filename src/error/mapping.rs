use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Invalid field path '{path}': {reason}")]
    InvalidFieldPath { path: String, reason: &'static str },
    #[error("Failed to encode special field '{field}': {reason}")]
    Encoding { field: String, reason: String },
    #[error("Failed to decode special payload: {reason}")]
    Decoding { reason: String },
}
