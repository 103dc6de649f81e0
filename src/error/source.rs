use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Document store is not connected.")]
    NotConnected,
    #[error("Database '{database}' was not found.")]
    DatabaseNotFound { database: String },
    #[error("Collection '{database}.{collection}' was not found.")]
    CollectionNotFound {
        database: String,
        collection: String,
    },
    #[error("Collection '{database}.{collection}' has no documents.")]
    EmptyCollection {
        database: String,
        collection: String,
    },
    #[error("Failed to read document store '{path}': {source}")]
    ReadStore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse document store '{path}': {source}")]
    ParseStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Document store root must be an object of databases.")]
    InvalidStoreLayout,
}
