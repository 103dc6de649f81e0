//! Document sources that supply one sample record per iteration.
mod json_store;


use async_trait::async_trait;
use serde_json::Value;

use crate::error::SourceError;
use crate::mapping::list_field_paths;

pub use json_store::JsonStore;

/// Names a collection inside a document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRef {
    pub database: String,
    pub collection: String,
}

impl CollectionRef {
    #[must_use]
    pub fn new<D: Into<String>, C: Into<String>>(database: D, collection: C) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl std::fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// An established session against a document store, shared by every
/// in-flight iteration. Connection lifecycle belongs to the caller.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetches one representative record from `collection`.
    async fn fetch_sample_record(&self, collection: &CollectionRef) -> Result<Value, SourceError>;

    /// Lists dotted field paths of one sample record, up to `max_depth`.
    async fn list_field_paths(
        &self,
        collection: &CollectionRef,
        max_depth: usize,
    ) -> Result<Vec<String>, SourceError> {
        let record = self.fetch_sample_record(collection).await?;
        Ok(list_field_paths(&record, max_depth))
    }
}
