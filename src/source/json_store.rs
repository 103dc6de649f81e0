use std::path::Path;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::info;

use crate::error::SourceError;

use super::{CollectionRef, DocumentSource};

/// A document store kept in a JSON file shaped as
/// `{"<database>": {"<collection>": [documents...]}}`.
///
/// The store is loaded on [`JsonStore::connect`] and released on
/// [`JsonStore::disconnect`]; fetches after disconnecting fail with
/// [`SourceError::NotConnected`].
#[derive(Debug)]
pub struct JsonStore {
    databases: RwLock<Option<Map<String, Value>>>,
}

impl JsonStore {
    /// Loads the store file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, is not JSON, or its
    /// root is not an object.
    pub async fn connect(path: &Path) -> Result<Self, SourceError> {
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|err| SourceError::ReadStore {
                    path: path.to_path_buf(),
                    source: err,
                })?;
        let value: Value =
            serde_json::from_str(&content).map_err(|err| SourceError::ParseStore {
                path: path.to_path_buf(),
                source: err,
            })?;
        let store = Self::from_value(value)?;
        info!("Connected to document store {}", path.display());
        Ok(store)
    }

    /// Wraps an in-memory store value.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidStoreLayout`] when `value` is not an object.
    pub fn from_value(value: Value) -> Result<Self, SourceError> {
        match value {
            Value::Object(databases) => Ok(Self {
                databases: RwLock::new(Some(databases)),
            }),
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
                Err(SourceError::InvalidStoreLayout)
            }
        }
    }

    pub async fn disconnect(&self) {
        self.databases.write().await.take();
    }

    /// # Errors
    ///
    /// Returns [`SourceError::NotConnected`] after [`JsonStore::disconnect`].
    pub async fn list_databases(&self) -> Result<Vec<String>, SourceError> {
        let guard = self.databases.read().await;
        let databases = guard.as_ref().ok_or(SourceError::NotConnected)?;
        Ok(databases.keys().cloned().collect())
    }

    /// # Errors
    ///
    /// Returns [`SourceError::NotConnected`] after disconnecting, or
    /// [`SourceError::DatabaseNotFound`] for an unknown database.
    pub async fn list_collections(&self, database: &str) -> Result<Vec<String>, SourceError> {
        let guard = self.databases.read().await;
        let databases = guard.as_ref().ok_or(SourceError::NotConnected)?;
        match databases.get(database) {
            Some(Value::Object(collections)) => Ok(collections.keys().cloned().collect()),
            Some(_) | None => Err(SourceError::DatabaseNotFound {
                database: database.to_owned(),
            }),
        }
    }
}

#[async_trait]
impl DocumentSource for JsonStore {
    async fn fetch_sample_record(&self, collection: &CollectionRef) -> Result<Value, SourceError> {
        let guard = self.databases.read().await;
        let databases = guard.as_ref().ok_or(SourceError::NotConnected)?;
        let Some(Value::Object(collections)) = databases.get(&collection.database) else {
            return Err(SourceError::DatabaseNotFound {
                database: collection.database.clone(),
            });
        };
        let Some(Value::Array(documents)) = collections.get(&collection.collection) else {
            return Err(SourceError::CollectionNotFound {
                database: collection.database.clone(),
                collection: collection.collection.clone(),
            });
        };
        documents
            .first()
            .cloned()
            .ok_or_else(|| SourceError::EmptyCollection {
                database: collection.database.clone(),
                collection: collection.collection.clone(),
            })
    }
}
