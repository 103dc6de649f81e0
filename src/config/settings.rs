use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::args::{OutputFormat, PositiveUsize, TesterArgs};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};
use crate::mapping::FieldMappingConfig;
use crate::source::CollectionRef;

use super::types::ConfigFile;

/// Effective run settings after CLI values override config-file values.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub curl: Option<String>,
    pub requests: PositiveUsize,
    pub concurrency: PositiveUsize,
    pub request_timeout: Option<Duration>,
    pub store: Option<PathBuf>,
    pub database: Option<String>,
    pub collection: Option<String>,
    pub jwt_secret: Option<String>,
    pub output_format: OutputFormat,
    pub mapping: FieldMappingConfig,
}

impl RunSettings {
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingCurl`] when no curl command was given.
    pub fn curl_command(&self) -> Result<&str, ValidationError> {
        self.curl
            .as_deref()
            .filter(|curl| !curl.trim().is_empty())
            .ok_or(ValidationError::MissingCurl)
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::MissingStore`] when no store was given.
    pub fn store_path(&self) -> Result<&Path, ValidationError> {
        self.store.as_deref().ok_or(ValidationError::MissingStore)
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::MissingCollection`] unless both database and
    /// collection are set.
    pub fn collection_ref(&self) -> Result<CollectionRef, ValidationError> {
        match (self.database.as_deref(), self.collection.as_deref()) {
            (Some(database), Some(collection)) => Ok(CollectionRef::new(database, collection)),
            _ => Err(ValidationError::MissingCollection),
        }
    }
}

/// Merges CLI arguments over an optional config file.
///
/// # Errors
///
/// Returns an error when a config value is out of range or its timeout is
/// malformed.
pub fn resolve_settings(args: &TesterArgs, config: Option<ConfigFile>) -> AppResult<RunSettings> {
    let config = config.unwrap_or_default();

    let requests = match (args.requests, config.requests) {
        (Some(requests), _) => requests,
        (None, Some(requests)) => ensure_positive(requests, "requests")?,
        (None, None) => PositiveUsize::ONE,
    };
    let concurrency = match (args.concurrency, config.concurrency) {
        (Some(concurrency), _) => concurrency,
        (None, Some(concurrency)) => ensure_positive(concurrency, "concurrency")?,
        (None, None) => PositiveUsize::ONE,
    };
    let request_timeout = match (args.request_timeout, config.timeout.as_ref()) {
        (Some(timeout), _) => Some(timeout),
        (None, Some(timeout)) => Some(
            timeout
                .to_duration()
                .map_err(|err| AppError::config(ConfigError::InvalidTimeout { source: err }))?,
        ),
        (None, None) => None,
    };

    Ok(RunSettings {
        curl: args.curl.clone().or(config.curl),
        requests,
        concurrency,
        request_timeout,
        store: args.store.clone().or(config.store).map(PathBuf::from),
        database: args.database.clone().or(config.database),
        collection: args.collection.clone().or(config.collection),
        jwt_secret: args.jwt_secret.clone().or(config.jwt_secret),
        output_format: args
            .output_format
            .or(config.output_format)
            .unwrap_or_default(),
        mapping: config.mapping.unwrap_or_default(),
    })
}

fn ensure_positive(value: usize, field: &'static str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value)
        .map_err(|err| AppError::config(ConfigError::FieldMustBePositive { field, source: err }))
}
