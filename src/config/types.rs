use std::time::Duration;

use serde::Deserialize;

use crate::args::{OutputFormat, parse_duration_arg};
use crate::error::ValidationError;
use crate::mapping::FieldMappingConfig;

/// On-disk description of a run. Every field is optional; CLI flags win.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub curl: Option<String>,
    #[serde(alias = "numRequests")]
    pub requests: Option<usize>,
    pub concurrency: Option<usize>,
    pub timeout: Option<DurationValue>,
    pub store: Option<String>,
    pub database: Option<String>,
    pub collection: Option<String>,
    #[serde(alias = "jwtSecret")]
    pub jwt_secret: Option<String>,
    #[serde(alias = "outputFormat")]
    pub output_format: Option<OutputFormat>,
    #[serde(alias = "fieldMappings")]
    pub mapping: Option<FieldMappingConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => parse_duration_arg(text),
        }
    }
}
