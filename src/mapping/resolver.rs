use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::MappingError;

use super::encoding::encode_payload;
use super::path::FieldPath;
use super::types::{
    FieldBinding, FieldMappingConfig, PayloadEncoding, PayloadEntry, ResolvedFields, Section,
};

#[derive(Debug, Clone)]
enum CompiledBinding {
    Source(FieldPath),
    Fixed(Value),
}

impl CompiledBinding {
    fn compile(binding: &FieldBinding) -> Result<Option<Self>, MappingError> {
        match binding {
            FieldBinding::CollectionField(path) => {
                Ok(Some(CompiledBinding::Source(FieldPath::parse(path)?)))
            }
            FieldBinding::FixedValue(value) => Ok(Some(CompiledBinding::Fixed(value.clone()))),
            FieldBinding::Unset => Ok(None),
        }
    }

    fn compile_entry(entry: &PayloadEntry) -> Result<Option<Self>, MappingError> {
        match entry {
            PayloadEntry::Path(path) if path.trim().is_empty() => Ok(None),
            PayloadEntry::Path(path) => Ok(Some(CompiledBinding::Source(FieldPath::parse(path)?))),
            PayloadEntry::Binding(binding) => Self::compile(binding),
        }
    }

    fn resolve(&self, record: &Value) -> Option<Value> {
        match self {
            CompiledBinding::Source(path) => path.lookup(record).cloned(),
            CompiledBinding::Fixed(value) => Some(value.clone()),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledSpecialField {
    section: Section,
    field_name: String,
    payload: Vec<(String, CompiledBinding)>,
    encoding: PayloadEncoding,
    secret: String,
}

/// A validated mapping configuration, ready to resolve records.
///
/// Compiling up front turns every path syntax problem into a configuration
/// error before a run starts; resolving a record never fails afterwards.
#[derive(Debug, Clone)]
pub struct MappingPlan {
    url_params: Vec<(String, CompiledBinding)>,
    headers: Vec<(String, CompiledBinding)>,
    body: Vec<(String, CompiledBinding)>,
    special_fields: Vec<CompiledSpecialField>,
}

impl MappingPlan {
    /// Validates `config` and parses every field path it names.
    ///
    /// `default_secret` signs `jwt` special fields that carry no own secret.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::InvalidFieldPath`] for malformed paths.
    pub fn compile(
        config: &FieldMappingConfig,
        default_secret: Option<&str>,
    ) -> Result<Self, MappingError> {
        let special_fields = config
            .special_fields
            .iter()
            .map(|field| {
                Ok(CompiledSpecialField {
                    section: field.section,
                    field_name: field.field_name.clone(),
                    payload: compile_entries(&field.payload)?,
                    encoding: field.encoding,
                    secret: field
                        .secret
                        .as_deref()
                        .or(default_secret)
                        .unwrap_or_default()
                        .to_owned(),
                })
            })
            .collect::<Result<Vec<_>, MappingError>>()?;

        Ok(Self {
            url_params: compile_section(&config.url_params)?,
            headers: compile_section(&config.headers)?,
            body: compile_section(&config.body)?,
            special_fields,
        })
    }

    /// Produces concrete query/header/body values for one source record.
    #[must_use]
    pub fn resolve(&self, record: &Value) -> ResolvedFields {
        let mut resolved = ResolvedFields {
            query_params: resolve_section(&self.url_params, record),
            headers: resolve_section(&self.headers, record),
            body: resolve_section(&self.body, record),
        };

        for field in &self.special_fields {
            let mut payload = Map::new();
            for (key, binding) in &field.payload {
                match binding.resolve(record) {
                    Some(value) => {
                        payload.insert(key.clone(), value);
                    }
                    None => debug!(
                        "Special field '{}': source field for '{}' not found, dropping key.",
                        field.field_name, key
                    ),
                }
            }

            match encode_payload(&field.field_name, field.encoding, &payload, &field.secret) {
                Ok(encoded) => {
                    resolved
                        .section_mut(field.section)
                        .insert(field.field_name.clone(), Value::String(encoded));
                }
                Err(err) => warn!("{}; omitting it from the request.", err),
            }
        }

        resolved
    }
}

/// Resolves `record` against `config` in one step.
///
/// # Errors
///
/// Returns [`MappingError::InvalidFieldPath`] for malformed paths.
pub fn resolve(record: &Value, config: &FieldMappingConfig) -> Result<ResolvedFields, MappingError> {
    Ok(MappingPlan::compile(config, None)?.resolve(record))
}

fn compile_section(
    section: &BTreeMap<String, FieldBinding>,
) -> Result<Vec<(String, CompiledBinding)>, MappingError> {
    let mut compiled = Vec::with_capacity(section.len());
    for (name, binding) in section {
        if let Some(binding) = CompiledBinding::compile(binding)? {
            compiled.push((name.clone(), binding));
        }
    }
    Ok(compiled)
}

fn compile_entries(
    payload: &BTreeMap<String, PayloadEntry>,
) -> Result<Vec<(String, CompiledBinding)>, MappingError> {
    let mut compiled = Vec::with_capacity(payload.len());
    for (name, entry) in payload {
        if let Some(binding) = CompiledBinding::compile_entry(entry)? {
            compiled.push((name.clone(), binding));
        }
    }
    Ok(compiled)
}

fn resolve_section(
    bindings: &[(String, CompiledBinding)],
    record: &Value,
) -> BTreeMap<String, Value> {
    bindings
        .iter()
        .filter_map(|(name, binding)| {
            binding
                .resolve(record)
                .map(|value| (name.clone(), value))
        })
        .collect()
}
