use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a template field gets its value for one iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BindingRepr", into = "BindingRepr")]
pub enum FieldBinding {
    /// Dotted path looked up in the sampled source record.
    CollectionField(String),
    /// Used verbatim.
    FixedValue(Value),
    /// Neither variant populated; contributes nothing.
    Unset,
}

impl FieldBinding {
    #[must_use]
    pub fn collection<S: Into<String>>(path: S) -> Self {
        FieldBinding::CollectionField(path.into())
    }

    #[must_use]
    pub fn fixed<V: Into<Value>>(value: V) -> Self {
        FieldBinding::FixedValue(value.into())
    }
}

/// Wire shape of a binding: `{ collection_field = "a.b" }` or `{ fixed_value = 42 }`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct BindingRepr {
    #[serde(
        default,
        alias = "collectionField",
        skip_serializing_if = "Option::is_none"
    )]
    collection_field: Option<String>,
    #[serde(default, alias = "fixedValue", skip_serializing_if = "Option::is_none")]
    fixed_value: Option<Value>,
}

impl From<BindingRepr> for FieldBinding {
    fn from(repr: BindingRepr) -> Self {
        match (repr.collection_field, repr.fixed_value) {
            (Some(path), _) if !path.trim().is_empty() => FieldBinding::CollectionField(path),
            (_, Some(value)) => FieldBinding::FixedValue(value),
            _ => FieldBinding::Unset,
        }
    }
}

impl From<FieldBinding> for BindingRepr {
    fn from(binding: FieldBinding) -> Self {
        match binding {
            FieldBinding::CollectionField(path) => BindingRepr {
                collection_field: Some(path),
                fixed_value: None,
            },
            FieldBinding::FixedValue(value) => BindingRepr {
                collection_field: None,
                fixed_value: Some(value),
            },
            FieldBinding::Unset => BindingRepr::default(),
        }
    }
}

/// A special-field payload entry: either a full binding or a bare source path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadEntry {
    Path(String),
    Binding(FieldBinding),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    #[serde(rename = "urlParams", alias = "url_params", alias = "query")]
    UrlParams,
    #[serde(rename = "headers")]
    Headers,
    #[serde(rename = "body")]
    Body,
}

impl Section {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Section::UrlParams => "urlParams",
            Section::Headers => "headers",
            Section::Body => "body",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadEncoding {
    #[default]
    #[serde(rename = "base64_json", alias = "base64Json", alias = "base64")]
    Base64Json,
    #[serde(rename = "jwt")]
    Jwt,
}

/// A field whose value is a constructed JSON object, encoded into one string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialField {
    pub section: Section,
    #[serde(alias = "fieldName")]
    pub field_name: String,
    #[serde(default)]
    pub payload: BTreeMap<String, PayloadEntry>,
    #[serde(default)]
    pub encoding: PayloadEncoding,
    /// HS256 secret for `jwt` encoding; falls back to the run-level secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMappingConfig {
    #[serde(default, alias = "urlParams")]
    pub url_params: BTreeMap<String, FieldBinding>,
    #[serde(default)]
    pub headers: BTreeMap<String, FieldBinding>,
    #[serde(default)]
    pub body: BTreeMap<String, FieldBinding>,
    #[serde(default, alias = "specialFields")]
    pub special_fields: Vec<SpecialField>,
}

/// Concrete values for one iteration, keyed by template field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFields {
    pub query_params: BTreeMap<String, Value>,
    pub headers: BTreeMap<String, Value>,
    pub body: BTreeMap<String, Value>,
}

impl ResolvedFields {
    pub(crate) fn section_mut(&mut self, section: Section) -> &mut BTreeMap<String, Value> {
        match section {
            Section::UrlParams => &mut self.query_params,
            Section::Headers => &mut self.headers,
            Section::Body => &mut self.body,
        }
    }
}
