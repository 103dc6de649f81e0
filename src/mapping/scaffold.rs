use std::collections::BTreeMap;

use serde_json::Value;

use crate::http::RequestTemplate;

use super::encoding::decode_special_payload;
use super::types::{FieldBinding, FieldMappingConfig, Section, SpecialField};

/// Builds a starting mapping for a parsed request template.
///
/// Every query parameter, header, and (flattened) body field keeps its
/// template value as a fixed binding, unless its name case-insensitively
/// matches one of `field_paths`, in which case it is bound to that path.
/// String values that decode as base64 JSON or a JWT also get a special field
/// entry carrying the decoded payload.
#[must_use]
pub fn scaffold_mapping(template: &RequestTemplate, field_paths: &[String]) -> FieldMappingConfig {
    let url_params = template
        .query_params
        .iter()
        .map(|(key, value)| {
            (
                key.clone(),
                bind(key, Value::String(value.clone()), field_paths),
            )
        })
        .collect();

    let headers = template
        .headers
        .iter()
        .map(|(key, value)| {
            (
                key.clone(),
                bind(key, Value::String(value.clone()), field_paths),
            )
        })
        .collect();

    let mut body = BTreeMap::new();
    if let Some(Value::Object(object)) = template.data.as_ref() {
        flatten_body(object, "", field_paths, &mut body);
    }

    let mut special_fields = Vec::new();
    for (key, value) in &template.query_params {
        push_special(&mut special_fields, Section::UrlParams, key, value);
    }
    for (key, value) in &template.headers {
        push_special(&mut special_fields, Section::Headers, key, value);
    }
    for (key, binding) in &body {
        if let FieldBinding::FixedValue(Value::String(value)) = binding {
            push_special(&mut special_fields, Section::Body, key, value);
        }
    }

    FieldMappingConfig {
        url_params,
        headers,
        body,
        special_fields,
    }
}

fn push_special(out: &mut Vec<SpecialField>, section: Section, field_name: &str, value: &str) {
    if let Ok((encoding, payload)) = decode_special_payload(value) {
        out.push(SpecialField {
            section,
            field_name: field_name.to_owned(),
            payload,
            encoding,
            secret: None,
        });
    }
}

fn flatten_body(
    object: &serde_json::Map<String, Value>,
    prefix: &str,
    field_paths: &[String],
    out: &mut BTreeMap<String, FieldBinding>,
) {
    for (key, value) in object {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(nested) => flatten_body(nested, &path, field_paths, out),
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
                out.insert(path, bind(key, value.clone(), field_paths));
            }
        }
    }
}

fn bind(key: &str, template_value: Value, field_paths: &[String]) -> FieldBinding {
    field_paths
        .iter()
        .find(|path| path.eq_ignore_ascii_case(key))
        .map_or(FieldBinding::FixedValue(template_value), |path| {
            FieldBinding::CollectionField(path.clone())
        })
}
