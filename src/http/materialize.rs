use std::collections::BTreeMap;

use http::Method;
use serde_json::{Map, Value};
use url::Url;

use crate::error::HttpError;

const CONTENT_TYPE: &str = "Content-Type";
const JSON_CONTENT_TYPE: &str = "application/json";

/// A fully concrete request, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedRequest {
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

/// Builds the final request from resolved values.
///
/// Query parameters are appended to `base_url` as a form-encoded query
/// string. `Content-Type: application/json` is added unless a header of that
/// name (any case) is present. The body is sent only for POST, PUT, and PATCH
/// with at least one field; dotted body keys become nested objects.
///
/// # Errors
///
/// Returns [`HttpError::InvalidUrl`] when `base_url` cannot be parsed.
pub fn materialize(
    method: &Method,
    base_url: &str,
    query_params: &BTreeMap<String, Value>,
    headers: &BTreeMap<String, String>,
    body: &BTreeMap<String, Value>,
) -> Result<MaterializedRequest, HttpError> {
    let mut url = Url::parse(base_url).map_err(|err| HttpError::InvalidUrl {
        url: base_url.to_owned(),
        source: err,
    })?;
    if !query_params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query_params {
            pairs.append_pair(key, &render_value(value));
        }
    }

    let mut headers = headers.clone();
    if !headers
        .keys()
        .any(|name| name.eq_ignore_ascii_case(CONTENT_TYPE))
    {
        headers.insert(CONTENT_TYPE.to_owned(), JSON_CONTENT_TYPE.to_owned());
    }

    let sends_body = *method == Method::POST || *method == Method::PUT || *method == Method::PATCH;
    let body = if sends_body && !body.is_empty() {
        Some(Value::Object(nest_dotted_keys(body)).to_string())
    } else {
        None
    };

    Ok(MaterializedRequest {
        method: method.clone(),
        url: url.into(),
        headers,
        body,
    })
}

/// Overlays resolved mapping headers on the template's static headers.
/// Names compare case-insensitively; the resolved value wins.
#[must_use]
pub fn merge_headers(
    static_headers: &BTreeMap<String, String>,
    resolved: &BTreeMap<String, Value>,
) -> BTreeMap<String, String> {
    let mut merged = static_headers.clone();
    for (name, value) in resolved {
        merged.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        merged.insert(name.clone(), render_value(value));
    }
    merged
}

/// Overlays resolved query parameters on the template's own query string.
/// Keys compare exactly; the resolved value wins.
#[must_use]
pub fn merge_query(
    static_params: &BTreeMap<String, String>,
    resolved: &BTreeMap<String, Value>,
) -> BTreeMap<String, Value> {
    let mut merged: BTreeMap<String, Value> = static_params
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();
    merged.extend(
        resolved
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    merged
}

/// Renders a JSON value as a query/header string: strings verbatim, `null`
/// as empty, anything else as compact JSON.
#[must_use]
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn nest_dotted_keys(body: &BTreeMap<String, Value>) -> Map<String, Value> {
    let mut root = Map::new();
    for (key, value) in body {
        if !insert_nested(&mut root, key, value.clone()) {
            root.insert(key.clone(), value.clone());
        }
    }
    root
}

/// Returns false when an intermediate segment is already a non-object.
fn insert_nested(root: &mut Map<String, Value>, key: &str, value: Value) -> bool {
    let mut segments = key.split('.').peekable();
    let mut current = root;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_owned(), value);
            return true;
        }
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match entry {
            Value::Object(next) => next,
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
                return false;
            }
        };
    }
    false
}
