use serde_json::Value;

use crate::error::MappingError;

const FIRST_INDEX_SUFFIX: &str = "[0]";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    key: String,
    first_element: bool,
}

/// A parsed dotted path such as `profile.addresses[0].city`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Parses a dotted path. Each segment may end with a single `[0]`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::InvalidFieldPath`] for empty paths, empty
    /// segments, or bracket syntax other than a trailing `[0]`.
    pub fn parse(raw: &str) -> Result<Self, MappingError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid(raw, "path is empty"));
        }

        let mut segments = Vec::new();
        for part in trimmed.split('.') {
            let (key, first_element) = match part.strip_suffix(FIRST_INDEX_SUFFIX) {
                Some(key) => (key, true),
                None => (part, false),
            };
            if key.is_empty() {
                return Err(invalid(raw, "empty segment"));
            }
            if key.contains('[') || key.contains(']') {
                return Err(invalid(raw, "only a single trailing [0] index is supported"));
            }
            segments.push(Segment {
                key: key.to_owned(),
                first_element,
            });
        }

        Ok(Self {
            raw: trimmed.to_owned(),
            segments,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Walks `record` along the path. `None` means the field is undefined.
    #[must_use]
    pub fn lookup<'doc>(&self, record: &'doc Value) -> Option<&'doc Value> {
        let mut current = record;
        for segment in &self.segments {
            current = step(current, &segment.key)?;
            if segment.first_element {
                current = current.as_array()?.first()?;
            }
        }
        Some(current)
    }
}

fn step<'doc>(value: &'doc Value, key: &str) -> Option<&'doc Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
    }
}

fn invalid(raw: &str, reason: &'static str) -> MappingError {
    MappingError::InvalidFieldPath {
        path: raw.to_owned(),
        reason,
    }
}
