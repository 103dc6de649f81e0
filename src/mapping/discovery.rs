use std::collections::BTreeSet;

use serde_json::Value;

/// Default nesting depth explored when listing field paths.
pub const DEFAULT_MAX_FIELD_DEPTH: usize = 5;

/// Lists dotted field paths found in a sample document.
///
/// Objects are walked up to `max_depth` segments; an object at the limit is
/// reported as a single leaf. Arrays are represented once with a `[0]`
/// suffix, following the shape of their first element only. Empty arrays are
/// leaves without the suffix.
#[must_use]
pub fn list_field_paths(document: &Value, max_depth: usize) -> Vec<String> {
    let mut paths = BTreeSet::new();
    if let Value::Object(map) = document {
        for (key, value) in map {
            collect(value, key.clone(), 1, max_depth.max(1), &mut paths);
        }
    }
    paths.into_iter().collect()
}

fn collect(
    value: &Value,
    path: String,
    depth: usize,
    max_depth: usize,
    paths: &mut BTreeSet<String>,
) {
    match value {
        Value::Object(map) if !map.is_empty() && depth < max_depth => {
            for (key, child) in map {
                collect(
                    child,
                    format!("{}.{}", path, key),
                    depth.saturating_add(1),
                    max_depth,
                    paths,
                );
            }
        }
        Value::Array(items) => match items.first() {
            Some(Value::Object(first)) if !first.is_empty() && depth < max_depth => {
                for (key, child) in first {
                    collect(
                        child,
                        format!("{}[0].{}", path, key),
                        depth.saturating_add(1),
                        max_depth,
                        paths,
                    );
                }
            }
            Some(_) => {
                paths.insert(format!("{}[0]", path));
            }
            None => {
                paths.insert(path);
            }
        },
        Value::Object(_) | Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            paths.insert(path);
        }
    }
}
