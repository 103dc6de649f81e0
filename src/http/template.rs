use std::collections::BTreeMap;

use http::Method;
use serde_json::Value;

/// A request as written in the source curl command, before substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTemplate {
    pub method: Method,
    /// Base URL with the query string removed.
    pub url: String,
    pub query_params: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON body, or a JSON string holding raw body text that was not
    /// valid JSON.
    pub data: Option<Value>,
}

impl RequestTemplate {
    #[must_use]
    pub fn new(method: Method, url: String) -> Self {
        Self {
            method,
            url,
            query_params: BTreeMap::new(),
            headers: BTreeMap::new(),
            data: None,
        }
    }
}
