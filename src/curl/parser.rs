use std::collections::BTreeMap;

use http::Method;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::args::parse_header;
use crate::error::CurlError;
use crate::http::RequestTemplate;

use super::tokenize::tokenize;

/// Flags whose value is consumed and discarded.
const IGNORED_VALUE_FLAGS: [&str; 30] = [
    "-u",
    "--user",
    "-o",
    "--output",
    "-e",
    "--referer",
    "-c",
    "--cookie-jar",
    "-m",
    "--max-time",
    "--connect-timeout",
    "-x",
    "--proxy",
    "-w",
    "--write-out",
    "--retry",
    "-F",
    "--form",
    "--cacert",
    "--cert",
    "-E",
    "--key",
    "-T",
    "--upload-file",
    "-r",
    "--range",
    "--resolve",
    "--connect-to",
    "-K",
    "--config",
];

/// Short flags that accept an attached value, as in `-XPOST`.
const ATTACHABLE_SHORT_FLAGS: [char; 7] = ['X', 'H', 'd', 'A', 'b', 'u', 'o'];

#[derive(Debug, Default)]
struct ParsedParts {
    method: Option<String>,
    url: Option<String>,
    headers: BTreeMap<String, String>,
    data: Vec<String>,
}

/// Parses a curl command line into a request template.
///
/// # Errors
///
/// Returns [`CurlError`] for empty input, commands that are not curl,
/// unterminated quotes, flags missing their value, and a missing or
/// unparsable URL.
pub fn parse_curl_command(raw: &str) -> Result<RequestTemplate, CurlError> {
    let tokens = tokenize(raw)?;
    let mut tokens = tokens.into_iter();
    let program = tokens.next().ok_or(CurlError::Empty)?;
    if program != "curl" && !program.ends_with("/curl") {
        return Err(CurlError::NotCurl { found: program });
    }

    let mut parts = ParsedParts::default();
    while let Some(token) = tokens.next() {
        let (flag, attached) = split_flag(&token);
        let mut value = |flag: &str| -> Result<String, CurlError> {
            match attached.clone() {
                Some(value) => Ok(value),
                None => tokens.next().ok_or_else(|| CurlError::MissingFlagValue {
                    flag: flag.to_owned(),
                }),
            }
        };

        match flag {
            "-X" | "--request" => parts.method = Some(value(flag)?),
            "-H" | "--header" => insert_header(&mut parts.headers, &value(flag)?),
            "-d" | "--data" | "--data-raw" | "--data-binary" | "--data-ascii" => {
                parts.data.push(value(flag)?);
            }
            "--json" => {
                parts.data.push(value(flag)?);
                parts
                    .headers
                    .entry("Content-Type".to_owned())
                    .or_insert_with(|| "application/json".to_owned());
                parts
                    .headers
                    .entry("Accept".to_owned())
                    .or_insert_with(|| "application/json".to_owned());
            }
            "-A" | "--user-agent" => {
                parts.headers.insert("User-Agent".to_owned(), value(flag)?);
            }
            "-b" | "--cookie" => {
                let cookie = value(flag)?;
                if cookie.contains('=') {
                    parts.headers.insert("Cookie".to_owned(), cookie);
                }
            }
            "--url" => parts.url = Some(value(flag)?),
            ignored if IGNORED_VALUE_FLAGS.contains(&ignored) => {
                value(flag)?;
            }
            other if other.starts_with('-') && other.len() > 1 => {
                debug!("Ignoring curl flag '{}'", other);
            }
            _ if parts.url.is_none() => parts.url = Some(token.clone()),
            _ => debug!("Ignoring extra curl argument '{}'", token),
        }
    }

    build_template(parts)
}

fn split_flag(token: &str) -> (&str, Option<String>) {
    if let Some(long) = token.strip_prefix("--") {
        return match long.split_once('=') {
            Some((name, value)) => (
                token.get(..name.len().saturating_add(2)).unwrap_or(token),
                Some(value.to_owned()),
            ),
            None => (token, None),
        };
    }

    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some('-'), Some(short)) if ATTACHABLE_SHORT_FLAGS.contains(&short) && token.len() > 2 => {
            (
                token.get(..2).unwrap_or(token),
                token.get(2..).map(str::to_owned),
            )
        }
        _ => (token, None),
    }
}

fn insert_header(headers: &mut BTreeMap<String, String>, raw: &str) {
    match parse_header(raw) {
        Ok((key, value)) if !key.is_empty() => {
            headers.insert(key, value);
        }
        Ok(_) | Err(_) => warn!("Skipping malformed curl header '{}'", raw),
    }
}

fn build_template(parts: ParsedParts) -> Result<RequestTemplate, CurlError> {
    let raw_url = parts.url.ok_or(CurlError::MissingUrl)?;
    let with_scheme = if raw_url.contains("://") {
        raw_url.clone()
    } else {
        format!("http://{}", raw_url)
    };
    let mut url = Url::parse(&with_scheme).map_err(|err| CurlError::InvalidUrl {
        url: raw_url,
        source: err,
    })?;

    let query_params: BTreeMap<String, String> = url
        .query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    url.set_query(None);
    url.set_fragment(None);

    let data = if parts.data.is_empty() {
        None
    } else {
        let text = parts.data.join("&");
        Some(serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text)))
    };

    let method = match parts.method {
        Some(method) => Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|_err| CurlError::InvalidMethod { method })?,
        None if data.is_some() => Method::POST,
        None => Method::GET,
    };

    Ok(RequestTemplate {
        method,
        url: url.into(),
        query_params,
        headers: parts.headers,
        data,
    })
}
