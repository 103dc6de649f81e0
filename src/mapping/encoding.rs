use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Map, Value};

use crate::error::MappingError;

use super::types::{FieldBinding, PayloadEncoding, PayloadEntry};

/// Encodes a constructed payload object into a single field value.
///
/// # Errors
///
/// Returns [`MappingError::Encoding`] when serialization or signing fails.
pub(crate) fn encode_payload(
    field: &str,
    encoding: PayloadEncoding,
    payload: &Map<String, Value>,
    secret: &str,
) -> Result<String, MappingError> {
    match encoding {
        PayloadEncoding::Base64Json => {
            let bytes = serde_json::to_vec(payload).map_err(|err| MappingError::Encoding {
                field: field.to_owned(),
                reason: err.to_string(),
            })?;
            Ok(STANDARD.encode(bytes))
        }
        PayloadEncoding::Jwt => encode(
            &Header::new(Algorithm::HS256),
            payload,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|err| MappingError::Encoding {
            field: field.to_owned(),
            reason: err.to_string(),
        }),
    }
}

/// Decodes an existing encoded field value into a payload scaffold whose
/// entries hold the decoded values as fixed bindings.
///
/// Three dot-separated segments are read as a JWT (payload segment only, the
/// signature is not verified); anything else as base64 JSON.
///
/// # Errors
///
/// Returns [`MappingError::Decoding`] when the text is not valid base64 or
/// does not hold a JSON object.
pub fn decode_special_payload(
    encoded: &str,
) -> Result<(PayloadEncoding, BTreeMap<String, PayloadEntry>), MappingError> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Err(decoding("input is empty"));
    }

    let parts: Vec<&str> = encoded.split('.').collect();
    let (encoding, bytes) = match parts.as_slice() {
        [_, claims, _] => {
            let bytes = URL_SAFE_NO_PAD
                .decode(claims.trim_end_matches('='))
                .map_err(|err| decoding(&err.to_string()))?;
            (PayloadEncoding::Jwt, bytes)
        }
        _ => {
            let bytes = STANDARD
                .decode(encoded)
                .map_err(|err| decoding(&err.to_string()))?;
            (PayloadEncoding::Base64Json, bytes)
        }
    };

    let value: Value =
        serde_json::from_slice(&bytes).map_err(|err| decoding(&err.to_string()))?;
    let Value::Object(object) = value else {
        return Err(decoding("payload is not a JSON object"));
    };

    let payload = object
        .into_iter()
        .map(|(key, value)| (key, PayloadEntry::Binding(FieldBinding::FixedValue(value))))
        .collect();
    Ok((encoding, payload))
}

fn decoding(reason: &str) -> MappingError {
    MappingError::Decoding {
        reason: reason.to_owned(),
    }
}
