use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::Method;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde_json::{Map, Value, json};

use super::{
    DEFAULT_MAX_FIELD_DEPTH, FieldBinding, FieldMappingConfig, FieldPath, MappingPlan,
    PayloadEncoding, PayloadEntry, Section, SpecialField, decode_special_payload,
    list_field_paths, resolve, scaffold_mapping,
};
use crate::error::MappingError;
use crate::http::RequestTemplate;

fn special(
    section: Section,
    name: &str,
    encoding: PayloadEncoding,
    payload: &[(&str, PayloadEntry)],
) -> SpecialField {
    SpecialField {
        section,
        field_name: name.to_owned(),
        payload: payload
            .iter()
            .map(|(key, entry)| ((*key).to_owned(), entry.clone()))
            .collect(),
        encoding,
        secret: None,
    }
}

fn decode_base64_object(encoded: &Value) -> Result<Value, String> {
    let text = encoded
        .as_str()
        .ok_or_else(|| format!("Expected string, got {}", encoded))?;
    let bytes = STANDARD
        .decode(text)
        .map_err(|err| format!("Invalid base64: {}", err))?;
    serde_json::from_slice(&bytes).map_err(|err| format!("Invalid JSON: {}", err))
}

#[test]
fn collection_field_resolves_defined_values_only() -> Result<(), String> {
    let mut config = FieldMappingConfig::default();
    config
        .url_params
        .insert("x".to_owned(), FieldBinding::collection("a.b"));
    config
        .url_params
        .insert("missing".to_owned(), FieldBinding::collection("a.c"));

    let resolved = resolve(&json!({"a": {"b": 42}}), &config).map_err(|err| err.to_string())?;
    let expected: BTreeMap<String, Value> = [("x".to_owned(), json!(42))].into_iter().collect();
    if resolved.query_params != expected {
        return Err(format!("Unexpected query params: {:?}", resolved.query_params));
    }
    Ok(())
}

#[test]
fn fixed_value_ignores_record() -> Result<(), String> {
    let mut config = FieldMappingConfig::default();
    config
        .headers
        .insert("X-Env".to_owned(), FieldBinding::fixed("staging"));
    config.body.insert("retries".to_owned(), FieldBinding::fixed(3));

    for record in [json!({}), json!({"X-Env": "prod"}), json!(null)] {
        let resolved = resolve(&record, &config).map_err(|err| err.to_string())?;
        if resolved.headers.get("X-Env") != Some(&json!("staging"))
            || resolved.body.get("retries") != Some(&json!(3))
        {
            return Err(format!("Fixed values changed for record {}", record));
        }
    }
    Ok(())
}

#[test]
fn unset_bindings_contribute_nothing() -> Result<(), String> {
    let config: FieldMappingConfig = serde_json::from_value(json!({
        "urlParams": {"a": {}, "b": {"collectionField": ""}, "c": {"fixedValue": 1}}
    }))
    .map_err(|err| format!("Failed to parse mapping: {}", err))?;

    if config.url_params.get("a") != Some(&FieldBinding::Unset) {
        return Err(format!("Expected unset binding, got {:?}", config.url_params));
    }
    let resolved = resolve(&json!({"a": 1}), &config).map_err(|err| err.to_string())?;
    if resolved.query_params.keys().collect::<Vec<_>>() != vec!["c"] {
        return Err(format!("Unexpected params: {:?}", resolved.query_params));
    }
    Ok(())
}

#[test]
fn first_element_and_numeric_segments_index_arrays() -> Result<(), String> {
    let record = json!({
        "orders": [{"id": "o-1"}, {"id": "o-2"}],
        "tags": ["x", "y"]
    });
    let first = FieldPath::parse("orders[0].id").map_err(|err| err.to_string())?;
    let second = FieldPath::parse("orders.1.id").map_err(|err| err.to_string())?;
    let tag = FieldPath::parse("tags[0]").map_err(|err| err.to_string())?;

    if first.lookup(&record) != Some(&json!("o-1")) {
        return Err("orders[0].id did not resolve".to_owned());
    }
    if second.lookup(&record) != Some(&json!("o-2")) {
        return Err("orders.1.id did not resolve".to_owned());
    }
    if tag.lookup(&record) != Some(&json!("x")) {
        return Err("tags[0] did not resolve".to_owned());
    }
    if first.lookup(&json!({"orders": []})).is_some() {
        return Err("Empty array should be undefined".to_owned());
    }
    if first.as_str() != "orders[0].id" {
        return Err(format!("Unexpected raw path: {}", first.as_str()));
    }
    Ok(())
}

#[test]
fn malformed_paths_are_rejected() -> Result<(), String> {
    for raw in ["", "a..b", ".a", "a.", "a[1]", "a[0][0]", "a[0"] {
        match FieldPath::parse(raw) {
            Err(MappingError::InvalidFieldPath { .. }) => {}
            other => return Err(format!("Expected '{}' to fail, got {:?}", raw, other)),
        }
    }
    Ok(())
}

#[test]
fn compile_surfaces_bad_special_payload_paths() -> Result<(), String> {
    let mut config = FieldMappingConfig::default();
    config.special_fields.push(special(
        Section::Headers,
        "X-Ctx",
        PayloadEncoding::Base64Json,
        &[("user", PayloadEntry::Path("user..id".to_owned()))],
    ));
    match MappingPlan::compile(&config, None) {
        Err(MappingError::InvalidFieldPath { path, .. }) if path == "user..id" => Ok(()),
        other => Err(format!("Expected invalid path, got {:?}", other.map(|_| ()))),
    }
}

#[test]
fn special_field_encodes_base64_json_and_drops_unresolved_keys() -> Result<(), String> {
    let mut config = FieldMappingConfig::default();
    config.special_fields.push(special(
        Section::UrlParams,
        "ctx",
        PayloadEncoding::Base64Json,
        &[
            ("user", PayloadEntry::Path("user.id".to_owned())),
            ("region", PayloadEntry::Path("user.region".to_owned())),
            ("empty", PayloadEntry::Path(String::new())),
            ("app", PayloadEntry::Binding(FieldBinding::fixed("mapload"))),
        ],
    ));

    let resolved =
        resolve(&json!({"user": {"id": 9}}), &config).map_err(|err| err.to_string())?;
    let encoded = resolved
        .query_params
        .get("ctx")
        .ok_or_else(|| "Special field missing".to_owned())?;
    let decoded = decode_base64_object(encoded)?;
    if decoded != json!({"user": 9, "app": "mapload"}) {
        return Err(format!("Unexpected payload: {}", decoded));
    }
    Ok(())
}

#[test]
fn last_special_field_wins_on_same_name() -> Result<(), String> {
    let mut config = FieldMappingConfig::default();
    config
        .headers
        .insert("auth".to_owned(), FieldBinding::fixed("plain"));
    config.special_fields.push(special(
        Section::Headers,
        "auth",
        PayloadEncoding::Base64Json,
        &[("v", PayloadEntry::Binding(FieldBinding::fixed(1)))],
    ));
    config.special_fields.push(special(
        Section::Headers,
        "auth",
        PayloadEncoding::Base64Json,
        &[("v", PayloadEntry::Binding(FieldBinding::fixed(2)))],
    ));

    let resolved = resolve(&json!({}), &config).map_err(|err| err.to_string())?;
    let encoded = resolved
        .headers
        .get("auth")
        .ok_or_else(|| "auth header missing".to_owned())?;
    let decoded = decode_base64_object(encoded)?;
    if decoded != json!({"v": 2}) {
        return Err(format!("Expected last special field, got {}", decoded));
    }
    Ok(())
}

#[test]
fn jwt_special_field_signs_with_field_or_run_secret() -> Result<(), String> {
    let mut own_secret = special(
        Section::Headers,
        "X-Token",
        PayloadEncoding::Jwt,
        &[("sub", PayloadEntry::Path("id".to_owned()))],
    );
    own_secret.secret = Some("field-secret".to_owned());
    let run_secret = special(
        Section::Body,
        "token",
        PayloadEncoding::Jwt,
        &[("sub", PayloadEntry::Path("id".to_owned()))],
    );

    let config = FieldMappingConfig {
        special_fields: vec![own_secret, run_secret],
        ..FieldMappingConfig::default()
    };
    let plan = MappingPlan::compile(&config, Some("run-secret")).map_err(|err| err.to_string())?;
    let resolved = plan.resolve(&json!({"id": "u-1"}));

    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();
    validation.validate_exp = false;

    for (token, secret) in [
        (resolved.headers.get("X-Token"), "field-secret"),
        (resolved.body.get("token"), "run-secret"),
    ] {
        let token = token
            .and_then(Value::as_str)
            .ok_or_else(|| "Token missing".to_owned())?;
        let data = decode::<Map<String, Value>>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|err| format!("Token did not verify with {}: {}", secret, err))?;
        if data.claims.get("sub") != Some(&json!("u-1")) {
            return Err(format!("Unexpected claims: {:?}", data.claims));
        }
    }
    Ok(())
}

#[test]
fn decode_special_payload_reads_base64_and_jwt() -> Result<(), String> {
    let base64 = STANDARD.encode(br#"{"user":1,"tier":"gold"}"#);
    let (encoding, payload) = decode_special_payload(&base64).map_err(|err| err.to_string())?;
    if encoding != PayloadEncoding::Base64Json {
        return Err(format!("Unexpected encoding: {:?}", encoding));
    }
    if payload.get("tier") != Some(&PayloadEntry::Binding(FieldBinding::fixed("gold"))) {
        return Err(format!("Unexpected payload: {:?}", payload));
    }

    // header {"alg":"HS256","typ":"JWT"}, claims {"sub":"42"}
    let jwt = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiI0MiJ9.c2ln";
    let (encoding, payload) = decode_special_payload(jwt).map_err(|err| err.to_string())?;
    if encoding != PayloadEncoding::Jwt {
        return Err(format!("Unexpected encoding: {:?}", encoding));
    }
    if payload.get("sub") != Some(&PayloadEntry::Binding(FieldBinding::fixed("42"))) {
        return Err(format!("Unexpected payload: {:?}", payload));
    }

    let array_payload = STANDARD.encode(b"[1,2]");
    for bad in ["", "not base64!", array_payload.as_str()] {
        match decode_special_payload(bad) {
            Err(MappingError::Decoding { .. }) => {}
            other => return Err(format!("Expected decode failure for '{}', got {:?}", bad, other)),
        }
    }
    Ok(())
}

#[test]
fn list_field_paths_flattens_with_first_element_shape() -> Result<(), String> {
    let document = json!({
        "_id": "abc",
        "profile": {"name": "ada", "address": {"city": "x"}},
        "orders": [{"sku": "a"}, {"qty": 2}],
        "tags": ["a"],
        "empty": [],
        "meta": {}
    });
    let paths = list_field_paths(&document, DEFAULT_MAX_FIELD_DEPTH);
    let expected = vec![
        "_id",
        "empty",
        "meta",
        "orders[0].sku",
        "profile.address.city",
        "profile.name",
        "tags[0]",
    ];
    if paths != expected {
        return Err(format!("Unexpected paths: {:?}", paths));
    }

    let shallow = list_field_paths(&document, 2);
    if !shallow.contains(&"profile.address".to_owned()) {
        return Err(format!("Depth limit not applied: {:?}", shallow));
    }
    if !list_field_paths(&json!([1, 2]), DEFAULT_MAX_FIELD_DEPTH).is_empty() {
        return Err("Non-object documents have no fields".to_owned());
    }
    Ok(())
}

#[test]
fn scaffold_binds_matching_fields_and_keeps_template_values() -> Result<(), String> {
    let mut template = RequestTemplate::new(Method::POST, "http://api.local/users".to_owned());
    template
        .query_params
        .insert("Email".to_owned(), "a@b.c".to_owned());
    template
        .headers
        .insert("X-Trace".to_owned(), "t-1".to_owned());
    template.data = Some(json!({"user": {"name": "ada", "roles": ["admin"]}, "count": 2}));

    let fields = vec!["email".to_owned(), "name".to_owned()];
    let config = scaffold_mapping(&template, &fields);

    if config.url_params.get("Email") != Some(&FieldBinding::collection("email")) {
        return Err(format!("Unexpected url params: {:?}", config.url_params));
    }
    if config.headers.get("X-Trace") != Some(&FieldBinding::fixed("t-1")) {
        return Err(format!("Unexpected headers: {:?}", config.headers));
    }
    let expected_body: BTreeMap<String, FieldBinding> = [
        ("count".to_owned(), FieldBinding::fixed(2)),
        ("user.name".to_owned(), FieldBinding::collection("name")),
        ("user.roles".to_owned(), FieldBinding::fixed(json!(["admin"]))),
    ]
    .into_iter()
    .collect();
    if config.body != expected_body {
        return Err(format!("Unexpected body: {:?}", config.body));
    }
    Ok(())
}

#[test]
fn mapping_config_accepts_snake_and_camel_case() -> Result<(), String> {
    let camel: FieldMappingConfig = serde_json::from_value(json!({
        "urlParams": {"id": {"collectionField": "user.id"}},
        "specialFields": [{
            "section": "headers",
            "fieldName": "X-Ctx",
            "payload": {"id": "user.id", "kind": {"fixedValue": "a"}},
            "encoding": "base64Json"
        }]
    }))
    .map_err(|err| format!("camelCase parse failed: {}", err))?;

    let snake: FieldMappingConfig = toml::from_str(
        r#"
[url_params]
id = { collection_field = "user.id" }

[[special_fields]]
section = "headers"
field_name = "X-Ctx"
encoding = "base64_json"

[special_fields.payload]
id = "user.id"
kind = { fixed_value = "a" }
"#,
    )
    .map_err(|err| format!("snake_case parse failed: {}", err))?;

    if camel != snake {
        return Err(format!("Configs differ: {:?} vs {:?}", camel, snake));
    }
    Ok(())
}

#[test]
fn scaffold_detects_encoded_special_fields() -> Result<(), String> {
    let mut template = RequestTemplate::new(Method::GET, "http://api.local/".to_owned());
    template
        .headers
        .insert("X-Ctx".to_owned(), STANDARD.encode(br#"{"tenant":"acme"}"#));
    template
        .headers
        .insert("Accept".to_owned(), "application/json".to_owned());

    let config = scaffold_mapping(&template, &[]);
    let [field] = config.special_fields.as_slice() else {
        return Err(format!("Expected one special field: {:?}", config.special_fields));
    };
    if field.section != Section::Headers
        || field.field_name != "X-Ctx"
        || field.encoding != PayloadEncoding::Base64Json
    {
        return Err(format!("Unexpected special field: {:?}", field));
    }
    if field.payload.get("tenant") != Some(&PayloadEntry::Binding(FieldBinding::fixed("acme"))) {
        return Err(format!("Unexpected payload: {:?}", field.payload));
    }
    Ok(())
}
