//! Builders for the response-schema dialect accepted by `generateContent`.
//!
//! The service uses an OpenAPI subset with upper-case type names. Only the
//! pieces the brand schemas need are covered here.

use serde_json::{json, Map, Value};

pub fn string() -> Value {
    json!({ "type": "STRING" })
}

pub fn string_described(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

pub fn string_enum(values: &[&str]) -> Value {
    json!({ "type": "STRING", "enum": values })
}

pub fn number() -> Value {
    json!({ "type": "NUMBER" })
}

pub fn array(items: Value) -> Value {
    json!({ "type": "ARRAY", "items": items })
}

/// Object schema. Every property listed in `required` must also appear in
/// `properties`.
pub fn object(properties: &[(&str, Value)], required: &[&str]) -> Value {
    debug_assert!(required
        .iter()
        .all(|r| properties.iter().any(|(name, _)| name == r)));

    let mut props = Map::new();
    for (name, schema) in properties {
        props.insert((*name).to_string(), schema.clone());
    }
    json!({
        "type": "OBJECT",
        "properties": Value::Object(props),
        "required": required,
    })
}

/// Object schema where every property is required.
pub fn strict_object(properties: &[(&str, Value)]) -> Value {
    let required: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();
    object(properties, &required)
}
