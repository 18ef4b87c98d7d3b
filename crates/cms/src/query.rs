//! Query strings in the CMS's nested bracket dialect.
//!
//! `{ "filters": { "slug": { "$eq": "a b" } }, "fields": ["slug"] }` becomes
//! `filters[slug][$eq]=a%20b&fields[]=slug`. Keys go out verbatim, values are
//! percent-encoded (RFC 3986 unreserved set kept).

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

const VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub fn to_query_string(query: &Value) -> String {
    let mut pairs = Vec::new();
    if let Value::Object(map) = query {
        for (key, value) in map {
            flatten(key, value, &mut pairs);
        }
    }
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                flatten(&format!("{}[{}]", prefix, key), inner, out);
            }
        }
        Value::Array(items) => {
            let key = format!("{}[]", prefix);
            for item in items {
                flatten(&key, item, out);
            }
        }
        Value::String(s) => out.push((prefix.to_string(), encode(s))),
        Value::Number(n) => out.push((prefix.to_string(), n.to_string())),
        Value::Bool(b) => out.push((prefix.to_string(), b.to_string())),
        Value::Null => out.push((prefix.to_string(), String::new())),
    }
}

fn encode(s: &str) -> String {
    utf8_percent_encode(s, VALUE).to_string()
}
