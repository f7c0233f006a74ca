//! Key conversion between the API and storage: JSON keys are PascalCase (`SgradeName`),
//! column names are snake_case (`sgrade_name`).

use serde_json::{Map, Value};

/// snake_case -> PascalCase. e.g. "sgrade_name" -> "SgradeName", "cid" -> "Cid"
pub fn to_pascal_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = true;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// PascalCase or camelCase -> snake_case. e.g. "SgradeName" -> "sgrade_name"
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Lowercase with underscores removed; `AQtime`, `Aqtime` and `aqtime` all fold to `aqtime`.
pub fn fold_identifier(s: &str) -> String {
    s.chars().filter(|c| *c != '_').flat_map(char::to_lowercase).collect()
}

/// Rename every key of an object in place.
pub fn rename_keys(obj: &mut Map<String, Value>, rename: impl Fn(&str) -> String) {
    let keys: Vec<String> = obj.keys().cloned().collect();
    for k in keys {
        let renamed = rename(&k);
        if renamed != k {
            if let Some(v) = obj.remove(&k) {
                obj.insert(renamed, v);
            }
        }
    }
}
