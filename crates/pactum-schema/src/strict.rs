//! Closing object schemas before compilation.

use serde_json::{Map, Value};

/// Keywords whose value is a map of name to subschema.
const SCHEMA_MAPS: [&str; 5] = [
    "properties",
    "patternProperties",
    "dependentSchemas",
    "$defs",
    "definitions",
];

/// Keywords whose value is a single subschema.
const SCHEMA_SINGLES: [&str; 11] = [
    "propertyNames",
    "additionalProperties",
    "unevaluatedProperties",
    "items",
    "contains",
    "additionalItems",
    "unevaluatedItems",
    "not",
    "if",
    "then",
    "else",
];

/// Keywords whose value is a list of subschemas.
const SCHEMA_LISTS: [&str; 4] = ["prefixItems", "allOf", "anyOf", "oneOf"];

const OBJECT_KEYWORDS: [&str; 8] = [
    "properties",
    "patternProperties",
    "additionalProperties",
    "unevaluatedProperties",
    "required",
    "dependentRequired",
    "dependentSchemas",
    "propertyNames",
];

/// Add `additionalProperties: false` to every object schema that leaves it
/// unspecified, at any depth.
pub fn close_object_schemas(schema: &mut Value) {
    match schema {
        Value::Object(map) => {
            if describes_object(map) && !map.contains_key("additionalProperties") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
            }
            for_each_subschema(map, close_object_schemas);
        }
        Value::Array(items) => items.iter_mut().for_each(close_object_schemas),
        _ => {}
    }
}

fn for_each_subschema(map: &mut Map<String, Value>, visit: fn(&mut Value)) {
    for keyword in SCHEMA_MAPS {
        if let Some(Value::Object(children)) = map.get_mut(keyword) {
            children.values_mut().for_each(visit);
        }
    }
    for keyword in SCHEMA_SINGLES {
        if let Some(child) = map.get_mut(keyword) {
            visit(child);
        }
    }
    for keyword in SCHEMA_LISTS {
        if let Some(Value::Array(children)) = map.get_mut(keyword) {
            children.iter_mut().for_each(visit);
        }
    }
}

/// True when the schema's `type` admits objects, or when it has no `type`
/// but uses object keywords.
pub fn describes_object(map: &Map<String, Value>) -> bool {
    match map.get("type") {
        Some(Value::String(kind)) => kind == "object",
        Some(Value::Array(kinds)) => kinds
            .iter()
            .any(|kind| matches!(kind, Value::String(k) if k == "object")),
        _ => OBJECT_KEYWORDS.iter().any(|kw| map.contains_key(*kw)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn closes_nested_objects_and_keeps_explicit_policy() {
        let mut schema = json!({
            "type": "object",
            "properties": {
                "nested": { "type": "object", "properties": { "v": { "type": "integer" } } },
                "open": { "type": "object", "additionalProperties": true },
                "list": { "type": "array", "items": { "required": ["x"] } }
            }
        });
        close_object_schemas(&mut schema);

        assert_eq!(schema["additionalProperties"], json!(false));
        assert_eq!(schema["properties"]["nested"]["additionalProperties"], json!(false));
        assert_eq!(schema["properties"]["open"]["additionalProperties"], json!(true));
        assert_eq!(
            schema["properties"]["list"]["items"]["additionalProperties"],
            json!(false)
        );
        assert!(schema["properties"]["list"].get("additionalProperties").is_none());
    }

    #[test]
    fn object_keywords_without_type_count_as_object() {
        let map = json!({"required": ["id"]});
        assert!(describes_object(map.as_object().unwrap()));
        let map = json!({"type": ["null", "object"]});
        assert!(describes_object(map.as_object().unwrap()));
        let map = json!({"type": "string", "minLength": 1});
        assert!(!describes_object(map.as_object().unwrap()));
    }
}
