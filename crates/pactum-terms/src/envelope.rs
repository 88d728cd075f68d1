use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level key holding the schema inside a terms definition.
pub const ENVELOPE_KEY: &str = "declaredSchema";
const ENVELOPE_KEY_SNAKE: &str = "declared_schema";

/// Why a definition has no usable envelope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    #[error("definition must be an object, found {found}")]
    DefinitionNotObject { found: &'static str },

    #[error("definition has no `declaredSchema` envelope")]
    Missing,

    #[error("`declaredSchema` must be an object schema, found {found}")]
    SchemaNotObject { found: &'static str },

    #[error("malformed envelope metadata: {message}")]
    Malformed { message: String },
}

/// The schema a party declares, unwrapped from its envelope.
///
/// ```json
/// {
///   "name": "orders-feed",
///   "version": "1.2.0",
///   "declaredSchema": { "type": "object", "required": ["id"] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeclaredSchema {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    schema: Value,
}

#[derive(Deserialize)]
struct EnvelopeMeta {
    name: Option<String>,
    version: Option<String>,
    description: Option<String>,
}

impl DeclaredSchema {
    /// Locate and check the envelope in `definition`.
    pub fn from_definition(definition: &Value) -> Result<Self, EnvelopeError> {
        let map = definition
            .as_object()
            .ok_or(EnvelopeError::DefinitionNotObject {
                found: kind_of(definition),
            })?;

        let schema = map
            .get(ENVELOPE_KEY)
            .or_else(|| map.get(ENVELOPE_KEY_SNAKE))
            .ok_or(EnvelopeError::Missing)?;
        if !schema.is_object() {
            return Err(EnvelopeError::SchemaNotObject {
                found: kind_of(schema),
            });
        }

        let meta = EnvelopeMeta::deserialize(definition).map_err(|err| EnvelopeError::Malformed {
            message: err.to_string(),
        })?;

        Ok(Self {
            name: meta.name,
            version: meta.version,
            description: meta.description,
            schema: schema.clone(),
        })
    }

    /// The unwrapped schema. Always a JSON object.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn into_schema(self) -> Value {
        self.schema
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
