use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::error::{Result, SourceError};

/// Recognized declaration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// Detect the format from a file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse `text` read from `path`.
///
/// Files without a recognized extension are sniffed as JSON.
pub fn parse_document(path: &Path, text: &str) -> Result<(DocumentFormat, Value)> {
    match DocumentFormat::from_path(path) {
        Some(DocumentFormat::Json) => parse_json(path, text).map(|v| (DocumentFormat::Json, v)),
        Some(DocumentFormat::Toml) => parse_toml(path, text).map(|v| (DocumentFormat::Toml, v)),
        None => serde_json::from_str(text)
            .map(|v| (DocumentFormat::Json, v))
            .map_err(|_| SourceError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
    }
}

fn parse_json(path: &Path, text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|err| SourceError::Parse {
        path: path.to_path_buf(),
        format: DocumentFormat::Json.as_str(),
        message: err.to_string(),
    })
}

fn parse_toml(path: &Path, text: &str) -> Result<Value> {
    toml::from_str::<Value>(text).map_err(|err| SourceError::Parse {
        path: path.to_path_buf(),
        format: DocumentFormat::Toml.as_str(),
        message: err.message().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn detects_format_by_extension() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("a/terms.JSON")),
            Some(DocumentFormat::Json)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("terms.toml")),
            Some(DocumentFormat::Toml)
        );
        assert_eq!(DocumentFormat::from_path(Path::new("terms.yaml")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("terms")), None);
    }

    #[test]
    fn parses_toml_into_json_value() {
        let text = r#"
name = "orders"

[declaredSchema]
type = "object"
required = ["id"]
"#;
        let (format, value) = parse_document(Path::new("orders.toml"), text).unwrap();
        assert_eq!(format, DocumentFormat::Toml);
        assert_eq!(value["name"], json!("orders"));
        assert_eq!(value["declaredSchema"]["required"], json!(["id"]));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = parse_document(Path::new("bad.json"), "{ not json").unwrap_err();
        assert!(matches!(err, SourceError::Parse { format: "json", .. }));
        assert!(err.is_parse());
    }

    #[test]
    fn unknown_extension_sniffs_json() {
        let (format, value) = parse_document(Path::new("terms.decl"), r#"{"a":1}"#).unwrap();
        assert_eq!(format, DocumentFormat::Json);
        assert_eq!(value, json!({"a": 1}));

        let err = parse_document(Path::new("terms.decl"), "a = 1").unwrap_err();
        assert!(matches!(err, SourceError::UnsupportedFormat { .. }));
    }
}
