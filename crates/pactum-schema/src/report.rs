use std::fmt;

use serde::Serialize;

use crate::validator::ValidationErrorRecord;

/// Validation errors in the order the engine produced them.
///
/// Displays as one `path: message` line per error. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationErrorRecord>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationErrorRecord> {
        self.errors.iter()
    }

    /// A single-line summary of the first `limit` errors.
    pub fn summary(&self, limit: usize) -> String {
        let mut message = self
            .errors
            .iter()
            .take(limit)
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        if self.errors.len() > limit {
            message.push_str(&format!(" (+{} more)", self.errors.len() - limit));
        }
        message
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

/// Build a report from an engine-produced error list.
pub fn report_validation_errors(errors: &[ValidationErrorRecord]) -> ValidationReport {
    ValidationReport {
        errors: errors.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(path: &str, message: &str) -> ValidationErrorRecord {
        ValidationErrorRecord {
            instance_path: path.to_string(),
            schema_path: "/type".to_string(),
            keyword: "type".to_string(),
            message: message.to_string(),
            expected: Some(json!("string")),
            actual: json!(1),
        }
    }

    #[test]
    fn keeps_order_and_duplicates() {
        let errors = vec![
            record("/b", "second"),
            record("/a", "first"),
            record("/b", "second"),
        ];
        let report = report_validation_errors(&errors);

        assert_eq!(report.len(), 3);
        assert_eq!(report.to_string(), "/b: second\n/a: first\n/b: second");
    }

    #[test]
    fn summary_truncates() {
        let errors = vec![record("/a", "x"), record("/b", "y"), record("/c", "z")];
        let report = report_validation_errors(&errors);
        assert_eq!(report.summary(2), "/a: x; /b: y (+1 more)");
        assert_eq!(report.summary(5), "/a: x; /b: y; /c: z");
    }

    #[test]
    fn empty_report_displays_nothing() {
        let report = report_validation_errors(&[]);
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "");
    }
}
