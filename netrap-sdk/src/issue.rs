use serde::Serialize;
use thiserror::Error;

/// Recoverable problem found while reading an inventory.
///
/// None of these abort report generation; they are logged and carried
/// alongside the report so callers can surface them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InventoryIssue {
    #[error("{scope}: missing field `{field}`")]
    MissingField { scope: String, field: &'static str },

    #[error("{scope}: malformed `{field}` value {value}, skipped")]
    MalformedValue {
        scope: String,
        field: &'static str,
        value: String,
    },

    #[error("last_updated `{raw}` is not a valid timestamp, shown verbatim")]
    TimestampParseFailure { raw: String },
}

impl InventoryIssue {
    pub fn missing(scope: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            scope: scope.into(),
            field,
        }
    }

    pub fn malformed(
        scope: impl Into<String>,
        field: &'static str,
        value: &serde_json::Value,
    ) -> Self {
        Self::MalformedValue {
            scope: scope.into(),
            field,
            value: value.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            InventoryIssue::MissingField { .. } => "missing_field",
            InventoryIssue::MalformedValue { .. } => "malformed_value",
            InventoryIssue::TimestampParseFailure { .. } => "timestamp_parse_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_names_scope_and_field() {
        let issue = InventoryIssue::malformed("HQ/sw-01", "uptime_days", &json!("soon"));
        assert_eq!(
            issue.to_string(),
            "HQ/sw-01: malformed `uptime_days` value \"soon\", skipped"
        );
        assert_eq!(issue.kind(), "malformed_value");
    }

    #[test]
    fn serializes_with_kind_tag() {
        let issue = InventoryIssue::missing("HQ", "devices");
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["kind"], "missing_field");
        assert_eq!(value["field"], "devices");
    }
}
