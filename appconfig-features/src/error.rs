//! Error types for feature construction, evaluation and snapshot loading.

use crate::value::FlagType;
use thiserror::Error;

/// A configuration record could not be turned into a [`FeatureFlag`](crate::FeatureFlag).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// A required key is absent (or explicitly `null`)
    #[error("Missing field: {field}")]
    MissingField { field: &'static str },

    /// A key is present with the wrong JSON type
    #[error("Field '{field}' must be {expected}, found {found}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// `type` is not one of BOOLEAN, STRING, NUMERIC
    #[error("Unknown feature type: {0}")]
    UnknownFlagType(String),
}

/// A value could not be read as the declared flag type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("Expected a {expected} value, found {found}")]
    Mismatch {
        expected: FlagType,
        found: &'static str,
    },
}

/// Resolving a feature value for an identity failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// The identity id was empty
    #[error("Identity id must not be empty")]
    MissingIdentity,

    /// The value selected for the identity does not match the feature type
    #[error("Invalid value for feature '{feature_id}': {source}")]
    InvalidValue {
        feature_id: String,
        #[source]
        source: ValueError,
    },

    /// No feature with this id in the set
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),
}

/// A configuration snapshot could not be loaded into a [`FeatureSet`](crate::FeatureSet).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("Malformed snapshot: {0}")]
    Malformed(String),

    #[error("Duplicate feature id: {0}")]
    DuplicateFeatureId(String),

    #[error("Invalid feature at index {index}: {source}")]
    InvalidFeature {
        index: usize,
        #[source]
        source: ConstructionError,
    },
}

/// Human-readable JSON kind, used in mismatch messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_kind() {
        assert_eq!(json_kind(&json!(null)), "null");
        assert_eq!(json_kind(&json!(true)), "boolean");
        assert_eq!(json_kind(&json!(1.5)), "number");
        assert_eq!(json_kind(&json!("x")), "string");
        assert_eq!(json_kind(&json!([])), "array");
        assert_eq!(json_kind(&json!({})), "object");
    }

    #[test]
    fn test_error_display() {
        let err = ConstructionError::TypeMismatch {
            field: "isEnabled",
            expected: "boolean",
            found: "string",
        };
        assert_eq!(err.to_string(), "Field 'isEnabled' must be boolean, found string");

        let err = SnapshotError::InvalidFeature {
            index: 2,
            source: ConstructionError::MissingField {
                field: "enabled_value",
            },
        };
        assert!(err.to_string().contains("index 2"));
        assert!(err.to_string().contains("enabled_value"));
    }
}
