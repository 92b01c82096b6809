//! Error types for store operations.

use thiserror::Error;

/// Errors returned by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The field was not part of the state the store was created with.
    #[error("unknown field `{field}`")]
    UnknownField { field: String },

    /// Initial state or merge delta was not a JSON object.
    #[error("expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    /// A typed value could not be converted into a JSON value.
    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    /// A stored JSON value could not be converted into the requested type.
    #[error("failed to decode field `{field}`: {source}")]
    Decode {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// The state record could not be converted into the state type.
    #[error("failed to decode state: {0}")]
    DecodeState(#[source] serde_json::Error),
}

impl StoreError {
    pub(crate) fn unknown_field(field: &str) -> Self {
        Self::UnknownField {
            field: field.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Name of a JSON value's kind, for error messages.
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_field_message() {
        let err = StoreError::unknown_field("profile");
        assert_eq!(err.to_string(), "unknown field `profile`");
    }

    #[test]
    fn not_an_object_message() {
        let err = StoreError::NotAnObject {
            found: kind_of(&json!([1, 2])),
        };
        assert_eq!(err.to_string(), "expected a JSON object, found an array");
    }
}
