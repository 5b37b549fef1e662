//! Error types for Trellis

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Result type alias for Trellis operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while looking up declarations or loading configuration.
///
/// Builders and the reference resolver never fail; only name lookups and
/// configuration I/O produce these.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A route builder was requested for a verb that does not exist.
    #[error("unknown route method `{0}`")]
    UnknownMethod(String),

    /// An aggregation target name could not be parsed.
    #[error("unknown aggregation target `{0}`")]
    UnknownTarget(String),

    /// A configuration document was not valid JSON for the expected shape.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Environment overrides could not be deserialized.
    #[cfg(feature = "config")]
    #[error("invalid environment configuration: {0}")]
    Env(#[from] envy::Error),
}

/// Failure reported by a validator function.
///
/// A validator may reject a value either by returning `Ok(false)` or by
/// returning one of these, which carries a code and a message for the
/// external engine to report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleError {
    /// The validation rule code (e.g., "required", "length")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional parameters for message interpolation
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub params: HashMap<String, serde_json::Value>,
}

impl RuleError {
    /// Create a new rule error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            params: HashMap::new(),
        }
    }

    /// Add a parameter to the error.
    pub fn param(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.params.insert(key.into(), v);
        }
        self
    }

    /// Interpolate parameters into the message.
    ///
    /// Replaces `{param_name}` placeholders with actual values.
    pub fn interpolate_message(&self) -> String {
        let mut result = self.message.clone();
        for (key, value) in &self.params {
            let placeholder = format!("{{{}}}", key);
            let replacement = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            result = result.replace(&placeholder, &replacement);
        }
        result
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.interpolate_message())
    }
}

impl std::error::Error for RuleError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_error_interpolates_params() {
        let error = RuleError::new("length", "must be at least {min} characters").param("min", 3);
        assert_eq!(error.interpolate_message(), "must be at least 3 characters");
        assert_eq!(error.to_string(), "[length] must be at least 3 characters");
    }

    #[test]
    fn rule_error_skips_empty_params_when_serialized() {
        let json = serde_json::to_value(RuleError::new("required", "missing")).unwrap();
        assert_eq!(json["code"], "required");
        assert!(json.get("params").is_none());
    }

    #[test]
    fn unknown_method_display() {
        let err = Error::UnknownMethod("fetch".into());
        assert_eq!(err.to_string(), "unknown route method `fetch`");
    }
}
