use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The request component a validation or transformation rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationTarget {
    /// Request headers
    Headers,
    /// Query string parameters
    Queries,
    /// Request body
    Body,
    /// Path parameters
    Params,
    /// Whole-request custom extraction
    Custom,
}

impl AggregationTarget {
    /// All targets, in declaration order.
    pub const ALL: [AggregationTarget; 5] = [
        AggregationTarget::Headers,
        AggregationTarget::Queries,
        AggregationTarget::Body,
        AggregationTarget::Params,
        AggregationTarget::Custom,
    ];

    /// Lower-case name of the target.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Headers => "headers",
            Self::Queries => "queries",
            Self::Body => "body",
            Self::Params => "params",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for AggregationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|target| target.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownTarget(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(AggregationTarget::Params).unwrap(),
            serde_json::json!("params")
        );
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("BODY".parse::<AggregationTarget>().unwrap(), AggregationTarget::Body);
        assert!(matches!(
            "cookies".parse::<AggregationTarget>(),
            Err(Error::UnknownTarget(name)) if name == "cookies"
        ));
    }
}
