//! Validation rule builders
//!
//! Each builder tags the supplied validator with its target. The shape of the
//! validator is not checked here; the router engine rejects unusable
//! definitions when it runs them.
//!
//! # Example
//!
//! ```rust
//! use trellis_core::rules::{AggregationTarget, ValidationDefinition, Validator};
//! use trellis_core::validate;
//!
//! let rule = validate::headers(
//!     ValidationDefinition::new().field("x-api-key", Validator::sync(|v, _| Ok(v.is_string()))),
//! );
//! assert_eq!(rule.target, AggregationTarget::Headers);
//! ```

use crate::rules::{AggregationTarget, ValidationRule, Validator, ValidatorSpec};

fn rule(target: AggregationTarget, validator: impl Into<ValidatorSpec>) -> ValidationRule {
    ValidationRule {
        target,
        validator: validator.into(),
    }
}

/// Creates validation rule for request headers.
pub fn headers(validator: impl Into<ValidatorSpec>) -> ValidationRule {
    rule(AggregationTarget::Headers, validator)
}

/// Creates validation rule for request query parameters.
pub fn queries(validator: impl Into<ValidatorSpec>) -> ValidationRule {
    rule(AggregationTarget::Queries, validator)
}

/// Creates validation rule for request body.
pub fn body(validator: impl Into<ValidatorSpec>) -> ValidationRule {
    rule(AggregationTarget::Body, validator)
}

/// Creates validation rule for path parameters.
pub fn params(validator: impl Into<ValidatorSpec>) -> ValidationRule {
    rule(AggregationTarget::Params, validator)
}

/// Creates custom validation rule for request.
pub fn custom(validator: Validator) -> ValidationRule {
    rule(AggregationTarget::Custom, validator)
}
