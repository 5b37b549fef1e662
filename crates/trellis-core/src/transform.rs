//! Transformation rule builders
//!
//! Mirrors [`crate::validate`]: every builder tags the supplied transformer
//! with its target and hands it back untouched. Pass [`Origin`] to leave a
//! target unchanged in the pipeline.
//!
//! [`Origin`]: crate::rules::Origin

use crate::rules::{AggregationTarget, TransformationRule, Transformer, TransformerSpec};

fn rule(target: AggregationTarget, transformer: impl Into<TransformerSpec>) -> TransformationRule {
    TransformationRule {
        target,
        transformer: transformer.into(),
    }
}

/// Creates transformation rule for request headers.
pub fn headers(transformer: impl Into<TransformerSpec>) -> TransformationRule {
    rule(AggregationTarget::Headers, transformer)
}

/// Creates transformation rule for request query parameters.
pub fn queries(transformer: impl Into<TransformerSpec>) -> TransformationRule {
    rule(AggregationTarget::Queries, transformer)
}

/// Creates transformation rule for request body.
pub fn body(transformer: impl Into<TransformerSpec>) -> TransformationRule {
    rule(AggregationTarget::Body, transformer)
}

/// Creates transformation rule for path parameters.
pub fn params(transformer: impl Into<TransformerSpec>) -> TransformationRule {
    rule(AggregationTarget::Params, transformer)
}

/// Creates custom transformation rule for request.
pub fn custom(transformer: Transformer) -> TransformationRule {
    rule(AggregationTarget::Custom, transformer)
}
