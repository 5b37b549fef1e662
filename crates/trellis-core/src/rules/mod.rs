//! Validation and transformation rules
//!
//! A rule pairs an [`AggregationTarget`] with a validator or transformer. Rules
//! are listed in a route's aggregate pipeline and executed in order by the
//! router engine; nothing here inspects the supplied functions.

mod fields;
mod target;
mod transformer;
mod validator;

pub use fields::FieldMap;
pub use target::AggregationTarget;
pub use transformer::{
    AsyncPipeFn, AsyncRequestTransformerFn, BodyTransformationDefinition, ExecutablePipe, Origin,
    PipeFn, RequestTransformerFn, TransformationDefinition, TransformationRule, Transformer,
    TransformerNode, TransformerSpec,
};
pub use validator::{
    AsyncValidatorFn, BodyValidationDefinition, ExecutableValidator, ValidationDefinition,
    ValidationRule, Validator, ValidatorFn, ValidatorNode, ValidatorSpec, Verdict,
};

/// One stage of a route's aggregate pipeline.
#[derive(Debug, Clone)]
pub enum AggregateRule {
    Validation(ValidationRule),
    Transformation(TransformationRule),
}

impl AggregateRule {
    /// The request component this stage applies to.
    pub fn target(&self) -> AggregationTarget {
        match self {
            AggregateRule::Validation(rule) => rule.target,
            AggregateRule::Transformation(rule) => rule.target,
        }
    }

    /// Check if this stage validates.
    pub fn is_validation(&self) -> bool {
        matches!(self, AggregateRule::Validation(_))
    }

    /// Check if this stage transforms.
    pub fn is_transformation(&self) -> bool {
        matches!(self, AggregateRule::Transformation(_))
    }
}

impl From<ValidationRule> for AggregateRule {
    fn from(rule: ValidationRule) -> Self {
        AggregateRule::Validation(rule)
    }
}

impl From<TransformationRule> for AggregateRule {
    fn from(rule: TransformationRule) -> Self {
        AggregateRule::Transformation(rule)
    }
}
