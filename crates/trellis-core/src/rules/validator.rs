//! Validator function shapes and validation definitions.

use super::fields::FieldMap;
use super::target::AggregationTarget;
use crate::error::RuleError;
use futures_util::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Outcome of a validator: `Ok(true)` passes, `Ok(false)` or `Err` rejects.
pub type Verdict = Result<bool, RuleError>;

/// Synchronous validator receiving the field value and the raw aggregated values.
pub type ValidatorFn = Arc<dyn Fn(&Value, Option<&Value>) -> Verdict + Send + Sync>;

/// Asynchronous validator receiving the field value and the raw aggregated values.
pub type AsyncValidatorFn =
    Arc<dyn Fn(Value, Option<Value>) -> BoxFuture<'static, Verdict> + Send + Sync>;

/// A value that produces an async validator on demand.
///
/// Chained validator builders implement this so the engine can obtain a
/// single callable once the chain is complete.
pub trait ExecutableValidator: Send + Sync {
    /// Produce the validator to run.
    fn exec(&self) -> AsyncValidatorFn;
}

/// A single validator in any of its accepted shapes.
#[derive(Clone)]
pub enum Validator {
    /// Plain synchronous predicate
    Sync(ValidatorFn),
    /// Predicate returning a future
    Async(AsyncValidatorFn),
    /// Deferred validator chain
    Executable(Arc<dyn ExecutableValidator>),
}

impl Validator {
    /// Wrap a synchronous predicate.
    pub fn sync<F>(validator: F) -> Self
    where
        F: Fn(&Value, Option<&Value>) -> Verdict + Send + Sync + 'static,
    {
        Validator::Sync(Arc::new(validator))
    }

    /// Wrap an async predicate.
    pub fn asynchronous<F, Fut>(validator: F) -> Self
    where
        F: Fn(Value, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Verdict> + Send + 'static,
    {
        let func: AsyncValidatorFn = Arc::new(
            move |value: Value, raw: Option<Value>| -> BoxFuture<'static, Verdict> {
                Box::pin(validator(value, raw))
            },
        );
        Validator::Async(func)
    }

    /// Wrap a deferred validator chain.
    pub fn executable(validator: impl ExecutableValidator + 'static) -> Self {
        Validator::Executable(Arc::new(validator))
    }

    /// Short name of the shape, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Validator::Sync(_) => "sync",
            Validator::Async(_) => "async",
            Validator::Executable(_) => "executable",
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validator::{}", self.kind())
    }
}

/// Flat per-field validators, used for headers, queries and params.
pub type ValidationDefinition = FieldMap<Validator>;

/// Per-field validators that may nest, used for request bodies.
pub type BodyValidationDefinition = FieldMap<ValidatorNode>;

/// An entry of a [`BodyValidationDefinition`].
#[derive(Debug, Clone)]
pub enum ValidatorNode {
    Validator(Validator),
    Nested(BodyValidationDefinition),
}

impl From<Validator> for ValidatorNode {
    fn from(validator: Validator) -> Self {
        ValidatorNode::Validator(validator)
    }
}

impl From<BodyValidationDefinition> for ValidatorNode {
    fn from(definition: BodyValidationDefinition) -> Self {
        ValidatorNode::Nested(definition)
    }
}

/// The validator carried by a [`ValidationRule`], in whichever shape it was supplied.
#[derive(Debug, Clone)]
pub enum ValidatorSpec {
    Fields(ValidationDefinition),
    Body(BodyValidationDefinition),
    Function(Validator),
}

impl From<ValidationDefinition> for ValidatorSpec {
    fn from(definition: ValidationDefinition) -> Self {
        ValidatorSpec::Fields(definition)
    }
}

impl From<BodyValidationDefinition> for ValidatorSpec {
    fn from(definition: BodyValidationDefinition) -> Self {
        ValidatorSpec::Body(definition)
    }
}

impl From<Validator> for ValidatorSpec {
    fn from(validator: Validator) -> Self {
        ValidatorSpec::Function(validator)
    }
}

/// A validator tagged with the request component it applies to.
#[derive(Debug, Clone)]
pub struct ValidationRule {
    pub target: AggregationTarget,
    pub validator: ValidatorSpec,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct AlwaysValid;

    impl ExecutableValidator for AlwaysValid {
        fn exec(&self) -> AsyncValidatorFn {
            Arc::new(|_: Value, _: Option<Value>| -> BoxFuture<'static, Verdict> {
                Box::pin(async { Ok(true) })
            })
        }
    }

    #[test]
    fn sync_validator_is_callable() {
        let validator = Validator::sync(|value, _| Ok(value.is_string()));
        let Validator::Sync(func) = validator else {
            panic!("expected sync validator");
        };
        assert_eq!(func(&json!("abc"), None), Ok(true));
        assert_eq!(func(&json!(1), None), Ok(false));
    }

    #[tokio::test]
    async fn async_validator_sees_raw_values() {
        let validator = Validator::asynchronous(|value, raw| async move {
            let expected = raw.as_ref().and_then(|r| r.get("confirm")).cloned();
            Ok::<_, RuleError>(Some(value) == expected)
        });
        let Validator::Async(func) = validator else {
            panic!("expected async validator");
        };
        let raw = json!({ "confirm": "secret" });
        assert_eq!(func(json!("secret"), Some(raw.clone())).await, Ok(true));
        assert_eq!(func(json!("other"), Some(raw)).await, Ok(false));
    }

    #[tokio::test]
    async fn executable_validator_produces_function() {
        let validator = Validator::executable(AlwaysValid);
        assert_eq!(validator.kind(), "executable");
        let Validator::Executable(chain) = validator else {
            panic!("expected executable validator");
        };
        assert_eq!((chain.exec())(json!(null), None).await, Ok(true));
    }

    #[test]
    fn body_definition_nests() {
        let definition = BodyValidationDefinition::new()
            .field("name", Validator::sync(|v, _| Ok(v.is_string())))
            .field(
                "address",
                BodyValidationDefinition::new().field("city", Validator::sync(|_, _| Ok(true))),
            );
        assert!(matches!(definition.get("name"), Some(ValidatorNode::Validator(_))));
        assert!(matches!(
            definition.get("address"),
            Some(ValidatorNode::Nested(inner)) if inner.contains("city")
        ));
    }

    #[test]
    fn debug_names_the_shape() {
        let validator = Validator::sync(|_, _| Ok(true));
        assert_eq!(format!("{:?}", validator), "Validator::sync");
    }
}
