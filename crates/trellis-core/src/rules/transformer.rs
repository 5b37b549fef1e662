//! Transformer function shapes and transformation definitions.

use super::fields::FieldMap;
use super::target::AggregationTarget;
use futures_util::future::BoxFuture;
use http::request::Parts;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Synchronous pipe producing the new field value from the current one and the raw values.
pub type PipeFn = Arc<dyn Fn(&Value, Option<&Value>) -> Value + Send + Sync>;

/// Asynchronous pipe producing the new field value.
pub type AsyncPipeFn = Arc<dyn Fn(Value, Option<Value>) -> BoxFuture<'static, Value> + Send + Sync>;

/// Whole-request transformer that edits the request head in place.
pub type RequestTransformerFn = Arc<dyn Fn(&mut Parts) + Send + Sync>;

/// Asynchronous whole-request transformer.
pub type AsyncRequestTransformerFn =
    Arc<dyn for<'a> Fn(&'a mut Parts) -> BoxFuture<'a, ()> + Send + Sync>;

/// A value that produces an async pipe on demand.
pub trait ExecutablePipe: Send + Sync {
    /// Produce the pipe to run.
    fn exec(&self) -> AsyncPipeFn;
}

/// A single transformer in any of its accepted shapes.
#[derive(Clone)]
pub enum Transformer {
    Pipe(PipeFn),
    AsyncPipe(AsyncPipeFn),
    Request(RequestTransformerFn),
    AsyncRequest(AsyncRequestTransformerFn),
    Executable(Arc<dyn ExecutablePipe>),
}

impl Transformer {
    /// Wrap a synchronous pipe.
    pub fn pipe<F>(pipe: F) -> Self
    where
        F: Fn(&Value, Option<&Value>) -> Value + Send + Sync + 'static,
    {
        Transformer::Pipe(Arc::new(pipe))
    }

    /// Wrap an async pipe.
    pub fn async_pipe<F, Fut>(pipe: F) -> Self
    where
        F: Fn(Value, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        let func: AsyncPipeFn = Arc::new(
            move |value: Value, raw: Option<Value>| -> BoxFuture<'static, Value> {
                Box::pin(pipe(value, raw))
            },
        );
        Transformer::AsyncPipe(func)
    }

    /// Wrap a request transformer.
    pub fn request<F>(transformer: F) -> Self
    where
        F: Fn(&mut Parts) + Send + Sync + 'static,
    {
        Transformer::Request(Arc::new(transformer))
    }

    /// Wrap an async request transformer.
    ///
    /// The closure must return a boxed future borrowing the request head.
    pub fn async_request<F>(transformer: F) -> Self
    where
        F: for<'a> Fn(&'a mut Parts) -> BoxFuture<'a, ()> + Send + Sync + 'static,
    {
        Transformer::AsyncRequest(Arc::new(transformer))
    }

    /// Wrap a deferred pipe chain.
    pub fn executable(pipe: impl ExecutablePipe + 'static) -> Self {
        Transformer::Executable(Arc::new(pipe))
    }

    /// Short name of the shape, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Transformer::Pipe(_) => "pipe",
            Transformer::AsyncPipe(_) => "async_pipe",
            Transformer::Request(_) => "request",
            Transformer::AsyncRequest(_) => "async_request",
            Transformer::Executable(_) => "executable",
        }
    }
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transformer::{}", self.kind())
    }
}

/// Marker telling the engine to leave the target unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Origin;

impl Origin {
    /// Literal form of the marker.
    pub const MARKER: &'static str = "origin";
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::MARKER)
    }
}

impl Serialize for Origin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(Self::MARKER)
    }
}

/// Flat per-field pipes, used for headers, queries and params.
pub type TransformationDefinition = FieldMap<Transformer>;

/// Per-field pipes that may nest, used for request bodies.
pub type BodyTransformationDefinition = FieldMap<TransformerNode>;

/// An entry of a [`BodyTransformationDefinition`].
#[derive(Debug, Clone)]
pub enum TransformerNode {
    Transformer(Transformer),
    Nested(BodyTransformationDefinition),
}

impl From<Transformer> for TransformerNode {
    fn from(transformer: Transformer) -> Self {
        TransformerNode::Transformer(transformer)
    }
}

impl From<BodyTransformationDefinition> for TransformerNode {
    fn from(definition: BodyTransformationDefinition) -> Self {
        TransformerNode::Nested(definition)
    }
}

/// The transformer carried by a [`TransformationRule`].
#[derive(Debug, Clone)]
pub enum TransformerSpec {
    Fields(TransformationDefinition),
    Body(BodyTransformationDefinition),
    Function(Transformer),
    Origin(Origin),
}

impl TransformerSpec {
    /// Check if this is the pass-through marker.
    pub fn is_origin(&self) -> bool {
        matches!(self, TransformerSpec::Origin(_))
    }
}

impl From<TransformationDefinition> for TransformerSpec {
    fn from(definition: TransformationDefinition) -> Self {
        TransformerSpec::Fields(definition)
    }
}

impl From<BodyTransformationDefinition> for TransformerSpec {
    fn from(definition: BodyTransformationDefinition) -> Self {
        TransformerSpec::Body(definition)
    }
}

impl From<Transformer> for TransformerSpec {
    fn from(transformer: Transformer) -> Self {
        TransformerSpec::Function(transformer)
    }
}

impl From<Origin> for TransformerSpec {
    fn from(marker: Origin) -> Self {
        TransformerSpec::Origin(marker)
    }
}

/// A transformer tagged with the request component it applies to.
#[derive(Debug, Clone)]
pub struct TransformationRule {
    pub target: AggregationTarget,
    pub transformer: TransformerSpec,
}
