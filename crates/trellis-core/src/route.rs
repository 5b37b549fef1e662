//! Route definitions
//!
//! A router module lists its routes as [`RouteDefinition`] records. Each record
//! binds a verb and a path to the names of the middleware that handle it and to
//! an ordered pipeline of validation/transformation rules.
//!
//! # Example
//!
//! ```rust
//! use trellis_core::aggregate;
//! use trellis_core::rules::Origin;
//! use trellis_core::{route, transform, RouteMethod};
//!
//! let routes = vec![
//!     route::global("*", "logger"),
//!     route::get("/users/:id", ["auth", "get-user"])
//!         .aggregate(aggregate![transform::params(Origin)]),
//! ];
//!
//! assert!(routes[0].is_global());
//! assert_eq!(routes[1].method, Some(RouteMethod::Get));
//! ```

use crate::cors::CorsPolicy;
use crate::error::{Error, Result};
use crate::method::RouteMethod;
use crate::rules::AggregateRule;

/// Builds an aggregate pipeline from validation and transformation rules.
///
/// ```rust
/// use trellis_core::{aggregate, transform, validate};
/// use trellis_core::rules::{Origin, Validator};
///
/// let pipeline = aggregate![
///     validate::custom(Validator::sync(|_, _| Ok(true))),
///     transform::body(Origin),
/// ];
/// assert_eq!(pipeline.len(), 2);
/// ```
#[macro_export]
macro_rules! aggregate {
    ($($rule:expr),* $(,)?) => {
        ::std::vec![$($crate::rules::AggregateRule::from($rule)),*]
    };
}

/// Values accepted as the middleware of a route: one name or a list of names.
pub trait IntoMiddleware {
    fn into_middleware(self) -> Vec<String>;
}

impl IntoMiddleware for &str {
    fn into_middleware(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoMiddleware for String {
    fn into_middleware(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoMiddleware for &String {
    fn into_middleware(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl IntoMiddleware for Vec<String> {
    fn into_middleware(self) -> Vec<String> {
        self
    }
}

impl IntoMiddleware for Vec<&str> {
    fn into_middleware(self) -> Vec<String> {
        self.into_iter().map(String::from).collect()
    }
}

impl IntoMiddleware for &[&str] {
    fn into_middleware(self) -> Vec<String> {
        self.iter().map(|name| name.to_string()).collect()
    }
}

impl<const N: usize> IntoMiddleware for [&str; N] {
    fn into_middleware(self) -> Vec<String> {
        self.into_iter().map(String::from).collect()
    }
}

/// A declarative route: verb, path, middleware names and aggregate pipeline.
///
/// `method` is `None` for global routes, which the router runs as an
/// unconditional pipeline stage for every request matching `path`.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    pub method: Option<RouteMethod>,
    pub path: String,
    pub middleware: Vec<String>,
    pub aggregate: Option<Vec<AggregateRule>>,
    pub cors_policy: Option<CorsPolicy>,
}

impl RouteDefinition {
    /// Set the aggregate pipeline.
    pub fn aggregate(mut self, rules: Vec<AggregateRule>) -> Self {
        self.aggregate = Some(rules);
        self
    }

    /// Append one rule to the aggregate pipeline.
    pub fn rule(mut self, rule: impl Into<AggregateRule>) -> Self {
        self.aggregate.get_or_insert_with(Vec::new).push(rule.into());
        self
    }

    /// Override the CORS policy for this route.
    pub fn cors_policy(mut self, policy: CorsPolicy) -> Self {
        self.cors_policy = Some(policy);
        self
    }

    /// Check if this route applies to every method.
    pub fn is_global(&self) -> bool {
        self.method.is_none()
    }

    /// The bound verb as an `http::Method`.
    pub fn http_method(&self) -> Option<http::Method> {
        self.method.map(Into::into)
    }

    /// Rules of the aggregate pipeline, empty if none were set.
    pub fn rules(&self) -> &[AggregateRule] {
        self.aggregate.as_deref().unwrap_or_default()
    }
}

/// Builds a route definition. Every verb builder delegates here.
pub fn define(
    method: Option<RouteMethod>,
    path: impl Into<String>,
    middleware: impl IntoMiddleware,
    aggregate: Option<Vec<AggregateRule>>,
    cors_policy: Option<CorsPolicy>,
) -> RouteDefinition {
    let definition = RouteDefinition {
        method,
        path: path.into(),
        middleware: middleware.into_middleware(),
        aggregate,
        cors_policy,
    };

    tracing::trace!(
        method = definition.method.map(|m| m.as_str()).unwrap_or("global"),
        path = %definition.path,
        middleware = definition.middleware.len(),
        "route defined"
    );

    definition
}

/// Route bound to `method`.
pub fn on(
    method: RouteMethod,
    path: impl Into<String>,
    middleware: impl IntoMiddleware,
) -> RouteDefinition {
    define(Some(method), path, middleware, None, None)
}

/// Creates a global route definition, run for all methods.
pub fn global(path: impl Into<String>, middleware: impl IntoMiddleware) -> RouteDefinition {
    define(None, path, middleware, None, None)
}

/// Creates a GET route definition.
pub fn get(path: impl Into<String>, middleware: impl IntoMiddleware) -> RouteDefinition {
    on(RouteMethod::Get, path, middleware)
}

/// Creates a POST route definition.
pub fn post(path: impl Into<String>, middleware: impl IntoMiddleware) -> RouteDefinition {
    on(RouteMethod::Post, path, middleware)
}

/// Creates a PUT route definition.
pub fn put(path: impl Into<String>, middleware: impl IntoMiddleware) -> RouteDefinition {
    on(RouteMethod::Put, path, middleware)
}

/// Creates a DELETE route definition.
pub fn delete(path: impl Into<String>, middleware: impl IntoMiddleware) -> RouteDefinition {
    on(RouteMethod::Delete, path, middleware)
}

/// Creates a PATCH route definition.
pub fn patch(path: impl Into<String>, middleware: impl IntoMiddleware) -> RouteDefinition {
    on(RouteMethod::Patch, path, middleware)
}

const BUILDERS: [(&str, Option<RouteMethod>); 6] = [
    ("global", None),
    ("get", Some(RouteMethod::Get)),
    ("post", Some(RouteMethod::Post)),
    ("put", Some(RouteMethod::Put)),
    ("delete", Some(RouteMethod::Delete)),
    ("patch", Some(RouteMethod::Patch)),
];

/// Resolves a builder name (`"get"`, `"GET"`, `"global"`, ...) to its verb.
///
/// `Ok(None)` is the global builder.
pub fn lookup(name: &str) -> Result<Option<RouteMethod>> {
    BUILDERS
        .iter()
        .find(|(builder, _)| builder.eq_ignore_ascii_case(name))
        .map(|(_, method)| *method)
        .ok_or_else(|| Error::UnknownMethod(name.to_string()))
}

/// Creates a route definition through the builder named `name`, in any case.
pub fn by_name(
    name: &str,
    path: impl Into<String>,
    middleware: impl IntoMiddleware,
) -> Result<RouteDefinition> {
    Ok(define(lookup(name)?, path, middleware, None, None))
}
