//! # Trellis Core
//!
//! Declarative building blocks shared by every Trellis crate: route
//! definitions, validation and transformation rules, CORS policies, module
//! metadata and server configuration.
//!
//! Nothing in this crate executes a request. The records built here are read
//! by the router engine when the application starts.
//!
//! This crate is not meant to be used directly. Use `trellis-rs` instead.

pub mod config;
pub mod cors;
mod error;
mod method;
pub mod module;
mod resolve;
pub mod route;
pub mod rules;
pub mod transform;
pub mod validate;

// Public API
pub use config::{ConfigProfiles, Environment, LogLevel, LogLevels, ServerConfig};
pub use cors::{AllowedOrigin, CorsPolicy};
pub use error::{Error, Result, RuleError};
pub use method::RouteMethod;
pub use module::{Module, ModuleDecoratorArgs, ModuleMetadata, ModuleType, RouterDecoratorArgs};
pub use resolve::resolve_ref;
pub use route::{IntoMiddleware, RouteDefinition};
pub use rules::{AggregateRule, AggregationTarget, TransformationRule, ValidationRule};
