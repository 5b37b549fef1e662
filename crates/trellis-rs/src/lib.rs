//! # Trellis
//!
//! Declarative building blocks for HTTP servers: route definitions with
//! aggregate validation/transformation pipelines, CORS policies, module
//! metadata, layered server configuration and plugin lifecycle hooks.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trellis_rs::prelude::*;
//!
//! let routes = vec![
//!     route::global("/", "requestId"),
//!     route::post("/users", ["auth", "createUser"]).aggregate(aggregate![
//!         validate::body(
//!             ValidationDefinition::new()
//!                 .field("email", Validator::sync(|value, _| Ok(value.is_string()))),
//!         ),
//!         transform::headers(Origin),
//!     ]),
//! ];
//!
//! let users = ModuleMetadata::router(RouterDecoratorArgs::new("users", routes));
//! ```
//!
//! ## Features
//!
//! - `config` (default) - `.env` loading and `TRELLIS_*` environment
//!   overrides for [`ServerConfig`]

mod logging;

// Re-export core functionality
pub use trellis_core::*;

// Re-export the plugin layer
pub use trellis_plugin as plugin;
pub use trellis_plugin::{
    async_trait, OnConfig, OnInit, OnInjection, OnInterception, PluginBus, PluginError,
    PluginEvent, PluginEventData, PluginListener, Services,
};

pub use logging::{filter_directive, init_tracing};

/// Prelude module - import everything you need with `use trellis_rs::prelude::*`
pub mod prelude {
    // Builders
    pub use trellis_core::{aggregate, route, transform, validate};

    // Route declarations
    pub use trellis_core::{
        AggregateRule, AggregationTarget, CorsPolicy, RouteDefinition, RouteMethod,
        TransformationRule, ValidationRule,
    };

    // Rule shapes
    pub use trellis_core::rules::{
        BodyTransformationDefinition, BodyValidationDefinition, Origin, TransformationDefinition,
        Transformer, TransformerNode, ValidationDefinition, Validator, ValidatorNode,
    };

    // Modules and configuration
    pub use trellis_core::{
        ConfigProfiles, Environment, Module, ModuleDecoratorArgs, ModuleMetadata,
        RouterDecoratorArgs, RuleError, ServerConfig,
    };

    // Plugin lifecycle
    pub use trellis_plugin::{
        async_trait, MiddlewareStage, OnConfig, OnInit, OnInjection, OnInterception, Phase,
        PluginBus, PluginError, PluginEvent, PluginEventData, PluginListener, Services,
    };

    pub use crate::init_tracing;

    // Re-export commonly used external types
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{json, Value};
    pub use tracing::{debug, error, info, trace, warn};
}
