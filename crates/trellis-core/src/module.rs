//! Module metadata
//!
//! Services and routers are plain types that carry a [`ModuleMetadata`]
//! record. The metadata is what the framework reads when it installs
//! components: their name, their kind, their priority and, for routers,
//! the route table.

use crate::cors::CorsPolicy;
use crate::route::RouteDefinition;
use serde::{Deserialize, Serialize};

/// Kind of installed component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Service,
    Router,
}

/// Arguments shared by every module declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDecoratorArgs {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl ModuleDecoratorArgs {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: None,
        }
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Arguments of a router declaration.
#[derive(Debug, Clone, Default)]
pub struct RouterDecoratorArgs {
    pub name: String,
    pub priority: Option<i32>,
    pub routes: Vec<RouteDefinition>,
    pub cors_policy: Option<CorsPolicy>,
}

impl RouterDecoratorArgs {
    pub fn new(name: impl Into<String>, routes: Vec<RouteDefinition>) -> Self {
        Self {
            name: name.into(),
            priority: None,
            routes,
            cors_policy: None,
        }
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// CORS policy applied to every route of the router unless the route overrides it.
    pub fn cors_policy(mut self, policy: CorsPolicy) -> Self {
        self.cors_policy = Some(policy);
        self
    }
}

/// Metadata stamped onto a service or router.
#[derive(Debug, Clone)]
pub struct ModuleMetadata {
    pub name: String,
    pub module_type: ModuleType,
    pub routes: Option<Vec<RouteDefinition>>,
    pub priority: i32,
    pub cors_policy: Option<CorsPolicy>,
}

impl ModuleMetadata {
    /// Default priority for modules that do not set one.
    pub const DEFAULT_PRIORITY: i32 = 0;

    /// Metadata of a service module.
    pub fn service(args: ModuleDecoratorArgs) -> Self {
        Self {
            name: args.name,
            module_type: ModuleType::Service,
            routes: None,
            priority: args.priority.unwrap_or(Self::DEFAULT_PRIORITY),
            cors_policy: None,
        }
    }

    /// Metadata of a router module.
    pub fn router(args: RouterDecoratorArgs) -> Self {
        tracing::debug!(
            router = %args.name,
            routes = args.routes.len(),
            "router declared"
        );

        Self {
            name: args.name,
            module_type: ModuleType::Router,
            routes: Some(args.routes),
            priority: args.priority.unwrap_or(Self::DEFAULT_PRIORITY),
            cors_policy: args.cors_policy,
        }
    }

    pub fn is_router(&self) -> bool {
        self.module_type == ModuleType::Router
    }

    pub fn is_service(&self) -> bool {
        self.module_type == ModuleType::Service
    }

    /// Routes of a router, empty for services.
    pub fn routes(&self) -> &[RouteDefinition] {
        self.routes.as_deref().unwrap_or_default()
    }

    /// CORS policy in effect for `route`: the route's own policy layered
    /// over the router's.
    pub fn effective_cors_policy(&self, route: &RouteDefinition) -> Option<CorsPolicy> {
        match (&route.cors_policy, &self.cors_policy) {
            (Some(own), Some(inherited)) => Some(own.clone().or(inherited)),
            (Some(own), None) => Some(own.clone()),
            (None, inherited) => inherited.clone(),
        }
    }
}

/// A component carrying module metadata.
pub trait Module: Send + Sync {
    fn metadata(&self) -> &ModuleMetadata;
}

/// Sorts modules by descending priority. Equal priorities keep their order.
pub fn sort_by_priority(modules: &mut [ModuleMetadata]) {
    modules.sort_by(|a, b| b.priority.cmp(&a.priority));
}
