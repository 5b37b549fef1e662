//! Lifecycle hooks
//!
//! Components opt into lifecycle callbacks by implementing these traits. The
//! server calls them in this order while starting up:
//!
//! 1. [`OnInjection`] once every service is installed
//! 2. [`OnConfig`] with the resolved configuration
//! 3. [`OnInit`] when the component is ready
//!
//! [`OnInterception`] runs per request, before routing, for components
//! registered as interceptors.
//!
//! # Example
//!
//! ```rust,ignore
//! use trellis_plugin::{async_trait, OnConfig, PluginError};
//! use trellis_core::ServerConfig;
//!
//! struct Mailer;
//!
//! #[async_trait]
//! impl OnConfig for Mailer {
//!     async fn on_config(&self, config: &ServerConfig) -> Result<(), PluginError> {
//!         tracing::info!(port = ?config.port, "mailer configured");
//!         Ok(())
//!     }
//! }
//! ```

use crate::error::Result;
use async_trait::async_trait;
use http::request::Parts;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use trellis_core::ServerConfig;

/// Called when the component has been installed and configured.
#[async_trait]
pub trait OnInit: Send + Sync {
    async fn on_init(&self) -> Result<()>;
}

/// Called with the configuration resolved for the current environment.
#[async_trait]
pub trait OnConfig: Send + Sync {
    async fn on_config(&self, config: &ServerConfig) -> Result<()>;
}

/// Called with every installed service.
#[async_trait]
pub trait OnInjection: Send + Sync {
    async fn on_injection(&self, services: &Services) -> Result<()>;
}

/// Called for each incoming request before it is routed.
///
/// Interceptors may rewrite the request head; returning an error rejects
/// the request.
#[async_trait]
pub trait OnInterception: Send + Sync {
    async fn on_interception(&self, request: &mut Parts) -> Result<()>;
}

/// Installed services, keyed by module name.
#[derive(Clone, Default)]
pub struct Services {
    entries: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Services {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service under `name`, replacing any previous one.
    pub fn insert<S: Any + Send + Sync>(&mut self, name: impl Into<String>, service: S) {
        self.insert_arc(name, Arc::new(service));
    }

    /// Register an already shared service.
    pub fn insert_arc<S: Any + Send + Sync>(&mut self, name: impl Into<String>, service: Arc<S>) {
        let service: Arc<dyn Any + Send + Sync> = service;
        self.entries.insert(name.into(), service);
    }

    /// Look up a service by name and type.
    ///
    /// Returns `None` if nothing is registered under `name` or if the
    /// registered service is not an `S`.
    pub fn get<S: Any + Send + Sync>(&self, name: &str) -> Option<Arc<S>> {
        self.entries.get(name)?.clone().downcast::<S>().ok()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Service names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PluginError;
    use http::header::{HeaderValue, AUTHORIZATION};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    struct Database {
        url: String,
    }

    #[derive(Default)]
    struct UsersService {
        db_url: Mutex<Option<String>>,
        port: Mutex<Option<u16>>,
        ready: AtomicBool,
    }

    #[async_trait]
    impl OnInjection for UsersService {
        async fn on_injection(&self, services: &Services) -> Result<()> {
            let db = services
                .get::<Database>("database")
                .ok_or_else(|| PluginError::hook("database service missing"))?;
            *self.db_url.lock().unwrap() = Some(db.url.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl OnConfig for UsersService {
        async fn on_config(&self, config: &ServerConfig) -> Result<()> {
            *self.port.lock().unwrap() = config.port;
            Ok(())
        }
    }

    #[async_trait]
    impl OnInit for UsersService {
        async fn on_init(&self) -> Result<()> {
            self.ready.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct RequireAuth;

    #[async_trait]
    impl OnInterception for RequireAuth {
        async fn on_interception(&self, request: &mut Parts) -> Result<()> {
            if request.headers.contains_key(AUTHORIZATION) {
                Ok(())
            } else {
                Err(PluginError::hook("missing authorization"))
            }
        }
    }

    #[test]
    fn services_typed_lookup() {
        let mut services = Services::new();
        services.insert("database", Database { url: "sqlite::memory:".into() });

        assert!(services.contains("database"));
        assert_eq!(services.get::<Database>("database").unwrap().url, "sqlite::memory:");
        assert!(services.get::<String>("database").is_none());
        assert!(services.get::<Database>("cache").is_none());
        assert_eq!(services.names(), vec!["database"]);
    }

    #[tokio::test]
    async fn hooks_run_in_startup_order() {
        let mut services = Services::new();
        services.insert("database", Database { url: "postgres://db".into() });
        let config = ServerConfig {
            port: Some(5000),
            ..Default::default()
        };

        let users = UsersService::default();
        users.on_injection(&services).await.unwrap();
        users.on_config(&config).await.unwrap();
        users.on_init().await.unwrap();

        assert_eq!(users.db_url.lock().unwrap().as_deref(), Some("postgres://db"));
        assert_eq!(*users.port.lock().unwrap(), Some(5000));
        assert!(users.ready.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn injection_reports_missing_services() {
        let users = UsersService::default();
        let err = users.on_injection(&Services::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "hook failed: database service missing");
    }

    #[tokio::test]
    async fn interceptor_can_reject_requests() {
        let hook: Arc<dyn OnInterception> = Arc::new(RequireAuth);
        let (mut parts, _) = http::Request::builder().uri("/").body(()).unwrap().into_parts();
        assert!(hook.on_interception(&mut parts).await.is_err());

        parts
            .headers
            .insert(AUTHORIZATION, HeaderValue::from_static("Bearer token"));
        assert!(hook.on_interception(&mut parts).await.is_ok());
    }
}
