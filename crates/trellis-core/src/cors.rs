//! Declarative CORS policies
//!
//! A [`CorsPolicy`] can be attached to a router module or to a single route,
//! where it overrides the server-wide settings for that scope. Only the
//! description lives here; the CORS middleware that enforces it is part of the
//! server runtime.
//!
//! # Example
//!
//! ```rust
//! use trellis_core::cors::CorsPolicy;
//! use std::time::Duration;
//!
//! let policy = CorsPolicy::new()
//!     .allow_origins(["https://example.com"])
//!     .allow_methods(["GET", "POST"])
//!     .allow_credentials(true)
//!     .max_age(Duration::from_secs(600));
//! ```

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which origins a policy accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigin {
    /// Reflect any request origin (`true`).
    Any,
    /// Disable CORS for the scope (`false`).
    Disabled,
    /// A single origin, or `"*"`.
    Exact(String),
    /// Any of the listed origins.
    List(Vec<String>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum OriginRepr {
    Flag(bool),
    One(String),
    Many(Vec<String>),
}

impl Serialize for AllowedOrigin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            AllowedOrigin::Any => OriginRepr::Flag(true),
            AllowedOrigin::Disabled => OriginRepr::Flag(false),
            AllowedOrigin::Exact(origin) => OriginRepr::One(origin.clone()),
            AllowedOrigin::List(origins) => OriginRepr::Many(origins.clone()),
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AllowedOrigin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match OriginRepr::deserialize(deserializer)? {
            OriginRepr::Flag(true) => AllowedOrigin::Any,
            OriginRepr::Flag(false) => AllowedOrigin::Disabled,
            OriginRepr::One(origin) => AllowedOrigin::Exact(origin),
            OriginRepr::Many(origins) => AllowedOrigin::List(origins),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Accepts `"GET,POST"` as well as `["GET", "POST"]`.
fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<OneOrMany>::deserialize(deserializer)?.map(|value| match value {
            OneOrMany::One(joined) => joined
                .split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect(),
            OneOrMany::Many(items) => items,
        }),
    )
}

/// CORS settings for a router or route. Every field is optional; absent
/// fields fall back to the enclosing scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<AllowedOrigin>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub allowed_headers: Option<Vec<String>>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub exposed_headers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<bool>,
    /// Preflight cache lifetime in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_success_status: Option<u16>,
}

impl CorsPolicy {
    /// Create an empty policy that overrides nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a permissive policy that allows everything.
    pub fn permissive() -> Self {
        Self {
            origin: Some(AllowedOrigin::Any),
            methods: Some(
                ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"]
                    .map(String::from)
                    .to_vec(),
            ),
            allowed_headers: Some(vec!["*".to_string()]),
            exposed_headers: None,
            credentials: Some(false),
            max_age: Some(86400),
            options_success_status: Some(204),
        }
    }

    /// Allow any origin.
    pub fn allow_any_origin(mut self) -> Self {
        self.origin = Some(AllowedOrigin::Any);
        self
    }

    /// Disable CORS in this scope.
    pub fn disable(mut self) -> Self {
        self.origin = Some(AllowedOrigin::Disabled);
        self
    }

    /// Allow a single origin.
    pub fn allow_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(AllowedOrigin::Exact(origin.into()));
        self
    }

    /// Allow specific origins.
    pub fn allow_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.origin = Some(AllowedOrigin::List(
            origins.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Allow specific HTTP methods.
    pub fn allow_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }

    /// Allow specific request headers.
    pub fn allow_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_headers = Some(headers.into_iter().map(Into::into).collect());
        self
    }

    /// Expose specific response headers.
    pub fn expose_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exposed_headers = Some(headers.into_iter().map(Into::into).collect());
        self
    }

    /// Allow credentials (cookies, authorization headers).
    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.credentials = Some(allow);
        self
    }

    /// Set the max age for preflight cache.
    pub fn max_age(mut self, duration: Duration) -> Self {
        self.max_age = Some(duration.as_secs());
        self
    }

    /// Set the status returned for successful preflight requests.
    pub fn options_success_status(mut self, status: u16) -> Self {
        self.options_success_status = Some(status);
        self
    }

    /// Get the max age as a duration.
    pub fn max_age_duration(&self) -> Option<Duration> {
        self.max_age.map(Duration::from_secs)
    }

    /// Fill fields this policy leaves unset from `fallback`.
    ///
    /// Used to layer a route policy over its router's policy.
    pub fn or(self, fallback: &CorsPolicy) -> CorsPolicy {
        CorsPolicy {
            origin: self.origin.or_else(|| fallback.origin.clone()),
            methods: self.methods.or_else(|| fallback.methods.clone()),
            allowed_headers: self
                .allowed_headers
                .or_else(|| fallback.allowed_headers.clone()),
            exposed_headers: self
                .exposed_headers
                .or_else(|| fallback.exposed_headers.clone()),
            credentials: self.credentials.or(fallback.credentials),
            max_age: self.max_age.or(fallback.max_age),
            options_success_status: self
                .options_success_status
                .or(fallback.options_success_status),
        }
    }
}
