//! Server configuration
//!
//! [`ServerConfig`] describes the options the server runtime understands.
//! Unknown keys are kept in [`ServerConfig::extra`] so applications can carry
//! their own settings in the same document and read them back with
//! [`ServerConfig::extension`].
//!
//! Configuration is usually split into profiles: a `default` profile plus one
//! per deployment environment, selected by `TRELLIS_ENV`.
//!
//! # Example
//!
//! ```rust
//! use trellis_core::config::ServerConfig;
//!
//! let config = ServerConfig::from_json_str(r#"{ "port": 8080, "consoleLogLevels": "all" }"#).unwrap();
//! assert_eq!(config.port, Some(8080));
//! ```

use crate::error::Result;
use serde::de::{DeserializeOwned, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Severity levels the server logger knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Notice,
    Warn,
    Error,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Notice,
        LogLevel::Warn,
        LogLevel::Error,
    ];
}

/// A set of log levels: `"all"` or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLevels {
    All,
    Only(Vec<LogLevel>),
}

impl LogLevels {
    /// Check if `level` is part of the set.
    pub fn includes(&self, level: LogLevel) -> bool {
        match self {
            LogLevels::All => true,
            LogLevels::Only(levels) => levels.contains(&level),
        }
    }

    /// The most verbose level in the set.
    pub fn most_verbose(&self) -> Option<LogLevel> {
        match self {
            LogLevels::All => Some(LogLevel::Debug),
            LogLevels::Only(levels) => levels.iter().min().copied(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LogLevelsRepr {
    Keyword(String),
    List(Vec<LogLevel>),
}

impl Serialize for LogLevels {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            LogLevels::All => serializer.serialize_str("all"),
            LogLevels::Only(levels) => levels.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for LogLevels {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match LogLevelsRepr::deserialize(deserializer)? {
            LogLevelsRepr::Keyword(keyword) if keyword == "all" => Ok(LogLevels::All),
            LogLevelsRepr::Keyword(other) => Err(serde::de::Error::invalid_value(
                serde::de::Unexpected::Str(&other),
                &"\"all\" or a list of log levels",
            )),
            LogLevelsRepr::List(levels) => Ok(LogLevels::Only(levels)),
        }
    }
}

/// Options understood by the server runtime. Every option is optional; the
/// runtime applies its own defaults for absent ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, rename = "predictive404", skip_serializing_if = "Option::is_none")]
    pub predictive_404: Option<bool>,
    #[serde(
        default,
        rename = "predictive404Priority",
        skip_serializing_if = "Option::is_none"
    )]
    pub predictive_404_priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colorful_logs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console_log_levels: Option<LogLevels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_logs_to_file: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_levels: Option<LogLevels>,
    /// Days to keep log files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_max_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_logs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_query_params_in_logs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_headers_in_logs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_request_headers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_response_messages: Option<bool>,
    /// Size limit such as `"10mb"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_upload_limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_management: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_cors: Option<bool>,
    /// Application-defined keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServerConfig {
    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading server config");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Deserialize the application-defined keys into `T`.
    pub fn extension<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.extra.clone()))?)
    }

    /// Get a single application-defined key.
    pub fn get_extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Layer `overlay` on top of this config: options present in `overlay`
    /// win, extra keys are merged key by key.
    pub fn merge(self, overlay: ServerConfig) -> Self {
        let mut base = self;
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $( if overlay.$field.is_some() { base.$field = overlay.$field; } )*
            };
        }

        take!(
            port,
            predictive_404,
            predictive_404_priority,
            timezone,
            colorful_logs,
            console_log_levels,
            write_logs_to_file,
            log_file_levels,
            log_file_max_age,
            archive_logs,
            exclude_query_params_in_logs,
            exclude_headers_in_logs,
            log_request_headers,
            log_response_messages,
            file_upload_limit,
            session_management,
            cookie_secret,
            enable_cors,
        );
        base.extra.extend(overlay.extra);
        base
    }

    /// Overlay values from `TRELLIS_*` environment variables, reading a
    /// `.env` file first if one exists.
    ///
    /// Recognised: `TRELLIS_PORT`, `TRELLIS_TIMEZONE`, `TRELLIS_COOKIE_SECRET`,
    /// `TRELLIS_ENABLE_CORS`, `TRELLIS_SESSION_MANAGEMENT`.
    #[cfg(feature = "config")]
    pub fn with_env_overrides(self) -> Result<Self> {
        #[derive(Deserialize)]
        struct EnvOverrides {
            port: Option<u16>,
            timezone: Option<String>,
            cookie_secret: Option<String>,
            enable_cors: Option<bool>,
            session_management: Option<bool>,
        }

        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }

        let env: EnvOverrides = envy::prefixed("TRELLIS_").from_env()?;
        Ok(self.merge(ServerConfig {
            port: env.port,
            timezone: env.timezone,
            cookie_secret: env.cookie_secret,
            enable_cors: env.enable_cors,
            session_management: env.session_management,
            ..ServerConfig::default()
        }))
    }
}

/// Deployment environment, detected from `TRELLIS_ENV`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Environment {
    Development,
    Production,
    Custom(String),
}

impl Environment {
    /// Detect the current environment from `TRELLIS_ENV`.
    ///
    /// - `Production` if `TRELLIS_ENV` is "production" or "prod"
    /// - `Development` if it is "development", "dev", or not set
    /// - `Custom(name)` for any other value
    pub fn current() -> Self {
        match std::env::var("TRELLIS_ENV").as_deref() {
            Ok(name) => Self::from_name(name),
            Err(_) => Self::Development,
        }
    }

    fn from_name(name: &str) -> Self {
        match name {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Name of the environment, also the name of its config profile.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Named configuration profiles.
///
/// The `default` profile applies everywhere; an environment's own profile is
/// layered over it by [`ConfigProfiles::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigProfiles {
    #[serde(flatten)]
    profiles: HashMap<String, ServerConfig>,
}

impl ConfigProfiles {
    /// Name of the base profile.
    pub const DEFAULT: &'static str = "default";

    const FILE_STEM: &'static str = "server.config";

    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a profile, builder style.
    pub fn profile(mut self, name: impl Into<String>, config: ServerConfig) -> Self {
        self.profiles.insert(name.into(), config);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ServerConfig> {
        self.profiles.get(name)
    }

    /// Profile names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// The configuration in effect for `env`.
    pub fn resolve(&self, env: &Environment) -> ServerConfig {
        let base = self.get(Self::DEFAULT).cloned().unwrap_or_default();
        match self.get(env.as_str()) {
            Some(profile) if env.as_str() != Self::DEFAULT => base.merge(profile.clone()),
            _ => base,
        }
    }

    /// Load `server.config.json` (the default profile) and every
    /// `server.config.<profile>.json` found in `dir`.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut profiles = Self::new();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(name) = Self::profile_name(file_name) else {
                continue;
            };
            let config = ServerConfig::from_file(&path)?;
            profiles.profiles.insert(name.to_string(), config);
        }

        tracing::debug!(
            dir = %dir.display(),
            profiles = ?profiles.names(),
            "loaded config profiles"
        );
        Ok(profiles)
    }

    fn profile_name(file_name: &str) -> Option<&str> {
        let rest = file_name.strip_prefix(Self::FILE_STEM)?.strip_suffix(".json")?;
        match rest {
            "" => Some(Self::DEFAULT),
            _ => rest.strip_prefix('.').filter(|name| !name.is_empty()),
        }
    }
}
