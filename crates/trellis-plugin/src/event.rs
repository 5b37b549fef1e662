//! Plugin bus events
//!
//! The server emits a fixed sequence of events while it starts up. Each event
//! carries a [`PluginEventData`] snapshot that grows as startup progresses:
//! the root directory and config profiles are known from the first event,
//! the resolved config after `plugin:config:after`, the application handle
//! once middleware installation begins, and the installed components by
//! launch.

use crate::error::PluginError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use trellis_core::{ConfigProfiles, ModuleMetadata, ServerConfig};

/// Whether an event fires before or after its stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    After,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Before => "before",
            Phase::After => "after",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "before" => Some(Phase::Before),
            "after" => Some(Phase::After),
            _ => None,
        }
    }
}

/// Middleware installation stages, in installation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MiddlewareStage {
    Internal,
    Session,
    Logger,
    Cors,
    BodyParsers,
    Routes,
}

impl MiddlewareStage {
    pub const ALL: [MiddlewareStage; 6] = [
        MiddlewareStage::Internal,
        MiddlewareStage::Session,
        MiddlewareStage::Logger,
        MiddlewareStage::Cors,
        MiddlewareStage::BodyParsers,
        MiddlewareStage::Routes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MiddlewareStage::Internal => "internal",
            MiddlewareStage::Session => "session",
            MiddlewareStage::Logger => "logger",
            MiddlewareStage::Cors => "cors",
            MiddlewareStage::BodyParsers => "body-parsers",
            MiddlewareStage::Routes => "routes",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.as_str() == s)
    }
}

/// A named lifecycle event of the plugin bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginEvent {
    /// `plugin:config:before` / `plugin:config:after`
    Config(Phase),
    /// `plugin:middleware:<stage>:before` / `...:after`
    Middleware(MiddlewareStage, Phase),
    /// `plugin:launch:before` / `plugin:launch:after`
    Launch(Phase),
}

impl PluginEvent {
    const PREFIX: &'static str = "plugin";

    /// Every event, in the order the server emits them.
    pub fn lifecycle() -> Vec<PluginEvent> {
        let mut events = vec![
            PluginEvent::Config(Phase::Before),
            PluginEvent::Config(Phase::After),
        ];
        for stage in MiddlewareStage::ALL {
            events.push(PluginEvent::Middleware(stage, Phase::Before));
            events.push(PluginEvent::Middleware(stage, Phase::After));
        }
        events.push(PluginEvent::Launch(Phase::Before));
        events.push(PluginEvent::Launch(Phase::After));
        events
    }

    pub fn phase(&self) -> Phase {
        match self {
            PluginEvent::Config(phase)
            | PluginEvent::Middleware(_, phase)
            | PluginEvent::Launch(phase) => *phase,
        }
    }

    /// Wire name of the event, e.g. `plugin:middleware:cors:before`.
    pub fn name(&self) -> String {
        match self {
            PluginEvent::Config(phase) => format!("{}:config:{}", Self::PREFIX, phase.as_str()),
            PluginEvent::Middleware(stage, phase) => format!(
                "{}:middleware:{}:{}",
                Self::PREFIX,
                stage.as_str(),
                phase.as_str()
            ),
            PluginEvent::Launch(phase) => format!("{}:launch:{}", Self::PREFIX, phase.as_str()),
        }
    }
}

impl fmt::Display for PluginEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for PluginEvent {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split(':').collect();
        let event = match segments.as_slice() {
            ["plugin", "config", phase] => Phase::parse(phase).map(PluginEvent::Config),
            ["plugin", "launch", phase] => Phase::parse(phase).map(PluginEvent::Launch),
            ["plugin", "middleware", stage, phase] => MiddlewareStage::parse(stage)
                .zip(Phase::parse(phase))
                .map(|(stage, phase)| PluginEvent::Middleware(stage, phase)),
            _ => None,
        };
        event.ok_or_else(|| PluginError::UnknownEvent(s.to_string()))
    }
}

impl Serialize for PluginEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> Deserialize<'de> for PluginEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Opaque handle to the running application.
pub type AppHandle = Arc<dyn Any + Send + Sync>;

/// Snapshot of application state passed to listeners.
#[derive(Clone, Default)]
pub struct PluginEventData {
    /// Application root directory
    pub root: PathBuf,
    /// All configuration profiles found under the root
    pub profiles: Option<ConfigProfiles>,
    /// Configuration resolved for the current environment
    pub config: Option<ServerConfig>,
    pub app: Option<AppHandle>,
    /// Installed services and routers
    pub components: Vec<ModuleMetadata>,
}

impl PluginEventData {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_profiles(mut self, profiles: ConfigProfiles) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_app<A: Any + Send + Sync>(mut self, app: A) -> Self {
        let app: AppHandle = Arc::new(app);
        self.app = Some(app);
        self
    }

    pub fn with_components(mut self, components: Vec<ModuleMetadata>) -> Self {
        self.components = components;
        self
    }

    /// Typed access to the application handle.
    pub fn app_as<A: Any + Send + Sync>(&self) -> Option<Arc<A>> {
        self.app.clone()?.downcast::<A>().ok()
    }

    /// Find an installed component by name.
    pub fn component(&self, name: &str) -> Option<&ModuleMetadata> {
        self.components.iter().find(|c| c.name == name)
    }
}

impl fmt::Debug for PluginEventData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginEventData")
            .field("root", &self.root)
            .field("profiles", &self.profiles.as_ref().map(|p| p.names()))
            .field("has_config", &self.config.is_some())
            .field("has_app", &self.app.is_some())
            .field(
                "components",
                &self.components.iter().map(|c| &c.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}
