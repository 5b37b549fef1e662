//! Plugin error types

use crate::event::PluginEvent;

/// Result type alias for hooks and listeners
pub type Result<T, E = PluginError> = std::result::Result<T, E>;

/// Errors raised by lifecycle hooks, plugin listeners and event parsing.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// A lifecycle hook reported a failure.
    #[error("hook failed: {0}")]
    Hook(String),

    /// An event name is not part of the plugin protocol.
    #[error("unknown plugin event `{0}`")]
    UnknownEvent(String),

    /// A listener failed while handling an event.
    #[error("listener for `{event}` failed: {source}")]
    Listener {
        event: PluginEvent,
        #[source]
        source: Box<PluginError>,
    },

    /// Any other error raised by plugin code.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl PluginError {
    /// Create a hook failure.
    pub fn hook(message: impl Into<String>) -> Self {
        PluginError::Hook(message.into())
    }
}

impl From<trellis_core::Error> for PluginError {
    fn from(err: trellis_core::Error) -> Self {
        PluginError::Other(Box::new(err))
    }
}
