//! Plugin bus
//!
//! Listeners subscribe to named lifecycle events. [`PluginBus::emit`] runs the
//! listeners of one event sequentially, in registration order, and stops at
//! the first failure.

use crate::error::{PluginError, Result};
use crate::event::{PluginEvent, PluginEventData};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Receives plugin bus events.
#[async_trait]
pub trait PluginListener: Send + Sync {
    async fn on_event(&self, event: PluginEvent, data: &PluginEventData) -> Result<()>;
}

/// Adapts an async closure into a [`PluginListener`].
///
/// The closure receives its own copy of the event data.
pub struct FnListener<F>(F);

impl<F> FnListener<F> {
    pub fn new(listener: F) -> Self {
        Self(listener)
    }
}

#[async_trait]
impl<F, Fut> PluginListener for FnListener<F>
where
    F: Fn(PluginEvent, PluginEventData) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn on_event(&self, event: PluginEvent, data: &PluginEventData) -> Result<()> {
        (self.0)(event, data.clone()).await
    }
}

/// Registry of listeners per event.
#[derive(Clone, Default)]
pub struct PluginBus {
    listeners: HashMap<PluginEvent, Vec<Arc<dyn PluginListener>>>,
}

impl PluginBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a listener to `event`.
    pub fn on<L: PluginListener + 'static>(&mut self, event: PluginEvent, listener: L) -> &mut Self {
        self.listeners
            .entry(event)
            .or_default()
            .push(Arc::new(listener));
        self
    }

    /// Subscribe an async closure to `event`.
    pub fn on_fn<F, Fut>(&mut self, event: PluginEvent, listener: F) -> &mut Self
    where
        F: Fn(PluginEvent, PluginEventData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.on(event, FnListener::new(listener))
    }

    /// Subscribe a listener by event name, e.g. `"plugin:launch:after"`.
    pub fn on_named<L: PluginListener + 'static>(&mut self, name: &str, listener: L) -> Result<&mut Self> {
        let event = name.parse()?;
        Ok(self.on(event, listener))
    }

    pub fn listener_count(&self, event: PluginEvent) -> usize {
        self.listeners.get(&event).map_or(0, Vec::len)
    }

    /// Run every listener of `event` with `data`.
    pub async fn emit(&self, event: PluginEvent, data: &PluginEventData) -> Result<()> {
        let Some(listeners) = self.listeners.get(&event) else {
            tracing::trace!(%event, "no plugin listeners");
            return Ok(());
        };

        tracing::debug!(%event, listeners = listeners.len(), "emitting plugin event");

        for (index, listener) in listeners.iter().enumerate() {
            if let Err(err) = listener.on_event(event, data).await {
                tracing::warn!(%event, listener = index, error = %err, "plugin listener failed");
                return Err(PluginError::Listener {
                    event,
                    source: Box::new(err),
                });
            }
        }

        Ok(())
    }
}

impl fmt::Debug for PluginBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<(String, usize)> = self
            .listeners
            .iter()
            .map(|(event, listeners)| (event.name(), listeners.len()))
            .collect();
        counts.sort();
        f.debug_struct("PluginBus").field("listeners", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{MiddlewareStage, Phase};
    use std::sync::Mutex;

    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl PluginListener for Recorder {
        async fn on_event(&self, event: PluginEvent, _data: &PluginEventData) -> Result<()> {
            self.log.lock().unwrap().push(format!("{}@{}", self.label, event));
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl PluginListener for Failing {
        async fn on_event(&self, _event: PluginEvent, _data: &PluginEventData) -> Result<()> {
            Err(PluginError::hook("boom"))
        }
    }

    #[tokio::test]
    async fn listeners_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let launch = PluginEvent::Launch(Phase::Before);

        let mut bus = PluginBus::new();
        bus.on(launch, Recorder { label: "a", log: log.clone() })
            .on(launch, Recorder { label: "b", log: log.clone() });

        bus.emit(launch, &PluginEventData::new("/app")).await.unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a@plugin:launch:before", "b@plugin:launch:before"]
        );
    }

    #[tokio::test]
    async fn events_without_listeners_are_ok() {
        let bus = PluginBus::new();
        let event = PluginEvent::Config(Phase::After);
        assert_eq!(bus.listener_count(event), 0);
        assert!(bus.emit(event, &PluginEventData::default()).await.is_ok());
    }

    #[tokio::test]
    async fn first_failure_stops_emission() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let event = PluginEvent::Middleware(MiddlewareStage::Cors, Phase::Before);

        let mut bus = PluginBus::new();
        bus.on(event, Failing)
            .on(event, Recorder { label: "late", log: log.clone() });

        let err = bus.emit(event, &PluginEventData::default()).await.unwrap_err();
        assert!(matches!(err, PluginError::Listener { event: e, .. } if e == event));
        assert_eq!(
            err.to_string(),
            "listener for `plugin:middleware:cors:before` failed: hook failed: boom"
        );
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn closure_listeners_see_the_snapshot() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();

        let mut bus = PluginBus::new();
        bus.on_fn(PluginEvent::Config(Phase::Before), move |_, data| {
            let sink = sink.clone();
            async move {
                *sink.lock().unwrap() = Some(data.root);
                Ok(())
            }
        });

        bus.emit(PluginEvent::Config(Phase::Before), &PluginEventData::new("/srv"))
            .await
            .unwrap();
        assert_eq!(
            seen.lock().unwrap().as_deref(),
            Some(std::path::Path::new("/srv"))
        );
    }

    #[tokio::test]
    async fn closure_listener_can_be_built_directly() {
        let listener = FnListener::new(|event: PluginEvent, _data: PluginEventData| async move {
            match event {
                PluginEvent::Launch(_) => Ok(()),
                other => Err(PluginError::hook(format!("unexpected {other}"))),
            }
        });
        let data = PluginEventData::default();
        assert!(listener.on_event(PluginEvent::Launch(Phase::After), &data).await.is_ok());
        assert!(listener.on_event(PluginEvent::Config(Phase::Before), &data).await.is_err());

        let mut bus = PluginBus::new();
        bus.on(PluginEvent::Launch(Phase::After), listener);
        assert_eq!(bus.listener_count(PluginEvent::Launch(Phase::After)), 1);
    }

    #[test]
    fn named_subscription_validates_the_name() {
        let mut bus = PluginBus::new();
        assert!(bus.on_named("plugin:launch:after", Failing).is_ok());
        assert_eq!(bus.listener_count(PluginEvent::Launch(Phase::After)), 1);
        assert!(matches!(
            bus.on_named("plugin:launch:soon", Failing),
            Err(PluginError::UnknownEvent(_))
        ));
    }
}
