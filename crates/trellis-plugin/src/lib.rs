//! # Trellis Plugin
//!
//! Lifecycle hooks for services and routers, and the plugin bus the server
//! uses to announce each startup stage.
//!
//! The bus emits, in order:
//!
//! - `plugin:config:before` / `plugin:config:after`
//! - `plugin:middleware:<stage>:before` / `...:after` for each of `internal`,
//!   `session`, `logger`, `cors`, `body-parsers` and `routes`
//! - `plugin:launch:before` / `plugin:launch:after`
//!
//! ```rust,ignore
//! use trellis_plugin::{PluginBus, PluginEvent, Phase};
//!
//! let mut bus = PluginBus::new();
//! bus.on_fn(PluginEvent::Launch(Phase::After), |_, data| async move {
//!     tracing::info!(components = data.components.len(), "server launched");
//!     Ok(())
//! });
//! ```
//!
//! This crate is not meant to be used directly. Use `trellis-rs` instead.

mod bus;
mod error;
mod event;
mod hooks;

// Public API
pub use bus::{FnListener, PluginBus, PluginListener};
pub use error::{PluginError, Result};
pub use event::{AppHandle, MiddlewareStage, Phase, PluginEvent, PluginEventData};
pub use hooks::{OnConfig, OnInit, OnInjection, OnInterception, Services};

// Hook implementations need the same attribute macro
pub use async_trait::async_trait;
