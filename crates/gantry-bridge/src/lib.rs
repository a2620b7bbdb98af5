//! Native-side bridge for embedding a browser engine in a host shell.
//!
//! Ties an embedded engine view to a natively implemented plugin set:
//! - A lifecycle-managed [`BridgeSession`] per embedded view
//! - Navigation policy: plugin overrides, then allow-lists, then an
//!   explicit external-intent handoff
//! - A FIFO native-to-script message queue with swappable
//!   [`BridgeMode`]s
//! - Generation-guarded load timeout and visibility fallback

pub mod allowlist;
pub mod config;
pub mod deferred;
pub mod engine;
pub mod host;
pub mod keys;
pub mod plugin;
pub mod queue;
pub mod session;

#[cfg(test)]
pub(crate) mod testutil;

pub use allowlist::AllowList;
pub use config::BridgeConfig;
pub use deferred::{Generation, SessionTask, TimeoutTicket};
pub use engine::Engine;
pub use host::HostPlatform;
pub use keys::{HardwareKey, KeyAction, KeyEvent};
pub use plugin::{Plugin, PluginRegistry};
pub use queue::{
    BridgeMode, EvalBridgeMode, MessageQueue, NoOpBridgeMode, PendingMessage, PluginResult,
    ResultStatus,
};
pub use session::{BridgeSession, LifecycleState, NavigationDecision, OverlayCallback};
