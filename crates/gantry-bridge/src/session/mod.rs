//! Bridge session facade.
//!
//! [`BridgeSession`] ties the plugin registry, navigation policy,
//! message queue, and timeout machinery to one embedded engine view.
//! Two-phase initialization: construct with [`BridgeSession::new`],
//! then call [`BridgeSession::init`] before any other operation.
//!
//! Every public method runs on the session's owning context; the only
//! cross-context traffic is the [`SessionTask`] channel drained by
//! [`BridgeSession::drain_deferred`].

use std::collections::HashSet;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use gantry_common::{BridgeError, Result, SessionId};

use crate::allowlist::AllowList;
use crate::config::BridgeConfig;
use crate::deferred::{schedule_guarded, Generation, SessionTask};
use crate::engine::{Engine, ERROR_CONNECT, ERROR_CONNECT_DESCRIPTION};
use crate::host::HostPlatform;
use crate::keys::HardwareKey;
use crate::plugin::PluginRegistry;
use crate::queue::MessageQueue;

mod client;
mod lifecycle;
mod messages;
mod overlay;

pub use client::{NavigationDecision, SPINNER_FALLBACK_MS};
pub use overlay::OverlayCallback;

use overlay::ActiveOverlay;

/// The blank sentinel page. Loading it bypasses policy and signals
/// session teardown to plugins.
pub const BLANK_SENTINEL: &str = "about:blank";

/// Lifecycle states of a bridge session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Active,
    Paused,
    Destroyed,
}

/// The single live bridge instance per embedded view.
pub struct BridgeSession {
    pub(crate) id: SessionId,
    pub(crate) state: LifecycleState,
    pub(crate) config: BridgeConfig,
    pub(crate) engine: Box<dyn Engine>,
    pub(crate) host: Box<dyn HostPlatform>,
    pub(crate) plugins: PluginRegistry,
    pub(crate) queue: MessageQueue,
    pub(crate) generation: Generation,
    /// The URL passed to the last top-level load, not necessarily the
    /// URL of the current page.
    pub(crate) loaded_url: Option<String>,
    pub(crate) bound_keys: HashSet<HardwareKey>,
    pub(crate) has_paused_ever: bool,
    pub(crate) overlay: Option<ActiveOverlay>,
    pub(crate) task_tx: mpsc::UnboundedSender<SessionTask>,
    task_rx: mpsc::UnboundedReceiver<SessionTask>,
}

impl BridgeSession {
    /// Create an uninitialized session around an engine and the host
    /// platform.
    pub fn new(engine: Box<dyn Engine>, host: Box<dyn HostPlatform>) -> Self {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        Self {
            id: SessionId::new(),
            state: LifecycleState::Uninitialized,
            config: BridgeConfig::default(),
            engine,
            host,
            plugins: PluginRegistry::new(AllowList::default(), AllowList::default()),
            queue: MessageQueue::new(),
            generation: Generation::new(),
            loaded_url: None,
            bound_keys: HashSet::new(),
            has_paused_ever: false,
            overlay: None,
            task_tx,
            task_rx,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, LifecycleState::Active | LifecycleState::Paused)
    }

    /// URL of the last top-level load request.
    pub fn loaded_url(&self) -> Option<&str> {
        self.loaded_url.as_deref()
    }

    /// Load a URL, recreating the plugin set.
    pub fn load(&mut self, url: &str) {
        self.load_url(url, true);
    }

    /// Load a URL into the embedded view.
    ///
    /// The blank sentinel and `javascript:` URLs bypass policy, plugin
    /// re-initialization, and the timeout machinery entirely. All other
    /// URLs invalidate outstanding deferred actions, capture a fresh
    /// timeout ticket (when a timeout is configured), and drive the
    /// engine.
    pub fn load_url(&mut self, url: &str, recreate_plugins: bool) {
        if !self.is_initialized() {
            warn!(url = %url, "load ignored: session not initialized");
            return;
        }
        debug!(session = %self.id, url = %url, "load requested");

        if url == BLANK_SENTINEL || url.starts_with("javascript:") {
            self.engine.load_url(url, false);
            return;
        }

        let recreate_plugins = recreate_plugins || self.loaded_url.is_none();
        if recreate_plugins {
            // Don't re-initialize on first load.
            if self.loaded_url.is_some() {
                self.plugins.init_all();
            }
            self.loaded_url = Some(url.to_string());
        }

        // A new top-level navigation supersedes every outstanding
        // deferred action.
        self.generation.advance();
        let timeout_ms = self.config.load_url_timeout_ms;
        if timeout_ms > 0 {
            schedule_guarded(
                Duration::from_millis(timeout_ms),
                &self.task_tx,
                SessionTask::LoadTimeout {
                    ticket: self.generation.ticket(),
                    url: url.to_string(),
                },
            );
        }

        self.engine.load_url(url, recreate_plugins);
    }

    /// Stop tracking the in-flight load by invalidating every
    /// outstanding timeout ticket.
    pub fn stop_loading(&mut self) {
        self.generation.advance();
    }

    /// Drain and handle completion actions posted by background
    /// timers. Call from the owning context's event loop.
    pub fn drain_deferred(&mut self) {
        while let Ok(task) = self.task_rx.try_recv() {
            self.handle_task(task);
        }
    }

    fn handle_task(&mut self, task: SessionTask) {
        // Re-check at drain time: the generation may have advanced
        // after the timer posted.
        if !task.ticket().is_live() {
            return;
        }
        match task {
            SessionTask::LoadTimeout { url, .. } => {
                self.stop_loading();
                error!(session = %self.id, url = %url, "load timed out");
                let data = serde_json::json!({
                    "errorCode": ERROR_CONNECT,
                    "description": ERROR_CONNECT_DESCRIPTION,
                    "url": url,
                });
                self.plugins.post_message("onReceivedError", &data);
            }
            SessionTask::SpinnerFallback { .. } => {
                debug!(session = %self.id, "view never became visible, forcing spinner stop");
                self.plugins
                    .post_message("spinner", &serde_json::Value::String("stop".into()));
            }
        }
    }

    /// Claim or release a hardware key for script-side handling.
    ///
    /// Only the fixed claimable set is accepted; any other key fails
    /// fast with an unsupported-key error, leaving the claim set
    /// unchanged.
    pub fn set_button_plumbed_to_js(&mut self, key: HardwareKey, claim: bool) -> Result<()> {
        if !key.is_claimable() {
            return Err(BridgeError::UnsupportedKey(key.to_string()));
        }
        if claim {
            self.bound_keys.insert(key);
        } else {
            self.bound_keys.remove(&key);
        }
        Ok(())
    }

    pub fn is_button_plumbed_to_js(&self, key: HardwareKey) -> bool {
        self.bound_keys.contains(&key)
    }

    // Engine proxies.

    pub fn can_go_back(&self) -> bool {
        self.engine.can_go_back()
    }

    /// Navigate one step back in the embedded view's history.
    pub fn back_history(&mut self) -> bool {
        self.engine.go_back()
    }

    pub fn clear_cache(&mut self) {
        self.engine.clear_cache();
    }

    pub fn clear_history(&mut self) {
        self.engine.clear_history();
    }

    /// URL of the current page as reported by the engine.
    pub fn current_url(&self) -> Option<String> {
        self.engine.url()
    }
}
