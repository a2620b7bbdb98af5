//! One-shot initialization and host lifecycle forwarding.

use serde_json::Value;
use tracing::info;

use gantry_common::{BridgeError, Result};

use crate::config::BridgeConfig;
use crate::plugin::{Plugin, PluginRegistry};

use super::{BridgeSession, LifecycleState, BLANK_SENTINEL};

impl BridgeSession {
    /// Initialize the session with its configuration and plugin set.
    ///
    /// One-shot: exactly one `init` succeeds per session; a second call
    /// fails with an invalid-state error, including after destroy.
    pub fn init(&mut self, config: BridgeConfig, plugins: Vec<Box<dyn Plugin>>) -> Result<()> {
        if self.state != LifecycleState::Uninitialized {
            return Err(BridgeError::InvalidState(
                "bridge session already initialized",
            ));
        }

        let mut registry = PluginRegistry::new(
            config.allow_navigation.clone(),
            config.allow_intent.clone(),
        );
        for plugin in plugins {
            registry.register(plugin);
        }
        self.plugins = registry;

        if config.disallow_overscroll {
            self.engine.set_overscroll_disabled(true);
        }
        self.config = config;

        self.plugins.init_all();
        self.state = LifecycleState::Active;
        info!(session = %self.id, plugins = self.plugins.len(), "bridge session initialized");
        Ok(())
    }

    /// Host went to the background. `keep_running` false additionally
    /// suspends the page's script timers.
    pub fn handle_pause(&mut self, keep_running: bool) {
        if !self.is_initialized() {
            return;
        }
        self.has_paused_ever = true;
        self.plugins.on_pause(keep_running);
        self.fire_script_event("pause");
        if !keep_running {
            // This affects every view within the host app.
            self.engine.set_paused(true);
        }
        self.state = LifecycleState::Paused;
    }

    /// Host returned to the foreground. Script timers always resume;
    /// the `resume` script event fires only after an observed pause so
    /// a first launch stays quiet.
    pub fn handle_resume(&mut self, keep_running: bool) {
        if !self.is_initialized() {
            return;
        }
        self.engine.set_paused(false);
        self.plugins.on_resume(keep_running);
        if self.has_paused_ever {
            self.fire_script_event("resume");
        }
        self.state = LifecycleState::Active;
    }

    pub fn handle_start(&mut self) {
        if !self.is_initialized() {
            return;
        }
        self.plugins.on_start();
    }

    pub fn handle_stop(&mut self) {
        if !self.is_initialized() {
            return;
        }
        self.plugins.on_stop();
    }

    /// The host received a new external intent for this session.
    pub fn handle_new_intent(&mut self, data: &Value) {
        if !self.is_initialized() {
            return;
        }
        self.plugins.on_new_intent(data);
    }

    /// Tear the session down: invalidate outstanding tickets, notify
    /// plugins, load the blank sentinel, release the engine, and
    /// dismiss any active overlay. Further lifecycle calls no-op.
    pub fn handle_destroy(&mut self) {
        if !self.is_initialized() {
            return;
        }
        info!(session = %self.id, "destroying bridge session");
        self.generation.advance();
        self.plugins.on_destroy();
        self.load_url(BLANK_SENTINEL, false);
        self.engine.destroy();
        self.hide_overlay();
        self.state = LifecycleState::Destroyed;
    }
}
