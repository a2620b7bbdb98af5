//! Native-to-script message send entry points.

use serde_json::Value;
use tracing::warn;

use gantry_common::Result;

use crate::queue::{self, BridgeMode, PluginResult};

use super::BridgeSession;

impl BridgeSession {
    /// Evaluate a raw script statement via the message queue.
    pub fn send_script(&mut self, statement: impl Into<String>) -> Result<()> {
        if !self.is_initialized() {
            warn!("script send ignored: session not initialized");
            return Ok(());
        }
        self.queue.enqueue_script(statement);
        self.queue.flush(self.engine.as_mut())
    }

    /// Route a plugin result to its script-side callback.
    pub fn send_plugin_result(
        &mut self,
        result: PluginResult,
        callback_id: impl Into<String>,
    ) -> Result<()> {
        if !self.is_initialized() {
            warn!("plugin result ignored: session not initialized");
            return Ok(());
        }
        self.queue.enqueue_result(result, callback_id);
        self.queue.flush(self.engine.as_mut())
    }

    /// Install a new bridge mode. Queued messages are preserved and
    /// immediately offered to the new mode.
    pub fn set_bridge_mode(&mut self, mode: Box<dyn BridgeMode>) {
        self.queue.set_mode(mode);
        if let Err(e) = self.queue.flush(self.engine.as_mut()) {
            warn!(error = %e, "flush after bridge mode switch failed");
        }
    }

    /// Flush any retained messages through the active mode.
    pub fn flush_messages(&mut self) -> Result<()> {
        self.queue.flush(self.engine.as_mut())
    }

    /// Number of messages awaiting delivery.
    pub fn pending_messages(&self) -> usize {
        self.queue.len()
    }

    /// Offer a named event to the plugin set; the first plugin to
    /// answer wins.
    pub fn post_message(&mut self, name: &str, payload: &Value) -> Option<Value> {
        self.plugins.post_message(name, payload)
    }

    /// Fire a named script event (`pause`, `backbutton`, ...).
    pub(crate) fn fire_script_event(&mut self, event: &str) {
        self.queue.enqueue_script(queue::js_fire_event(event));
        if let Err(e) = self.queue.flush(self.engine.as_mut()) {
            warn!(event = %event, error = %e, "script event delivery failed");
        }
    }
}
