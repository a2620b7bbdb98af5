//! Native-to-script message queue and bridge delivery modes.
//!
//! Messages flow in both directions:
//! - **Native -> script**: plugin results and raw statements are
//!   enqueued here and delivered by the active [`BridgeMode`].
//! - **Script -> native**: script code calls
//!   `window.gantry.bridge.send(...)`, which the host wires to
//!   [`crate::session::BridgeSession::post_message`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use tracing::{debug, warn};

use gantry_common::Result;

use crate::engine::Engine;

/// Completion status carried by a plugin result. The numeric codes are
/// part of the wire format the script side parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultStatus {
    NoResult,
    Ok,
    InvalidAction,
    JsonError,
    Error,
}

impl ResultStatus {
    /// Wire code for this status.
    pub fn code(self) -> u8 {
        match self {
            ResultStatus::NoResult => 0,
            ResultStatus::Ok => 1,
            ResultStatus::InvalidAction => 7,
            ResultStatus::JsonError => 8,
            ResultStatus::Error => 9,
        }
    }

    /// Whether the script-side success callback is invoked.
    pub fn is_success(self) -> bool {
        matches!(self, ResultStatus::Ok | ResultStatus::NoResult)
    }
}

/// A structured result produced by a native plugin for a script-side
/// callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginResult {
    pub status: ResultStatus,
    pub payload: Value,
    /// Keep the script-side callback registered for further results.
    pub keep_callback: bool,
}

impl PluginResult {
    pub fn ok(payload: Value) -> Self {
        Self {
            status: ResultStatus::Ok,
            payload,
            keep_callback: false,
        }
    }

    pub fn error(payload: Value) -> Self {
        Self {
            status: ResultStatus::Error,
            payload,
            keep_callback: false,
        }
    }

    pub fn no_result() -> Self {
        Self {
            status: ResultStatus::NoResult,
            payload: Value::Null,
            keep_callback: false,
        }
    }
}

/// An ordered unit of work for the bridge. FIFO per session; once
/// flushed to the script side, a message is not redelivered.
#[derive(Debug, Clone)]
pub enum PendingMessage {
    /// A literal script statement to evaluate.
    Script(String),
    /// A plugin result routed to a script-side callback.
    Result {
        result: PluginResult,
        callback_id: String,
    },
}

impl PendingMessage {
    /// Encode as the script statement the bridge evaluates.
    pub fn encode(&self) -> String {
        match self {
            PendingMessage::Script(statement) => statement.clone(),
            PendingMessage::Result {
                result,
                callback_id,
            } => {
                let id = serde_json::to_string(callback_id)
                    .unwrap_or_else(|_| "\"\"".to_string());
                let payload = serde_json::to_string(&result.payload)
                    .unwrap_or_else(|_| "null".to_string());
                format!(
                    "window.gantry.bridge.callbackFromNative({},{},{},[{}],{});",
                    id,
                    result.status.is_success(),
                    result.status.code(),
                    payload,
                    result.keep_callback,
                )
            }
        }
    }
}

/// Encode a batch as one script text, one statement per line.
pub fn encode_batch(batch: &[PendingMessage]) -> String {
    batch
        .iter()
        .map(PendingMessage::encode)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Script injected into every page to set up the script-side bridge
/// object the wire format targets.
pub const BRIDGE_INIT_SCRIPT: &str = r#"
(function() {
    window.gantry = window.gantry || {};
    window.gantry.bridge = {
        // Callbacks registered by script code, keyed by callback id.
        _callbacks: {},
        // Named-event handlers (pause, resume, backbutton, ...).
        _handlers: {},
        register: function(callbackId, onSuccess, onError) {
            this._callbacks[callbackId] = { success: onSuccess, error: onError };
        },
        callbackFromNative: function(callbackId, success, status, args, keepCallback) {
            var cb = this._callbacks[callbackId];
            if (!cb) { return; }
            if (success) {
                if (cb.success) { cb.success.apply(null, args); }
            } else if (cb.error) {
                cb.error.apply(null, args);
            }
            if (!keepCallback) {
                delete this._callbacks[callbackId];
            }
        },
        on: function(event, handler) {
            this._handlers[event] = handler;
        },
        _fireEvent: function(event) {
            var handler = this._handlers[event];
            if (handler) { handler(); }
        }
    };
})();
"#;

/// Build the statement that fires a named script event.
pub fn js_fire_event(event: &str) -> String {
    format!(
        "window.gantry.bridge._fireEvent({});",
        serde_json::to_string(event).unwrap_or_else(|_| "\"unknown\"".to_string()),
    )
}

/// Outcome of handing a batch to the active bridge mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The batch reached the script context; the queue clears it.
    Flushed,
    /// The mode did not deliver; the batch stays queued.
    Deferred,
}

/// Strategy for delivering queued messages into the script context.
/// Exactly one mode is active at a time; switching modes never drops
/// or duplicates queued messages.
pub trait BridgeMode {
    fn name(&self) -> &'static str;

    /// Deliver the full pending batch. Invoked exactly once per
    /// non-empty flush.
    fn deliver(&mut self, batch: &[PendingMessage], engine: &mut dyn Engine) -> Result<Delivery>;
}

/// Delivers nothing; messages stay queued until a real mode is
/// installed. Active until the script side completes its handshake.
#[derive(Debug, Default)]
pub struct NoOpBridgeMode;

impl BridgeMode for NoOpBridgeMode {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn deliver(&mut self, _batch: &[PendingMessage], _engine: &mut dyn Engine) -> Result<Delivery> {
        Ok(Delivery::Deferred)
    }
}

/// Delivers by evaluating the encoded batch directly in the script
/// context.
#[derive(Debug, Default)]
pub struct EvalBridgeMode;

impl BridgeMode for EvalBridgeMode {
    fn name(&self) -> &'static str {
        "eval"
    }

    fn deliver(&mut self, batch: &[PendingMessage], engine: &mut dyn Engine) -> Result<Delivery> {
        engine.evaluate_script(&encode_batch(batch))?;
        Ok(Delivery::Flushed)
    }
}

/// FIFO queue of native-to-script messages.
pub struct MessageQueue {
    pending: VecDeque<PendingMessage>,
    mode: Box<dyn BridgeMode>,
}

impl MessageQueue {
    /// New queue in no-op mode.
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            mode: Box::new(NoOpBridgeMode),
        }
    }

    pub fn enqueue_script(&mut self, statement: impl Into<String>) {
        self.pending.push_back(PendingMessage::Script(statement.into()));
    }

    pub fn enqueue_result(&mut self, result: PluginResult, callback_id: impl Into<String>) {
        self.pending.push_back(PendingMessage::Result {
            result,
            callback_id: callback_id.into(),
        });
    }

    /// Install a new delivery mode. Pending messages are untouched.
    pub fn set_mode(&mut self, mode: Box<dyn BridgeMode>) {
        debug!(mode = mode.name(), "bridge mode installed");
        self.mode = mode;
    }

    pub fn mode_name(&self) -> &'static str {
        self.mode.name()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Hand the full pending batch to the active mode.
    ///
    /// On `Flushed` the batch is cleared; on `Deferred` or error it is
    /// retained unreordered for the next attempt. A flush with nothing
    /// pending does not invoke the mode at all.
    pub fn flush(&mut self, engine: &mut dyn Engine) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let batch: Vec<PendingMessage> = self.pending.iter().cloned().collect();
        match self.mode.deliver(&batch, engine) {
            Ok(Delivery::Flushed) => {
                debug!(count = batch.len(), "message batch flushed");
                self.pending.clear();
                Ok(())
            }
            Ok(Delivery::Deferred) => Ok(()),
            Err(e) => {
                warn!(count = batch.len(), error = %e, "bridge delivery failed, batch retained");
                Err(e)
            }
        }
    }
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new()
    }
}
