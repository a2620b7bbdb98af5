//! Engine client adapter: navigation policy, load lifecycle, and key
//! dispatch.
//!
//! The embedded engine invokes these methods back into the session.
//! They stay callable while the engine tears down after destroy (the
//! blank sentinel's page-finish is the teardown signal) but are
//! ignored before init.

use serde_json::{json, Value};
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::deferred::{schedule_guarded, SessionTask};
use crate::host::mime_for_file_url;
use crate::keys::{HardwareKey, KeyAction, KeyEvent};

use super::{BridgeSession, LifecycleState, BLANK_SENTINEL};

/// Delay before a finished-but-invisible page is forced visible.
pub const SPINNER_FALLBACK_MS: u64 = 2000;

/// Terminal outcome of a navigation attempt. Produced once per
/// attempt, never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// A plugin claimed the URL; nothing loads.
    InternalHandled,
    /// The load proceeds inside the embedded view.
    Allowed,
    /// Handed off to the host platform's external opener.
    ExternalDelegated,
    /// Outside every allow-list; logged and dropped.
    Blocked,
}

impl BridgeSession {
    /// Decide a navigation attempt.
    ///
    /// The order is load-bearing: plugin overrides always win, and
    /// nothing reaches the external opener without explicit
    /// allow-listing.
    pub fn on_navigation_attempt(&mut self, url: &str) -> NavigationDecision {
        if self.plugins.on_override_url_loading(url) {
            debug!(url = %url, "navigation claimed by plugin");
            NavigationDecision::InternalHandled
        } else if self.plugins.should_allow_navigation(url) {
            debug!(url = %url, "navigation allowed");
            NavigationDecision::Allowed
        } else if self.plugins.should_open_external_url(url) {
            self.open_external(url);
            NavigationDecision::ExternalDelegated
        } else {
            warn!(url = %url, "blocked navigation to non-allowed URL");
            NavigationDecision::Blocked
        }
    }

    /// Load a page into the view or hand it to the external opener,
    /// re-checking the relevant allow-list either way.
    pub fn show_web_page(&mut self, url: &str, open_external: bool, clear_history: bool) {
        debug!(url = %url, open_external, clear_history, "show_web_page");
        if clear_history {
            self.engine.clear_history();
        }
        if !open_external {
            if self.plugins.should_allow_navigation(url) {
                self.load_url(url, true);
            } else {
                warn!(url = %url, "refusing to load URL outside the navigation allow-list");
            }
            return;
        }
        if !self.plugins.should_open_external_url(url) {
            warn!(url = %url, "refusing to open URL outside the intent allow-list");
            return;
        }
        self.open_external(url);
    }

    fn open_external(&mut self, url: &str) {
        // MIME type only for file: URLs; see HostPlatform::open_external.
        let mime = if url.starts_with("file:") {
            Some(mime_for_file_url(url))
        } else {
            None
        };
        if let Err(e) = self.host.open_external(url, mime) {
            error!(url = %url, error = %e, "failed to open external URL");
        }
    }

    /// The engine started loading a top-level page. Per-page state is
    /// reset: key claims are dropped and plugins re-establish their
    /// page hooks.
    pub fn on_page_started(&mut self, url: &str) {
        if self.state == LifecycleState::Uninitialized {
            return;
        }
        debug!(url = %url, "page started");
        self.bound_keys.clear();
        self.plugins.reset_all();
        self.plugins
            .post_message("onPageStarted", &Value::String(url.to_string()));
    }

    /// The engine reported a navigation failure.
    pub fn on_received_error(&mut self, error_code: i32, description: &str, failing_url: &str) {
        if self.state == LifecycleState::Uninitialized {
            return;
        }
        self.generation.advance();
        let data = json!({
            "errorCode": error_code,
            "description": description,
            "url": failing_url,
        });
        self.plugins.post_message("onReceivedError", &data);
    }

    /// The engine finished loading a page.
    pub fn on_page_finished(&mut self, url: &str) {
        if self.state == LifecycleState::Uninitialized {
            return;
        }
        debug!(url = %url, "page finished");
        self.generation.advance();
        self.plugins
            .post_message("onPageFinished", &Value::String(url.to_string()));

        // Force the app visible after a delay in case the page's
        // bridge script never signals readiness.
        if !self.engine.is_visible() {
            schedule_guarded(
                Duration::from_millis(SPINNER_FALLBACK_MS),
                &self.task_tx,
                SessionTask::SpinnerFallback {
                    ticket: self.generation.ticket(),
                },
            );
        }

        if url == BLANK_SENTINEL {
            self.plugins.post_message("exit", &Value::Null);
        }
    }

    /// Host key-dispatch hook for claimed keys, the overlay, and back
    /// navigation.
    ///
    /// Returns `Some(consumed)` when the bridge answers the dispatch,
    /// `None` to fall through to the host's default handling. Back is
    /// two-phase by contract: key-down answers `can_go_back` and
    /// key-up performs the navigation; the host dispatch cycle relies
    /// on both phases to produce a single back action per press.
    pub fn on_dispatch_key(&mut self, event: KeyEvent) -> Option<bool> {
        let is_back = event.key == HardwareKey::Back;
        match event.action {
            KeyAction::Down => {
                if is_back && self.overlay.is_some() {
                    Some(true)
                } else if self.bound_keys.contains(&event.key) {
                    Some(true)
                } else if is_back {
                    Some(self.engine.can_go_back())
                } else {
                    None
                }
            }
            KeyAction::Up => {
                if is_back && self.overlay.is_some() {
                    self.hide_overlay();
                    Some(true)
                } else if self.bound_keys.contains(&event.key) {
                    self.fire_script_event(event.key.script_event());
                    Some(true)
                } else if is_back {
                    Some(self.engine.go_back())
                } else {
                    None
                }
            }
        }
    }
}
