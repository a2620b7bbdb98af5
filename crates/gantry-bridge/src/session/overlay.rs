//! Custom overlay surface handling (fullscreen media and the like).
//!
//! The overlay itself is platform glue owned by the host; the bridge
//! only tracks the at-most-one instance and completes callbacks.

use tracing::debug;

use super::BridgeSession;

/// Completion callback for a custom overlay surface.
pub trait OverlayCallback {
    /// The overlay is no longer showing.
    fn on_hidden(&mut self);
}

pub(crate) struct ActiveOverlay {
    callback: Box<dyn OverlayCallback>,
}

impl BridgeSession {
    /// Show a custom overlay surface.
    ///
    /// At most one may be active; a second request is rejected by
    /// completing its callback as hidden immediately.
    pub fn show_overlay(&mut self, mut callback: Box<dyn OverlayCallback>) {
        if self.overlay.is_some() {
            callback.on_hidden();
            return;
        }
        debug!(session = %self.id, "showing overlay");
        self.overlay = Some(ActiveOverlay { callback });
    }

    /// Dismiss the active overlay, if any, completing its callback.
    pub fn hide_overlay(&mut self) {
        if let Some(mut active) = self.overlay.take() {
            debug!(session = %self.id, "hiding overlay");
            active.callback.on_hidden();
        }
    }

    pub fn is_overlay_showing(&self) -> bool {
        self.overlay.is_some()
    }
}
