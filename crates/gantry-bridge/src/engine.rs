//! Embedded engine collaborator surface.

use gantry_common::Result;

/// Engine error code reported when a load times out.
pub const ERROR_CONNECT: i32 = -6;

/// Description delivered with [`ERROR_CONNECT`].
pub const ERROR_CONNECT_DESCRIPTION: &str = "The connection to the server was unsuccessful.";

/// The embedded browser engine, opaque to the bridge beyond this
/// interface.
///
/// The bridge drives the engine only from the session's owning context;
/// every call is fire-and-forget from the caller's perspective. The
/// engine reports page lifecycle, key dispatch, and navigation attempts
/// back through the session's client methods
/// ([`crate::session::BridgeSession::on_page_started`] and friends).
pub trait Engine {
    /// Begin loading `url`. `clear_nav_stack` resets the engine's
    /// back/forward history for the new page.
    fn load_url(&mut self, url: &str, clear_nav_stack: bool);

    /// Evaluate a script statement in the page's script context.
    fn evaluate_script(&mut self, script: &str) -> Result<()>;

    /// URL of the current page, if any.
    fn url(&self) -> Option<String>;

    fn can_go_back(&self) -> bool;

    /// Navigate one step back. Returns whether a navigation happened.
    fn go_back(&mut self) -> bool;

    fn clear_cache(&mut self);

    fn clear_history(&mut self);

    /// Suspend or resume the page's script timers.
    fn set_paused(&mut self, paused: bool);

    /// Whether the view has become visible to the user yet.
    fn is_visible(&self) -> bool;

    /// Disable view overscroll. Applied once at session init when
    /// configured.
    fn set_overscroll_disabled(&mut self, disabled: bool);

    /// Release the engine. The bridge makes no calls after this.
    fn destroy(&mut self);
}
