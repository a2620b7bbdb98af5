//! Plugin capability interface and registry.

use serde_json::Value;
use tracing::{debug, warn};

use crate::allowlist::AllowList;

/// A natively implemented plugin.
///
/// Every capability has a default implementation so a plugin opts in to
/// only what it handles. Navigation verdicts return `Option<bool>`:
/// `None` defers to the next plugin and finally to the configured
/// allow-list.
pub trait Plugin {
    /// Registry name, unique per session.
    fn name(&self) -> &str;

    /// Called once per plugin (re)initialization cycle.
    fn initialize(&mut self) {}

    /// The page navigated; per-page hooks must be re-established.
    fn on_reset(&mut self) {}

    /// Handle a named bridge event. Return a value to claim it.
    fn on_message(&mut self, _name: &str, _payload: &Value) -> Option<Value> {
        None
    }

    /// Claim a navigation attempt for internal handling.
    fn on_override_url_loading(&mut self, _url: &str) -> bool {
        false
    }

    /// Policy verdict for in-view navigation.
    fn should_allow_navigation(&self, _url: &str) -> Option<bool> {
        None
    }

    /// Policy verdict for external-intent delegation.
    fn should_open_external_url(&self, _url: &str) -> Option<bool> {
        None
    }

    fn on_pause(&mut self, _keep_running: bool) {}
    fn on_resume(&mut self, _keep_running: bool) {}
    fn on_start(&mut self) {}
    fn on_stop(&mut self) {}
    fn on_destroy(&mut self) {}
    fn on_new_intent(&mut self, _data: &Value) {}
}

/// The registered plugin set plus the configured navigation policy.
///
/// Dispatch order is registration order; the first plugin to claim a
/// message or return a policy verdict wins.
pub struct PluginRegistry {
    plugins: Vec<Box<dyn Plugin>>,
    nav_allowlist: AllowList,
    external_allowlist: AllowList,
}

impl PluginRegistry {
    pub fn new(nav_allowlist: AllowList, external_allowlist: AllowList) -> Self {
        Self {
            plugins: Vec::new(),
            nav_allowlist,
            external_allowlist,
        }
    }

    /// Register a plugin. A plugin with the same name is replaced in
    /// place, keeping its dispatch position.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        if let Some(slot) = self
            .plugins
            .iter()
            .position(|p| p.name() == plugin.name())
        {
            warn!(name = plugin.name(), "replacing already-registered plugin");
            self.plugins[slot] = plugin;
        } else {
            self.plugins.push(plugin);
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// (Re)initialize every plugin, in registration order.
    pub fn init_all(&mut self) {
        debug!(count = self.plugins.len(), "initializing plugins");
        for plugin in &mut self.plugins {
            plugin.initialize();
        }
    }

    /// Notify every plugin that per-page state was reset.
    pub fn reset_all(&mut self) {
        for plugin in &mut self.plugins {
            plugin.on_reset();
        }
    }

    /// Offer a named event to the plugin set. The first non-`None`
    /// answer wins.
    pub fn post_message(&mut self, name: &str, payload: &Value) -> Option<Value> {
        for plugin in &mut self.plugins {
            if let Some(result) = plugin.on_message(name, payload) {
                return Some(result);
            }
        }
        None
    }

    /// Whether any plugin claims the navigation for internal handling.
    pub fn on_override_url_loading(&mut self, url: &str) -> bool {
        self.plugins
            .iter_mut()
            .any(|p| p.on_override_url_loading(url))
    }

    /// Whether `url` may load inside the embedded view. The first
    /// plugin verdict wins; with no verdict, the configured
    /// allow-list decides.
    pub fn should_allow_navigation(&self, url: &str) -> bool {
        for plugin in &self.plugins {
            if let Some(verdict) = plugin.should_allow_navigation(url) {
                return verdict;
            }
        }
        self.nav_allowlist.allows(url)
    }

    /// Whether `url` may be handed to the host's external opener. Same
    /// resolution order as navigation.
    pub fn should_open_external_url(&self, url: &str) -> bool {
        for plugin in &self.plugins {
            if let Some(verdict) = plugin.should_open_external_url(url) {
                return verdict;
            }
        }
        self.external_allowlist.allows(url)
    }

    pub fn on_pause(&mut self, keep_running: bool) {
        for plugin in &mut self.plugins {
            plugin.on_pause(keep_running);
        }
    }

    pub fn on_resume(&mut self, keep_running: bool) {
        for plugin in &mut self.plugins {
            plugin.on_resume(keep_running);
        }
    }

    pub fn on_start(&mut self) {
        for plugin in &mut self.plugins {
            plugin.on_start();
        }
    }

    pub fn on_stop(&mut self) {
        for plugin in &mut self.plugins {
            plugin.on_stop();
        }
    }

    pub fn on_destroy(&mut self) {
        for plugin in &mut self.plugins {
            plugin.on_destroy();
        }
    }

    pub fn on_new_intent(&mut self, data: &Value) {
        for plugin in &mut self.plugins {
            plugin.on_new_intent(data);
        }
    }
}
