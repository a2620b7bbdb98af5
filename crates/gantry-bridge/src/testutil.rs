//! Recording fakes shared by this crate's tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use gantry_common::{BridgeError, PlatformError, Result};

use crate::allowlist::AllowList;
use crate::config::BridgeConfig;
use crate::engine::Engine;
use crate::host::HostPlatform;
use crate::plugin::Plugin;
use crate::session::{BridgeSession, OverlayCallback};

/// Observable engine state, shared with the test through `Arc<Mutex>`.
#[derive(Debug, Default)]
pub struct EngineState {
    pub loads: Vec<(String, bool)>,
    pub scripts: Vec<String>,
    pub paused: Vec<bool>,
    pub destroyed: bool,
    pub cache_cleared: bool,
    pub history_cleared: bool,
    pub back_calls: usize,
    pub overscroll_disabled: bool,
    // Control knobs.
    pub visible: bool,
    pub can_go_back: bool,
    pub fail_eval: bool,
}

pub struct RecordingEngine(Arc<Mutex<EngineState>>);

impl RecordingEngine {
    pub fn new() -> (Self, Arc<Mutex<EngineState>>) {
        let state = Arc::new(Mutex::new(EngineState {
            visible: true,
            ..EngineState::default()
        }));
        (Self(Arc::clone(&state)), state)
    }
}

impl Engine for RecordingEngine {
    fn load_url(&mut self, url: &str, clear_nav_stack: bool) {
        self.0
            .lock()
            .unwrap()
            .loads
            .push((url.to_string(), clear_nav_stack));
    }

    fn evaluate_script(&mut self, script: &str) -> Result<()> {
        let mut state = self.0.lock().unwrap();
        if state.fail_eval {
            return Err(BridgeError::Eval("engine rejected script".into()));
        }
        state.scripts.push(script.to_string());
        Ok(())
    }

    fn url(&self) -> Option<String> {
        self.0
            .lock()
            .unwrap()
            .loads
            .last()
            .map(|(url, _)| url.clone())
    }

    fn can_go_back(&self) -> bool {
        self.0.lock().unwrap().can_go_back
    }

    fn go_back(&mut self) -> bool {
        let mut state = self.0.lock().unwrap();
        state.back_calls += 1;
        state.can_go_back
    }

    fn clear_cache(&mut self) {
        self.0.lock().unwrap().cache_cleared = true;
    }

    fn clear_history(&mut self) {
        self.0.lock().unwrap().history_cleared = true;
    }

    fn set_paused(&mut self, paused: bool) {
        self.0.lock().unwrap().paused.push(paused);
    }

    fn is_visible(&self) -> bool {
        self.0.lock().unwrap().visible
    }

    fn set_overscroll_disabled(&mut self, disabled: bool) {
        self.0.lock().unwrap().overscroll_disabled = disabled;
    }

    fn destroy(&mut self) {
        self.0.lock().unwrap().destroyed = true;
    }
}

/// Observable plugin state.
#[derive(Debug, Default)]
pub struct PluginState {
    /// Lifecycle calls in order, e.g. `"initialize"`, `"on_pause(true)"`.
    pub calls: Vec<String>,
    /// Messages observed through `on_message`.
    pub messages: Vec<(String, Value)>,
}

pub struct RecordingPlugin {
    name: String,
    state: Arc<Mutex<PluginState>>,
    claim_payload: Option<Value>,
    claim_url_prefix: Option<String>,
    nav_verdict: Option<bool>,
    external_verdict: Option<bool>,
}

impl RecordingPlugin {
    pub fn new(name: &str) -> (Self, Arc<Mutex<PluginState>>) {
        let state = Arc::new(Mutex::new(PluginState::default()));
        (
            Self {
                name: name.to_string(),
                state: Arc::clone(&state),
                claim_payload: None,
                claim_url_prefix: None,
                nav_verdict: None,
                external_verdict: None,
            },
            state,
        )
    }

    /// Claim every posted message with this payload.
    pub fn claim_messages(&mut self, payload: Value) {
        self.claim_payload = Some(payload);
    }

    /// Claim navigation attempts whose URL starts with `prefix`.
    pub fn claim_urls(&mut self, prefix: &str) {
        self.claim_url_prefix = Some(prefix.to_string());
    }

    pub fn navigation_verdict(&mut self, verdict: Option<bool>) {
        self.nav_verdict = verdict;
    }

    pub fn external_verdict(&mut self, verdict: Option<bool>) {
        self.external_verdict = verdict;
    }

    fn record(&self, call: impl Into<String>) {
        self.state.lock().unwrap().calls.push(call.into());
    }
}

impl Plugin for RecordingPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self) {
        self.record("initialize");
    }

    fn on_reset(&mut self) {
        self.record("on_reset");
    }

    fn on_message(&mut self, name: &str, payload: &Value) -> Option<Value> {
        self.state
            .lock()
            .unwrap()
            .messages
            .push((name.to_string(), payload.clone()));
        self.claim_payload.clone()
    }

    fn on_override_url_loading(&mut self, url: &str) -> bool {
        self.claim_url_prefix
            .as_deref()
            .map_or(false, |prefix| url.starts_with(prefix))
    }

    fn should_allow_navigation(&self, _url: &str) -> Option<bool> {
        self.nav_verdict
    }

    fn should_open_external_url(&self, _url: &str) -> Option<bool> {
        self.external_verdict
    }

    fn on_pause(&mut self, keep_running: bool) {
        self.record(format!("on_pause({keep_running})"));
    }

    fn on_resume(&mut self, keep_running: bool) {
        self.record(format!("on_resume({keep_running})"));
    }

    fn on_start(&mut self) {
        self.record("on_start");
    }

    fn on_stop(&mut self) {
        self.record("on_stop");
    }

    fn on_destroy(&mut self) {
        self.record("on_destroy");
    }

    fn on_new_intent(&mut self, _data: &Value) {
        self.record("on_new_intent");
    }
}

/// Observable host state.
#[derive(Debug, Default)]
pub struct HostState {
    pub opens: Vec<(String, Option<String>)>,
    pub fail: bool,
}

pub struct RecordingHost(Arc<Mutex<HostState>>);

impl RecordingHost {
    pub fn new() -> (Self, Arc<Mutex<HostState>>) {
        let state = Arc::new(Mutex::new(HostState::default()));
        (Self(Arc::clone(&state)), state)
    }
}

impl HostPlatform for RecordingHost {
    fn open_external(&mut self, url: &str, mime: Option<&str>) -> std::result::Result<(), PlatformError> {
        let mut state = self.0.lock().unwrap();
        if state.fail {
            return Err(PlatformError::ExternalOpen("no handler".into()));
        }
        state.opens.push((url.to_string(), mime.map(String::from)));
        Ok(())
    }
}

/// Overlay callback that records whether it completed.
pub struct RecordingOverlay(Arc<Mutex<bool>>);

impl RecordingOverlay {
    pub fn new() -> (Self, Arc<Mutex<bool>>) {
        let hidden = Arc::new(Mutex::new(false));
        (Self(Arc::clone(&hidden)), hidden)
    }
}

impl OverlayCallback for RecordingOverlay {
    fn on_hidden(&mut self) {
        *self.0.lock().unwrap() = true;
    }
}

/// Config with allow-lists for the well-known test hosts and the
/// timeout monitor disabled.
pub fn policy_config() -> BridgeConfig {
    BridgeConfig {
        load_url_timeout_ms: 0,
        allow_navigation: AllowList::new(["https://allowed.example/"]),
        allow_intent: AllowList::new(["https://external.example/", "file://"]),
        ..BridgeConfig::default()
    }
}

/// [`policy_config`] with the given load timeout.
pub fn timed_config(timeout_ms: u64) -> BridgeConfig {
    BridgeConfig {
        load_url_timeout_ms: timeout_ms,
        ..policy_config()
    }
}

/// An uninitialized session over recording fakes.
pub fn build_uninit_session() -> (
    BridgeSession,
    Arc<Mutex<EngineState>>,
    Arc<Mutex<HostState>>,
) {
    let (engine, engine_state) = RecordingEngine::new();
    let (host, host_state) = RecordingHost::new();
    let session = BridgeSession::new(Box::new(engine), Box::new(host));
    (session, engine_state, host_state)
}

/// An initialized session with the given plugin set.
pub fn build_session_with(
    config: BridgeConfig,
    plugins: Vec<Box<dyn Plugin>>,
) -> (
    BridgeSession,
    Arc<Mutex<EngineState>>,
    Arc<Mutex<HostState>>,
) {
    let (mut session, engine_state, host_state) = build_uninit_session();
    session.init(config, plugins).expect("init in test harness");
    (session, engine_state, host_state)
}

/// An initialized session with named recording plugins, returning each
/// plugin's state keyed by name.
pub fn build_session(
    config: BridgeConfig,
    plugin_names: Vec<&str>,
) -> (
    BridgeSession,
    Arc<Mutex<EngineState>>,
    Arc<Mutex<HostState>>,
    HashMap<String, Arc<Mutex<PluginState>>>,
) {
    let mut plugins: Vec<Box<dyn Plugin>> = Vec::new();
    let mut states = HashMap::new();
    for name in plugin_names {
        let (plugin, state) = RecordingPlugin::new(name);
        plugins.push(Box::new(plugin));
        states.insert(name.to_string(), state);
    }
    let (session, engine_state, host_state) = build_session_with(config, plugins);
    (session, engine_state, host_state, states)
}
