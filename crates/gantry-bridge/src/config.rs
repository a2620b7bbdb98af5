//! Bridge configuration schema and TOML loading.
//!
//! All structs use `serde(default)` so partial configs work correctly.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use gantry_common::ConfigError;

use crate::allowlist::AllowList;

/// Default top-level load timeout.
pub const DEFAULT_LOAD_URL_TIMEOUT_MS: u64 = 20_000;

/// Recognized bridge options. Missing fields use defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Top-level load timeout in milliseconds. `0` disables the
    /// timeout monitor entirely.
    pub load_url_timeout_ms: u64,
    /// Disable view overscroll. View-level behavior, applied to the
    /// engine once at session init.
    pub disallow_overscroll: bool,
    /// URL prefixes permitted for in-view navigation.
    pub allow_navigation: AllowList,
    /// URL prefixes permitted for external-intent delegation.
    pub allow_intent: AllowList,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            load_url_timeout_ms: DEFAULT_LOAD_URL_TIMEOUT_MS,
            disallow_overscroll: false,
            allow_navigation: AllowList::default(),
            allow_intent: AllowList::default(),
        }
    }
}

/// Load config from a specific TOML file path.
///
/// Deserializes the file using serde defaults for any missing fields.
/// After loading, the config is validated; if validation fails, a
/// warning is logged and the default config is returned. Defaults have
/// empty allow-lists, so the fallback blocks every navigation.
pub fn load_from_path(path: &Path) -> Result<BridgeConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: BridgeConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validate(&config) {
        warn!("config validation warning: {e}");
        warn!("falling back to default config");
        return Ok(BridgeConfig::default());
    }

    info!("loaded bridge config from {}", path.display());
    Ok(config)
}

/// An empty pattern prefix-matches every URL, which would silently turn
/// an allow-list into allow-all.
pub fn validate(config: &BridgeConfig) -> Result<(), ConfigError> {
    for (list, name) in [
        (&config.allow_navigation, "allow_navigation"),
        (&config.allow_intent, "allow_intent"),
    ] {
        if list.patterns().iter().any(|p| p.is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "{name} contains an empty pattern"
            )));
        }
    }
    Ok(())
}
