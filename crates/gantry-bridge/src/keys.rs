//! Hardware keys, key events, and the key→script-event table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hardware keys the embedded view can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HardwareKey {
    VolumeDown,
    VolumeUp,
    Back,
    Menu,
    Search,
}

impl HardwareKey {
    /// Whether scripts may claim this key via the key-claim API.
    ///
    /// Search is dispatchable but not claimable.
    pub fn is_claimable(self) -> bool {
        !matches!(self, HardwareKey::Search)
    }

    /// Script event fired when a claimed key is released.
    pub fn script_event(self) -> &'static str {
        match self {
            HardwareKey::VolumeDown => "volumedownbutton",
            HardwareKey::VolumeUp => "volumeupbutton",
            HardwareKey::Back => "backbutton",
            HardwareKey::Menu => "menubutton",
            HardwareKey::Search => "searchbutton",
        }
    }
}

impl fmt::Display for HardwareKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Press phase of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
}

/// A hardware key event dispatched by the host key-dispatch cycle.
#[derive(Debug, Clone, Copy)]
pub struct KeyEvent {
    pub key: HardwareKey,
    pub action: KeyAction,
}

impl KeyEvent {
    pub fn down(key: HardwareKey) -> Self {
        Self {
            key,
            action: KeyAction::Down,
        }
    }

    pub fn up(key: HardwareKey) -> Self {
        Self {
            key,
            action: KeyAction::Up,
        }
    }
}
