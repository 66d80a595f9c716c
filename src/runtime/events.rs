//! Raw input events as delivered by the UI layer
//!
//! Each event carries a `handled` flag the input manager sets once the
//! shortcut system has claimed it, so the UI stops bubbling it further.

use serde::Deserialize;

use crate::keymap::{KeyCode, Modifiers, MouseButton};

/// A physical key press or release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub is_release: bool,
    /// Live modifier state at the time of the event
    pub modifiers: Modifiers,
    /// Generated by keyboard auto-repeat
    pub is_repeat: bool,
    pub handled: bool,
}

impl KeyEvent {
    pub fn press(key: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            key,
            is_release: false,
            modifiers,
            is_repeat: false,
            handled: false,
        }
    }

    pub fn release(key: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            is_release: true,
            ..Self::press(key, modifiers)
        }
    }

    /// Mark as an auto-repeat event (builder pattern)
    pub fn repeated(mut self) -> Self {
        self.is_repeat = true;
        self
    }
}

/// A mouse button press or release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MouseButtonEvent {
    pub button: MouseButton,
    pub is_release: bool,
    pub modifiers: Modifiers,
    pub click_count: u32,
    pub handled: bool,
}

impl MouseButtonEvent {
    pub fn press(button: MouseButton, modifiers: Modifiers, click_count: u32) -> Self {
        Self {
            button,
            is_release: false,
            modifiers,
            click_count,
            handled: false,
        }
    }

    pub fn release(button: MouseButton, modifiers: Modifiers) -> Self {
        Self {
            is_release: true,
            ..Self::press(button, modifiers, 1)
        }
    }
}

/// A mouse wheel rotation. Positive deltas scroll up (away from the user);
/// one notch is 120 units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MouseWheelEvent {
    pub delta: i32,
    pub modifiers: Modifiers,
    pub handled: bool,
}

impl MouseWheelEvent {
    pub fn new(delta: i32, modifiers: Modifiers) -> Self {
        Self {
            delta,
            modifiers,
            handled: false,
        }
    }
}

/// Event phase: preview events tunnel root-to-leaf before the bubbling pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPhase {
    Preview,
    #[default]
    Bubble,
}

impl EventPhase {
    pub fn is_preview(self) -> bool {
        self == EventPhase::Preview
    }
}
