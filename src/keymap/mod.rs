//! Configurable shortcut mapping
//!
//! This module provides a data-driven binding system that:
//! - Maps key and mouse strokes to command ids
//! - Supports platform-specific modifier handling (Cmd on macOS, Ctrl elsewhere)
//! - Scopes bindings to focus groups and gates them on context predicates
//! - Enables user customization via YAML config files
//! - Supports multi-stroke chords
//!
//! # Architecture
//!
//! ```text
//! winit event → KeyEvent/MouseButtonEvent/MouseWheelEvent → Stroke
//!     → Keymap::handle_stroke_with(scopes, context) → CommandId
//! ```
//!
//! # Loading Keymaps
//!
//! ```ignore
//! // Embedded defaults merged with project and user overrides
//! let keymap = Keymap::with_bindings(load_default_keymap());
//!
//! // Or a single YAML file
//! let keymap = Keymap::with_bindings(load_keymap_file(Path::new("keymap.yaml"))?);
//! ```

mod binding;
mod config;
mod context;
mod defaults;
#[allow(clippy::module_inception)]
mod keymap;
mod types;
mod winit_adapter;

pub use binding::Keybinding;
pub use config::{
    load_keymap_file, parse_key_string, parse_keymap_yaml, parse_modifiers, parse_stroke_sequence,
    KeymapError,
};
pub use context::Condition;
pub use defaults::{
    default_bindings, get_user_config_path, load_default_keymap, load_layered_keymap,
    merge_bindings, DEFAULT_KEYMAP_YAML,
};
pub use keymap::{KeyAction, Keymap, StrokeQuery};
pub use types::{KeyCode, KeyStroke, Modifiers, MouseButton, MouseStroke, Stroke};
pub use winit_adapter::{
    key_code_from_winit, key_event_from_winit, modifiers_from_winit, mouse_button_event_from_winit,
    mouse_button_from_winit, mouse_wheel_event_from_winit, wheel_delta_from_winit,
};

#[cfg(test)]
mod tests;
