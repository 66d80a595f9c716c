//! Default keybindings for the notepad
//!
//! The shipped bindings live in keymap.yaml at the project root and are
//! embedded at compile time; `default_bindings` is the hardcoded fallback.

use std::path::{Path, PathBuf};

use super::binding::Keybinding;
use super::config::{load_keymap_file, parse_keymap_yaml};
use super::context::Condition;
use super::types::{KeyCode, KeyStroke, Modifiers, MouseButton, MouseStroke};
use crate::model::data_keys;

/// Default keymap YAML embedded at compile time
pub const DEFAULT_KEYMAP_YAML: &str = include_str!("../../keymap.yaml");

/// Get the user's keymap configuration path
///
/// Returns `~/.config/quill/keymap.yaml` on Unix
/// Returns `%APPDATA%\quill\keymap.yaml` on Windows
pub fn get_user_config_path() -> Option<PathBuf> {
    crate::config_paths::keymap_file()
}

/// Load and merge keymaps: defaults + project + user overrides
pub fn load_default_keymap() -> Vec<Keybinding> {
    load_layered_keymap(None)
}

/// Load and merge keymaps, with an optional extra layer on top
///
/// Loading order (each layer overrides the previous):
/// 1. Embedded default keymap (compiled into binary)
/// 2. keymap.yaml in current directory (project-local overrides)
/// 3. User config at ~/.config/quill/keymap.yaml
/// 4. `extra`, e.g. a path given on the command line
///
/// Bindings with `command: Unbound` remove matching bindings from earlier layers.
pub fn load_layered_keymap(extra: Option<&Path>) -> Vec<Keybinding> {
    let mut bindings = match parse_keymap_yaml(DEFAULT_KEYMAP_YAML) {
        Ok(b) => {
            tracing::info!("Loaded embedded default keymap ({} bindings)", b.len());
            b
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse embedded keymap: {}, using hardcoded defaults",
                e
            );
            default_bindings()
        }
    };

    if let Ok(local_bindings) = load_keymap_file(Path::new("keymap.yaml")) {
        tracing::info!(
            "Merging project keymap.yaml ({} bindings)",
            local_bindings.len()
        );
        bindings = merge_bindings(bindings, local_bindings);
    }

    if let Some(user_path) = get_user_config_path() {
        if user_path.exists() {
            bindings = merge_layer(bindings, &user_path);
        }
    }

    if let Some(extra) = extra {
        bindings = merge_layer(bindings, extra);
    }

    bindings
}

fn merge_layer(bindings: Vec<Keybinding>, path: &Path) -> Vec<Keybinding> {
    match load_keymap_file(path) {
        Ok(layer) => {
            tracing::info!(
                "Merging keymap from {} ({} bindings)",
                path.display(),
                layer.len()
            );
            merge_bindings(bindings, layer)
        }
        Err(e) => {
            tracing::warn!("Failed to load keymap from {}: {}", path.display(), e);
            bindings
        }
    }
}

/// Merge override bindings into base bindings
///
/// - Same strokes + scope + conditions as a base binding: replaces it
/// - Command `Unbound`: removes every base binding with the same strokes + scope
/// - Otherwise: added
pub fn merge_bindings(base: Vec<Keybinding>, overrides: Vec<Keybinding>) -> Vec<Keybinding> {
    let mut result = base;

    for binding in overrides {
        if binding.command.is_unbound() {
            result.retain(|b| b.strokes != binding.strokes || b.scope != binding.scope);
            continue;
        }

        let existing_idx = result.iter().position(|b| {
            b.strokes == binding.strokes && b.scope == binding.scope && b.when == binding.when
        });

        match existing_idx {
            Some(idx) => result[idx] = binding,
            None => result.push(binding),
        }
    }

    result
}

/// Hardcoded default bindings for the current platform
///
/// Mirrors keymap.yaml; used when the embedded YAML fails to parse.
pub fn default_bindings() -> Vec<Keybinding> {
    let cmd = Modifiers::cmd();
    let ctrl = Modifiers::CTRL;
    let none = Modifiers::NONE;

    let has_document = || Condition::has(data_keys::DOCUMENT.id());
    let has_editor = || Condition::has(data_keys::TEXT_EDITOR.id());

    vec![
        // File
        Keybinding::new(KeyStroke::new(KeyCode::Char('n'), cmd), "NewFile").no_repeat(),
        Keybinding::new(KeyStroke::new(KeyCode::Char('o'), cmd), "OpenFile").no_repeat(),
        Keybinding::chord(
            vec![
                KeyStroke::new(KeyCode::Char('k'), ctrl).into(),
                KeyStroke::new(KeyCode::Char('o'), ctrl).into(),
            ],
            "OpenFile",
        ),
        // Documents
        Keybinding::new(KeyStroke::new(KeyCode::Char('w'), cmd), "CloseDocument")
            .in_scope("notepad")
            .when_single(has_document()),
        Keybinding::new(KeyStroke::new(KeyCode::F(4), cmd), "CloseDocument")
            .in_scope("notepad")
            .when_single(has_document()),
        Keybinding::new(
            MouseStroke::new(MouseButton::Middle, none, false, 0),
            "CloseDocument",
        )
        .in_scope("tabs")
        .when_single(has_document()),
        // Editor
        Keybinding::new(KeyStroke::new(KeyCode::Char('l'), cmd), "SelectLine")
            .in_scope("editor")
            .when_single(has_editor()),
        Keybinding::new(
            MouseStroke::new(MouseButton::Left, none, false, 3),
            "SelectLine",
        )
        .in_scope("editor")
        .when_single(has_editor()),
        // View
        Keybinding::new(MouseStroke::wheel(MouseButton::WheelUp, ctrl, 0), "ZoomIn"),
        Keybinding::new(MouseStroke::wheel(MouseButton::WheelDown, ctrl, 0), "ZoomOut"),
        Keybinding::new(KeyStroke::new(KeyCode::Char('+'), cmd), "ZoomIn"),
        Keybinding::new(KeyStroke::new(KeyCode::Char('-'), cmd), "ZoomOut"),
        Keybinding::new(KeyStroke::release(KeyCode::Alt, none), "ToggleMenuBar")
            .when_single(Condition::missing(data_keys::TEXT_EDITOR.id())),
    ]
}
