//! Input eligibility: whether a raw event may reach the shortcut system
//!
//! Text inputs swallow typing by default. Their flags decide which strokes
//! still get a chance to trigger shortcuts.

use crate::keymap::Modifiers;
use crate::model::{ElementId, ElementTree};

/// The target handles exactly one of the preview and bubbling phases
pub fn should_process_event_kind(tree: &dyn ElementTree, target: ElementId, is_preview: bool) -> bool {
    tree.input_flags(target).use_preview_events == is_preview
}

/// Mouse strokes are eligible unless a text input that opts out has focus
pub fn should_process_mouse_event(tree: &dyn ElementTree, focused: Option<ElementId>) -> bool {
    match focused {
        Some(element) if tree.is_text_input(element) => {
            tree.input_flags(element).can_process_text_box_mouse_stroke
        }
        _ => true,
    }
}

pub fn should_process_key_event(tree: &dyn ElementTree, focused: ElementId, modifiers: Modifiers) -> bool {
    if !tree.is_text_input(focused) {
        return true;
    }

    let flags = tree.input_flags(focused);
    if modifiers.is_empty() {
        flags.can_process_text_box_key_stroke
    } else {
        flags.can_process_text_box_key_stroke_with_modifiers
    }
}
