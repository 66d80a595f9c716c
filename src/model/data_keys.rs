//! Well-known context keys attached by the notepad's views

use super::context::DataKey;
use super::tree::ElementId;

/// The top-level window hosting the focused element
pub const HOST_WINDOW: DataKey<ElementId> = DataKey::new("host_window");

/// The notepad panel (document tabs + editor)
pub const NOTEPAD: DataKey<ElementId> = DataKey::new("notepad");

/// The active document, by name
pub const DOCUMENT: DataKey<String> = DataKey::new("document");

/// The text editor control showing the active document
pub const TEXT_EDITOR: DataKey<ElementId> = DataKey::new("text_editor");
