//! UI-side model the input layer reads from
//!
//! The notepad's views own these values; the input layer only borrows them:
//! - `context` - ordered key-value context attached to elements
//! - `data_keys` - well-known context keys
//! - `tree` - element ownership, focus and per-element input flags
//! - `property` - observable fields with change hooks

pub mod context;
pub mod data_keys;
pub mod property;
pub mod tree;

pub use context::{ContextData, DataKey};
pub use property::Property;
pub use tree::{ElementId, ElementKind, ElementTree, FocusPath, InputFlags, UiTree};
