//! Quill - shortcut routing for a notepad
//!
//! This crate turns raw keyboard and mouse events into commands: events are
//! normalized into strokes, matched against a scoped, context-gated keymap,
//! and dispatched inside per-device processing sessions.

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod demo;
pub mod keymap;
pub mod model;
pub mod replay;
pub mod runtime;
pub mod tracing;

// Re-export commonly used types
pub use commands::{CommandDispatcher, CommandId, CommandManager, DispatchError};
pub use config::InputConfig;
pub use keymap::{Keymap, Stroke};
pub use runtime::{InputClass, InputOutcome, ShortcutInputManager};
