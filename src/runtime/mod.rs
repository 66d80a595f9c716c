//! Runtime module - routing live input to commands
//!
//! - `events` - raw key/mouse events with a handled flag
//! - `eligibility` - which events reach the shortcut system
//! - `resolver` - context data merged along the ownership chain
//! - `session` - per-class processing sessions and their notifications
//! - `input` - the shortcut input manager (keys)
//! - `mouse` - mouse button and wheel routing
//! - `executor` - foreground executor for pending dispatches

pub mod eligibility;
pub mod events;
pub mod executor;
pub mod input;
pub mod mouse;
pub mod resolver;
pub mod session;
pub mod subscription;

pub use events::{EventPhase, KeyEvent, MouseButtonEvent, MouseWheelEvent};
pub use executor::{yield_now, ForegroundExecutor, Task};
pub use input::{DispatchResult, InputOutcome, SessionGuard, ShortcutInputManager};
pub use session::{InputClass, SessionEvent, SessionEvents, SessionId};
pub use subscription::Subscription;
