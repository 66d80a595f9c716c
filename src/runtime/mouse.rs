//! Mouse button and wheel routing
//!
//! Mouse events run through the same session state machine as keys. The
//! target is the element under the pointer; text-input eligibility is
//! decided by the focused element.

use super::eligibility::{should_process_event_kind, should_process_mouse_event};
use super::events::{MouseButtonEvent, MouseWheelEvent};
use super::input::{InputOutcome, ShortcutInputManager};
use super::session::InputClass;
use crate::commands::DispatchError;
use crate::keymap::{MouseButton, MouseStroke, Stroke};
use crate::model::{ElementId, ElementTree};

impl ShortcutInputManager {
    /// Handle a mouse button press or release over `target`
    pub fn on_mouse_button(
        &self,
        tree: &dyn ElementTree,
        target: ElementId,
        event: &mut MouseButtonEvent,
        is_preview: bool,
    ) -> Result<InputOutcome, DispatchError> {
        if !self.mouse_eligible(tree, target, is_preview) {
            return Ok(InputOutcome::Ignored);
        }

        let stroke = MouseStroke::new(
            event.button,
            event.modifiers,
            event.is_release,
            event.click_count,
        );
        self.route_mouse(tree, target, stroke.into(), &mut event.handled)
    }

    /// Handle a wheel rotation over `target`
    ///
    /// The sign of the delta picks `WheelUp` or `WheelDown`; a zero delta is
    /// dropped without starting a session.
    pub fn on_mouse_wheel(
        &self,
        tree: &dyn ElementTree,
        target: ElementId,
        event: &mut MouseWheelEvent,
        is_preview: bool,
    ) -> Result<InputOutcome, DispatchError> {
        let Some(button) = MouseButton::from_wheel_delta(event.delta) else {
            return Ok(InputOutcome::Ignored);
        };
        if !self.mouse_eligible(tree, target, is_preview) {
            return Ok(InputOutcome::Ignored);
        }

        let stroke = MouseStroke::wheel(button, event.modifiers, event.delta);
        self.route_mouse(tree, target, stroke.into(), &mut event.handled)
    }

    fn mouse_eligible(&self, tree: &dyn ElementTree, target: ElementId, is_preview: bool) -> bool {
        let eligible = should_process_event_kind(tree, target, is_preview)
            && should_process_mouse_event(tree, tree.focused());
        if !eligible {
            tracing::trace!("Mouse event over {:?} not eligible", target);
        }
        eligible
    }

    fn route_mouse(
        &self,
        tree: &dyn ElementTree,
        target: ElementId,
        stroke: Stroke,
        handled: &mut bool,
    ) -> Result<InputOutcome, DispatchError> {
        let guard = self.begin_input_processing(InputClass::Mouse, target);
        let path = self.focus_path(tree, target);
        let dispatch = self.process_stroke(tree, InputClass::Mouse, &path, stroke, false);
        self.finish(guard, dispatch, handled)
    }
}
