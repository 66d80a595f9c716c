//! Shortcut input manager: raw events → strokes → commands
//!
//! Each eligible event runs inside a processing session. The session's
//! context is resolved lazily, only once a stroke could match a binding, and
//! is cached until the session ends. Dispatch is polled once; if it is still
//! pending the event is marked handled right away and the rest runs on the
//! foreground executor.

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{self, FutureExt, LocalBoxFuture};

use super::eligibility::{should_process_event_kind, should_process_key_event};
use super::events::KeyEvent;
use super::executor::{ForegroundExecutor, Task};
use super::resolver;
use super::session::{InputClass, SessionEvents, SessionId, SessionState};
use crate::commands::{CommandDispatcher, DispatchError};
use crate::keymap::{KeyAction, KeyStroke, Keymap, Modifiers, Stroke, StrokeQuery};
use crate::model::{ContextData, ElementId, ElementTree, FocusPath};

/// Result of dispatching a stroke: whether a binding matched and ran
pub type DispatchResult = Result<bool, DispatchError>;

/// What happened to an input event
#[derive(Debug)]
#[must_use]
pub enum InputOutcome {
    /// Filtered out before a session began; the event is untouched
    Ignored,
    /// Dispatch finished synchronously; `handled` was written to the event
    Completed { handled: bool },
    /// Dispatch is still running on the foreground executor. The event was
    /// marked handled even if the dispatch later finds nothing to run.
    Pending(Task<DispatchResult>),
}

impl InputOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, InputOutcome::Ignored)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, InputOutcome::Pending(_))
    }
}

/// Ends its session when dropped
#[must_use = "the session ends when the guard is dropped"]
pub struct SessionGuard {
    sessions: Rc<RefCell<SessionState>>,
    events: SessionEvents,
    class: InputClass,
    id: SessionId,
}

impl SessionGuard {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn class(&self) -> InputClass {
        self.class
    }

    /// Ends the session now rather than at scope exit
    pub fn end_input_processing(self) {
        drop(self);
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let ended = self.sessions.borrow_mut().end(self.class, self.id);
        if let Some(event) = ended {
            tracing::debug!("Ended {} session {:?}", event.class, event.id);
            self.events.notify_ended(&event);
        }
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("class", &self.class)
            .field("id", &self.id)
            .finish()
    }
}

pub struct ShortcutInputManager {
    keymap: Rc<RefCell<Keymap>>,
    dispatcher: Rc<dyn CommandDispatcher>,
    executor: Rc<ForegroundExecutor>,
    sessions: Rc<RefCell<SessionState>>,
    events: SessionEvents,
}

impl ShortcutInputManager {
    pub fn new(
        keymap: Rc<RefCell<Keymap>>,
        dispatcher: Rc<dyn CommandDispatcher>,
        executor: Rc<ForegroundExecutor>,
    ) -> Self {
        Self {
            keymap,
            dispatcher,
            executor,
            sessions: Rc::new(RefCell::new(SessionState::default())),
            events: SessionEvents::new(),
        }
    }

    pub fn keymap(&self) -> &Rc<RefCell<Keymap>> {
        &self.keymap
    }

    pub fn executor(&self) -> &Rc<ForegroundExecutor> {
        &self.executor
    }

    /// Session began/ended notifications
    pub fn session_events(&self) -> &SessionEvents {
        &self.events
    }

    /// Start a session for `class`, superseding any active session of that class
    pub fn begin_input_processing(&self, class: InputClass, target: ElementId) -> SessionGuard {
        let (began, superseded) = self.sessions.borrow_mut().begin(class, target);

        if let Some(old) = superseded {
            tracing::debug!("Superseded {} session {:?}", old.class, old.id);
            self.events.notify_ended(&old);
        }
        tracing::debug!("Began {} session {:?} on {:?}", class, began.id, target);
        self.events.notify_began(&began);

        SessionGuard {
            sessions: Rc::clone(&self.sessions),
            events: self.events.clone(),
            class,
            id: began.id,
        }
    }

    pub fn is_processing(&self, class: InputClass) -> bool {
        self.sessions.borrow().get(class).is_some()
    }

    pub fn current_target(&self, class: InputClass) -> Option<ElementId> {
        self.sessions.borrow().get(class).map(|s| s.target)
    }

    /// Context of the most recently begun active session
    pub fn current_context(&self, tree: &dyn ElementTree) -> Option<Rc<ContextData>> {
        let class = self.sessions.borrow().last_begun()?;
        self.current_context_for(tree, class)
    }

    /// Context of the active `class` session, resolved on first access and
    /// cached until the session ends
    pub fn current_context_for(
        &self,
        tree: &dyn ElementTree,
        class: InputClass,
    ) -> Option<Rc<ContextData>> {
        let mut sessions = self.sessions.borrow_mut();
        let session = sessions.get_mut(class)?;
        if let Some(context) = &session.context {
            return Some(Rc::clone(context));
        }

        let context = Rc::new(resolver::resolve(tree, Some(session.target))?);
        tracing::debug!("Resolved {} context {:?}", class, context);
        session.context = Some(Rc::clone(&context));
        Some(context)
    }

    /// Handle a key press or release delivered to `focused`
    ///
    /// Modifier keys produce strokes without modifiers, so pressing Ctrl
    /// yields `Ctrl` rather than `Ctrl+Ctrl`.
    pub fn on_key_event(
        &self,
        tree: &dyn ElementTree,
        focused: ElementId,
        event: &mut KeyEvent,
        is_preview: bool,
    ) -> Result<InputOutcome, DispatchError> {
        if !should_process_event_kind(tree, focused, is_preview)
            || !should_process_key_event(tree, focused, event.modifiers)
        {
            tracing::trace!("Key event for {:?} not eligible", focused);
            return Ok(InputOutcome::Ignored);
        }

        let guard = self.begin_input_processing(InputClass::Keyboard, focused);
        let mods = if event.key.is_modifier() {
            Modifiers::NONE
        } else {
            event.modifiers
        };
        let stroke = KeyStroke {
            key: event.key,
            mods,
            is_release: event.is_release,
        };

        let path = self.focus_path(tree, focused);
        let dispatch = self.process_stroke(
            tree,
            InputClass::Keyboard,
            &path,
            stroke.into(),
            event.is_repeat,
        );
        self.finish(guard, dispatch, &mut event.handled)
    }

    /// Match a stroke against the keymap and dispatch the bound command
    ///
    /// `path` is the focus path, leaf first; its focus groups scope the
    /// lookup. Resolves to whether a binding matched and its command ran. A
    /// stroke that starts or continues a chord counts as matched.
    pub fn process_stroke(
        &self,
        tree: &dyn ElementTree,
        class: InputClass,
        path: &FocusPath,
        stroke: Stroke,
        is_repeat: bool,
    ) -> LocalBoxFuture<'static, DispatchResult> {
        if !self.keymap.borrow().may_match(&stroke) {
            tracing::trace!("No binding for {}", stroke);
            return future::ready(Ok(false)).boxed_local();
        }

        let context = self.current_context_for(tree, class);
        let scopes: Vec<&str> = path.iter().filter_map(|e| tree.focus_group(e)).collect();
        let query = StrokeQuery {
            scopes: &scopes,
            context: context.as_deref(),
            is_repeat,
        };

        let action = self.keymap.borrow_mut().handle_stroke_with(stroke, &query);
        match action {
            KeyAction::Execute(command) => {
                tracing::debug!("{} → {}", stroke, command);
                let context = context.unwrap_or_else(|| Rc::new(ContextData::new()));
                self.dispatcher.dispatch(&command, context)
            }
            KeyAction::AwaitMore => {
                tracing::debug!("{} started or continued a chord", stroke);
                future::ready(Ok(true)).boxed_local()
            }
            KeyAction::NoMatch => future::ready(Ok(false)).boxed_local(),
        }
    }

    /// Focus path used for scoping: the focused chain, or the target's own
    /// chain when nothing has focus
    pub(super) fn focus_path(&self, tree: &dyn ElementTree, target: ElementId) -> FocusPath {
        let path = tree.focused_path();
        if path.is_empty() {
            tree.path_from(target)
        } else {
            path
        }
    }

    /// Poll the dispatch once, then either settle the event or hand the rest
    /// to the executor. The session ends when `guard` drops.
    pub(super) fn finish(
        &self,
        guard: SessionGuard,
        mut dispatch: LocalBoxFuture<'static, DispatchResult>,
        handled: &mut bool,
    ) -> Result<InputOutcome, DispatchError> {
        match (&mut dispatch).now_or_never() {
            Some(result) => {
                drop(guard);
                let matched = result?;
                *handled = matched;
                Ok(InputOutcome::Completed { handled: matched })
            }
            None => {
                *handled = true;
                tracing::debug!("Dispatch pending for session {:?}", guard.id());
                let task = self.executor.spawn(async move {
                    let result = dispatch.await;
                    drop(guard);
                    if let Err(e) = &result {
                        tracing::error!("Shortcut dispatch failed: {}", e);
                    }
                    result
                });
                Ok(InputOutcome::Pending(task))
            }
        }
    }
}

impl std::fmt::Debug for ShortcutInputManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShortcutInputManager")
            .field("sessions", &self.sessions)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandManager;
    use crate::keymap::{KeyCode, Keybinding};
    use crate::model::{data_keys, ElementKind, UiTree};
    use std::cell::Cell;

    fn tree() -> (UiTree, ElementId) {
        let mut tree = UiTree::new();
        let window = tree.add_root(ElementKind::Window, "window");
        tree.set_context_data(window, ContextData::new().with(data_keys::HOST_WINDOW, window));
        tree.focus(Some(window));
        (tree, window)
    }

    fn manager(bindings: Vec<Keybinding>, commands: CommandManager) -> ShortcutInputManager {
        ShortcutInputManager::new(
            Rc::new(RefCell::new(Keymap::with_bindings(bindings))),
            Rc::new(commands),
            Rc::new(ForegroundExecutor::new()),
        )
    }

    #[test]
    fn test_guard_drop_ends_session() {
        let (_, window) = tree();
        let input = manager(vec![], CommandManager::new());

        let guard = input.begin_input_processing(InputClass::Keyboard, window);
        assert!(input.is_processing(InputClass::Keyboard));
        assert_eq!(input.current_target(InputClass::Keyboard), Some(window));

        drop(guard);
        assert!(!input.is_processing(InputClass::Keyboard));
        assert_eq!(input.current_target(InputClass::Keyboard), None);
    }

    #[test]
    fn test_superseding_session_notifies_end_once() {
        let (_, window) = tree();
        let input = manager(vec![], CommandManager::new());
        let ended = Rc::new(Cell::new(0));
        let counter = Rc::clone(&ended);
        let _sub = input
            .session_events()
            .subscribe_ended(move |_| counter.set(counter.get() + 1));

        let first = input.begin_input_processing(InputClass::Mouse, window);
        let second = input.begin_input_processing(InputClass::Mouse, window);
        assert_eq!(ended.get(), 1);

        drop(first);
        assert_eq!(ended.get(), 1);
        assert!(input.is_processing(InputClass::Mouse));

        drop(second);
        assert_eq!(ended.get(), 2);
    }

    #[test]
    fn test_context_cached_per_session() {
        let (tree, window) = tree();
        let input = manager(vec![], CommandManager::new());
        assert!(input.current_context(&tree).is_none());

        let guard = input.begin_input_processing(InputClass::Keyboard, window);
        let first = input.current_context(&tree).unwrap();
        let second = input.current_context(&tree).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.get(data_keys::HOST_WINDOW), Some(&window));
        drop(guard);

        assert!(input.current_context(&tree).is_none());
        let _guard = input.begin_input_processing(InputClass::Keyboard, window);
        let fresh = input.current_context(&tree).unwrap();
        assert!(!Rc::ptr_eq(&first, &fresh));
    }

    #[test]
    fn test_unbound_stroke_skips_context_resolution() {
        let (tree, window) = tree();
        let input = manager(vec![], CommandManager::new());
        let _guard = input.begin_input_processing(InputClass::Keyboard, window);

        let stroke: Stroke = KeyStroke::new(KeyCode::Char('q'), Modifiers::CTRL).into();
        let result = input
            .process_stroke(&tree, InputClass::Keyboard, &tree.focused_path(), stroke, false)
            .now_or_never();

        assert!(matches!(result, Some(Ok(false))));
        let sessions = input.sessions.borrow();
        assert!(sessions.get(InputClass::Keyboard).unwrap().context.is_none());
    }

    #[test]
    fn test_sync_fault_propagates_and_cleans_up() {
        let (tree, window) = tree();
        let mut commands = CommandManager::new();
        commands.register_fn("NewFile", |_| anyhow::bail!("no disk"));
        let stroke = KeyStroke::new(KeyCode::Char('n'), Modifiers::CTRL);
        let input = manager(vec![Keybinding::new(stroke, "NewFile")], commands);

        let mut event = KeyEvent::press(KeyCode::Char('n'), Modifiers::CTRL);
        let err = input.on_key_event(&tree, window, &mut event, false).unwrap_err();

        assert_eq!(err.command().as_str(), "NewFile");
        assert!(!event.handled);
        assert!(!input.is_processing(InputClass::Keyboard));
    }
}
