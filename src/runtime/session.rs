//! Processing sessions: the bounded lifetime of handling one physical event
//!
//! Keyboard and mouse each have at most one active session. Sessions of
//! different classes overlap freely and are tracked independently.

use std::fmt;
use std::rc::Rc;

use super::subscription::{SubscriberList, Subscription};
use crate::model::{ContextData, ElementId};

/// Class of input device an event came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputClass {
    Keyboard,
    Mouse,
}

impl fmt::Display for InputClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputClass::Keyboard => write!(f, "keyboard"),
            InputClass::Mouse => write!(f, "mouse"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

/// Payload of session began/ended notifications
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionEvent {
    pub id: SessionId,
    pub class: InputClass,
    pub target: ElementId,
}

#[derive(Debug)]
pub(crate) struct Session {
    pub id: SessionId,
    pub target: ElementId,
    /// Lazily resolved context, shared with dispatched commands
    pub context: Option<Rc<ContextData>>,
}

impl Session {
    fn event(&self, class: InputClass) -> SessionEvent {
        SessionEvent {
            id: self.id,
            class,
            target: self.target,
        }
    }
}

/// Active sessions per input class
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    keyboard: Option<Session>,
    mouse: Option<Session>,
    /// Class of the most recently begun session that is still active
    last_begun: Option<InputClass>,
    next_id: u64,
}

impl SessionState {
    pub fn get(&self, class: InputClass) -> Option<&Session> {
        match class {
            InputClass::Keyboard => self.keyboard.as_ref(),
            InputClass::Mouse => self.mouse.as_ref(),
        }
    }

    pub fn get_mut(&mut self, class: InputClass) -> Option<&mut Session> {
        self.slot(class).as_mut()
    }

    fn slot(&mut self, class: InputClass) -> &mut Option<Session> {
        match class {
            InputClass::Keyboard => &mut self.keyboard,
            InputClass::Mouse => &mut self.mouse,
        }
    }

    pub fn last_begun(&self) -> Option<InputClass> {
        self.last_begun
    }

    /// Start a session, returning it and the session it superseded, if any
    pub fn begin(&mut self, class: InputClass, target: ElementId) -> (SessionEvent, Option<SessionEvent>) {
        let id = SessionId(self.next_id);
        self.next_id += 1;

        let session = Session {
            id,
            target,
            context: None,
        };
        let began = session.event(class);
        let superseded = self.slot(class).replace(session).map(|old| old.event(class));
        self.last_begun = Some(class);
        (began, superseded)
    }

    /// End the session `id` of `class`; a no-op if it already ended or was superseded
    pub fn end(&mut self, class: InputClass, id: SessionId) -> Option<SessionEvent> {
        let slot = self.slot(class);
        if slot.as_ref().map(|s| s.id) != Some(id) {
            return None;
        }
        let ended = slot.take().map(|s| s.event(class));

        if self.last_begun == Some(class) {
            let other = match class {
                InputClass::Keyboard => InputClass::Mouse,
                InputClass::Mouse => InputClass::Keyboard,
            };
            self.last_begun = self.get(other).map(|_| other);
        }
        ended
    }
}

/// Session began/ended observers
///
/// Subscribers are notified synchronously, in subscription order.
#[derive(Clone, Default)]
pub struct SessionEvents {
    began: SubscriberList<SessionEvent>,
    ended: SubscriberList<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_began(&self, callback: impl FnMut(&SessionEvent) + 'static) -> Subscription {
        self.began.insert(callback)
    }

    pub fn subscribe_ended(&self, callback: impl FnMut(&SessionEvent) + 'static) -> Subscription {
        self.ended.insert(callback)
    }

    pub(crate) fn notify_began(&self, event: &SessionEvent) {
        self.began.notify(event);
    }

    pub(crate) fn notify_ended(&self, event: &SessionEvent) {
        self.ended.notify(event);
    }
}

impl fmt::Debug for SessionEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEvents")
            .field("began", &self.began.len())
            .field("ended", &self.ended.len())
            .finish()
    }
}
