//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};

use quill::commands::{CommandDispatcher, CommandId, DispatchError};
use quill::demo::DemoApp;
use quill::keymap::{default_bindings, Keybinding, Keymap};
use quill::model::{ContextData, InputFlags};
use quill::runtime::{yield_now, ForegroundExecutor, ShortcutInputManager};

/// One recorded dispatch
#[derive(Clone)]
pub struct Dispatched {
    pub command: CommandId,
    pub context: Rc<ContextData>,
}

/// How the recording dispatcher answers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    Handled,
    NotHandled,
    Fault,
    /// Yield once, then report handled
    Later,
    /// Yield once, then report not handled
    LaterNotHandled,
    /// Yield once, then fail
    LaterFault,
}

/// Dispatcher that records every command it receives
pub struct RecordingDispatcher {
    pub calls: RefCell<Vec<Dispatched>>,
    pub reply: RefCell<Reply>,
}

impl RecordingDispatcher {
    pub fn new(reply: Reply) -> Rc<Self> {
        Rc::new(Self {
            calls: RefCell::new(Vec::new()),
            reply: RefCell::new(reply),
        })
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|d| d.command.as_str().to_string())
            .collect()
    }

    pub fn last_context(&self) -> Option<Rc<ContextData>> {
        self.calls.borrow().last().map(|d| Rc::clone(&d.context))
    }
}

impl CommandDispatcher for RecordingDispatcher {
    fn dispatch(
        &self,
        command: &CommandId,
        context: Rc<ContextData>,
    ) -> LocalBoxFuture<'static, Result<bool, DispatchError>> {
        self.calls.borrow_mut().push(Dispatched {
            command: command.clone(),
            context,
        });

        let command = command.clone();
        let reply = *self.reply.borrow();
        async move {
            match reply {
                Reply::Handled => Ok(true),
                Reply::NotHandled => Ok(false),
                Reply::Fault => Err(DispatchError::CommandFailed {
                    command,
                    source: anyhow::anyhow!("command blew up"),
                }),
                Reply::Later => {
                    yield_now().await;
                    Ok(true)
                }
                Reply::LaterNotHandled => {
                    yield_now().await;
                    Ok(false)
                }
                Reply::LaterFault => {
                    yield_now().await;
                    Err(DispatchError::CommandFailed {
                        command,
                        source: anyhow::anyhow!("command blew up later"),
                    })
                }
            }
        }
        .boxed_local()
    }
}

/// Input manager over `bindings` that reports to `dispatcher`
pub fn input_with(
    bindings: Vec<Keybinding>,
    dispatcher: Rc<RecordingDispatcher>,
) -> ShortcutInputManager {
    ShortcutInputManager::new(
        Rc::new(RefCell::new(Keymap::with_bindings(bindings))),
        dispatcher,
        Rc::new(ForegroundExecutor::new()),
    )
}

/// Demo notepad with default flags and the default keymap recorded
pub fn recording_demo(reply: Reply) -> (DemoApp, ShortcutInputManager, Rc<RecordingDispatcher>) {
    let demo = DemoApp::new(InputFlags::default());
    let dispatcher = RecordingDispatcher::new(reply);
    let input = input_with(default_bindings(), Rc::clone(&dispatcher));
    (demo, input, dispatcher)
}

/// Demo notepad with its real commands behind the default keymap
pub fn live_demo() -> (DemoApp, ShortcutInputManager) {
    let demo = DemoApp::new(InputFlags::default());
    let input = ShortcutInputManager::new(
        Rc::new(RefCell::new(Keymap::with_bindings(default_bindings()))),
        Rc::new(demo.commands()),
        Rc::new(ForegroundExecutor::new()),
    );
    (demo, input)
}
