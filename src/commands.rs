//! Commands: the application-level actions shortcuts resolve to
//!
//! Bindings name commands by string id. The `CommandManager` owns the
//! registered implementations and is the dispatch sink the input manager
//! hands resolved commands to.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use futures::future::{self, FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use crate::model::ContextData;

/// Identifier of a command, e.g. `CloseDocument`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(String);

impl CommandId {
    /// Reserved id used in keymaps to remove a binding
    pub const UNBOUND: &'static str = "Unbound";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unbound(&self) -> bool {
        self.0 == Self::UNBOUND
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommandId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CommandId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A command failed while executing
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("command '{command}' failed: {source}")]
    CommandFailed {
        command: CommandId,
        #[source]
        source: anyhow::Error,
    },
}

impl DispatchError {
    pub fn command(&self) -> &CommandId {
        match self {
            DispatchError::CommandFailed { command, .. } => command,
        }
    }
}

/// An executable action
pub trait Command {
    /// Whether the command applies in this context. Non-executable commands
    /// are reported as "not handled" so the event can fall through.
    fn can_execute(&self, _context: &ContextData) -> bool {
        true
    }

    fn execute(&self, context: Rc<ContextData>) -> LocalBoxFuture<'static, anyhow::Result<()>>;
}

/// Sink for resolved commands
///
/// Resolves to `Ok(true)` when a command ran, `Ok(false)` when nothing ran,
/// and `Err` when the command faulted.
pub trait CommandDispatcher {
    fn dispatch(
        &self,
        command: &CommandId,
        context: Rc<ContextData>,
    ) -> LocalBoxFuture<'static, Result<bool, DispatchError>>;
}

/// A synchronous command backed by a closure
pub struct FnCommand<F>(F);

impl<F> FnCommand<F>
where
    F: Fn(&ContextData) -> anyhow::Result<()>,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Command for FnCommand<F>
where
    F: Fn(&ContextData) -> anyhow::Result<()>,
{
    fn execute(&self, context: Rc<ContextData>) -> LocalBoxFuture<'static, anyhow::Result<()>> {
        future::ready((self.0)(&*context)).boxed_local()
    }
}

/// Registry of commands by id
#[derive(Default)]
pub struct CommandManager {
    commands: BTreeMap<CommandId, Rc<dyn Command>>,
}

impl CommandManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command, replacing any previous command with the same id
    pub fn register(&mut self, id: impl Into<CommandId>, command: impl Command + 'static) {
        let id = id.into();
        if self.commands.insert(id.clone(), Rc::new(command)).is_some() {
            tracing::warn!("Replaced existing command '{}'", id);
        }
    }

    /// Register a synchronous closure as a command
    pub fn register_fn<F>(&mut self, id: impl Into<CommandId>, f: F)
    where
        F: Fn(&ContextData) -> anyhow::Result<()> + 'static,
    {
        self.register(id, FnCommand::new(f));
    }

    pub fn unregister(&mut self, id: &CommandId) -> bool {
        self.commands.remove(id).is_some()
    }

    pub fn get(&self, id: &CommandId) -> Option<&Rc<dyn Command>> {
        self.commands.get(id)
    }

    pub fn contains(&self, id: &CommandId) -> bool {
        self.commands.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registered ids in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &CommandId> {
        self.commands.keys()
    }
}

impl CommandDispatcher for CommandManager {
    fn dispatch(
        &self,
        command: &CommandId,
        context: Rc<ContextData>,
    ) -> LocalBoxFuture<'static, Result<bool, DispatchError>> {
        let Some(cmd) = self.commands.get(command) else {
            tracing::warn!("No command registered for '{}'", command);
            return future::ready(Ok(false)).boxed_local();
        };

        if !cmd.can_execute(&context) {
            tracing::debug!("Command '{}' cannot execute in current context", command);
            return future::ready(Ok(false)).boxed_local();
        }

        tracing::debug!("Executing command '{}'", command);
        let id = command.clone();
        let execution = cmd.execute(context);
        async move {
            execution
                .await
                .map(|()| true)
                .map_err(|source| DispatchError::CommandFailed {
                    command: id,
                    source,
                })
        }
        .boxed_local()
    }
}
