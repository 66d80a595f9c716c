//! Keybinding struct representing a mapping from stroke(s) to command

use super::context::Condition;
use super::types::Stroke;
use crate::commands::CommandId;

/// A single keybinding mapping one or more strokes to a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybinding {
    /// The stroke sequence (usually 1, sometimes 2 for chords)
    pub strokes: Vec<Stroke>,
    /// The command to execute
    pub command: CommandId,
    /// Conditions that must be true for this binding to activate
    pub when: Option<Vec<Condition>>,
    /// Focus group the binding is limited to; None means global
    pub scope: Option<String>,
    /// Whether auto-repeated key events trigger the binding
    pub repeat: bool,
}

impl Keybinding {
    /// Create a single-stroke binding
    pub fn new(stroke: impl Into<Stroke>, command: impl Into<CommandId>) -> Self {
        Self::chord(vec![stroke.into()], command)
    }

    /// Create a chord binding (multi-stroke sequence)
    pub fn chord(strokes: Vec<Stroke>, command: impl Into<CommandId>) -> Self {
        Self {
            strokes,
            command: command.into(),
            when: None,
            scope: None,
            repeat: true,
        }
    }

    /// Add conditions to this binding (builder pattern)
    pub fn when(mut self, conditions: Vec<Condition>) -> Self {
        self.when = Some(conditions);
        self
    }

    /// Add a single condition to this binding
    pub fn when_single(mut self, condition: Condition) -> Self {
        self.when = Some(vec![condition]);
        self
    }

    /// Limit this binding to a focus group
    pub fn in_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Ignore auto-repeated key events
    pub fn no_repeat(mut self) -> Self {
        self.repeat = false;
        self
    }

    /// Check if this binding matches a single stroke (not a chord)
    pub fn matches_single(&self, stroke: &Stroke) -> bool {
        self.strokes.len() == 1 && self.strokes[0].matches(stroke)
    }

    /// Check if this binding starts with the given stroke
    pub fn starts_with(&self, stroke: &Stroke) -> bool {
        self.strokes.first().is_some_and(|first| first.matches(stroke))
    }

    /// Check whether `input` matches the first `input.len()` strokes of this binding
    pub fn matches_prefix(&self, input: &[Stroke]) -> bool {
        input.len() <= self.strokes.len()
            && self
                .strokes
                .iter()
                .zip(input)
                .all(|(pattern, stroke)| pattern.matches(stroke))
    }

    /// Check if this is a chord (multi-stroke) binding
    pub fn is_chord(&self) -> bool {
        self.strokes.len() > 1
    }

    pub fn is_conditional(&self) -> bool {
        self.when.is_some()
    }

    /// Precedence of this binding's scope on a focus path (lower is nearer)
    ///
    /// `scopes` lists focus group names from leaf to root. Global bindings rank
    /// after every scope; bindings for a group not on the path are inactive.
    pub fn scope_rank(&self, scopes: &[&str]) -> Option<usize> {
        match &self.scope {
            None => Some(scopes.len()),
            Some(scope) => scopes.iter().position(|s| *s == scope.as_str()),
        }
    }

    /// Get display string for this keybinding
    pub fn display_string(&self) -> String {
        self.strokes
            .iter()
            .map(|k| k.display_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
