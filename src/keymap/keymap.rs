//! Keymap struct for storing and looking up keybindings

use std::collections::HashMap;

use super::binding::Keybinding;
use super::context::Condition;
use super::types::Stroke;
use crate::commands::CommandId;
use crate::model::ContextData;

/// Result of handling a stroke
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Execute this command
    Execute(CommandId),
    /// Stroke is part of a chord, await more input
    AwaitMore,
    /// No binding matches this stroke
    NoMatch,
}

/// Everything besides the stroke itself that decides which binding applies
#[derive(Debug, Clone, Copy, Default)]
pub struct StrokeQuery<'a> {
    /// Focus group names on the focus path, leaf first
    pub scopes: &'a [&'a str],
    /// Context for conditional bindings; None skips every conditional binding
    pub context: Option<&'a ContextData>,
    /// The stroke comes from keyboard auto-repeat
    pub is_repeat: bool,
}

/// The keymap stores all keybindings and handles lookup
#[derive(Debug, Clone)]
pub struct Keymap {
    /// All registered bindings
    bindings: Vec<Keybinding>,
    /// Single-stroke bindings keyed by normalized stroke (indices into bindings)
    /// Multiple bindings can share the same stroke with different scopes or conditions
    single_lookup: HashMap<Stroke, Vec<usize>>,
    /// Strokes that start a chord sequence
    chord_prefixes: HashMap<Stroke, Vec<usize>>,
    /// Current chord state (pending strokes)
    pending_chord: Vec<Stroke>,
}

impl Keymap {
    /// Create an empty keymap
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
            single_lookup: HashMap::new(),
            chord_prefixes: HashMap::new(),
            pending_chord: Vec::new(),
        }
    }

    /// Create a keymap with the given bindings
    pub fn with_bindings(bindings: Vec<Keybinding>) -> Self {
        let mut keymap = Self::new();
        for binding in bindings {
            keymap.add_binding(binding);
        }
        keymap
    }

    /// Add a binding to the keymap
    pub fn add_binding(&mut self, binding: Keybinding) {
        let Some(first_stroke) = binding.strokes.first() else {
            return;
        };

        let key = first_stroke.lookup_key();
        let idx = self.bindings.len();

        if binding.is_chord() {
            self.chord_prefixes.entry(key).or_default().push(idx);
        } else {
            self.single_lookup.entry(key).or_default().push(idx);
        }

        self.bindings.push(binding);
    }

    /// Replace every binding, dropping any pending chord
    pub fn set_bindings(&mut self, bindings: Vec<Keybinding>) {
        *self = Self::with_bindings(bindings);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Clear pending chord state
    pub fn reset(&mut self) {
        self.pending_chord.clear();
    }

    /// Whether handling this stroke could produce anything but `NoMatch`
    ///
    /// Cheap pre-check so callers can skip building a context for strokes
    /// nothing is bound to.
    pub fn may_match(&self, stroke: &Stroke) -> bool {
        if !self.pending_chord.is_empty() {
            return true;
        }
        let key = stroke.lookup_key();
        self.single_lookup.contains_key(&key) || self.chord_prefixes.contains_key(&key)
    }

    /// Handle a stroke without scopes or context
    pub fn handle_stroke(&mut self, stroke: Stroke) -> KeyAction {
        self.handle_stroke_with(stroke, &StrokeQuery::default())
    }

    /// Handle a stroke and return the action to take
    ///
    /// Precedence among matching single-stroke bindings:
    /// 1. Nearest focus scope (global bindings last)
    /// 2. Conditional bindings before unconditional ones
    /// 3. Registration order
    ///
    /// Single-stroke bindings are tried before chord prefixes.
    pub fn handle_stroke_with(&mut self, stroke: Stroke, query: &StrokeQuery<'_>) -> KeyAction {
        if !self.pending_chord.is_empty() {
            return self.continue_chord(stroke, query);
        }

        let key = stroke.lookup_key();

        if let Some(indices) = self.single_lookup.get(&key) {
            if let Some(command) = self.find_matching_binding(indices, &stroke, query) {
                return KeyAction::Execute(command);
            }
        }

        if let Some(indices) = self.chord_prefixes.get(&key) {
            let starts_chord = indices.iter().any(|&idx| {
                let binding = &self.bindings[idx];
                binding.starts_with(&stroke) && Self::available_rank(binding, query).is_some()
            });
            if starts_chord {
                self.pending_chord.push(stroke);
                return KeyAction::AwaitMore;
            }
        }

        KeyAction::NoMatch
    }

    /// Scope and repeat filtering shared by single strokes and chords
    fn available_rank(binding: &Keybinding, query: &StrokeQuery<'_>) -> Option<usize> {
        if query.is_repeat && !binding.repeat {
            return None;
        }
        binding.scope_rank(query.scopes)
    }

    /// Conditions pass, or the binding has none
    fn conditions_hold(binding: &Keybinding, query: &StrokeQuery<'_>) -> bool {
        match (&binding.when, query.context) {
            (None, _) => true,
            (Some(conditions), Some(ctx)) => Condition::evaluate_all(conditions, ctx),
            (Some(_), None) => false,
        }
    }

    /// Pick the best binding among `indices` that matches the whole `strokes` sequence
    fn best_match<'k>(
        &'k self,
        indices: &[usize],
        strokes: &[Stroke],
        query: &StrokeQuery<'_>,
    ) -> Option<&'k Keybinding> {
        indices
            .iter()
            .filter_map(|&idx| {
                let binding = &self.bindings[idx];
                if binding.strokes.len() != strokes.len() || !binding.matches_prefix(strokes) {
                    return None;
                }
                let rank = Self::available_rank(binding, query)?;
                if !Self::conditions_hold(binding, query) {
                    return None;
                }
                Some(((rank, !binding.is_conditional(), idx), binding))
            })
            .min_by_key(|(precedence, _)| *precedence)
            .map(|(_, binding)| binding)
    }

    fn find_matching_binding(
        &self,
        indices: &[usize],
        stroke: &Stroke,
        query: &StrokeQuery<'_>,
    ) -> Option<CommandId> {
        self.best_match(indices, std::slice::from_ref(stroke), query)
            .map(|binding| binding.command.clone())
    }

    fn continue_chord(&mut self, stroke: Stroke, query: &StrokeQuery<'_>) -> KeyAction {
        // Auto-repeat of a held chord key keeps the chord alive
        if query.is_repeat {
            return KeyAction::AwaitMore;
        }

        // Modifier presses and stray key releases neither advance nor break a chord
        if stroke.is_modifier_key() || (stroke.is_release() && !self.extends_chord(&stroke)) {
            return KeyAction::NoMatch;
        }

        self.pending_chord.push(stroke);
        self.try_complete_chord(query)
    }

    fn extends_chord(&self, stroke: &Stroke) -> bool {
        let Some(indices) = self.chord_indices() else {
            return false;
        };
        let mut candidate = self.pending_chord.clone();
        candidate.push(*stroke);
        indices
            .iter()
            .any(|&idx| self.bindings[idx].matches_prefix(&candidate))
    }

    fn chord_indices(&self) -> Option<&Vec<usize>> {
        let first = self.pending_chord.first()?;
        self.chord_prefixes.get(&first.lookup_key())
    }

    /// Try to complete a pending chord sequence
    fn try_complete_chord(&mut self, query: &StrokeQuery<'_>) -> KeyAction {
        let Some(indices) = self.chord_indices() else {
            self.reset();
            return KeyAction::NoMatch;
        };

        if let Some(binding) = self.best_match(indices, &self.pending_chord, query) {
            let command = binding.command.clone();
            self.reset();
            return KeyAction::Execute(command);
        }

        // Check if any binding could still match (prefix match)
        let could_match = indices.iter().any(|&idx| {
            let binding = &self.bindings[idx];
            binding.strokes.len() > self.pending_chord.len()
                && binding.matches_prefix(&self.pending_chord)
                && Self::available_rank(binding, query).is_some()
        });

        if could_match {
            KeyAction::AwaitMore
        } else {
            self.reset();
            KeyAction::NoMatch
        }
    }

    /// Look up a single stroke without chord handling
    pub fn lookup(&self, stroke: &Stroke) -> Option<CommandId> {
        self.lookup_with(stroke, &StrokeQuery::default())
    }

    /// Look up a single stroke with scopes and context
    pub fn lookup_with(&self, stroke: &Stroke, query: &StrokeQuery<'_>) -> Option<CommandId> {
        let indices = self.single_lookup.get(&stroke.lookup_key())?;
        self.find_matching_binding(indices, stroke, query)
    }

    /// Get all bindings
    pub fn bindings(&self) -> &[Keybinding] {
        &self.bindings
    }

    /// Get the keybinding for a command (first match)
    pub fn binding_for(&self, command: &CommandId) -> Option<&Keybinding> {
        self.bindings.iter().find(|b| b.command == *command)
    }

    /// Get display string for a command's keybinding
    pub fn display_for(&self, command: &CommandId) -> Option<String> {
        self.binding_for(command).map(|b| b.display_string())
    }

    /// Check if any chord is in progress
    pub fn has_pending_chord(&self) -> bool {
        !self.pending_chord.is_empty()
    }

    /// Get the pending chord strokes (for status bar display)
    pub fn pending_chord_display(&self) -> Option<String> {
        if self.pending_chord.is_empty() {
            None
        } else {
            Some(
                self.pending_chord
                    .iter()
                    .map(|k| k.display_string())
                    .collect::<Vec<_>>()
                    .join(" "),
            )
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::types::{KeyCode, KeyStroke, Modifiers, MouseButton, MouseStroke};
    use crate::model::data_keys;

    fn ctrl(c: char) -> Stroke {
        KeyStroke::new(KeyCode::Char(c), Modifiers::CTRL).into()
    }

    fn execute(id: &str) -> KeyAction {
        KeyAction::Execute(CommandId::from(id))
    }

    #[test]
    fn test_single_binding_lookup() {
        let keymap = Keymap::with_bindings(vec![Keybinding::new(ctrl('s'), "SaveFile")]);

        assert_eq!(keymap.lookup(&ctrl('s')), Some(CommandId::from("SaveFile")));
        assert_eq!(keymap.lookup(&ctrl('k')), None);
    }

    #[test]
    fn test_handle_single_stroke() {
        let mut keymap = Keymap::with_bindings(vec![Keybinding::new(ctrl('s'), "SaveFile")]);

        assert_eq!(keymap.handle_stroke(ctrl('s')), execute("SaveFile"));
        assert_eq!(keymap.handle_stroke(ctrl('k')), KeyAction::NoMatch);
    }

    #[test]
    fn test_chord_await_more() {
        let mut keymap = Keymap::with_bindings(vec![Keybinding::chord(
            vec![ctrl('k'), ctrl('c')],
            "CommentLine",
        )]);

        assert_eq!(keymap.handle_stroke(ctrl('k')), KeyAction::AwaitMore);
        assert!(keymap.has_pending_chord());
        assert!(keymap.pending_chord_display().is_some());

        assert_eq!(keymap.handle_stroke(ctrl('c')), execute("CommentLine"));
        assert!(!keymap.has_pending_chord());
    }

    #[test]
    fn test_chord_mismatch_resets() {
        let mut keymap = Keymap::with_bindings(vec![Keybinding::chord(
            vec![ctrl('k'), ctrl('c')],
            "CommentLine",
        )]);

        assert_eq!(keymap.handle_stroke(ctrl('k')), KeyAction::AwaitMore);
        assert_eq!(keymap.handle_stroke(ctrl('s')), KeyAction::NoMatch);
        assert!(!keymap.has_pending_chord());
    }

    #[test]
    fn test_chord_survives_modifier_and_release_strokes() {
        let mut keymap = Keymap::with_bindings(vec![Keybinding::chord(
            vec![ctrl('k'), ctrl('c')],
            "CommentLine",
        )]);

        assert_eq!(keymap.handle_stroke(ctrl('k')), KeyAction::AwaitMore);
        let k_release = KeyStroke::release(KeyCode::Char('k'), Modifiers::CTRL).into();
        assert_eq!(keymap.handle_stroke(k_release), KeyAction::NoMatch);
        let ctrl_press = KeyStroke::key(KeyCode::Control).into();
        assert_eq!(keymap.handle_stroke(ctrl_press), KeyAction::NoMatch);
        assert!(keymap.has_pending_chord());

        assert_eq!(keymap.handle_stroke(ctrl('c')), execute("CommentLine"));
    }

    #[test]
    fn test_chord_swallows_auto_repeat() {
        let mut keymap = Keymap::with_bindings(vec![Keybinding::chord(
            vec![ctrl('k'), ctrl('c')],
            "CommentLine",
        )]);
        let repeat = StrokeQuery {
            is_repeat: true,
            ..StrokeQuery::default()
        };

        assert_eq!(keymap.handle_stroke(ctrl('k')), KeyAction::AwaitMore);
        assert_eq!(keymap.handle_stroke_with(ctrl('k'), &repeat), KeyAction::AwaitMore);
        assert_eq!(keymap.handle_stroke(ctrl('c')), execute("CommentLine"));
    }

    #[test]
    fn test_nearest_scope_wins() {
        let keymap = Keymap::with_bindings(vec![
            Keybinding::new(ctrl('w'), "CloseWindow"),
            Keybinding::new(ctrl('w'), "CloseDocument").in_scope("notepad"),
            Keybinding::new(ctrl('w'), "DeleteWord").in_scope("editor"),
        ]);

        let in_editor = StrokeQuery {
            scopes: &["editor", "notepad"],
            ..StrokeQuery::default()
        };
        let in_notepad = StrokeQuery {
            scopes: &["notepad"],
            ..StrokeQuery::default()
        };

        assert_eq!(
            keymap.lookup_with(&ctrl('w'), &in_editor),
            Some(CommandId::from("DeleteWord"))
        );
        assert_eq!(
            keymap.lookup_with(&ctrl('w'), &in_notepad),
            Some(CommandId::from("CloseDocument"))
        );
        assert_eq!(keymap.lookup(&ctrl('w')), Some(CommandId::from("CloseWindow")));
    }

    #[test]
    fn test_conditional_binding_preferred() {
        let keymap = Keymap::with_bindings(vec![
            Keybinding::new(ctrl('w'), "CloseWindow"),
            Keybinding::new(ctrl('w'), "CloseDocument").when_single(Condition::has("document")),
        ]);
        let ctx = ContextData::new().with(data_keys::DOCUMENT, "Doc 1".to_string());
        let with_doc = StrokeQuery {
            context: Some(&ctx),
            ..StrokeQuery::default()
        };
        let empty = ContextData::new();
        let without_doc = StrokeQuery {
            context: Some(&empty),
            ..StrokeQuery::default()
        };

        assert_eq!(
            keymap.lookup_with(&ctrl('w'), &with_doc),
            Some(CommandId::from("CloseDocument"))
        );
        assert_eq!(
            keymap.lookup_with(&ctrl('w'), &without_doc),
            Some(CommandId::from("CloseWindow"))
        );
        // No context at all: conditional bindings are skipped
        assert_eq!(keymap.lookup(&ctrl('w')), Some(CommandId::from("CloseWindow")));
    }

    #[test]
    fn test_no_repeat_binding_ignores_auto_repeat() {
        let keymap = Keymap::with_bindings(vec![Keybinding::new(ctrl('n'), "NewFile").no_repeat()]);
        let repeat = StrokeQuery {
            is_repeat: true,
            ..StrokeQuery::default()
        };

        assert_eq!(keymap.lookup(&ctrl('n')), Some(CommandId::from("NewFile")));
        assert_eq!(keymap.lookup_with(&ctrl('n'), &repeat), None);
    }

    #[test]
    fn test_wheel_binding_matches_any_delta() {
        let pattern = MouseStroke::wheel(MouseButton::WheelUp, Modifiers::CTRL, 0);
        let keymap = Keymap::with_bindings(vec![Keybinding::new(pattern, "ZoomIn")]);
        let input: Stroke = MouseStroke::wheel(MouseButton::WheelUp, Modifiers::CTRL, 360).into();

        assert!(keymap.may_match(&input));
        assert_eq!(keymap.lookup(&input), Some(CommandId::from("ZoomIn")));
    }

    #[test]
    fn test_may_match() {
        let mut keymap = Keymap::with_bindings(vec![
            Keybinding::new(ctrl('s'), "SaveFile"),
            Keybinding::chord(vec![ctrl('k'), ctrl('c')], "CommentLine"),
        ]);

        assert!(keymap.may_match(&ctrl('s')));
        assert!(keymap.may_match(&ctrl('k')));
        assert!(!keymap.may_match(&ctrl('c')));

        keymap.handle_stroke(ctrl('k'));
        assert!(keymap.may_match(&ctrl('c')));
    }

    #[test]
    fn test_binding_for_command() {
        let keymap = Keymap::with_bindings(vec![
            Keybinding::new(ctrl('s'), "SaveFile"),
            Keybinding::new(ctrl('c'), "Copy"),
        ]);

        let binding = keymap.binding_for(&CommandId::from("SaveFile"));
        assert_eq!(binding.map(|b| b.command.as_str()), Some("SaveFile"));

        let display = keymap.display_for(&CommandId::from("SaveFile")).unwrap();
        assert!(display.contains('S') || display.contains('s'));
    }

    #[test]
    fn test_empty_binding_is_ignored() {
        let keymap = Keymap::with_bindings(vec![Keybinding::chord(vec![], "Nothing")]);
        assert!(keymap.is_empty());
    }

    #[test]
    fn test_reset_clears_pending() {
        let mut keymap = Keymap::with_bindings(vec![Keybinding::chord(
            vec![ctrl('k'), ctrl('c')],
            "CommentLine",
        )]);

        keymap.handle_stroke(ctrl('k'));
        assert!(keymap.has_pending_chord());

        keymap.reset();
        assert!(!keymap.has_pending_chord());
    }
}
