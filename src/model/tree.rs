//! UI element tree: the collaborator the input layer queries for focus,
//! ownership chains, per-element input flags and context data

use serde::{Deserialize, Serialize};

use super::context::ContextData;
use super::property::Property;

/// Upper bound on ancestor walks, guards against malformed parent links
const MAX_TREE_DEPTH: usize = 256;

/// Identifier of a UI element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

/// What kind of control an element is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Window,
    Panel,
    /// A text box or text editor: receives raw typing
    TextInput,
    Control,
}

/// Per-element input configuration flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFlags {
    /// Process preview (tunnelling) events instead of bubbled ones
    pub use_preview_events: bool,
    /// Let mouse strokes through when a text input has focus
    pub can_process_text_box_mouse_stroke: bool,
    /// Let unmodified key strokes through when a text input has focus
    pub can_process_text_box_key_stroke: bool,
    /// Let modified key strokes (Ctrl+...) through when a text input has focus
    pub can_process_text_box_key_stroke_with_modifiers: bool,
}

/// Ordered chain of elements from a leaf up through its ancestors
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FocusPath(Vec<ElementId>);

impl FocusPath {
    pub fn new(elements: Vec<ElementId>) -> Self {
        Self(elements)
    }

    pub fn leaf(&self) -> Option<ElementId> {
        self.0.first().copied()
    }

    pub fn elements(&self) -> &[ElementId] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.0.contains(&element)
    }
}

/// Lookups the input layer needs from the UI
pub trait ElementTree {
    fn parent(&self, element: ElementId) -> Option<ElementId>;

    /// The element's own context entries, if any were attached
    fn context_data(&self, element: ElementId) -> Option<&ContextData>;

    fn input_flags(&self, element: ElementId) -> InputFlags;

    fn is_text_input(&self, element: ElementId) -> bool;

    /// Name of the focus group this element opens, used to scope bindings
    fn focus_group(&self, element: ElementId) -> Option<&str>;

    fn focused(&self) -> Option<ElementId>;

    /// Ownership chain starting at `element` (inclusive) up to the root
    fn path_from(&self, element: ElementId) -> FocusPath {
        let mut path = vec![element];
        let mut current = element;
        while let Some(parent) = self.parent(current) {
            if path.len() >= MAX_TREE_DEPTH || path.contains(&parent) {
                tracing::warn!("Malformed element tree above {:?}, truncating path", element);
                break;
            }
            path.push(parent);
            current = parent;
        }
        FocusPath(path)
    }

    /// Chain from the focused element up to the root, empty when nothing has focus
    fn focused_path(&self) -> FocusPath {
        self.focused()
            .map(|element| self.path_from(element))
            .unwrap_or_default()
    }
}

#[derive(Debug)]
struct Element {
    kind: ElementKind,
    name: String,
    parent: Option<ElementId>,
    flags: Option<InputFlags>,
    context: Option<ContextData>,
    focus_group: Option<String>,
}

/// In-memory element tree
#[derive(Debug)]
pub struct UiTree {
    elements: Vec<Element>,
    focused: Property<Option<ElementId>>,
    default_flags: InputFlags,
}

impl UiTree {
    pub fn new() -> Self {
        Self::with_default_flags(InputFlags::default())
    }

    /// Flags used by elements that have none of their own
    pub fn with_default_flags(default_flags: InputFlags) -> Self {
        Self {
            elements: Vec::new(),
            focused: Property::new(None),
            default_flags,
        }
    }

    pub fn add_root(&mut self, kind: ElementKind, name: impl Into<String>) -> ElementId {
        self.push(kind, name.into(), None)
    }

    /// Add a child element. Returns None if `parent` does not exist.
    pub fn add_child(
        &mut self,
        parent: ElementId,
        kind: ElementKind,
        name: impl Into<String>,
    ) -> Option<ElementId> {
        self.element(parent)?;
        Some(self.push(kind, name.into(), Some(parent)))
    }

    fn push(&mut self, kind: ElementKind, name: String, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(Element {
            kind,
            name,
            parent,
            flags: None,
            context: None,
            focus_group: None,
        });
        id
    }

    fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0 as usize)
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn name(&self, id: ElementId) -> Option<&str> {
        self.element(id).map(|e| e.name.as_str())
    }

    pub fn kind(&self, id: ElementId) -> Option<ElementKind> {
        self.element(id).map(|e| e.kind)
    }

    /// Find the first element with the given name
    pub fn find(&self, name: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .position(|e| e.name == name)
            .map(|idx| ElementId(idx as u32))
    }

    pub fn set_flags(&mut self, id: ElementId, flags: InputFlags) -> bool {
        match self.element_mut(id) {
            Some(element) => {
                element.flags = Some(flags);
                true
            }
            None => false,
        }
    }

    /// Attach context entries to an element, replacing what it had
    pub fn set_context_data(&mut self, id: ElementId, context: ContextData) -> bool {
        match self.element_mut(id) {
            Some(element) => {
                element.context = Some(context);
                true
            }
            None => false,
        }
    }

    pub fn context_data_mut(&mut self, id: ElementId) -> Option<&mut ContextData> {
        let element = self.element_mut(id)?;
        Some(element.context.get_or_insert_with(ContextData::new))
    }

    pub fn set_focus_group(&mut self, id: ElementId, group: impl Into<String>) -> bool {
        match self.element_mut(id) {
            Some(element) => {
                element.focus_group = Some(group.into());
                true
            }
            None => false,
        }
    }

    /// Move keyboard focus. Returns whether focus changed.
    pub fn focus(&mut self, id: Option<ElementId>) -> bool {
        if let Some(id) = id {
            if self.element(id).is_none() {
                tracing::warn!("Ignoring focus request for unknown element {:?}", id);
                return false;
            }
        }
        self.focused.set(id)
    }

    /// Register a hook called with `(old, new)` whenever focus moves
    pub fn on_focus_changed(
        &mut self,
        hook: impl FnMut(&Option<ElementId>, &Option<ElementId>) + 'static,
    ) {
        self.focused.on_change(hook);
    }
}

impl Default for UiTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTree for UiTree {
    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.element(element)?.parent
    }

    fn context_data(&self, element: ElementId) -> Option<&ContextData> {
        self.element(element)?.context.as_ref()
    }

    fn input_flags(&self, element: ElementId) -> InputFlags {
        self.element(element)
            .and_then(|e| e.flags)
            .unwrap_or(self.default_flags)
    }

    fn is_text_input(&self, element: ElementId) -> bool {
        self.kind(element) == Some(ElementKind::TextInput)
    }

    fn focus_group(&self, element: ElementId) -> Option<&str> {
        self.element(element)?.focus_group.as_deref()
    }

    fn focused(&self) -> Option<ElementId> {
        *self.focused.get()
    }
}
