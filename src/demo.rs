//! A small notepad used by the replay tool and the integration tests
//!
//! ```text
//! window            focus group "window"
//! ├── menu
//! └── notepad       focus group "notepad"
//!     ├── tabs      focus group "tabs"
//!     └── editor    focus group "editor", text input
//! ```
//!
//! Commands mutate a shared [`Notepad`]. `OpenFile` completes asynchronously
//! to exercise pending dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::commands::{Command, CommandManager};
use crate::model::{data_keys, ContextData, ElementId, ElementKind, InputFlags, UiTree};
use crate::runtime::yield_now;

pub const MIN_ZOOM: u32 = 30;
pub const MAX_ZOOM: u32 = 300;
const ZOOM_STEP: u32 = 10;

/// Document state the demo commands act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notepad {
    pub documents: Vec<String>,
    pub active: Option<usize>,
    pub zoom: u32,
    pub menu_bar_visible: bool,
    pub selected_lines: u32,
    untitled: u32,
    opened: u32,
}

impl Default for Notepad {
    fn default() -> Self {
        Self {
            documents: Vec::new(),
            active: None,
            zoom: 100,
            menu_bar_visible: true,
            selected_lines: 0,
            untitled: 0,
            opened: 0,
        }
    }
}

impl Notepad {
    pub fn active_document(&self) -> Option<&str> {
        self.documents.get(self.active?).map(String::as_str)
    }

    pub fn new_document(&mut self) -> &str {
        self.untitled += 1;
        let name = format!("Untitled {}", self.untitled);
        self.push(name)
    }

    pub fn open_document(&mut self) -> &str {
        self.opened += 1;
        let name = format!("file-{}.txt", self.opened);
        self.push(name)
    }

    fn push(&mut self, name: String) -> &str {
        self.documents.push(name);
        let idx = self.documents.len() - 1;
        self.active = Some(idx);
        &self.documents[idx]
    }

    /// Close `name`; the previous document (if any) becomes active
    pub fn close(&mut self, name: &str) -> anyhow::Result<()> {
        let idx = self
            .documents
            .iter()
            .position(|d| d == name)
            .ok_or_else(|| anyhow::anyhow!("no open document named '{}'", name))?;
        self.documents.remove(idx);
        self.active = match self.documents.len() {
            0 => None,
            len => Some(idx.saturating_sub(1).min(len - 1)),
        };
        Ok(())
    }

    pub fn zoom_by(&mut self, steps: i32) {
        let zoom = self.zoom as i64 + steps as i64 * ZOOM_STEP as i64;
        self.zoom = zoom.clamp(MIN_ZOOM as i64, MAX_ZOOM as i64) as u32;
    }
}

/// Element ids of the demo tree
#[derive(Debug, Clone, Copy)]
pub struct DemoElements {
    pub window: ElementId,
    pub menu: ElementId,
    pub notepad: ElementId,
    pub tabs: ElementId,
    pub editor: ElementId,
}

/// The demo element tree plus the notepad it shows
#[derive(Debug)]
pub struct DemoApp {
    pub tree: UiTree,
    pub elements: DemoElements,
    pub notepad: Rc<RefCell<Notepad>>,
}

impl DemoApp {
    pub fn new(default_flags: InputFlags) -> Self {
        let mut tree = UiTree::with_default_flags(default_flags);
        let window = tree.add_root(ElementKind::Window, "window");
        let menu = add(&mut tree, window, ElementKind::Control, "menu");
        let notepad = add(&mut tree, window, ElementKind::Panel, "notepad");
        let elements = DemoElements {
            window,
            menu,
            notepad,
            tabs: add(&mut tree, notepad, ElementKind::Control, "tabs"),
            editor: add(&mut tree, notepad, ElementKind::TextInput, "editor"),
        };

        tree.set_focus_group(elements.window, "window");
        tree.set_focus_group(elements.notepad, "notepad");
        tree.set_focus_group(elements.tabs, "tabs");
        tree.set_focus_group(elements.editor, "editor");

        // The editor lets shortcuts with modifiers and mouse shortcuts through
        tree.set_flags(
            elements.editor,
            InputFlags {
                can_process_text_box_key_stroke_with_modifiers: true,
                can_process_text_box_mouse_stroke: true,
                ..default_flags
            },
        );

        tree.set_context_data(
            elements.window,
            ContextData::new().with(data_keys::HOST_WINDOW, elements.window),
        );
        tree.set_context_data(
            elements.notepad,
            ContextData::new().with(data_keys::NOTEPAD, elements.notepad),
        );
        tree.set_context_data(
            elements.editor,
            ContextData::new().with(data_keys::TEXT_EDITOR, elements.editor),
        );

        Self {
            tree,
            elements,
            notepad: Rc::new(RefCell::new(Notepad::default())),
        }
    }

    /// Copy the active document into the notepad element's context
    pub fn sync_context(&mut self) {
        let active = self.notepad.borrow().active_document().map(str::to_owned);
        let Some(ctx) = self.tree.context_data_mut(self.elements.notepad) else {
            return;
        };
        match active {
            Some(name) => {
                ctx.set(data_keys::DOCUMENT, name);
            }
            None => {
                ctx.remove(data_keys::DOCUMENT.id());
            }
        }
    }

    /// Commands operating on this notepad
    pub fn commands(&self) -> CommandManager {
        let mut manager = CommandManager::new();
        let notepad = &self.notepad;

        let np = Rc::clone(notepad);
        manager.register_fn("NewFile", move |_| {
            let mut np = np.borrow_mut();
            tracing::info!("Created {}", np.new_document());
            Ok(())
        });

        manager.register(
            "OpenFile",
            OpenFile {
                notepad: Rc::clone(notepad),
            },
        );

        manager.register(
            "CloseDocument",
            CloseDocument {
                notepad: Rc::clone(notepad),
            },
        );

        let np = Rc::clone(notepad);
        manager.register(
            "SelectLine",
            Requires {
                key: data_keys::TEXT_EDITOR.id(),
                run: move || np.borrow_mut().selected_lines += 1,
            },
        );

        let np = Rc::clone(notepad);
        manager.register_fn("ZoomIn", move |_| {
            np.borrow_mut().zoom_by(1);
            Ok(())
        });

        let np = Rc::clone(notepad);
        manager.register_fn("ZoomOut", move |_| {
            np.borrow_mut().zoom_by(-1);
            Ok(())
        });

        let np = Rc::clone(notepad);
        manager.register_fn("ToggleMenuBar", move |_| {
            let mut np = np.borrow_mut();
            np.menu_bar_visible = !np.menu_bar_visible;
            Ok(())
        });

        manager
    }
}

fn add(tree: &mut UiTree, parent: ElementId, kind: ElementKind, name: &str) -> ElementId {
    tree.add_child(parent, kind, name)
        .unwrap_or_else(|| tree.add_root(kind, name))
}

/// Opens a file after yielding to the event loop, as a file dialog would
struct OpenFile {
    notepad: Rc<RefCell<Notepad>>,
}

impl Command for OpenFile {
    fn execute(&self, _context: Rc<ContextData>) -> LocalBoxFuture<'static, anyhow::Result<()>> {
        let notepad = Rc::clone(&self.notepad);
        async move {
            yield_now().await;
            let mut np = notepad.borrow_mut();
            tracing::info!("Opened {}", np.open_document());
            Ok(())
        }
        .boxed_local()
    }
}

/// Closes the document named by the context
struct CloseDocument {
    notepad: Rc<RefCell<Notepad>>,
}

impl Command for CloseDocument {
    fn can_execute(&self, context: &ContextData) -> bool {
        context.contains_key(data_keys::DOCUMENT.id())
    }

    fn execute(&self, context: Rc<ContextData>) -> LocalBoxFuture<'static, anyhow::Result<()>> {
        let result = match context.get(data_keys::DOCUMENT) {
            Some(name) => self.notepad.borrow_mut().close(name),
            None => Err(anyhow::anyhow!("no document in context")),
        };
        future::ready(result).boxed_local()
    }
}

/// Runs only when the context has `key`
struct Requires<F> {
    key: &'static str,
    run: F,
}

impl<F: Fn()> Command for Requires<F> {
    fn can_execute(&self, context: &ContextData) -> bool {
        context.contains_key(self.key)
    }

    fn execute(&self, _context: Rc<ContextData>) -> LocalBoxFuture<'static, anyhow::Result<()>> {
        (self.run)();
        future::ready(Ok(())).boxed_local()
    }
}
