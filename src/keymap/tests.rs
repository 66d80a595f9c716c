//! Integration tests for the keymap system

use super::*;
use crate::commands::CommandId;
use crate::model::{data_keys, ContextData, ElementId};

fn cmd_key(c: char) -> Stroke {
    KeyStroke::new(KeyCode::Char(c), Modifiers::cmd()).into()
}

fn id(name: &str) -> Option<CommandId> {
    Some(CommandId::from(name))
}

fn notepad_context() -> ContextData {
    ContextData::new()
        .with(data_keys::NOTEPAD, ElementId(1))
        .with(data_keys::DOCUMENT, "Untitled 1".to_string())
        .with(data_keys::TEXT_EDITOR, ElementId(3))
}

#[test]
fn test_embedded_yaml_parses() {
    let bindings = parse_keymap_yaml(DEFAULT_KEYMAP_YAML)
        .expect("Embedded keymap.yaml should parse successfully");

    for name in ["CloseDocument", "SelectLine", "NewFile", "OpenFile"] {
        assert!(
            bindings.iter().any(|b| b.command.as_str() == name),
            "Should have {} binding",
            name
        );
    }
}

#[test]
fn test_load_default_keymap() {
    let bindings = load_default_keymap();
    assert!(!bindings.is_empty(), "Default keymap should not be empty");
}

#[test]
fn test_global_bindings_need_no_context() {
    let keymap = Keymap::with_bindings(default_bindings());

    assert_eq!(keymap.lookup(&cmd_key('n')), id("NewFile"));
    assert_eq!(keymap.lookup(&cmd_key('o')), id("OpenFile"));
}

#[test]
fn test_close_document_needs_notepad_scope_and_document() {
    let keymap = Keymap::with_bindings(default_bindings());
    let ctx = notepad_context();

    let in_notepad = StrokeQuery {
        scopes: &["editor", "notepad"],
        context: Some(&ctx),
        is_repeat: false,
    };
    assert_eq!(keymap.lookup_with(&cmd_key('w'), &in_notepad), id("CloseDocument"));

    let outside = StrokeQuery {
        scopes: &["sidebar"],
        context: Some(&ctx),
        is_repeat: false,
    };
    assert_eq!(keymap.lookup_with(&cmd_key('w'), &outside), None);

    let empty = ContextData::new();
    let no_document = StrokeQuery {
        scopes: &["notepad"],
        context: Some(&empty),
        is_repeat: false,
    };
    assert_eq!(keymap.lookup_with(&cmd_key('w'), &no_document), None);
}

#[test]
fn test_wheel_zoom_bindings() {
    let keymap = Keymap::with_bindings(default_bindings());

    let up: Stroke = MouseStroke::wheel(MouseButton::WheelUp, Modifiers::CTRL, 120).into();
    let down: Stroke = MouseStroke::wheel(MouseButton::WheelDown, Modifiers::CTRL, -240).into();
    let plain: Stroke = MouseStroke::wheel(MouseButton::WheelUp, Modifiers::NONE, 120).into();

    assert_eq!(keymap.lookup(&up), id("ZoomIn"));
    assert_eq!(keymap.lookup(&down), id("ZoomOut"));
    assert_eq!(keymap.lookup(&plain), None);
}

#[test]
fn test_triple_click_selects_line_in_editor() {
    let keymap = Keymap::with_bindings(default_bindings());
    let ctx = notepad_context();
    let query = StrokeQuery {
        scopes: &["editor", "notepad"],
        context: Some(&ctx),
        is_repeat: false,
    };

    let triple: Stroke = MouseStroke::new(MouseButton::Left, Modifiers::NONE, false, 3).into();
    let double: Stroke = MouseStroke::new(MouseButton::Left, Modifiers::NONE, false, 2).into();

    assert_eq!(keymap.lookup_with(&triple, &query), id("SelectLine"));
    assert_eq!(keymap.lookup_with(&double, &query), None);
}

#[test]
fn test_alt_release_toggles_menu_outside_editor() {
    let keymap = Keymap::with_bindings(default_bindings());
    let release: Stroke = KeyStroke::release(KeyCode::Alt, Modifiers::NONE).into();

    let empty = ContextData::new();
    let outside_editor = StrokeQuery {
        context: Some(&empty),
        ..StrokeQuery::default()
    };
    assert_eq!(keymap.lookup_with(&release, &outside_editor), id("ToggleMenuBar"));

    let ctx = notepad_context();
    let in_editor = StrokeQuery {
        context: Some(&ctx),
        ..StrokeQuery::default()
    };
    assert_eq!(keymap.lookup_with(&release, &in_editor), None);

    let press: Stroke = KeyStroke::key(KeyCode::Alt).into();
    assert_eq!(keymap.lookup_with(&press, &outside_editor), None);
}

#[test]
fn test_open_file_chord() {
    let mut keymap = Keymap::with_bindings(default_bindings());
    let ctrl = |c: char| -> Stroke { KeyStroke::new(KeyCode::Char(c), Modifiers::CTRL).into() };

    assert_eq!(keymap.handle_stroke(ctrl('k')), KeyAction::AwaitMore);
    assert_eq!(
        keymap.handle_stroke(ctrl('o')),
        KeyAction::Execute(CommandId::from("OpenFile"))
    );
}

#[test]
fn test_new_file_ignores_auto_repeat() {
    let mut keymap = Keymap::with_bindings(default_bindings());
    let repeat = StrokeQuery {
        is_repeat: true,
        ..StrokeQuery::default()
    };

    assert_eq!(keymap.handle_stroke_with(cmd_key('n'), &repeat), KeyAction::NoMatch);
    assert_eq!(
        keymap.handle_stroke(cmd_key('n')),
        KeyAction::Execute(CommandId::from("NewFile"))
    );
}

#[test]
fn test_display_for_command() {
    let keymap = Keymap::with_bindings(default_bindings());

    let display = keymap.display_for(&CommandId::from("NewFile")).unwrap();
    assert!(display.to_uppercase().contains('N'));

    let chord = keymap
        .bindings()
        .iter()
        .find(|b| b.is_chord())
        .map(Keybinding::display_string)
        .unwrap();
    assert!(chord.contains(' '));
}

#[test]
fn test_user_override_yaml_merges_over_defaults() {
    let yaml = r#"
bindings:
  - key: "cmd+n"
    command: Unbound
  - key: "cmd+w"
    command: CloseWindow
"#;

    let user = parse_keymap_yaml(yaml).expect("Should parse");
    let keymap = Keymap::with_bindings(merge_bindings(default_bindings(), user));

    assert_eq!(keymap.lookup(&cmd_key('n')), None);
    assert_eq!(keymap.lookup(&cmd_key('w')), id("CloseWindow"));

    // Scoped CloseDocument still wins inside a notepad
    let ctx = notepad_context();
    let in_notepad = StrokeQuery {
        scopes: &["notepad"],
        context: Some(&ctx),
        is_repeat: false,
    };
    assert_eq!(keymap.lookup_with(&cmd_key('w'), &in_notepad), id("CloseDocument"));
}
