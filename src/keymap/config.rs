//! YAML configuration parsing for keymaps
//!
//! Parses keymap.yaml files into Keybinding structs.
//!
//! ```yaml
//! bindings:
//!   - key: "cmd+w"
//!     command: CloseDocument
//!     scope: notepad
//!     when: [document]
//!   - key: "ctrl+k ctrl+c"      # chord
//!     command: CommentLine
//!   - key: "ctrl+wheel_up"      # mouse wheel
//!     command: ZoomIn
//!   - key: "mouse_left*2"       # double click
//!     command: SelectWord
//!   - key: "release:f5"         # fires on key release
//!     command: Run
//!     repeat: false
//! ```

use std::path::Path;

use serde::Deserialize;

use super::binding::Keybinding;
use super::context::Condition;
use super::types::{KeyCode, KeyStroke, Modifiers, MouseButton, MouseStroke, Stroke};
use crate::commands::CommandId;

/// Root structure of a keymap YAML file
#[derive(Debug, Deserialize)]
pub struct KeymapConfig {
    pub bindings: Vec<BindingConfig>,
}

/// A single binding entry from YAML
#[derive(Debug, Deserialize)]
pub struct BindingConfig {
    pub key: String,
    pub command: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub when: Option<Vec<String>>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub repeat: Option<bool>,
}

/// Errors that can occur when loading or parsing keymaps
#[derive(Debug, thiserror::Error)]
pub enum KeymapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),
}

/// Load keybindings from a YAML file
pub fn load_keymap_file(path: &Path) -> Result<Vec<Keybinding>, KeymapError> {
    let content = std::fs::read_to_string(path)?;
    parse_keymap_yaml(&content)
}

/// Parse keybindings from YAML string
pub fn parse_keymap_yaml(yaml: &str) -> Result<Vec<Keybinding>, KeymapError> {
    let config: KeymapConfig = serde_yaml::from_str(yaml)?;

    let current_platform = get_current_platform();
    let mut bindings = Vec::new();

    for entry in config.bindings {
        // Skip if platform-specific and doesn't match current platform
        if let Some(ref platform) = entry.platform {
            if platform != current_platform {
                continue;
            }
        }

        let strokes = parse_stroke_sequence(&entry.key)?;
        let command = parse_command(&entry.command)?;
        let conditions = parse_conditions(&entry.when)?;

        let mut binding = Keybinding::chord(strokes, command);
        if let Some(conds) = conditions {
            binding = binding.when(conds);
        }
        if let Some(scope) = entry.scope {
            binding = binding.in_scope(scope);
        }
        if entry.repeat == Some(false) {
            binding = binding.no_repeat();
        }
        bindings.push(binding);
    }

    Ok(bindings)
}

/// Parse a whitespace-separated stroke sequence like "ctrl+k ctrl+c"
pub fn parse_stroke_sequence(sequence: &str) -> Result<Vec<Stroke>, KeymapError> {
    let strokes = sequence
        .split_whitespace()
        .map(parse_key_string)
        .collect::<Result<Vec<_>, _>>()?;

    if strokes.is_empty() {
        return Err(KeymapError::InvalidKey(format!(
            "Empty key sequence: '{}'",
            sequence
        )));
    }
    Ok(strokes)
}

/// Parse a single stroke like "cmd+shift+s", "ctrl+wheel_up" or "release:f5"
pub fn parse_key_string(key_str: &str) -> Result<Stroke, KeymapError> {
    let (is_release, body) = match key_str.strip_prefix("release:") {
        Some(rest) => (true, rest),
        None => (false, key_str),
    };

    let parts: Vec<&str> = body.split('+').collect();
    let part_count = parts.len();

    let mut mods = Modifiers::NONE;
    let mut key_part: Option<StrokeTarget> = None;
    // A lone modifier name is the modifier key itself
    let mut last_modifier: Option<KeyCode> = None;

    for part in parts {
        let part_lower = part.trim().to_lowercase();
        match modifier_flag(&part_lower) {
            Some((flag, key)) => {
                mods = mods | flag;
                last_modifier = Some(key);
            }
            None => {
                if key_part.is_some() {
                    return Err(KeymapError::InvalidKey(format!(
                        "Multiple keys in binding: {}",
                        key_str
                    )));
                }
                key_part = Some(parse_target(&part_lower)?);
            }
        }
    }

    let target = match (key_part, last_modifier) {
        (Some(target), _) => target,
        (None, Some(_)) if part_count > 1 => {
            return Err(KeymapError::InvalidKey(format!(
                "Multiple modifiers without a key in binding: {}",
                key_str
            )))
        }
        (None, Some(key)) => {
            // "ctrl" on its own: the Ctrl key, reported without modifiers
            mods = Modifiers::NONE;
            StrokeTarget::Key(key)
        }
        (None, None) => {
            return Err(KeymapError::InvalidKey(format!(
                "No key found in binding: {}",
                key_str
            )))
        }
    };

    Ok(match target {
        StrokeTarget::Key(key) => KeyStroke {
            key,
            mods,
            is_release,
        }
        .into(),
        StrokeTarget::Mouse(button, click_count) => {
            MouseStroke::new(button, mods, is_release, click_count).into()
        }
    })
}

/// Parse a bare modifier combination like "ctrl+shift"; empty means none
pub fn parse_modifiers(mods_str: &str) -> Result<Modifiers, KeymapError> {
    let mut mods = Modifiers::NONE;
    for part in mods_str.split('+').map(str::trim).filter(|p| !p.is_empty()) {
        let (flag, _) = modifier_flag(&part.to_lowercase())
            .ok_or_else(|| KeymapError::InvalidKey(format!("Unknown modifier: {}", part)))?;
        mods = mods | flag;
    }
    Ok(mods)
}

/// A modifier name's flag and the key that produces it
fn modifier_flag(name: &str) -> Option<(Modifiers, KeyCode)> {
    match name {
        "cmd" => Some((Modifiers::cmd(), modifier_key(Modifiers::cmd()))),
        "ctrl" | "control" => Some((Modifiers::CTRL, KeyCode::Control)),
        "shift" => Some((Modifiers::SHIFT, KeyCode::Shift)),
        "alt" | "option" | "opt" => Some((Modifiers::ALT, KeyCode::Alt)),
        "meta" | "super" | "win" => Some((Modifiers::META, KeyCode::Meta)),
        _ => None,
    }
}

enum StrokeTarget {
    Key(KeyCode),
    Mouse(MouseButton, u32),
}

fn modifier_key(flag: Modifiers) -> KeyCode {
    if flag.meta() {
        KeyCode::Meta
    } else {
        KeyCode::Control
    }
}

fn parse_target(part: &str) -> Result<StrokeTarget, KeymapError> {
    if let Some(button) = parse_mouse_button(part)? {
        return Ok(button);
    }
    parse_key_code(part).map(StrokeTarget::Key)
}

/// Parse "mouse_left", "wheel_up" or "mouse_left*2"
fn parse_mouse_button(part: &str) -> Result<Option<StrokeTarget>, KeymapError> {
    let (name, clicks) = match part.split_once('*') {
        Some((name, count)) => {
            let count = count
                .parse::<u32>()
                .map_err(|_| KeymapError::InvalidKey(format!("Invalid click count: {}", part)))?;
            (name, Some(count))
        }
        None => (part, None),
    };

    let button = match name {
        "mouse_left" | "lmb" => MouseButton::Left,
        "mouse_right" | "rmb" => MouseButton::Right,
        "mouse_middle" | "mmb" => MouseButton::Middle,
        "mouse_x1" | "mouse4" => MouseButton::X1,
        "mouse_x2" | "mouse5" => MouseButton::X2,
        "wheel_up" => MouseButton::WheelUp,
        "wheel_down" => MouseButton::WheelDown,
        _ if clicks.is_some() => {
            return Err(KeymapError::InvalidKey(format!(
                "Click count on non-mouse key: {}",
                part
            )))
        }
        _ => return Ok(None),
    };

    if button.is_wheel() && clicks.is_some() {
        return Err(KeymapError::InvalidKey(format!(
            "Click count on wheel: {}",
            part
        )));
    }

    Ok(Some(StrokeTarget::Mouse(button, clicks.unwrap_or(0))))
}

/// Parse a key code from string
fn parse_key_code(key: &str) -> Result<KeyCode, KeymapError> {
    // Single character
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c.to_ascii_lowercase()));
    }

    // Function keys F1-F24
    if let Some(n) = key.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        if (1..=24).contains(&n) {
            return Ok(KeyCode::F(n));
        }
    }

    // Named keys
    match key {
        "enter" | "return" => Ok(KeyCode::Enter),
        "escape" | "esc" => Ok(KeyCode::Escape),
        "tab" => Ok(KeyCode::Tab),
        "backspace" | "back" => Ok(KeyCode::Backspace),
        "delete" | "del" => Ok(KeyCode::Delete),
        "space" => Ok(KeyCode::Space),
        "plus" => Ok(KeyCode::Char('+')),
        "minus" => Ok(KeyCode::Char('-')),

        "up" | "arrowup" => Ok(KeyCode::Up),
        "down" | "arrowdown" => Ok(KeyCode::Down),
        "left" | "arrowleft" => Ok(KeyCode::Left),
        "right" | "arrowright" => Ok(KeyCode::Right),

        "home" => Ok(KeyCode::Home),
        "end" => Ok(KeyCode::End),
        "pageup" | "pgup" => Ok(KeyCode::PageUp),
        "pagedown" | "pgdown" | "pgdn" => Ok(KeyCode::PageDown),
        "insert" | "ins" => Ok(KeyCode::Insert),

        // Numpad
        "numpad0" | "num0" => Ok(KeyCode::Numpad0),
        "numpad1" | "num1" => Ok(KeyCode::Numpad1),
        "numpad2" | "num2" => Ok(KeyCode::Numpad2),
        "numpad3" | "num3" => Ok(KeyCode::Numpad3),
        "numpad4" | "num4" => Ok(KeyCode::Numpad4),
        "numpad5" | "num5" => Ok(KeyCode::Numpad5),
        "numpad6" | "num6" => Ok(KeyCode::Numpad6),
        "numpad7" | "num7" => Ok(KeyCode::Numpad7),
        "numpad8" | "num8" => Ok(KeyCode::Numpad8),
        "numpad9" | "num9" => Ok(KeyCode::Numpad9),
        "numpad_add" | "numadd" | "numplus" => Ok(KeyCode::NumpadAdd),
        "numpad_subtract" | "numsub" | "numminus" => Ok(KeyCode::NumpadSubtract),
        "numpad_multiply" | "nummul" => Ok(KeyCode::NumpadMultiply),
        "numpad_divide" | "numdiv" => Ok(KeyCode::NumpadDivide),
        "numpad_enter" | "numenter" => Ok(KeyCode::NumpadEnter),
        "numpad_decimal" | "numdot" => Ok(KeyCode::NumpadDecimal),

        _ => Err(KeymapError::InvalidKey(format!("Unknown key: {}", key))),
    }
}

/// Validate a command name
fn parse_command(cmd: &str) -> Result<CommandId, KeymapError> {
    let cmd = cmd.trim();
    if cmd.is_empty() || cmd.chars().any(char::is_whitespace) {
        return Err(KeymapError::InvalidCommand(cmd.to_string()));
    }
    Ok(CommandId::new(cmd))
}

/// Parse condition strings into Conditions
fn parse_conditions(when: &Option<Vec<String>>) -> Result<Option<Vec<Condition>>, KeymapError> {
    let Some(conditions) = when else {
        return Ok(None);
    };

    conditions
        .iter()
        .map(|cond| cond.parse().map_err(KeymapError::InvalidCondition))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Get the current platform identifier
fn get_current_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else {
        "linux"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_stroke(s: &str) -> KeyStroke {
        match parse_key_string(s).unwrap() {
            Stroke::Key(k) => k,
            other => panic!("expected key stroke, got {:?}", other),
        }
    }

    fn mouse_stroke(s: &str) -> MouseStroke {
        match parse_key_string(s).unwrap() {
            Stroke::Mouse(m) => m,
            other => panic!("expected mouse stroke, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_simple_key() {
        let stroke = key_stroke("a");
        assert_eq!(stroke.key, KeyCode::Char('a'));
        assert!(stroke.mods.is_empty());
        assert!(!stroke.is_release);
    }

    #[test]
    fn test_parse_key_with_multiple_modifiers() {
        let stroke = key_stroke("ctrl+shift+s");
        assert_eq!(stroke.key, KeyCode::Char('s'));
        assert!(stroke.mods.ctrl());
        assert!(stroke.mods.shift());
    }

    #[test]
    fn test_parse_cmd_modifier() {
        let stroke = key_stroke("cmd+s");
        assert!(stroke.mods.has_cmd());
    }

    #[test]
    fn test_parse_named_and_function_keys() {
        assert_eq!(key_stroke("enter").key, KeyCode::Enter);
        assert_eq!(key_stroke("esc").key, KeyCode::Escape);
        assert_eq!(key_stroke("f5").key, KeyCode::F(5));
        assert_eq!(key_stroke("F24").key, KeyCode::F(24));
        assert!(parse_key_string("f25").is_err());
        assert_eq!(key_stroke("numpad_add").key, KeyCode::NumpadAdd);
        assert_eq!(key_stroke("ctrl+plus").key, KeyCode::Char('+'));
    }

    #[test]
    fn test_parse_lone_modifier_is_modifier_key() {
        let stroke = key_stroke("ctrl");
        assert_eq!(stroke.key, KeyCode::Control);
        assert!(stroke.mods.is_empty());
    }

    #[test]
    fn test_parse_modifier_chord_without_key_is_rejected() {
        let err = parse_key_string("ctrl+shift").unwrap_err();
        assert!(matches!(err, KeymapError::InvalidKey(_)));
        assert!(err.to_string().contains("ctrl+shift"));
        assert!(parse_key_string("release:alt+shift").is_err());
        assert!(parse_key_string("release:shift").is_ok());
    }

    #[test]
    fn test_parse_modifiers() {
        assert_eq!(parse_modifiers("").unwrap(), Modifiers::NONE);
        assert_eq!(
            parse_modifiers("ctrl+Shift").unwrap(),
            Modifiers::CTRL | Modifiers::SHIFT
        );
        assert!(parse_modifiers("ctrl+a").is_err());
    }

    #[test]
    fn test_parse_release() {
        let stroke = key_stroke("release:f5");
        assert_eq!(stroke.key, KeyCode::F(5));
        assert!(stroke.is_release);
    }

    #[test]
    fn test_parse_mouse_strokes() {
        let wheel = mouse_stroke("ctrl+wheel_up");
        assert_eq!(wheel.button, MouseButton::WheelUp);
        assert!(wheel.mods.ctrl());

        let double = mouse_stroke("mouse_left*2");
        assert_eq!(double.button, MouseButton::Left);
        assert_eq!(double.click_count, 2);

        let any = mouse_stroke("mmb");
        assert_eq!(any.click_count, 0);

        assert!(parse_key_string("wheel_up*2").is_err());
        assert!(parse_key_string("a*2").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_key_string("ctrl+a+b"),
            Err(KeymapError::InvalidKey(_))
        ));
        assert!(matches!(
            parse_key_string("hyper+a"),
            Err(KeymapError::InvalidKey(_))
        ));
        assert!(parse_stroke_sequence("   ").is_err());
    }

    #[test]
    fn test_parse_chord_sequence() {
        let strokes = parse_stroke_sequence("ctrl+k  ctrl+c").unwrap();
        assert_eq!(strokes.len(), 2);
        assert_eq!(
            strokes[1],
            Stroke::Key(KeyStroke::new(KeyCode::Char('c'), Modifiers::CTRL))
        );
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
bindings:
  - key: "cmd+s"
    command: SaveFile
  - key: "cmd+w"
    command: CloseDocument
    scope: notepad
    when: [document, "!modal"]
    repeat: false
"#;

        let bindings = parse_keymap_yaml(yaml).unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].command.as_str(), "SaveFile");
        assert!(bindings[0].repeat);

        let close = &bindings[1];
        assert_eq!(close.scope.as_deref(), Some("notepad"));
        assert_eq!(
            close.when,
            Some(vec![Condition::has("document"), Condition::missing("modal")])
        );
        assert!(!close.repeat);
    }

    #[test]
    fn test_parse_yaml_with_platform() {
        let yaml = r#"
bindings:
  - key: "cmd+s"
    command: SaveFile
  - key: "meta+left"
    command: MoveLineStart
    platform: macos
"#;

        let bindings = parse_keymap_yaml(yaml).unwrap();

        #[cfg(target_os = "macos")]
        assert_eq!(bindings.len(), 2);

        #[cfg(not(target_os = "macos"))]
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn test_parse_yaml_rejects_bad_entries() {
        let bad_condition = "bindings:\n  - key: a\n    command: X\n    when: [\"has space\"]\n";
        assert!(matches!(
            parse_keymap_yaml(bad_condition),
            Err(KeymapError::InvalidCondition(_))
        ));

        let bad_command = "bindings:\n  - key: a\n    command: \"two words\"\n";
        assert!(matches!(
            parse_keymap_yaml(bad_command),
            Err(KeymapError::InvalidCommand(_))
        ));

        assert!(matches!(
            parse_keymap_yaml("bindings: 3"),
            Err(KeymapError::Parse(_))
        ));
    }
}
