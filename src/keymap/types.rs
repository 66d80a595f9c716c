//! Core types for the keymap system: Stroke, KeyStroke, MouseStroke, Modifiers, KeyCode

use std::fmt;

/// Modifier keys as a bitfield for efficient storage and comparison
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const SHIFT: Modifiers = Modifiers(0b0010);
    pub const ALT: Modifiers = Modifiers(0b0100);
    pub const META: Modifiers = Modifiers(0b1000); // Cmd on macOS, Win on Windows

    /// Create modifiers from individual flags
    pub const fn new(ctrl: bool, shift: bool, alt: bool, meta: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= 0b0001;
        }
        if shift {
            bits |= 0b0010;
        }
        if alt {
            bits |= 0b0100;
        }
        if meta {
            bits |= 0b1000;
        }
        Modifiers(bits)
    }

    /// Raw bitmask
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b0001 != 0
    }

    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & 0b0010 != 0
    }

    /// Check if alt/option is held
    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & 0b0100 != 0
    }

    /// Check if meta (cmd/win) is held
    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & 0b1000 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Combine two modifier sets
    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    /// Check if this contains all modifiers in other
    #[inline]
    pub const fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Get the platform-specific "command" modifier (Cmd on macOS, Ctrl elsewhere)
    pub fn cmd() -> Modifiers {
        if cfg!(target_os = "macos") {
            Modifiers::META
        } else {
            Modifiers::CTRL
        }
    }

    /// Check if the platform command key is held (Cmd on macOS, Ctrl elsewhere)
    pub fn has_cmd(self) -> bool {
        if cfg!(target_os = "macos") {
            self.meta()
        } else {
            self.ctrl()
        }
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl() {
            parts.push("Ctrl");
        }
        if self.shift() {
            parts.push("Shift");
        }
        if self.alt() {
            parts.push(if cfg!(target_os = "macos") {
                "Option"
            } else {
                "Alt"
            });
        }
        if self.meta() {
            parts.push(if cfg!(target_os = "macos") {
                "Cmd"
            } else {
                "Win"
            });
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A key code representing a physical or logical key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A character key (normalized to lowercase)
    Char(char),

    // Named keys
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Space,

    // Arrow keys
    Up,
    Down,
    Left,
    Right,

    // Navigation
    Home,
    End,
    PageUp,
    PageDown,
    Insert,

    // Function keys
    F(u8), // F1-F24

    // Numpad (physical keys)
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadAdd,
    NumpadSubtract,
    NumpadMultiply,
    NumpadDivide,
    NumpadEnter,
    NumpadDecimal,

    // Modifier keys pressed on their own (left/right collapsed)
    Control,
    Shift,
    Alt,
    Meta,
}

impl KeyCode {
    /// Whether this key is itself one of the modifier keys
    pub const fn is_modifier(self) -> bool {
        matches!(
            self,
            KeyCode::Control | KeyCode::Shift | KeyCode::Alt | KeyCode::Meta
        )
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char(c) => write!(f, "{}", c.to_uppercase()),
            KeyCode::Enter => write!(f, "Enter"),
            KeyCode::Escape => write!(f, "Escape"),
            KeyCode::Tab => write!(f, "Tab"),
            KeyCode::Backspace => write!(f, "Backspace"),
            KeyCode::Delete => write!(f, "Delete"),
            KeyCode::Space => write!(f, "Space"),
            KeyCode::Up => write!(f, "↑"),
            KeyCode::Down => write!(f, "↓"),
            KeyCode::Left => write!(f, "←"),
            KeyCode::Right => write!(f, "→"),
            KeyCode::Home => write!(f, "Home"),
            KeyCode::End => write!(f, "End"),
            KeyCode::PageUp => write!(f, "PageUp"),
            KeyCode::PageDown => write!(f, "PageDown"),
            KeyCode::Insert => write!(f, "Insert"),
            KeyCode::F(n) => write!(f, "F{}", n),
            KeyCode::Numpad0 => write!(f, "Num0"),
            KeyCode::Numpad1 => write!(f, "Num1"),
            KeyCode::Numpad2 => write!(f, "Num2"),
            KeyCode::Numpad3 => write!(f, "Num3"),
            KeyCode::Numpad4 => write!(f, "Num4"),
            KeyCode::Numpad5 => write!(f, "Num5"),
            KeyCode::Numpad6 => write!(f, "Num6"),
            KeyCode::Numpad7 => write!(f, "Num7"),
            KeyCode::Numpad8 => write!(f, "Num8"),
            KeyCode::Numpad9 => write!(f, "Num9"),
            KeyCode::NumpadAdd => write!(f, "Num+"),
            KeyCode::NumpadSubtract => write!(f, "Num-"),
            KeyCode::NumpadMultiply => write!(f, "Num*"),
            KeyCode::NumpadDivide => write!(f, "Num/"),
            KeyCode::NumpadEnter => write!(f, "NumEnter"),
            KeyCode::NumpadDecimal => write!(f, "Num."),
            KeyCode::Control => write!(f, "Ctrl"),
            KeyCode::Shift => write!(f, "Shift"),
            KeyCode::Alt => write!(f, "Alt"),
            KeyCode::Meta => write!(f, "Meta"),
        }
    }
}

/// A mouse button, including the two synthetic wheel "buttons"
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    X1,
    X2,
    WheelUp,
    WheelDown,
    /// Any other button reported by the platform
    Other(u16),
}

impl MouseButton {
    pub const fn is_wheel(self) -> bool {
        matches!(self, MouseButton::WheelUp | MouseButton::WheelDown)
    }

    /// Map a wheel delta to its synthetic button. Returns None for a zero delta.
    pub const fn from_wheel_delta(delta: i32) -> Option<MouseButton> {
        if delta > 0 {
            Some(MouseButton::WheelUp)
        } else if delta < 0 {
            Some(MouseButton::WheelDown)
        } else {
            None
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MouseButton::Left => write!(f, "LMB"),
            MouseButton::Middle => write!(f, "MMB"),
            MouseButton::Right => write!(f, "RMB"),
            MouseButton::X1 => write!(f, "Mouse4"),
            MouseButton::X2 => write!(f, "Mouse5"),
            MouseButton::WheelUp => write!(f, "WheelUp"),
            MouseButton::WheelDown => write!(f, "WheelDown"),
            MouseButton::Other(n) => write!(f, "Mouse{}", n),
        }
    }
}

/// A single keystroke: a key with modifiers, pressed or released
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyStroke {
    pub key: KeyCode,
    pub mods: Modifiers,
    pub is_release: bool,
}

impl KeyStroke {
    /// Create a new key press stroke
    pub const fn new(key: KeyCode, mods: Modifiers) -> Self {
        Self {
            key,
            mods,
            is_release: false,
        }
    }

    /// Create a key release stroke
    pub const fn release(key: KeyCode, mods: Modifiers) -> Self {
        Self {
            key,
            mods,
            is_release: true,
        }
    }

    /// Create a keystroke with no modifiers
    pub const fn key(key: KeyCode) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// Create a keystroke with a character key
    pub fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c.to_ascii_lowercase()), Modifiers::NONE)
    }

    /// Create a keystroke with a character and modifiers
    pub fn char_with_mods(c: char, mods: Modifiers) -> Self {
        Self::new(KeyCode::Char(c.to_ascii_lowercase()), mods)
    }

    /// Display the keystroke using platform-specific symbols
    pub fn display_string(&self) -> String {
        let key_str = match self.key {
            KeyCode::Char(c) => c.to_uppercase().to_string(),
            _ => format!("{}", self.key),
        };
        let text = format!("{}{}", modifier_prefix(self.mods), key_str);
        if self.is_release {
            format!("{} (release)", text)
        } else {
            text
        }
    }
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.mods.is_empty() {
            write!(f, "{}+{}", self.mods, self.key)?;
        } else {
            write!(f, "{}", self.key)?;
        }
        if self.is_release {
            write!(f, " (release)")?;
        }
        Ok(())
    }
}

/// A single mouse interaction: button or wheel, with modifiers and click count
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MouseStroke {
    pub button: MouseButton,
    pub mods: Modifiers,
    pub is_release: bool,
    /// Number of consecutive clicks; 0 in a binding pattern matches any count
    pub click_count: u32,
    /// Raw wheel delta; 0 for button strokes
    pub wheel_delta: i32,
}

impl MouseStroke {
    pub const fn new(button: MouseButton, mods: Modifiers, is_release: bool, click_count: u32) -> Self {
        Self {
            button,
            mods,
            is_release,
            click_count,
            wheel_delta: 0,
        }
    }

    /// Create a wheel stroke. The button is expected to be WheelUp or WheelDown.
    pub const fn wheel(button: MouseButton, mods: Modifiers, wheel_delta: i32) -> Self {
        Self {
            button,
            mods,
            is_release: false,
            click_count: 0,
            wheel_delta,
        }
    }

    /// Match an input stroke against this stroke used as a binding pattern.
    ///
    /// Wheel magnitude never participates; a pattern click count of 0 matches any count.
    pub fn matches(&self, input: &MouseStroke) -> bool {
        self.button == input.button
            && self.mods == input.mods
            && self.is_release == input.is_release
            && (self.click_count == 0 || self.click_count == input.click_count)
    }

    pub fn display_string(&self) -> String {
        let mut text = format!("{}{}", modifier_prefix(self.mods), self.button);
        if self.click_count > 1 {
            text.push_str(&format!(" x{}", self.click_count));
        }
        if self.is_release {
            text.push_str(" (release)");
        }
        text
    }
}

impl fmt::Display for MouseStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.mods.is_empty() {
            write!(f, "{}+{}", self.mods, self.button)?;
        } else {
            write!(f, "{}", self.button)?;
        }
        if self.click_count > 1 {
            write!(f, " x{}", self.click_count)?;
        }
        if self.is_release {
            write!(f, " (release)")?;
        }
        Ok(())
    }
}

/// A normalized description of one physical key or mouse interaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stroke {
    Key(KeyStroke),
    Mouse(MouseStroke),
}

impl Stroke {
    pub const fn mods(&self) -> Modifiers {
        match self {
            Stroke::Key(k) => k.mods,
            Stroke::Mouse(m) => m.mods,
        }
    }

    pub const fn is_release(&self) -> bool {
        match self {
            Stroke::Key(k) => k.is_release,
            Stroke::Mouse(m) => m.is_release,
        }
    }

    /// True for key strokes whose key is a modifier key
    pub const fn is_modifier_key(&self) -> bool {
        match self {
            Stroke::Key(k) => k.key.is_modifier(),
            Stroke::Mouse(_) => false,
        }
    }

    /// Match an input stroke against this stroke used as a binding pattern
    pub fn matches(&self, input: &Stroke) -> bool {
        match (self, input) {
            (Stroke::Key(pattern), Stroke::Key(key)) => pattern == key,
            (Stroke::Mouse(pattern), Stroke::Mouse(mouse)) => pattern.matches(mouse),
            _ => false,
        }
    }

    /// The stroke with variable mouse fields zeroed, used as a lookup index key
    pub(crate) const fn lookup_key(&self) -> Stroke {
        match self {
            Stroke::Key(k) => Stroke::Key(*k),
            Stroke::Mouse(m) => Stroke::Mouse(MouseStroke::new(m.button, m.mods, m.is_release, 0)),
        }
    }

    pub fn display_string(&self) -> String {
        match self {
            Stroke::Key(k) => k.display_string(),
            Stroke::Mouse(m) => m.display_string(),
        }
    }
}

impl From<KeyStroke> for Stroke {
    fn from(stroke: KeyStroke) -> Self {
        Stroke::Key(stroke)
    }
}

impl From<MouseStroke> for Stroke {
    fn from(stroke: MouseStroke) -> Self {
        Stroke::Mouse(stroke)
    }
}

impl fmt::Display for Stroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stroke::Key(k) => write!(f, "{}", k),
            Stroke::Mouse(m) => write!(f, "{}", m),
        }
    }
}

fn modifier_prefix(mods: Modifiers) -> String {
    let mut parts = Vec::new();

    if cfg!(target_os = "macos") {
        // macOS uses symbols: ⌃ ⇧ ⌥ ⌘
        if mods.ctrl() {
            parts.push("⌃");
        }
        if mods.alt() {
            parts.push("⌥");
        }
        if mods.shift() {
            parts.push("⇧");
        }
        if mods.meta() {
            parts.push("⌘");
        }
    } else {
        if mods.ctrl() {
            parts.push("Ctrl+");
        }
        if mods.alt() {
            parts.push("Alt+");
        }
        if mods.shift() {
            parts.push("Shift+");
        }
        if mods.meta() {
            parts.push("Win+");
        }
    }

    parts.concat()
}
