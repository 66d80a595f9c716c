//! Adapter converting winit input values into our stroke and event types

use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta};
use winit::keyboard::{Key, KeyCode as WinitKeyCode, ModifiersState, NamedKey, PhysicalKey};

use super::types::{KeyCode, Modifiers, MouseButton};
use crate::runtime::events::{KeyEvent, MouseButtonEvent, MouseWheelEvent};

/// Wheel units reported per scrolled line
pub const WHEEL_DELTA_PER_LINE: f32 = 120.0;

/// Convert winit's modifier state
pub fn modifiers_from_winit(state: ModifiersState) -> Modifiers {
    Modifiers::new(
        state.control_key(),
        state.shift_key(),
        state.alt_key(),
        state.super_key(),
    )
}

/// Map a winit key to our key code
///
/// Returns None if the key cannot be mapped (e.g., unknown keys)
pub fn key_code_from_winit(logical_key: &Key, physical_key: PhysicalKey) -> Option<KeyCode> {
    // Numpad keys arrive as plain characters (or Enter) and are only
    // distinguishable by their physical code. With NumLock off they report
    // navigation keys, which win.
    let numpad = match physical_key {
        PhysicalKey::Code(code) => numpad_key(code),
        PhysicalKey::Unidentified(_) => None,
    };
    match logical_key {
        Key::Named(NamedKey::Enter) | Key::Character(_) if numpad.is_some() => return numpad,
        _ => {}
    }

    match logical_key {
        Key::Named(named) => named_key(*named).or(numpad),

        // Character keys - normalize to lowercase
        Key::Character(s) => {
            let c = s.chars().next()?;
            Some(KeyCode::Char(c.to_ascii_lowercase()))
        }

        _ => numpad,
    }
}

fn named_key(named: NamedKey) -> Option<KeyCode> {
    let key = match named {
        NamedKey::Enter => KeyCode::Enter,
        NamedKey::Escape => KeyCode::Escape,
        NamedKey::Tab => KeyCode::Tab,
        NamedKey::Backspace => KeyCode::Backspace,
        NamedKey::Delete => KeyCode::Delete,
        NamedKey::Space => KeyCode::Space,

        NamedKey::ArrowUp => KeyCode::Up,
        NamedKey::ArrowDown => KeyCode::Down,
        NamedKey::ArrowLeft => KeyCode::Left,
        NamedKey::ArrowRight => KeyCode::Right,

        NamedKey::Home => KeyCode::Home,
        NamedKey::End => KeyCode::End,
        NamedKey::PageUp => KeyCode::PageUp,
        NamedKey::PageDown => KeyCode::PageDown,
        NamedKey::Insert => KeyCode::Insert,

        NamedKey::Control => KeyCode::Control,
        NamedKey::Shift => KeyCode::Shift,
        NamedKey::Alt | NamedKey::AltGraph => KeyCode::Alt,
        NamedKey::Super | NamedKey::Meta => KeyCode::Meta,

        NamedKey::F1 => KeyCode::F(1),
        NamedKey::F2 => KeyCode::F(2),
        NamedKey::F3 => KeyCode::F(3),
        NamedKey::F4 => KeyCode::F(4),
        NamedKey::F5 => KeyCode::F(5),
        NamedKey::F6 => KeyCode::F(6),
        NamedKey::F7 => KeyCode::F(7),
        NamedKey::F8 => KeyCode::F(8),
        NamedKey::F9 => KeyCode::F(9),
        NamedKey::F10 => KeyCode::F(10),
        NamedKey::F11 => KeyCode::F(11),
        NamedKey::F12 => KeyCode::F(12),
        NamedKey::F13 => KeyCode::F(13),
        NamedKey::F14 => KeyCode::F(14),
        NamedKey::F15 => KeyCode::F(15),
        NamedKey::F16 => KeyCode::F(16),
        NamedKey::F17 => KeyCode::F(17),
        NamedKey::F18 => KeyCode::F(18),
        NamedKey::F19 => KeyCode::F(19),
        NamedKey::F20 => KeyCode::F(20),
        NamedKey::F21 => KeyCode::F(21),
        NamedKey::F22 => KeyCode::F(22),
        NamedKey::F23 => KeyCode::F(23),
        NamedKey::F24 => KeyCode::F(24),

        _ => return None,
    };
    Some(key)
}

fn numpad_key(code: WinitKeyCode) -> Option<KeyCode> {
    let key = match code {
        WinitKeyCode::Numpad0 => KeyCode::Numpad0,
        WinitKeyCode::Numpad1 => KeyCode::Numpad1,
        WinitKeyCode::Numpad2 => KeyCode::Numpad2,
        WinitKeyCode::Numpad3 => KeyCode::Numpad3,
        WinitKeyCode::Numpad4 => KeyCode::Numpad4,
        WinitKeyCode::Numpad5 => KeyCode::Numpad5,
        WinitKeyCode::Numpad6 => KeyCode::Numpad6,
        WinitKeyCode::Numpad7 => KeyCode::Numpad7,
        WinitKeyCode::Numpad8 => KeyCode::Numpad8,
        WinitKeyCode::Numpad9 => KeyCode::Numpad9,
        WinitKeyCode::NumpadAdd => KeyCode::NumpadAdd,
        WinitKeyCode::NumpadSubtract => KeyCode::NumpadSubtract,
        WinitKeyCode::NumpadMultiply => KeyCode::NumpadMultiply,
        WinitKeyCode::NumpadDivide => KeyCode::NumpadDivide,
        WinitKeyCode::NumpadEnter => KeyCode::NumpadEnter,
        WinitKeyCode::NumpadDecimal => KeyCode::NumpadDecimal,
        _ => return None,
    };
    Some(key)
}

/// Build a key event from the parts of a winit `KeyEvent`
pub fn key_event_from_winit(
    logical_key: &Key,
    physical_key: PhysicalKey,
    state: ElementState,
    repeat: bool,
    modifiers: ModifiersState,
) -> Option<KeyEvent> {
    let key = key_code_from_winit(logical_key, physical_key)?;
    let mods = modifiers_from_winit(modifiers);
    let event = match state {
        ElementState::Pressed => KeyEvent::press(key, mods),
        ElementState::Released => KeyEvent::release(key, mods),
    };
    Some(if repeat { event.repeated() } else { event })
}

pub fn mouse_button_from_winit(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::X1,
        WinitMouseButton::Forward => MouseButton::X2,
        WinitMouseButton::Other(n) => MouseButton::Other(n),
    }
}

/// Build a mouse button event; winit does not count clicks, so the caller does
pub fn mouse_button_event_from_winit(
    button: WinitMouseButton,
    state: ElementState,
    modifiers: ModifiersState,
    click_count: u32,
) -> MouseButtonEvent {
    let button = mouse_button_from_winit(button);
    let mods = modifiers_from_winit(modifiers);
    match state {
        ElementState::Pressed => MouseButtonEvent::press(button, mods, click_count),
        ElementState::Released => MouseButtonEvent {
            click_count,
            ..MouseButtonEvent::release(button, mods)
        },
    }
}

/// Vertical wheel delta in 120-per-line units; positive scrolls up
pub fn wheel_delta_from_winit(delta: MouseScrollDelta) -> i32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => (y * WHEEL_DELTA_PER_LINE).round() as i32,
        MouseScrollDelta::PixelDelta(pos) => pos.y.round() as i32,
    }
}

pub fn mouse_wheel_event_from_winit(
    delta: MouseScrollDelta,
    modifiers: ModifiersState,
) -> MouseWheelEvent {
    MouseWheelEvent::new(wheel_delta_from_winit(delta), modifiers_from_winit(modifiers))
}
