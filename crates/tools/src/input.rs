//! Pointer and wheel events delivered to tools.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Keyboard modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    /// Shift held and nothing else
    pub fn is_shift_only(&self) -> bool {
        *self == Self::SHIFT
    }
}

/// Pointer press, release or move.
///
/// For presses and releases the button flags name the button that changed;
/// for moves they name the buttons held down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointingEvent {
    /// Pixel position, origin at the top left of the viewport
    pub position: IVec2,
    pub primary: bool,
    pub secondary: bool,
    pub middle: bool,
    pub modifiers: Modifiers,
}

impl PointingEvent {
    /// Move without any button held
    pub fn hover(position: IVec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_button(position: IVec2, button: MouseButton) -> Self {
        let mut event = Self::hover(position);
        match button {
            MouseButton::Left => event.primary = true,
            MouseButton::Right => event.secondary = true,
            MouseButton::Middle => event.middle = true,
        }
        event
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WheelOrientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Mouse wheel turn; positive `delta` scrolls away from the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub delta: i32,
    pub orientation: WheelOrientation,
    pub modifiers: Modifiers,
}
