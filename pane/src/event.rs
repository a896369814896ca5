//! Input events delivered by the display, in frame coordinates.

use crate::primitives::Point;

/// Linux input event codes understood by `InputEvent::from_raw`.
pub mod codes {
    pub const REL_WHEEL: u16 = 0x08;
    pub const BTN_LEFT: u16 = 0x110;
    pub const BTN_RIGHT: u16 = 0x111;
    pub const BTN_MIDDLE: u16 = 0x112;
    pub const BTN_SIDE: u16 = 0x113;
    pub const BTN_EXTRA: u16 = 0x114;
}

/// Mouse button types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

impl MouseButton {
    fn from_code(code: u16) -> Option<Self> {
        match code {
            codes::BTN_LEFT => Some(Self::Left),
            codes::BTN_RIGHT => Some(Self::Right),
            codes::BTN_MIDDLE => Some(Self::Middle),
            codes::BTN_SIDE => Some(Self::Back),
            codes::BTN_EXTRA => Some(Self::Forward),
            0x115..=0x117 => Some(Self::Other(code)),
            _ => None,
        }
    }
}

/// A single input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Mouse wheel moved by `delta` notches (positive = away from the user).
    Wheel { position: Point, delta: i32 },

    /// Mouse button pressed.
    ButtonPressed { button: MouseButton, position: Point },

    /// Mouse button released.
    ButtonReleased { button: MouseButton, position: Point },

    /// Anything else. Always ignored by the dispatcher.
    Other { code: u16 },
}

impl InputEvent {
    /// Decode a raw `{code, x, y, value}` event as sent by the display server.
    pub fn from_raw(code: u16, x: i32, y: i32, value: i32) -> Self {
        let position = Point::new(x, y);
        if code == codes::REL_WHEEL {
            return Self::Wheel {
                position,
                delta: value,
            };
        }
        match (MouseButton::from_code(code), value) {
            (Some(button), 1) => Self::ButtonPressed { button, position },
            (Some(button), 0) => Self::ButtonReleased { button, position },
            _ => Self::Other { code },
        }
    }

    pub fn position(&self) -> Option<Point> {
        match *self {
            Self::Wheel { position, .. }
            | Self::ButtonPressed { position, .. }
            | Self::ButtonReleased { position, .. } => Some(position),
            Self::Other { .. } => None,
        }
    }
}
