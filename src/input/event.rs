//! Input event types

use super::KeyCode;
use std::time::Instant;

/// The kinds of raw input a tool can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    PointerMove,
    PointerDown,
    PointerUp,
    KeyDown,
    KeyUp,
    Text,
}

/// Pointer button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Raw input as delivered by the host environment, before timestamping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInput {
    PointerMove { x: i32, y: i32 },
    PointerDown { x: i32, y: i32, button: MouseButton },
    PointerUp { x: i32, y: i32, button: MouseButton },
    /// `repeat` is set for OS key-repeat deliveries of a held key
    KeyDown { code: KeyCode, repeat: bool },
    KeyUp { code: KeyCode },
    /// A character produced by a key press, after layout and shift
    Text { ch: char },
}

impl RawInput {
    pub fn kind(&self) -> InputKind {
        match self {
            Self::PointerMove { .. } => InputKind::PointerMove,
            Self::PointerDown { .. } => InputKind::PointerDown,
            Self::PointerUp { .. } => InputKind::PointerUp,
            Self::KeyDown { .. } => InputKind::KeyDown,
            Self::KeyUp { .. } => InputKind::KeyUp,
            Self::Text { .. } => InputKind::Text,
        }
    }
}

/// An input event with the instant it was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub input: RawInput,
    pub timestamp: Instant,
}

impl InputEvent {
    pub fn new(input: RawInput, timestamp: Instant) -> Self {
        Self { input, timestamp }
    }

    pub fn kind(&self) -> InputKind {
        self.input.kind()
    }

    /// Key code for keyboard events
    pub fn key(&self) -> Option<KeyCode> {
        match self.input {
            RawInput::KeyDown { code, .. } | RawInput::KeyUp { code } => Some(code),
            _ => None,
        }
    }

    /// Pointer position for pointer events
    pub fn position(&self) -> Option<(i32, i32)> {
        match self.input {
            RawInput::PointerMove { x, y }
            | RawInput::PointerDown { x, y, .. }
            | RawInput::PointerUp { x, y, .. } => Some((x, y)),
            _ => None,
        }
    }
}
