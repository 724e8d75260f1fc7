//! Physical key codes and their layout-independent names
//!
//! Keys are identified by the position they occupy on the keyboard, not by
//! the character they produce. Codes follow the Linux evdev scancode
//! numbering and every code carries the W3C `KeyboardEvent.code` name
//! (`KeyA`, `Digit1`, `ShiftLeft`, ...) so that browser-style identifiers
//! and terminal input land on the same key.

use crossterm::event::{KeyCode as TermKey, ModifierKeyCode};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// A physical key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const ESCAPE: KeyCode = KeyCode(1);
    pub const BACKSPACE: KeyCode = KeyCode(14);
    pub const TAB: KeyCode = KeyCode(15);
    pub const ENTER: KeyCode = KeyCode(28);
    pub const SPACE: KeyCode = KeyCode(57);
    pub const HOME: KeyCode = KeyCode(102);
    pub const UP: KeyCode = KeyCode(103);
    pub const PAGE_UP: KeyCode = KeyCode(104);
    pub const LEFT: KeyCode = KeyCode(105);
    pub const RIGHT: KeyCode = KeyCode(106);
    pub const END: KeyCode = KeyCode(107);
    pub const DOWN: KeyCode = KeyCode(108);
    pub const PAGE_DOWN: KeyCode = KeyCode(109);

    pub fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Look up a key by its `KeyboardEvent.code` name
    pub fn from_code_name(name: &str) -> Option<Self> {
        BY_NAME.get(name).copied()
    }

    /// The `KeyboardEvent.code` name, or `"Unidentified"`
    pub fn code_name(&self) -> &'static str {
        get_key_info(*self).code_name
    }

    /// Translate a terminal key into the physical key that produced it.
    ///
    /// Shifted characters map back to their unshifted key, so `'A'` and
    /// `'a'` are the same physical key.
    pub fn from_terminal(key: TermKey) -> Option<Self> {
        let code = match key {
            TermKey::Char(c) => return char_key(c),
            TermKey::Esc => 1,
            TermKey::Backspace => 14,
            TermKey::Tab | TermKey::BackTab => 15,
            TermKey::Enter => 28,
            TermKey::CapsLock => 58,
            TermKey::F(n @ 1..=10) => 58 + n as u16,
            TermKey::F(11) => 87,
            TermKey::F(12) => 88,
            TermKey::Home => 102,
            TermKey::Up => 103,
            TermKey::PageUp => 104,
            TermKey::Left => 105,
            TermKey::Right => 106,
            TermKey::End => 107,
            TermKey::Down => 108,
            TermKey::PageDown => 109,
            TermKey::Insert => 110,
            TermKey::Delete => 111,
            TermKey::Menu => 127,
            TermKey::Modifier(m) => match m {
                ModifierKeyCode::LeftShift => 42,
                ModifierKeyCode::RightShift => 54,
                ModifierKeyCode::LeftControl => 29,
                ModifierKeyCode::RightControl => 97,
                ModifierKeyCode::LeftAlt => 56,
                ModifierKeyCode::RightAlt => 100,
                ModifierKeyCode::LeftSuper | ModifierKeyCode::LeftMeta => 125,
                ModifierKeyCode::RightSuper | ModifierKeyCode::RightMeta => 126,
                _ => return None,
            },
            _ => return None,
        };
        Some(Self(code))
    }
}

impl From<u16> for KeyCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code_name())
    }
}

fn char_key(c: char) -> Option<KeyCode> {
    let code = match c.to_ascii_lowercase() {
        '`' | '~' => 41,
        '1' | '!' => 2,
        '2' | '@' => 3,
        '3' | '#' => 4,
        '4' | '$' => 5,
        '5' | '%' => 6,
        '6' | '^' => 7,
        '7' | '&' => 8,
        '8' | '*' => 9,
        '9' | '(' => 10,
        '0' | ')' => 11,
        '-' | '_' => 12,
        '=' | '+' => 13,
        'q' => 16,
        'w' => 17,
        'e' => 18,
        'r' => 19,
        't' => 20,
        'y' => 21,
        'u' => 22,
        'i' => 23,
        'o' => 24,
        'p' => 25,
        '[' | '{' => 26,
        ']' | '}' => 27,
        'a' => 30,
        's' => 31,
        'd' => 32,
        'f' => 33,
        'g' => 34,
        'h' => 35,
        'j' => 36,
        'k' => 37,
        'l' => 38,
        ';' | ':' => 39,
        '\'' | '"' => 40,
        '\\' | '|' => 43,
        'z' => 44,
        'x' => 45,
        'c' => 46,
        'v' => 47,
        'b' => 48,
        'n' => 49,
        'm' => 50,
        ',' | '<' => 51,
        '.' | '>' => 52,
        '/' | '?' => 53,
        ' ' => 57,
        _ => return None,
    };
    Some(KeyCode(code))
}

/// Information about a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInfo {
    /// `KeyboardEvent.code` name
    pub code_name: &'static str,
    /// Short keycap label
    pub label: &'static str,
}

const UNKNOWN: KeyInfo = KeyInfo {
    code_name: "Unidentified",
    label: "?",
};

/// (scancode, code name, keycap label) for a standard US layout
const KEYS: &[(u16, &str, &str)] = &[
    (1, "Escape", "Esc"),
    (59, "F1", "F1"),
    (60, "F2", "F2"),
    (61, "F3", "F3"),
    (62, "F4", "F4"),
    (63, "F5", "F5"),
    (64, "F6", "F6"),
    (65, "F7", "F7"),
    (66, "F8", "F8"),
    (67, "F9", "F9"),
    (68, "F10", "F10"),
    (87, "F11", "F11"),
    (88, "F12", "F12"),
    (41, "Backquote", "`"),
    (2, "Digit1", "1"),
    (3, "Digit2", "2"),
    (4, "Digit3", "3"),
    (5, "Digit4", "4"),
    (6, "Digit5", "5"),
    (7, "Digit6", "6"),
    (8, "Digit7", "7"),
    (9, "Digit8", "8"),
    (10, "Digit9", "9"),
    (11, "Digit0", "0"),
    (12, "Minus", "-"),
    (13, "Equal", "="),
    (14, "Backspace", "Bksp"),
    (15, "Tab", "Tab"),
    (16, "KeyQ", "Q"),
    (17, "KeyW", "W"),
    (18, "KeyE", "E"),
    (19, "KeyR", "R"),
    (20, "KeyT", "T"),
    (21, "KeyY", "Y"),
    (22, "KeyU", "U"),
    (23, "KeyI", "I"),
    (24, "KeyO", "O"),
    (25, "KeyP", "P"),
    (26, "BracketLeft", "["),
    (27, "BracketRight", "]"),
    (43, "Backslash", "\\"),
    (58, "CapsLock", "Caps"),
    (30, "KeyA", "A"),
    (31, "KeyS", "S"),
    (32, "KeyD", "D"),
    (33, "KeyF", "F"),
    (34, "KeyG", "G"),
    (35, "KeyH", "H"),
    (36, "KeyJ", "J"),
    (37, "KeyK", "K"),
    (38, "KeyL", "L"),
    (39, "Semicolon", ";"),
    (40, "Quote", "'"),
    (28, "Enter", "Enter"),
    (42, "ShiftLeft", "Shift"),
    (44, "KeyZ", "Z"),
    (45, "KeyX", "X"),
    (46, "KeyC", "C"),
    (47, "KeyV", "V"),
    (48, "KeyB", "B"),
    (49, "KeyN", "N"),
    (50, "KeyM", "M"),
    (51, "Comma", ","),
    (52, "Period", "."),
    (53, "Slash", "/"),
    (54, "ShiftRight", "Shift"),
    (29, "ControlLeft", "Ctrl"),
    (125, "MetaLeft", "Win"),
    (56, "AltLeft", "Alt"),
    (57, "Space", "Space"),
    (100, "AltRight", "Alt"),
    (126, "MetaRight", "Win"),
    (127, "ContextMenu", "Menu"),
    (97, "ControlRight", "Ctrl"),
    (103, "ArrowUp", "↑"),
    (105, "ArrowLeft", "←"),
    (108, "ArrowDown", "↓"),
    (106, "ArrowRight", "→"),
    (110, "Insert", "Ins"),
    (102, "Home", "Home"),
    (104, "PageUp", "PgUp"),
    (111, "Delete", "Del"),
    (107, "End", "End"),
    (109, "PageDown", "PgDn"),
];

/// Key info indexed by code
pub static KEYMAP: LazyLock<HashMap<KeyCode, KeyInfo>> = LazyLock::new(|| {
    KEYS.iter()
        .map(|&(code, code_name, label)| (KeyCode(code), KeyInfo { code_name, label }))
        .collect()
});

static BY_NAME: LazyLock<HashMap<&'static str, KeyCode>> = LazyLock::new(|| {
    KEYS.iter()
        .map(|&(code, code_name, _)| (code_name, KeyCode(code)))
        .collect()
});

/// Get key info by code, returns an "Unidentified" entry if not found
pub fn get_key_info(code: KeyCode) -> KeyInfo {
    KEYMAP.get(&code).copied().unwrap_or(UNKNOWN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_names_round_trip_through_table() {
        let a = KeyCode::from_code_name("KeyA").unwrap();
        assert_eq!(a, KeyCode(30));
        assert_eq!(a.code_name(), "KeyA");
        assert_eq!(get_key_info(a).label, "A");
    }

    #[test]
    fn unknown_code_is_unidentified() {
        assert_eq!(KeyCode(999).code_name(), "Unidentified");
        assert_eq!(KeyCode::from_code_name("NotAKey"), None);
    }

    #[test]
    fn shifted_chars_map_to_same_physical_key() {
        assert_eq!(KeyCode::from_terminal(TermKey::Char('a')), Some(KeyCode(30)));
        assert_eq!(KeyCode::from_terminal(TermKey::Char('A')), Some(KeyCode(30)));
        assert_eq!(KeyCode::from_terminal(TermKey::Char('!')), Some(KeyCode(2)));
        assert_eq!(KeyCode::from_terminal(TermKey::Char('1')), Some(KeyCode(2)));
    }

    #[test]
    fn terminal_special_keys() {
        assert_eq!(KeyCode::from_terminal(TermKey::Char(' ')), Some(KeyCode::SPACE));
        assert_eq!(KeyCode::from_terminal(TermKey::BackTab), Some(KeyCode::TAB));
        assert_eq!(KeyCode::from_terminal(TermKey::F(5)), Some(KeyCode(63)));
        assert_eq!(KeyCode::from_terminal(TermKey::F(12)), Some(KeyCode(88)));
        assert_eq!(
            KeyCode::from_terminal(TermKey::Modifier(ModifierKeyCode::RightShift)),
            Some(KeyCode(54))
        );
        assert_eq!(KeyCode::from_terminal(TermKey::Char('é')), None);
    }

    #[test]
    fn every_table_entry_has_unique_code_and_name() {
        assert_eq!(KEYMAP.len(), KEYS.len());
        assert_eq!(BY_NAME.len(), KEYS.len());
    }
}
