//! USB HID Usage IDs (page 0x07, Keyboard/Keypad page).
//!
//! Reference: USB HID Usage Tables 1.3, Section 10 (Keyboard/Keypad page 0x07).
//!
//! # What is a HID Usage ID? (for beginners)
//!
//! The **USB Human Interface Device (HID)** standard assigns a unique number to
//! every key on a keyboard.  All keyboard keys are on page 0x07
//! ("Keyboard/Keypad").  HID codes for letters start at 0x04 (not at 'A'=0x41
//! like ASCII) because they name physical key positions, not characters.
//!
//! A touch keyboard has no physical positions, only printed characters, so the
//! mapping here goes the other way: from the printed character to the usage a
//! US-layout host expects for that character.
//!
//! # The `Unknown` sentinel
//!
//! Characters with no usage on the US layout map to [`HidKeyCode::Unknown`]
//! (value 0x0000).  Injection backends skip it.

use serde::{Deserialize, Serialize};

/// USB HID Usage ID for keyboard keys (page 0x07).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum HidKeyCode {
    // Letters (HID 0x04–0x1D)
    KeyA = 0x04,
    KeyB = 0x05,
    KeyC = 0x06,
    KeyD = 0x07,
    KeyE = 0x08,
    KeyF = 0x09,
    KeyG = 0x0A,
    KeyH = 0x0B,
    KeyI = 0x0C,
    KeyJ = 0x0D,
    KeyK = 0x0E,
    KeyL = 0x0F,
    KeyM = 0x10,
    KeyN = 0x11,
    KeyO = 0x12,
    KeyP = 0x13,
    KeyQ = 0x14,
    KeyR = 0x15,
    KeyS = 0x16,
    KeyT = 0x17,
    KeyU = 0x18,
    KeyV = 0x19,
    KeyW = 0x1A,
    KeyX = 0x1B,
    KeyY = 0x1C,
    KeyZ = 0x1D,

    // Digits (HID 0x1E–0x27; note 0 comes after 9)
    Digit1 = 0x1E,
    Digit2 = 0x1F,
    Digit3 = 0x20,
    Digit4 = 0x21,
    Digit5 = 0x22,
    Digit6 = 0x23,
    Digit7 = 0x24,
    Digit8 = 0x25,
    Digit9 = 0x26,
    Digit0 = 0x27,

    // Editing keys
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,

    // Punctuation
    Minus = 0x2D,
    Equal = 0x2E,
    BracketLeft = 0x2F,
    BracketRight = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Backquote = 0x35,
    Comma = 0x36,
    Period = 0x37,
    Slash = 0x38,

    /// No mapping exists for the character.
    Unknown = 0x0000,
}

impl HidKeyCode {
    const LETTERS: [HidKeyCode; 26] = [
        Self::KeyA, Self::KeyB, Self::KeyC, Self::KeyD, Self::KeyE, Self::KeyF, Self::KeyG,
        Self::KeyH, Self::KeyI, Self::KeyJ, Self::KeyK, Self::KeyL, Self::KeyM, Self::KeyN,
        Self::KeyO, Self::KeyP, Self::KeyQ, Self::KeyR, Self::KeyS, Self::KeyT, Self::KeyU,
        Self::KeyV, Self::KeyW, Self::KeyX, Self::KeyY, Self::KeyZ,
    ];

    const DIGITS: [HidKeyCode; 10] = [
        Self::Digit0, Self::Digit1, Self::Digit2, Self::Digit3, Self::Digit4,
        Self::Digit5, Self::Digit6, Self::Digit7, Self::Digit8, Self::Digit9,
    ];

    /// Resolves a printed character to its HID usage.
    ///
    /// Letters are case-insensitive.  `'\n'` maps to Enter, `'\u{8}'` to
    /// Backspace.  Anything else without a US-layout usage is [`HidKeyCode::Unknown`].
    pub fn from_char(ch: char) -> HidKeyCode {
        match ch.to_ascii_lowercase() {
            c @ 'a'..='z' => Self::LETTERS[(c as u8 - b'a') as usize],
            c @ '0'..='9' => Self::DIGITS[(c as u8 - b'0') as usize],
            ' ' => Self::Space,
            '\n' | '\r' => Self::Enter,
            '\u{8}' => Self::Backspace,
            '\t' => Self::Tab,
            '\u{1b}' => Self::Escape,
            '-' => Self::Minus,
            '=' => Self::Equal,
            '[' => Self::BracketLeft,
            ']' => Self::BracketRight,
            '\\' => Self::Backslash,
            ';' => Self::Semicolon,
            '\'' => Self::Quote,
            '`' => Self::Backquote,
            ',' => Self::Comma,
            '.' => Self::Period,
            '/' => Self::Slash,
            _ => Self::Unknown,
        }
    }

    /// Returns the raw HID usage value.
    pub fn usage_id(self) -> u16 {
        self as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_map_to_contiguous_usages() {
        assert_eq!(HidKeyCode::from_char('a'), HidKeyCode::KeyA);
        assert_eq!(HidKeyCode::from_char('q').usage_id(), 0x14);
        assert_eq!(HidKeyCode::from_char('z').usage_id(), 0x1D);
    }

    #[test]
    fn test_letters_are_case_insensitive() {
        assert_eq!(HidKeyCode::from_char('Q'), HidKeyCode::from_char('q'));
    }

    #[test]
    fn test_zero_follows_nine() {
        assert_eq!(HidKeyCode::from_char('9').usage_id(), 0x26);
        assert_eq!(HidKeyCode::from_char('0').usage_id(), 0x27);
    }

    #[test]
    fn test_space_and_editing_keys() {
        assert_eq!(HidKeyCode::from_char(' '), HidKeyCode::Space);
        assert_eq!(HidKeyCode::from_char('\n'), HidKeyCode::Enter);
        assert_eq!(HidKeyCode::from_char('\u{8}'), HidKeyCode::Backspace);
    }

    #[test]
    fn test_unmapped_character_is_unknown() {
        assert_eq!(HidKeyCode::from_char('é'), HidKeyCode::Unknown);
        assert_eq!(HidKeyCode::Unknown.usage_id(), 0);
    }
}
