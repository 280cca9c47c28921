//! Key code translation for injecting confirmed touches into the host.
//!
//! The canonical representation is USB HID Usage IDs (page 0x07, Keyboard/Keypad).
//! A printed key is identified by the character on it; [`hid::HidKeyCode::from_char`]
//! resolves that character to the usage an input-injection backend sends.

pub mod hid;

pub use hid::HidKeyCode;
