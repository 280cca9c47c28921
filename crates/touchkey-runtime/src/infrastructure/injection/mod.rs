//! Key injection adapters.
//!
//! A real deployment plugs in an OS-specific injector (SendInput, uinput,
//! CGEventPost) behind the `KeyInjector` trait.  This crate ships the
//! platform-independent [`text_buffer::TextBufferInjector`], which resolves
//! every touch to its HID usage, logs it, and appends the character to an
//! in-memory buffer.  The replay CLI uses it to show what would have been
//! typed.

pub mod text_buffer;

pub use text_buffer::TextBufferInjector;
