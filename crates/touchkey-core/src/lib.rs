//! # touchkey-core
//!
//! Shared library for the touchkey projected-keyboard stack containing the
//! touch-validation engine, the keyboard layout index, result and event types,
//! statistics tracking, HID key translation, and the sample trace codec.
//!
//! It has zero dependencies on cameras, OS input APIs, UI frameworks, or async
//! runtimes.
//!
//! # Architecture overview (for beginners)
//!
//! A touchkey keyboard is printed (or projected) on a flat surface and watched
//! by a camera.  An upstream vision pipeline finds the fingertip and the tip of
//! the finger's shadow in every frame.  When the finger is high above the
//! surface the two points are far apart; as the finger comes down they
//! converge, and at the moment of contact they meet.
//!
//! This crate turns that stream of (fingertip, shadow-tip) pairs into key
//! presses:
//!
//! - **`domain`** – Geometry, hand samples, and the keyboard layout index that
//!   answers "which key is under this point?".
//!
//! - **`validation`** – The [`TouchValidationEngine`]: a debounced state machine
//!   with hysteresis that classifies each frame as idle, hovering, rejected, or
//!   a confirmed touch.
//!
//! - **`stats`** – Running counters for accuracy reporting.
//!
//! - **`keymap`** – Translation from a key's printed character to the USB HID
//!   usage ID injected into the host.
//!
//! - **`trace`** – A compact binary format for recording and replaying sample
//!   streams.

pub mod domain;
pub mod keymap;
pub mod stats;
pub mod trace;
pub mod validation;

// Re-export the most-used types at the crate root so callers can write
// `touchkey_core::TouchValidationEngine` instead of the full module path.
pub use domain::geometry::Point;
pub use domain::keyboard::{KeyRegion, KeyboardKey, KeyboardLayout, KeyboardLayoutIndex, LayoutError};
pub use domain::sample::HandSample;
pub use keymap::hid::HidKeyCode;
pub use stats::{TouchStatistics, TouchStatisticsTracker};
pub use trace::{TraceError, TraceFrame, TraceReader, TraceWriter};
pub use validation::config::{ConfigError, TouchValidationConfig};
pub use validation::engine::TouchValidationEngine;
pub use validation::result::{TouchEvent, ValidationResult};
pub use validation::state::{InvalidReason, TouchInputState};
