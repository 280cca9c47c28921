//! Touch validation: turning per-frame hand samples into key presses.
//!
//! # How a touch is recognised (for beginners)
//!
//! A finger hovering over the surface casts a shadow a little way from the
//! fingertip.  The closer the finger gets, the closer fingertip and shadow tip
//! are; at contact they meet.  The engine measures that distance every frame
//! and sorts it into three bands:
//!
//! ```text
//!  0 ─────────── distance_threshold ─────────── hover_threshold ──────────▶
//!  │ touch candidate │            hover             │      no contact
//! ```
//!
//! A touch candidate is not a key press yet.  It must persist on the same key
//! for `debounce_frames` frames and `min_touch_duration` of wall-clock time,
//! and its combined confidence must clear `min_confidence_score`.  Only then
//! does the engine emit a [`result::TouchEvent`].
//!
//! # Sub-modules
//!
//! - **`config`** – Thresholds and timings, with validation.
//! - **`scoring`** – Pure distance classification and confidence functions.
//! - **`state`** – The engine's state machine states.
//! - **`result`** – What each `validate` call returns.
//! - **`engine`** – The stateful engine itself.

pub mod config;
pub mod engine;
pub mod result;
pub mod scoring;
pub mod state;
