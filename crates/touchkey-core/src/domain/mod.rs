//! Domain entities for touchkey.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain** (or "entities" layer).  Domain code:
//!
//! - Contains the core business rules of the application.
//! - Has **no** imports from camera drivers, OS input APIs, or UI frameworks.
//! - Can be compiled and tested on any platform without any external setup.
//!
//! Code in outer layers (the session runtime, the replay CLI) depends on the
//! domain, but the domain never depends on them.

/// 2-D points in the shared frame coordinate space.
pub mod geometry;

/// Keyboard keys and the layout index that maps points to keys.
///
/// See [`keyboard::KeyboardLayout`] for the provided implementation.
pub mod keyboard;

/// Per-frame observations delivered by the hand/shadow detector.
pub mod sample;
