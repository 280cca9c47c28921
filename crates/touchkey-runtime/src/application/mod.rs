//! Application layer use cases for the touchkey runtime.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (the pure validation engine in `touchkey-core`) and the infrastructure
//! (files, cameras, OS input injection).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a user goal (e.g., "turn this
//!   stream of hand samples into key presses").
//! - **Depend on abstractions** (traits) rather than concrete implementations,
//!   so the infrastructure can be swapped without changing this code.
//! - **Contain no OS calls and no file system access**.
//!
//! # Sub-modules
//!
//! - **`touch_session`** – Owns one validation engine and one layout, receives
//!   samples and control messages over a bounded channel, and forwards
//!   confirmed touches to a [`touch_session::KeyInjector`].  This runs on every
//!   camera frame.
//!
//! - **`accuracy`** – Turns a statistics snapshot into a pass/fail accuracy
//!   report against a target rate.

pub mod accuracy;
pub mod touch_session;
