//! Infrastructure layer for the touchkey runtime.
//!
//! Contains the adapters that touch the outside world: configuration file
//! storage, hand-sample sources (trace files, synthetic typing, test mocks),
//! and key injectors.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `touchkey_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod injection;
pub mod sample_source;
pub mod storage;
