//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module handles:
//!
//! - Reading the TOML configuration file from an explicit path or the
//!   platform-appropriate directory.
//! - Writing the configuration back to disk.
//! - Providing working defaults when no file exists yet (first run).
//! - Converting the on-disk sections into the domain's
//!   `TouchValidationConfig` and `KeyboardLayout`.

pub mod config;
