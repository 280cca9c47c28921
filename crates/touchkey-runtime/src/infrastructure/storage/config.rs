//! TOML-based configuration persistence for the touchkey runtime.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\Touchkey\config.toml`
//! - Linux:    `~/.config/touchkey/config.toml`
//! - macOS:    `~/Library/Application Support/Touchkey/config.toml`
//!
//! An explicit path (the CLI's `--config`) bypasses the platform lookup.
//!
//! # Example file
//!
//! ```toml
//! [validation]
//! distance_threshold = 1.0
//! hover_threshold = 3.0
//! debounce_frames = 2
//!
//! [layout]
//! key_size = 40.0
//! key_gap = 4.0
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! # Serde default values
//!
//! Every field is annotated with `#[serde(default = "some_fn")]` so a missing
//! file, a missing section, or a missing key all fall back to the built-in
//! defaults.  The defaults match `TouchValidationConfig::default()`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use touchkey_core::{KeyboardLayout, LayoutError, Point, TouchValidationConfig};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub validation: ValidationSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub layout: LayoutSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Touch-validation thresholds.  Durations are stored in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationSection {
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f64,
    #[serde(default = "default_hover_threshold")]
    pub hover_threshold: f64,
    #[serde(default = "default_release_threshold")]
    pub release_threshold: f64,
    #[serde(default = "default_key_margin")]
    pub key_margin: f64,
    #[serde(default = "default_min_touch_duration_ms")]
    pub min_touch_duration_ms: u64,
    #[serde(default = "default_debounce_frames")]
    pub debounce_frames: u32,
    #[serde(default = "default_min_confidence_score")]
    pub min_confidence_score: f64,
    #[serde(default = "default_true")]
    pub require_shadow_validation: bool,
    #[serde(default = "default_max_frame_gap")]
    pub max_frame_gap: u64,
    #[serde(default = "default_frame_budget_ms")]
    pub frame_budget_ms: u64,
}

/// Session channel sizes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSection {
    /// Capacity of the sample/command channel.  Frames beyond it are dropped.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

/// Geometry of the generated QWERTY layout, in frame coordinate units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutSection {
    /// Left edge of the `q` key.
    #[serde(default)]
    pub origin_x: f64,
    /// Top edge of the `q` key.
    #[serde(default)]
    pub origin_y: f64,
    #[serde(default = "default_key_size")]
    pub key_size: f64,
    #[serde(default = "default_key_gap")]
    pub key_gap: f64,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSection {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_distance_threshold() -> f64 {
    1.0
}
fn default_hover_threshold() -> f64 {
    3.0
}
fn default_release_threshold() -> f64 {
    2.0
}
fn default_key_margin() -> f64 {
    2.0
}
fn default_min_touch_duration_ms() -> u64 {
    50
}
fn default_debounce_frames() -> u32 {
    2
}
fn default_min_confidence_score() -> f64 {
    0.5
}
fn default_true() -> bool {
    true
}
fn default_max_frame_gap() -> u64 {
    5
}
fn default_frame_budget_ms() -> u64 {
    5
}
fn default_channel_capacity() -> usize {
    64
}
fn default_key_size() -> f64 {
    40.0
}
fn default_key_gap() -> f64 {
    4.0
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ValidationSection {
    fn default() -> Self {
        Self {
            distance_threshold: default_distance_threshold(),
            hover_threshold: default_hover_threshold(),
            release_threshold: default_release_threshold(),
            key_margin: default_key_margin(),
            min_touch_duration_ms: default_min_touch_duration_ms(),
            debounce_frames: default_debounce_frames(),
            min_confidence_score: default_min_confidence_score(),
            require_shadow_validation: default_true(),
            max_frame_gap: default_max_frame_gap(),
            frame_budget_ms: default_frame_budget_ms(),
        }
    }
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            key_size: default_key_size(),
            key_gap: default_key_gap(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ── Conversion to domain types ────────────────────────────────────────────────

impl ValidationSection {
    /// Builds the engine configuration.
    ///
    /// The result is not validated here; `TouchValidationEngine::new` does that.
    pub fn to_engine_config(&self) -> TouchValidationConfig {
        TouchValidationConfig {
            distance_threshold: self.distance_threshold,
            hover_threshold: self.hover_threshold,
            release_threshold: self.release_threshold,
            key_margin: self.key_margin,
            min_touch_duration: Duration::from_millis(self.min_touch_duration_ms),
            debounce_frames: self.debounce_frames,
            min_confidence_score: self.min_confidence_score,
            require_shadow_validation: self.require_shadow_validation,
            max_frame_gap: self.max_frame_gap,
            frame_budget: Duration::from_millis(self.frame_budget_ms),
        }
    }
}

impl LayoutSection {
    /// Builds the QWERTY layout described by this section.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if the key size or gap is invalid.
    pub fn build_layout(&self) -> Result<KeyboardLayout, LayoutError> {
        KeyboardLayout::qwerty(
            Point::new(self.origin_x, self.origin_y),
            self.key_size,
            self.key_gap,
        )
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`StorageError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, StorageError> {
    platform_config_dir().ok_or(StorageError::NoPlatformConfigDir)
}

/// Resolves the full path to the platform config file.
///
/// # Errors
///
/// Returns [`StorageError::NoPlatformConfigDir`] if the base directory cannot
/// be determined.
pub fn config_file_path() -> Result<PathBuf, StorageError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the platform config file, returning
/// `AppConfig::default()` if the file does not yet exist.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, StorageError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`StorageError::Io`] for file-system errors other than "not found",
/// and [`StorageError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, StorageError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(StorageError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to the platform config file.
///
/// # Errors
///
/// See [`save_config_to`].
pub fn save_config(config: &AppConfig) -> Result<(), StorageError> {
    save_config_to(&config_file_path()?, config)
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`StorageError::Io`] for file-system failures or
/// [`StorageError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), StorageError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory, including the `touchkey`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Touchkey"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("touchkey"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Touchkey")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
