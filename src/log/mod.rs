//! Logging for simulation runs.
//!
//! The crate logs through the `log` facade: per-sub-step transfer sizes at
//! `trace`, per-tick summaries at `debug`, and lifecycle messages at `info`.
//! This module installs the global logger and controls what it emits. Logging
//! is _disabled_ by default; the `epigraph` binary turns it on with
//! `--log-level <level>`. From code:
//!
//! ```rust
//! use epigraph::log::{set_log_level, set_module_filter, LevelFilter};
//!
//! // Per-tick summaries for the whole crate...
//! set_log_level(LevelFilter::Debug);
//! // ...but every single transfer from the population module.
//! set_module_filter("epigraph::population", LevelFilter::Trace);
//! ```
#[cfg(feature = "logging")]
mod standard_logger;

#[cfg(not(feature = "logging"))]
mod null_logger;

pub use log::{debug, error, info, trace, warn, LevelFilter};

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{LazyLock, Mutex, MutexGuard};

use crate::error::EpiError;

// Logging disabled
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;

static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// The global log level plus per-module overrides. Only one instance exists;
/// the free functions below lock it, edit it and reinstall the logger.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    pub(in crate::log) global_log_level: LevelFilter,
    /// Module path (e.g. `"epigraph::network"`) to its level filter.
    pub(in crate::log) module_levels: HashMap<String, LevelFilter>,

    #[cfg(feature = "logging")]
    root_handle: Option<log4rs::Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        LogConfiguration {
            global_log_level: DEFAULT_LOG_LEVEL,
            module_levels: HashMap::new(),

            #[cfg(feature = "logging")]
            root_handle: None,
        }
    }
}

/// Enables every log message. Equivalent to `set_log_level(LevelFilter::Trace)`.
pub fn enable_logging() {
    set_log_level(LevelFilter::Trace);
}

/// Disables logging completely. Equivalent to `set_log_level(LevelFilter::Off)`.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

/// Sets the global log level. `LevelFilter::Off` disables logging.
pub fn set_log_level(level: LevelFilter) {
    let mut configuration = get_log_configuration();
    configuration.global_log_level = level;
    configuration.set_config();
}

/// Parses a level name (`off`, `error`, `warn`, `info`, `debug`, `trace`,
/// case-insensitive) and sets it as the global level.
///
/// # Errors
///
/// Returns [`EpiError::ConfigurationError`] for an unknown level name.
pub fn set_log_level_from_str(level: &str) -> Result<(), EpiError> {
    let level = LevelFilter::from_str(level)
        .map_err(|_| EpiError::ConfigurationError(format!("unknown log level `{level}`")))?;
    set_log_level(level);
    Ok(())
}

/// Sets a level filter for the given module path.
pub fn set_module_filter(module_path: &str, level: LevelFilter) {
    let mut configuration = get_log_configuration();
    if configuration.module_levels.get(module_path) != Some(&level) {
        configuration
            .module_levels
            .insert(module_path.to_string(), level);
        configuration.set_config();
    }
}

/// Removes the filter for the given module path so the global level applies
/// to it again.
pub fn remove_module_filter(module_path: &str) {
    let mut configuration = get_log_configuration();
    if configuration.module_levels.remove(module_path).is_some() {
        configuration.set_config();
    }
}

fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("Mutex poisoned")
}
