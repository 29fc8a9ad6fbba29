//! Diagnostic logging for the simulator. This is not the CSV report, which records model
//! output. Log messages describe what the engine is doing: generation, seeding retries,
//! per-day demographics and tick timing.
//!
//! This module (re)exports the five logging macros: `error!`, `warn!`, `info!`, `debug!` and
//! `trace!`:
//!
//! ```rust
//! use sir_grid::log::info;
//!
//! pub fn report_progress(day: u64) {
//!     info!("finished day {day}");
//! }
//! ```
//!
//! Logging is _disabled_ by default. The binary enables it with `--log-level <level>` or
//! `-v`. From code it is controlled with:
//!
//!  - `enable_logging()`: turns on all log messages
//!  - `disable_logging()`: turns off all log messages
//!  - `set_log_level(level: LevelFilter)`: enables only log messages with priority at least `level`
//!
//! Per-module filters are set with `set_module_filter()` / `set_module_filters()` and removed
//! with `remove_module_filter()`:
//!
//! ```rust
//! use sir_grid::log::{set_log_level, set_module_filter, LevelFilter};
//!
//! // Daily demographics, but not the per-tick timing.
//! set_log_level(LevelFilter::Debug);
//! set_module_filter("sir_grid::population", LevelFilter::Info);
//! ```
#[cfg(feature = "logging")]
mod standard_logger;

#[cfg(all(feature = "logging", feature = "progress_bar"))]
mod progress_bar_encoder;

#[cfg(not(feature = "logging"))]
mod null_logger;

pub use log::{debug, error, info, trace, warn, LevelFilter};
use std::collections::BTreeMap;
use std::str::FromStr;

#[cfg(feature = "logging")]
use log4rs::Handle;
use std::sync::{LazyLock, Mutex, MutexGuard};

use crate::error::SirError;

static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// The levels currently installed in the global logger. Module levels are kept sorted by
/// path so the backend sees them in a stable order.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    pub(in crate::log) root_level: LevelFilter,
    pub(in crate::log) module_levels: BTreeMap<String, LevelFilter>,

    #[cfg(feature = "logging")]
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            root_level: LevelFilter::Off,
            module_levels: BTreeMap::new(),

            #[cfg(feature = "logging")]
            root_handle: None,
        }
    }
}

/// Applies `change` to the global configuration and reinstalls the logger if `change`
/// reports that something moved.
fn reconfigure(change: impl FnOnce(&mut LogConfiguration) -> bool) {
    let mut configuration = lock_configuration();
    if change(&mut configuration) {
        configuration.set_config();
    }
}

fn lock_configuration() -> MutexGuard<'static, LogConfiguration> {
    // A panic while holding the lock cannot leave the levels half-written.
    LOG_CONFIGURATION
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Emits everything, including per-tick timing.
pub fn enable_logging() {
    set_log_level(LevelFilter::Trace);
}

pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

/// Sets the level for every module without a filter of its own.
pub fn set_log_level(level: LevelFilter) {
    reconfigure(|configuration| {
        configuration.root_level = level;
        true
    });
}

/// Overrides the level under `module_path`, e.g. `"sir_grid::population"`.
pub fn set_module_filter(module_path: &str, level: LevelFilter) {
    set_module_filters(&[(module_path, level)]);
}

/// Installs several module filters with a single logger rebuild.
pub fn set_module_filters<S: AsRef<str>>(module_filters: &[(S, LevelFilter)]) {
    reconfigure(|configuration| {
        let mut changed = false;
        for (module, level) in module_filters {
            let previous = configuration
                .module_levels
                .insert(module.as_ref().to_string(), *level);
            changed |= previous != Some(*level);
        }
        changed
    });
}

/// Drops the filter under `module_path`; the root level applies to it again.
pub fn remove_module_filter(module_path: &str) {
    reconfigure(|configuration| configuration.module_levels.remove(module_path).is_some());
}

/// A parsed `--log-level` argument: an optional root level plus per-module levels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogLevelSpec {
    pub global: Option<LevelFilter>,
    pub modules: Vec<(String, LevelFilter)>,
}

impl FromStr for LogLevelSpec {
    type Err = SirError;

    /// Parses a comma separated list of `level` or `module=level` items, e.g.
    /// `info,sir_grid::population=trace`.
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut parsed = LogLevelSpec::default();
        for item in spec.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            let parse_level = |level: &str| {
                LevelFilter::from_str(level.trim())
                    .map_err(|_| SirError::SirError(format!("invalid log level: {level}")))
            };
            match item.split_once('=') {
                Some((module, level)) => parsed
                    .modules
                    .push((module.trim().to_string(), parse_level(level)?)),
                None => parsed.global = Some(parse_level(item)?),
            }
        }
        Ok(parsed)
    }
}

impl LogLevelSpec {
    /// Installs the levels in the global logger in one rebuild.
    pub fn apply(&self) {
        reconfigure(|configuration| {
            if let Some(level) = self.global {
                configuration.root_level = level;
            }
            for (module, level) in &self.modules {
                configuration.module_levels.insert(module.clone(), *level);
            }
            true
        });
    }
}
