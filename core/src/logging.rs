//! # Logging Context
//!
//! Logging is configured through an owned [`LogConfig`] value instead of
//! process-wide mutable state. A config carries a default [`Level`] and a
//! [`LevelOverrides`] table keyed by category (a `tracing` target such as
//! `waymark_router::place_manager`). Installing it with [`init`] turns the
//! table into an `EnvFilter` for the `tracing` subscriber.
//!
//! ```rust
//! use waymark_core::logging::{Level, LogConfig};
//!
//! let config = LogConfig::new(Level::Info).with_override("waymark_flow", Level::Debug);
//! assert_eq!(config.level_for("waymark_flow::sequence"), Level::Debug);
//! assert_eq!(config.level_for("waymark_router"), Level::Info);
//! ```

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const CATEGORY_SEPARATOR: &str = "::";

/// Log level, ordered from quietest to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Off => "off",
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
            Level::Trace => "trace",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> Self {
        match level {
            Level::Off => LevelFilter::OFF,
            Level::Error => LevelFilter::ERROR,
            Level::Warn => LevelFilter::WARN,
            Level::Info => LevelFilter::INFO,
            Level::Debug => LevelFilter::DEBUG,
            Level::Trace => LevelFilter::TRACE,
        }
    }
}

/// Returns true if `category` equals `parent` or lives below it.
pub fn is_subcategory(parent: &str, category: &str) -> bool {
    if parent == category {
        return true;
    }
    category
        .strip_prefix(parent)
        .is_some_and(|rest| rest.starts_with(CATEGORY_SEPARATOR))
}

/// Per-category level table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelOverrides {
    levels: BTreeMap<String, Level>,
}

impl LevelOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, category: impl Into<String>, level: Level) {
        self.levels.insert(category.into(), level);
    }

    pub fn remove(&mut self, category: &str) -> Option<Level> {
        self.levels.remove(category)
    }

    /// The level of the most specific registered parent of `category`.
    pub fn overridden_level(&self, category: &str) -> Option<Level> {
        self.levels
            .iter()
            .filter(|(parent, _)| is_subcategory(parent, category))
            .max_by_key(|(parent, _)| parent.len())
            .map(|(_, level)| *level)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Level)> {
        self.levels.iter().map(|(category, level)| (category.as_str(), *level))
    }
}

/// An explicitly constructed logging context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: Level,
    pub overrides: LevelOverrides,
}

impl LogConfig {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            overrides: LevelOverrides::new(),
        }
    }

    pub fn with_override(mut self, category: impl Into<String>, level: Level) -> Self {
        self.overrides.add(category, level);
        self
    }

    /// Effective level for a category.
    pub fn level_for(&self, category: &str) -> Level {
        self.overrides
            .overridden_level(category)
            .unwrap_or(self.level)
    }

    pub fn enabled(&self, category: &str, level: Level) -> bool {
        level != Level::Off && level <= self.level_for(category)
    }

    /// Renders the config as `EnvFilter` directives, e.g. `info,waymark_router=debug`.
    pub fn directives(&self) -> String {
        let mut directives = vec![self.level.as_str().to_string()];
        directives.extend(
            self.overrides
                .iter()
                .map(|(category, level)| format!("{category}={level}")),
        );
        directives.join(",")
    }

    /// Builds the filter, preferring `RUST_LOG` when it is set.
    pub fn env_filter(&self) -> Result<EnvFilter, CoreError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        let directives = self.directives();
        EnvFilter::try_new(&directives).map_err(|e| CoreError::Directive {
            directive: directives,
            reason: e.to_string(),
        })
    }
}

/// Install a stdout subscriber for this config.
pub fn try_init(config: &LogConfig) -> Result<(), CoreError> {
    let filter = config.env_filter()?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| CoreError::Subscriber(e.to_string()))
}

/// Like [`try_init`], but a subscriber that is already installed is left in place.
pub fn init(config: &LogConfig) {
    if let Err(e) = try_init(config) {
        tracing::debug!(error = %e, "Tracing subscriber not installed");
    }
}
