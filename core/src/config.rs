//! TOML settings.
//!
//! ```toml
//! [logging]
//! level = "info"
//!
//! [logging.overrides]
//! "waymark_router" = "debug"
//!
//! [router]
//! base = "/app"
//! root = "#main"
//!
//! [flow]
//! fail_fast = false
//! timeout_ms = 5000
//! ```

use crate::error::CoreError;
use crate::logging::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ROOT: &str = "body";
pub const DEFAULT_FAIL_FAST: bool = true;
pub const DEFAULT_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_REPEAT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: LogConfig,
    pub router: RouterSettings,
    pub flow: FlowSettings,
}

impl Settings {
    pub fn from_toml_str(input: &str) -> Result<Self, CoreError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&input)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    /// Prefix the application is served from, e.g. `/app`.
    pub base: Option<String>,
    /// Default attachment point for pages.
    pub root: String,
    /// Appended to every place title, e.g. ` - My App`.
    pub title_suffix: Option<String>,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            base: None,
            root: DEFAULT_ROOT.to_string(),
            title_suffix: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowSettings {
    pub fail_fast: bool,
    /// Overall timeout for parallel and sequential flows. Unset means no timeout.
    pub timeout_ms: Option<u64>,
    pub interval_ms: u64,
    pub repeat_timeout_ms: u64,
    pub iterations: Option<usize>,
}

impl FlowSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn repeat_timeout(&self) -> Duration {
        Duration::from_millis(self.repeat_timeout_ms)
    }
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            fail_fast: DEFAULT_FAIL_FAST,
            timeout_ms: None,
            interval_ms: DEFAULT_INTERVAL_MS,
            repeat_timeout_ms: DEFAULT_REPEAT_TIMEOUT_MS,
            iterations: None,
        }
    }
}
