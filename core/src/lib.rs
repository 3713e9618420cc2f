//! Waymark Core - shared ambient pieces for the router and the flow engine.
//!
//! - `logging`: an explicitly constructed logging context (`LogConfig`) with a
//!   per-category override table, installed as a `tracing` subscriber.
//! - `config`: TOML settings for logging, routing and flows.
//! - `error`: the crate error type.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{FlowSettings, RouterSettings, Settings};
pub use error::CoreError;
pub use logging::{Level, LevelOverrides, LogConfig};

pub mod prelude {
    pub use crate::config::{FlowSettings, RouterSettings, Settings};
    pub use crate::error::CoreError;
    pub use crate::logging::{Level, LevelOverrides, LogConfig};
}
