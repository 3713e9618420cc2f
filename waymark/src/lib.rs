//! Waymark facade crate.
//!
//! Re-exports the core, router and flow crates with a single entry point.

pub use waymark_core as core;
#[cfg(feature = "flow")]
pub use waymark_flow as flow;
#[cfg(feature = "router")]
pub use waymark_router as router;

pub use waymark_core::{LogConfig, Settings};
#[cfg(feature = "flow")]
pub use waymark_flow::{Flow, FlowContext, FlowStatus, Task};
#[cfg(feature = "router")]
pub use waymark_router::{Page, Place, PlaceManager, Places};

/// Load settings from `path` and install the logging subscriber they describe.
pub fn bootstrap(path: impl AsRef<std::path::Path>) -> Result<Settings, waymark_core::CoreError> {
    let settings = Settings::load(path)?;
    waymark_core::logging::try_init(&settings.logging)?;
    Ok(settings)
}

pub mod prelude {
    pub use waymark_core::prelude::*;
    #[cfg(feature = "flow")]
    pub use waymark_flow::prelude::*;
    #[cfg(feature = "router")]
    pub use waymark_router::prelude::*;
}
