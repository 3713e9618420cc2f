//! Waymark Router - client-side place manager
//!
//! This crate resolves URL paths to registered places and mounts their pages:
//! - `Path` / `Parameter`: normalization, tokenizing and `:name` matching
//! - `Place` / `Places`: immutable route descriptors and route trees
//! - `PlaceManager`: registration, resolution, hrefs and navigation
//!
//! Browser APIs are reached only through the `Host` trait.

pub mod base;
pub mod error;
pub mod host;
pub mod loader;
pub mod page;
pub mod parameter;
pub mod path;
pub mod place;
pub mod place_manager;
pub mod places;

pub use base::Base;
pub use error::RouterError;
pub use host::{Host, MemoryHost, NavigationEvent};
pub use loader::{LoadedData, Loader, LoaderFn, LoaderRef, loader_fn};
pub use page::{Page, PageFactory, page_factory};
pub use parameter::Parameter;
pub use path::Path;
pub use place::Place;
pub use place_manager::{AfterPlaceHandler, BeforePlaceHandler, Navigation, PlaceManager, Resolved};
pub use places::Places;

pub mod prelude {
    pub use crate::error::RouterError;
    pub use crate::host::{Host, MemoryHost, NavigationEvent};
    pub use crate::loader::{LoadedData, Loader, loader_fn};
    pub use crate::page::Page;
    pub use crate::parameter::Parameter;
    pub use crate::place::Place;
    pub use crate::place_manager::{
        AfterPlaceHandler, BeforePlaceHandler, Navigation, PlaceManager,
    };
    pub use crate::places::Places;
}
