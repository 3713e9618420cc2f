//! Pages render the nodes for a resolved place.

use crate::loader::LoadedData;
use crate::parameter::Parameter;
use crate::place::Place;
use std::sync::Arc;

/// Application-supplied renderer bound to a place.
///
/// `N` is the host's node type.
pub trait Page<N>: Send + Sync {
    /// The root nodes to mount for `place`.
    fn elements(&self, place: &Place, parameter: &Parameter, data: &LoadedData) -> Vec<N>;

    /// Called after the nodes have been mounted.
    fn attach(&mut self) {}

    /// Called before the page is replaced by another one.
    fn detach(&mut self) {}
}

/// Zero-argument constructor of a page.
pub type PageFactory<N> = Arc<dyn Fn() -> Box<dyn Page<N>> + Send + Sync>;

pub fn page_factory<N, P, F>(f: F) -> PageFactory<N>
where
    P: Page<N> + 'static,
    F: Fn() -> P + Send + Sync + 'static,
{
    Arc::new(move || Box::new(f()) as Box<dyn Page<N>>)
}

/// Fallback page for unknown paths.
pub type NotFoundFactory<N> = Arc<dyn Fn(&Place) -> Box<dyn Page<N>> + Send + Sync>;
/// Fallback page when a loader failed.
pub type NoDataFactory<N> = Arc<dyn Fn() -> Box<dyn Page<N>> + Send + Sync>;
/// Fallback page for navigation errors; receives the error message.
pub type ErrorPageFactory<N> = Arc<dyn Fn(&Place, &str) -> Box<dyn Page<N>> + Send + Sync>;

pub(crate) struct DefaultNotFound {
    route: String,
}

impl DefaultNotFound {
    pub(crate) fn new(place: &Place) -> Self {
        Self {
            route: place.route().to_string(),
        }
    }
}

impl<N: From<String>> Page<N> for DefaultNotFound {
    fn elements(&self, _place: &Place, _parameter: &Parameter, _data: &LoadedData) -> Vec<N> {
        vec![
            N::from("Error 404".to_string()),
            N::from(format!(
                "You're lost! Page '{}' was not found. Please take a step back.",
                self.route
            )),
        ]
    }
}

pub(crate) struct DefaultNoData;

impl<N: From<String>> Page<N> for DefaultNoData {
    fn elements(&self, place: &Place, _parameter: &Parameter, data: &LoadedData) -> Vec<N> {
        let fallback = "Undefined error".to_string();
        vec![
            N::from("No data".to_string()),
            N::from(format!(
                "The data for page '{}' could not be loaded.",
                place.route()
            )),
            N::from(data.get_or(&fallback).clone()),
        ]
    }
}

pub(crate) struct DefaultErrorPage {
    error: String,
}

impl DefaultErrorPage {
    pub(crate) fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

impl<N: From<String>> Page<N> for DefaultErrorPage {
    fn elements(&self, place: &Place, _parameter: &Parameter, _data: &LoadedData) -> Vec<N> {
        vec![
            N::from("Error".to_string()),
            N::from(format!(
                "An error occurred while loading the page '{}'.",
                place.route()
            )),
            N::from(self.error.clone()),
        ]
    }
}
