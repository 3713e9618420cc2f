use crate::loader::{Loader, LoaderRef};
use crate::parameter::has_parameter;
use crate::path::normalize;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An immutable route descriptor.
///
/// Identified by its (normalized) route pattern: equality and hashing ignore
/// the title, root selector and loader.
///
/// ```
/// use waymark_router::Place;
///
/// let place = Place::new("records/:from/:to/").title("Records").root("#main");
/// assert_eq!(place.route(), "/records/:from/:to");
/// assert!(place.has_parameter());
/// ```
#[derive(Clone)]
pub struct Place {
    route: String,
    title: Option<String>,
    root: Option<String>,
    loader: Option<LoaderRef>,
    has_parameter: bool,
}

impl Place {
    pub fn new(route: impl AsRef<str>) -> Self {
        let route = normalize(route.as_ref());
        let has_parameter = has_parameter(&route);
        Self {
            route,
            title: None,
            root: None,
            loader: None,
            has_parameter,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attach the page somewhere other than the manager's default root.
    pub fn root(mut self, selector: impl Into<String>) -> Self {
        self.root = Some(selector.into());
        self
    }

    pub fn loader<L: Loader>(mut self, loader: L) -> Self {
        self.loader = Some(LoaderRef::Inline(Arc::new(loader)));
        self
    }

    /// Refer to a loader registered on the place manager under `name`.
    pub fn named_loader(mut self, name: impl Into<String>) -> Self {
        self.loader = Some(LoaderRef::Named(name.into()));
        self
    }

    pub(crate) fn with_loader_ref(mut self, loader: LoaderRef) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Same metadata, different route.
    pub(crate) fn with_route(&self, route: &str) -> Self {
        let mut place = Place::new(route);
        place.title = self.title.clone();
        place.root = self.root.clone();
        place.loader = self.loader.clone();
        place
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn title_text(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn root_selector(&self) -> Option<&str> {
        self.root.as_deref()
    }

    pub fn loader_ref(&self) -> Option<&LoaderRef> {
        self.loader.as_ref()
    }

    pub fn has_parameter(&self) -> bool {
        self.has_parameter
    }
}

impl PartialEq for Place {
    fn eq(&self, other: &Self) -> bool {
        self.route == other.route
    }
}

impl Eq for Place {}

impl Hash for Place {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.route.hash(state);
    }
}

impl fmt::Debug for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Place")
            .field("route", &self.route)
            .field("title", &self.title)
            .field("root", &self.root)
            .field("loader", &self.loader)
            .finish()
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Place({}", self.route)?;
        if let Some(title) = &self.title {
            write!(f, ", {title}")?;
        }
        if self.root.is_some() {
            f.write_str(", custom root")?;
        }
        f.write_str(")")
    }
}
