use crate::loader::{Loader, LoaderRef};
use crate::page::{Page, PageFactory, page_factory};
use crate::path::normalize;
use crate::place::Place;
use std::sync::Arc;

/// A collection of places and their page factories, used to build route trees.
///
/// Adding a place whose route is already present replaces the earlier entry.
///
/// ```rust,ignore
/// let places = Places::new()
///     .add(Place::new("/"), || Home)
///     .children("/records", Places::new()
///         .add(Place::new("/"), || Records)
///         .add(Place::new(":id"), || Record));
/// ```
pub struct Places<N> {
    entries: Vec<(Place, PageFactory<N>)>,
}

impl<N: 'static> Places<N> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn add<P, F>(self, place: Place, page: F) -> Self
    where
        P: Page<N> + 'static,
        F: Fn() -> P + Send + Sync + 'static,
    {
        self.add_factory(place, page_factory(page))
    }

    pub fn add_factory(mut self, place: Place, factory: PageFactory<N>) -> Self {
        self.insert(place, factory);
        self
    }

    /// Add every entry of `places`.
    pub fn add_all(mut self, places: Places<N>) -> Self {
        for (place, factory) in places.entries {
            self.insert(place, factory);
        }
        self
    }

    /// Add every entry of `places` with its route nested below `prefix`.
    pub fn children(mut self, prefix: &str, places: Places<N>) -> Self {
        for (place, factory) in places.entries {
            let route = child_route(prefix, place.route());
            self.insert(place.with_route(&route), factory);
        }
        self
    }

    /// Assign `loader` to the already added place with the same route.
    pub fn loader<L: Loader>(mut self, place: &Place, loader: L) -> Self {
        let loader: Arc<dyn Loader> = Arc::new(loader);
        if let Some((existing, _)) = self.entries.iter_mut().find(|(p, _)| p == place) {
            *existing = existing.clone().with_loader_ref(LoaderRef::Inline(loader));
        }
        self
    }

    pub fn contains(&self, place: &Place) -> bool {
        self.entries.iter().any(|(p, _)| p == place)
    }

    pub fn contains_route(&self, route: &str) -> bool {
        self.contains(&Place::new(route))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Place> {
        self.entries.iter().map(|(place, _)| place)
    }

    fn insert(&mut self, place: Place, factory: PageFactory<N>) {
        match self.entries.iter_mut().find(|(p, _)| *p == place) {
            Some(entry) => *entry = (place, factory),
            None => self.entries.push((place, factory)),
        }
    }
}

impl<N: 'static> Default for Places<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> IntoIterator for Places<N> {
    type Item = (Place, PageFactory<N>);
    type IntoIter = std::vec::IntoIter<(Place, PageFactory<N>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Join a prefix and a child route with exactly one separator.
pub(crate) fn child_route(prefix: &str, route: &str) -> String {
    normalize(&format!("{}/{}", normalize(prefix), route))
}
