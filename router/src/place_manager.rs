//! # PlaceManager: Route Registry and Navigation
//!
//! Maps registered [`Place`]s to page factories, resolves concrete paths to a
//! place plus extracted [`Parameter`]s and drives navigation against a [`Host`]:
//!
//! 1. resolve the path (exact route first, then the most specific
//!    parameterized route),
//! 2. consult the before-place handlers,
//! 3. run the place's loader (if any),
//! 4. create the page, mount its nodes and update the history.
//!
//! Resolution never fails with an error: `None` means "not found" and
//! navigation renders the not-found page instead.

use crate::base::Base;
use crate::error::RouterError;
use crate::host::{Host, NavigationEvent};
use crate::loader::{LoadedData, Loader, LoaderRef};
use crate::page::{
    DefaultErrorPage, DefaultNoData, DefaultNotFound, ErrorPageFactory, NoDataFactory,
    NotFoundFactory, Page, PageFactory, page_factory,
};
use crate::parameter::{Parameter, literal_segments};
use crate::path::normalize;
use crate::place::Place;
use crate::places::Places;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Instrument;
use waymark_core::RouterSettings;

/// Consulted before every navigation to a registered place.
pub trait BeforePlaceHandler: Send + Sync {
    /// Return `false` to cancel the navigation.
    fn should_go_to(&self, _place: &Place) -> bool {
        true
    }

    /// An error renders the error page.
    fn before_place(&self, place: &Place) -> anyhow::Result<()>;
}

impl<F> BeforePlaceHandler for F
where
    F: Fn(&Place) -> anyhow::Result<()> + Send + Sync,
{
    fn before_place(&self, place: &Place) -> anyhow::Result<()> {
        self(place)
    }
}

/// Notified after a successful navigation.
pub trait AfterPlaceHandler: Send + Sync {
    fn after_place(&self, place: &Place, parameter: &Parameter);
}

impl<F> AfterPlaceHandler for F
where
    F: Fn(&Place, &Parameter) + Send + Sync,
{
    fn after_place(&self, place: &Place, parameter: &Parameter) {
        self(place, parameter)
    }
}

/// A registered place matched against a concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub place: Place,
    pub parameter: Parameter,
    /// The concrete path relative to the base, normalized.
    pub path: String,
}

/// Outcome of a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The place's page is mounted and the place is current.
    Arrived(Place),
    /// No registered place matches the path. The not-found page is mounted.
    NotFound(String),
    /// The loader failed. The no-data page is mounted.
    NoData { place: Place, reason: String },
    /// A handler, loader lookup or mount failed.
    Failed { place: Place, reason: String },
    /// A before-place handler declined the navigation.
    Cancelled(Place),
}

impl Navigation {
    pub fn is_arrived(&self) -> bool {
        matches!(self, Navigation::Arrived(_))
    }
}

type TitleFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

struct Entry<N> {
    place: Place,
    factory: PageFactory<N>,
}

/// Route registry and navigator bound to a [`Host`].
///
/// ```rust,ignore
/// let mut manager = PlaceManager::new(MemoryHost::new("/app/record/7"))
///     .base("/app")
///     .title(|title| format!("{title} - Records"))
///     .register(Place::new("/").title("Home"), || Home)
///     .register(Place::new("/record/:id").loader(records), || RecordPage);
///
/// manager.start().await;
/// ```
pub struct PlaceManager<H: Host> {
    host: H,
    entries: Vec<Entry<H::Node>>,
    index: HashMap<String, usize>,
    loaders: HashMap<String, Arc<dyn Loader>>,
    before: Vec<Arc<dyn BeforePlaceHandler>>,
    after: Vec<Arc<dyn AfterPlaceHandler>>,
    base: Base,
    root: String,
    title: TitleFn,
    not_found: Option<NotFoundFactory<H::Node>>,
    no_data: Option<NoDataFactory<H::Node>>,
    error_page: Option<ErrorPageFactory<H::Node>>,
    current: Option<Resolved>,
    current_page: Option<Box<dyn Page<H::Node>>>,
}

impl<H: Host> PlaceManager<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            entries: Vec::new(),
            index: HashMap::new(),
            loaders: HashMap::new(),
            before: Vec::new(),
            after: Vec::new(),
            base: Base::default(),
            root: waymark_core::config::DEFAULT_ROOT.to_string(),
            title: Arc::new(|title: &str| title.to_string()),
            not_found: None,
            no_data: None,
            error_page: None,
            current: None,
            current_page: None,
        }
    }

    // --- Configuration ---

    /// The prefix the application is served from.
    pub fn base(mut self, prefix: &str) -> Self {
        self.base = Base::new(prefix);
        self
    }

    /// Default attachment point for pages.
    pub fn root(mut self, selector: impl Into<String>) -> Self {
        self.root = selector.into();
        self
    }

    /// Map a place title to the document title.
    pub fn title<F>(mut self, title: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.title = Arc::new(title);
        self
    }

    pub fn not_found<P, F>(mut self, page: F) -> Self
    where
        P: Page<H::Node> + 'static,
        F: Fn(&Place) -> P + Send + Sync + 'static,
    {
        self.not_found = Some(Arc::new(move |place: &Place| {
            Box::new(page(place)) as Box<dyn Page<H::Node>>
        }));
        self
    }

    pub fn no_data<P, F>(mut self, page: F) -> Self
    where
        P: Page<H::Node> + 'static,
        F: Fn() -> P + Send + Sync + 'static,
    {
        self.no_data = Some(Arc::new(move || Box::new(page()) as Box<dyn Page<H::Node>>));
        self
    }

    pub fn error_page<P, F>(mut self, page: F) -> Self
    where
        P: Page<H::Node> + 'static,
        F: Fn(&Place, &str) -> P + Send + Sync + 'static,
    {
        self.error_page = Some(Arc::new(move |place: &Place, error: &str| {
            Box::new(page(place, error)) as Box<dyn Page<H::Node>>
        }));
        self
    }

    pub fn before_place<B: BeforePlaceHandler + 'static>(mut self, handler: B) -> Self {
        self.before.push(Arc::new(handler));
        self
    }

    pub fn after_place<A: AfterPlaceHandler + 'static>(mut self, handler: A) -> Self {
        self.after.push(Arc::new(handler));
        self
    }

    /// Apply a `[router]` settings section.
    pub fn configure(mut self, settings: &RouterSettings) -> Self {
        if let Some(base) = &settings.base {
            self.base = Base::new(base);
        }
        self.root = settings.root.clone();
        if let Some(suffix) = settings.title_suffix.clone() {
            self.title = Arc::new(move |title: &str| format!("{title}{suffix}"));
        }
        self
    }

    // --- Registration ---

    /// Register `place`. A place with the same route is replaced.
    pub fn register<P, F>(self, place: Place, page: F) -> Self
    where
        P: Page<H::Node> + 'static,
        F: Fn() -> P + Send + Sync + 'static,
    {
        self.register_factory(place, page_factory(page))
    }

    pub fn register_factory(mut self, place: Place, factory: PageFactory<H::Node>) -> Self {
        self.insert(place, factory);
        self
    }

    pub fn register_places(mut self, places: Places<H::Node>) -> Self {
        for (place, factory) in places {
            self.insert(place, factory);
        }
        self
    }

    /// Like [`register`](Self::register), but rejects a route that is already
    /// registered.
    pub fn try_register<P, F>(mut self, place: Place, page: F) -> Result<Self, RouterError>
    where
        P: Page<H::Node> + 'static,
        F: Fn() -> P + Send + Sync + 'static,
    {
        if self.index.contains_key(place.route()) {
            return Err(RouterError::DuplicateRoute(place.route().to_string()));
        }
        self.insert(place, page_factory(page));
        Ok(self)
    }

    /// Make `loader` available to places created with `Place::named_loader(name)`.
    pub fn register_loader<L: Loader>(mut self, name: impl Into<String>, loader: L) -> Self {
        self.loaders.insert(name.into(), Arc::new(loader));
        self
    }

    fn insert(&mut self, place: Place, factory: PageFactory<H::Node>) {
        match self.index.get(place.route()) {
            Some(&i) => {
                tracing::warn!("Place '{}' is already registered. Replacing it.", place.route());
                self.entries[i] = Entry { place, factory };
            }
            None => {
                self.index.insert(place.route().to_string(), self.entries.len());
                self.entries.push(Entry { place, factory });
            }
        }
    }

    // --- Queries ---

    pub fn host(&self) -> &H {
        &self.host
    }

    /// The place of the last successful navigation.
    pub fn current(&self) -> Option<&Place> {
        self.current.as_ref().map(|resolved| &resolved.place)
    }

    /// The parameters of the last successful navigation.
    pub fn parameter(&self) -> Option<&Parameter> {
        self.current.as_ref().map(|resolved| &resolved.parameter)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn places(&self) -> impl Iterator<Item = &Place> {
        self.entries.iter().map(|entry| &entry.place)
    }

    /// The registered place for `path`, if any.
    pub fn place(&self, path: &str) -> Option<Place> {
        self.resolve(path).map(|resolved| resolved.place)
    }

    /// Resolve an absolute location.
    ///
    /// The base is stripped first. An exact route match wins; otherwise the
    /// parameterized route with the most literal segments that matches is used,
    /// earlier registrations winning ties.
    pub fn resolve(&self, path: &str) -> Option<Resolved> {
        tracing::debug!("Find place for '{}'", path);
        if !path.starts_with('/') {
            tracing::debug!("No place found for '{}'.", path);
            return None;
        }
        let relative = normalize(&self.base.relative(path));

        if let Some(&i) = self.index.get(&relative) {
            let place = self.entries[i].place.clone();
            tracing::debug!("Found {}", place);
            return Some(Resolved {
                place,
                parameter: Parameter::empty(),
                path: relative,
            });
        }

        tracing::debug!("No direct match for '{}'. Looking for parameterized place.", path);
        let found = self
            .entries
            .iter()
            .filter(|entry| entry.place.has_parameter())
            .filter_map(|entry| {
                Parameter::extract(entry.place.route(), &relative)
                    .map(|parameter| (&entry.place, parameter))
            })
            .min_by_key(|(place, _)| Reverse(literal_segments(place.route())));

        match found {
            Some((place, parameter)) => {
                tracing::debug!("Found {}", place);
                Some(Resolved {
                    place: place.clone(),
                    parameter,
                    path: relative,
                })
            }
            None => {
                tracing::debug!("No place found for '{}'.", path);
                None
            }
        }
    }

    /// The absolute URL of `path` under the configured base.
    pub fn href(&self, path: &str) -> String {
        self.base.absolute(&normalize(path))
    }

    // --- Navigation ---

    /// Render the place for the host's current location and replace the
    /// current history entry.
    pub async fn start(&mut self) -> Navigation {
        let location = self.host.location();
        let navigation = self.navigate(&location).await;
        match &navigation {
            Navigation::Arrived(_) => self.update_history(false),
            other => tracing::error!("Unable to start place manager with '{}': {:?}", location, other),
        }
        navigation
    }

    /// Navigate to `path` and push a history entry on success.
    pub async fn go_to(&mut self, path: &str) -> Navigation {
        let navigation = self.navigate(path).await;
        match &navigation {
            Navigation::Arrived(_) => self.update_history(true),
            other => tracing::error!("Unable to go to '{}': {:?}", path, other),
        }
        navigation
    }

    /// Handle a history move. Entries without state are ignored.
    pub async fn pop_state(&mut self, state: Option<String>) -> Option<Navigation> {
        match state {
            Some(route) => Some(self.navigate(&route).await),
            None => None,
        }
    }

    /// Serve navigation events until the channel closes.
    pub async fn run(&mut self, mut events: mpsc::Receiver<NavigationEvent>) {
        tracing::info!("Place manager listening for navigation events");
        while let Some(event) = events.recv().await {
            match event {
                NavigationEvent::Link(url) => {
                    self.go_to(&url).await;
                }
                NavigationEvent::PopState(state) => {
                    self.pop_state(state).await;
                }
            }
        }
        tracing::info!("Navigation events closed");
    }

    async fn navigate(&mut self, path: &str) -> Navigation {
        let span = tracing::info_span!("Navigate", waymark.path = %path);
        self.navigate_inner(path).instrument(span).await
    }

    async fn navigate_inner(&mut self, path: &str) -> Navigation {
        let Some(resolved) = self.resolve(path) else {
            return self.missing(Place::new(path), path);
        };
        let place = resolved.place.clone();
        tracing::debug!("Goto {}", place);

        let handlers = self.before.clone();
        for handler in handlers {
            if !handler.should_go_to(&place) {
                tracing::debug!("Navigation canceled by before handler for {}", place);
                return Navigation::Cancelled(place);
            }
            if let Err(e) = handler.before_place(&place) {
                let reason = format!("Error in place before handler: {e}");
                return self.fail(&resolved, reason);
            }
        }

        let Some(factory) = self
            .index
            .get(place.route())
            .map(|&i| self.entries[i].factory.clone())
        else {
            return self.missing(place, path);
        };

        let loader = match place.loader_ref() {
            None => None,
            Some(LoaderRef::Inline(loader)) => Some(loader.clone()),
            Some(LoaderRef::Named(name)) => match self.loaders.get(name) {
                Some(loader) => Some(loader.clone()),
                None => {
                    let reason = RouterError::UnknownLoader(name.clone()).to_string();
                    tracing::error!("{} for {}", reason, place);
                    return self.fail(&resolved, reason);
                }
            },
        };

        let data = match loader {
            None => LoadedData::none(),
            Some(loader) => {
                tracing::debug!("Load data for {}", place);
                match loader.load(&place, &resolved.parameter).await {
                    Ok(data) => {
                        tracing::debug!("Data loaded successfully. Create page for {}", place);
                        data
                    }
                    Err(e) => {
                        let reason = format!("{e:#}");
                        tracing::error!("Unable to load page for {}: {}", place, reason);
                        let page = self.no_data_page(&place);
                        let data = LoadedData::new(reason.clone());
                        if let Err(e) = self.mount(&place, &resolved.parameter, &data, page) {
                            return Navigation::Failed {
                                place,
                                reason: e.to_string(),
                            };
                        }
                        return Navigation::NoData { place, reason };
                    }
                }
            }
        };

        tracing::debug!("Create page for {}", place);
        let page = factory();
        if let Err(e) = self.mount(&place, &resolved.parameter, &data, page) {
            return Navigation::Failed {
                place,
                reason: e.to_string(),
            };
        }

        tracing::info!("Navigation to {}", place);
        for handler in &self.after {
            handler.after_place(&place, &resolved.parameter);
        }
        self.current = Some(resolved);
        Navigation::Arrived(place)
    }

    fn missing(&mut self, place: Place, path: &str) -> Navigation {
        let page = self.not_found_page(&place);
        if let Err(e) = self.mount(&place, &Parameter::empty(), &LoadedData::none(), page) {
            return Navigation::Failed {
                place,
                reason: e.to_string(),
            };
        }
        Navigation::NotFound(path.to_string())
    }

    fn fail(&mut self, resolved: &Resolved, reason: String) -> Navigation {
        let place = resolved.place.clone();
        let page = self.error_page_for(&place, &reason);
        if let Err(e) = self.mount(&place, &resolved.parameter, &LoadedData::none(), page) {
            return Navigation::Failed {
                place,
                reason: e.to_string(),
            };
        }
        Navigation::Failed { place, reason }
    }

    /// Replace the mounted page. The previous page is detached, the new one attached.
    fn mount(
        &mut self,
        place: &Place,
        parameter: &Parameter,
        data: &LoadedData,
        mut page: Box<dyn Page<H::Node>>,
    ) -> Result<(), RouterError> {
        let root = place.root_selector().unwrap_or(&self.root).to_string();
        let nodes = page.elements(place, parameter, data);
        if let Err(e) = self.host.mount(&root, nodes) {
            tracing::error!("Unable to find root element for {}", place);
            return Err(e);
        }
        if let Some(title) = place.title_text() {
            self.host.set_title(&(self.title)(title));
        }
        if let Some(mut previous) = self.current_page.take() {
            previous.detach();
        }
        page.attach();
        self.current_page = Some(page);
        Ok(())
    }

    fn update_history(&self, push: bool) {
        if let Some(resolved) = &self.current {
            let url = self.base.absolute(&resolved.path);
            if push {
                self.host.push_state(&url);
            } else {
                self.host.replace_state(&url);
            }
        }
    }

    fn not_found_page(&self, place: &Place) -> Box<dyn Page<H::Node>> {
        tracing::debug!("No page found for {}", place);
        match &self.not_found {
            Some(factory) => factory(place),
            None => Box::new(DefaultNotFound::new(place)),
        }
    }

    fn no_data_page(&self, place: &Place) -> Box<dyn Page<H::Node>> {
        tracing::debug!("No data for {}", place);
        match &self.no_data {
            Some(factory) => factory(),
            None => Box::new(DefaultNoData),
        }
    }

    fn error_page_for(&self, place: &Place, error: &str) -> Box<dyn Page<H::Node>> {
        tracing::debug!("Error while going to {}", place);
        match &self.error_page {
            Some(factory) => factory(place, error),
            None => Box::new(DefaultErrorPage::new(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use crate::loader::loader_fn;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TestPage;

    impl Page<String> for TestPage {
        fn elements(&self, place: &Place, parameter: &Parameter, _: &LoadedData) -> Vec<String> {
            let mut nodes = vec![place.route().to_string()];
            nodes.extend(parameter.iter().map(|(k, v)| format!("{k}={v}")));
            nodes
        }
    }

    fn manager(location: &str) -> PlaceManager<MemoryHost> {
        PlaceManager::new(MemoryHost::new(location))
    }

    #[test]
    fn test_places() {
        let manager = manager("/").register(Place::new("/foo"), || TestPage);

        assert_eq!(manager.place(""), None);
        assert_eq!(manager.place("foo"), None);
        assert_eq!(manager.place("/bar"), None);
        assert_eq!(manager.place("/foo").map(|p| p.route().to_string()), Some("/foo".into()));
        assert_eq!(manager.place("/foo/").map(|p| p.route().to_string()), Some("/foo".into()));
    }

    #[test]
    fn test_base() {
        let manager = manager("/").base("/base").register(Place::new("/foo"), || TestPage);

        assert_eq!(manager.place("/foo").map(|p| p.route().to_string()), Some("/foo".into()));
        assert_eq!(manager.place("/base/foo").map(|p| p.route().to_string()), Some("/foo".into()));
        assert_eq!(manager.resolve("//base//foo/").map(|r| r.path), Some("/foo".into()));
        assert_eq!(manager.href("/foo"), "/base/foo");
        assert_eq!(manager.href("foo/"), "/base/foo");
        assert_eq!(manager.href("/"), "/base");
    }

    #[test]
    fn test_href_without_base() {
        let manager = manager("/");
        assert_eq!(manager.href("/foo"), "/foo");
        assert_eq!(manager.href("//foo//"), "/foo");
    }

    #[test]
    fn test_exact_match_before_parameter() {
        let manager = manager("/")
            .register(Place::new("/record/:id"), || TestPage)
            .register(Place::new("/record/new"), || TestPage);

        let resolved = manager.resolve("/record/new").unwrap();
        assert_eq!(resolved.place.route(), "/record/new");
        assert!(resolved.parameter.is_empty());

        let resolved = manager.resolve("/record/42").unwrap();
        assert_eq!(resolved.place.route(), "/record/:id");
        assert_eq!(resolved.parameter.get("id"), Some("42"));
    }

    #[test]
    fn test_most_specific_parameterized_place() {
        let manager = manager("/")
            .register(Place::new("/:kind/:id"), || TestPage)
            .register(Place::new("/records/:id"), || TestPage)
            .register(Place::new("/:kind/:from"), || TestPage);

        assert_eq!(manager.place("/records/1").unwrap().route(), "/records/:id");
        assert_eq!(manager.place("/decades/1").unwrap().route(), "/:kind/:id");
        assert_eq!(manager.place("/records/1/2"), None);
    }

    #[test]
    fn test_duplicate_registration() {
        let manager = manager("/")
            .register(Place::new("/foo").title("first"), || TestPage)
            .register(Place::new("/foo/").title("second"), || TestPage);
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.place("/foo").unwrap().title_text(), Some("second"));

        let result = manager.try_register(Place::new("foo"), || TestPage);
        assert!(matches!(result, Err(RouterError::DuplicateRoute(route)) if route == "/foo"));
    }

    #[test]
    fn test_configure() {
        let settings = RouterSettings {
            base: Some("/app/".into()),
            root: "#main".into(),
            title_suffix: Some(" - Demo".into()),
        };
        let manager = manager("/").configure(&settings);
        assert_eq!(manager.href("/a"), "/app/a");
        assert_eq!(manager.root, "#main");
        assert_eq!((manager.title)("Home"), "Home - Demo");
    }

    #[tokio::test]
    async fn test_start_renders_and_replaces_history() {
        let mut manager = manager("/app/record/7")
            .base("/app")
            .title(|title: &str| format!("{title} | Records"))
            .register(Place::new("/record/:id").title("Record"), || TestPage);

        let navigation = manager.start().await;

        assert_eq!(navigation, Navigation::Arrived(Place::new("/record/:id")));
        assert_eq!(manager.current().map(Place::route), Some("/record/:id"));
        assert_eq!(manager.parameter().and_then(|p| p.get("id")), Some("7"));
        let host = manager.host();
        assert_eq!(host.mounted("body"), vec!["/record/:id", "id=7"]);
        assert_eq!(host.title().as_deref(), Some("Record | Records"));
        assert_eq!(host.history(), vec!["/app/record/7"]);
    }

    #[tokio::test]
    async fn test_go_to_unknown_place_renders_not_found() {
        let mut manager = manager("/").register(Place::new("/"), || TestPage);
        manager.start().await;

        let navigation = manager.go_to("/nowhere").await;

        assert_eq!(navigation, Navigation::NotFound("/nowhere".into()));
        assert_eq!(manager.current().map(Place::route), Some("/"));
        let mounted = manager.host().mounted("body");
        assert_eq!(mounted[0], "Error 404");
        assert_eq!(manager.host().history(), vec!["/"]);
    }

    #[tokio::test]
    async fn test_loader_failure_renders_no_data() {
        let mut manager = manager("/").register(
            Place::new("/record/:id").loader(loader_fn(|_, _| async {
                Err(anyhow::anyhow!("connection refused"))
            })),
            || TestPage,
        );

        let navigation = manager.go_to("/record/1").await;

        assert!(matches!(
            &navigation,
            Navigation::NoData { reason, .. } if reason == "connection refused"
        ));
        assert_eq!(manager.current(), None);
        let mounted = manager.host().mounted("body");
        assert_eq!(mounted[0], "No data");
        assert_eq!(mounted[2], "connection refused");
    }

    #[tokio::test]
    async fn test_named_loader() {
        struct RecordPage;

        impl Page<String> for RecordPage {
            fn elements(&self, _: &Place, _: &Parameter, data: &LoadedData) -> Vec<String> {
                vec![data.get::<String>().cloned().unwrap_or_default()]
            }
        }

        let mut manager = manager("/")
            .register_loader(
                "record",
                loader_fn(|_, parameter: Parameter| async move {
                    Ok(LoadedData::new(format!("record {}", parameter.get_or("id", "?"))))
                }),
            )
            .register(Place::new("/record/:id").named_loader("record"), || RecordPage)
            .register(Place::new("/missing").named_loader("missing"), || RecordPage);

        assert!(manager.go_to("/record/3").await.is_arrived());
        assert_eq!(manager.host().mounted("body"), vec!["record 3"]);

        let navigation = manager.go_to("/missing").await;
        assert!(matches!(navigation, Navigation::Failed { .. }));
        assert_eq!(manager.host().mounted("body")[0], "Error");
    }

    #[tokio::test]
    async fn test_before_and_after_handlers() {
        struct Guard;

        impl BeforePlaceHandler for Guard {
            fn should_go_to(&self, place: &Place) -> bool {
                place.route() != "/admin"
            }

            fn before_place(&self, _place: &Place) -> anyhow::Result<()> {
                Ok(())
            }
        }

        let visits = Arc::new(AtomicUsize::new(0));
        let counter = visits.clone();
        let mut manager = manager("/")
            .before_place(Guard)
            .before_place(|place: &Place| {
                if place.route() == "/broken" {
                    anyhow::bail!("boom");
                }
                Ok(())
            })
            .after_place(move |_: &Place, _: &Parameter| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .register(Place::new("/"), || TestPage)
            .register(Place::new("/admin"), || TestPage)
            .register(Place::new("/broken"), || TestPage);

        assert!(manager.go_to("/").await.is_arrived());
        assert_eq!(manager.go_to("/admin").await, Navigation::Cancelled(Place::new("/admin")));
        assert!(matches!(
            manager.go_to("/broken").await,
            Navigation::Failed { reason, .. } if reason == "Error in place before handler: boom"
        ));
        assert_eq!(visits.load(Ordering::SeqCst), 1);
        assert_eq!(manager.current().map(Place::route), Some("/"));
    }

    #[tokio::test]
    async fn test_page_lifecycle() {
        struct Tracked {
            attached: Arc<AtomicUsize>,
            detached: Arc<AtomicUsize>,
        }

        impl Page<String> for Tracked {
            fn elements(&self, _: &Place, _: &Parameter, _: &LoadedData) -> Vec<String> {
                Vec::new()
            }

            fn attach(&mut self) {
                self.attached.fetch_add(1, Ordering::SeqCst);
            }

            fn detach(&mut self) {
                self.detached.fetch_add(1, Ordering::SeqCst);
            }
        }

        let attached = Arc::new(AtomicUsize::new(0));
        let detached = Arc::new(AtomicUsize::new(0));
        let (a, d) = (attached.clone(), detached.clone());
        let mut manager = manager("/").register(Place::new("/:name"), move || Tracked {
            attached: a.clone(),
            detached: d.clone(),
        });

        manager.go_to("/one").await;
        manager.go_to("/two").await;
        manager.go_to("/three").await;

        assert_eq!(attached.load(Ordering::SeqCst), 3);
        assert_eq!(detached.load(Ordering::SeqCst), 2);
        assert_eq!(manager.host().history(), vec!["/", "/one", "/two", "/three"]);
    }

    #[tokio::test]
    async fn test_missing_root() {
        let mut manager = manager("/").register(Place::new("/").root("#main"), || TestPage);

        let navigation = manager.start().await;

        assert!(matches!(
            navigation,
            Navigation::Failed { reason, .. } if reason == "Unable to find root element '#main'"
        ));
        assert_eq!(manager.current(), None);
    }

    #[tokio::test]
    async fn test_not_found_without_root_fails() {
        let mut manager = manager("/").root("#main").register(Place::new("/"), || TestPage);

        let navigation = manager.go_to("/nowhere").await;

        assert!(matches!(
            navigation,
            Navigation::Failed { ref place, ref reason }
                if place.route() == "/nowhere" && reason == "Unable to find root element '#main'"
        ));
        assert_eq!(manager.current(), None);
        assert!(manager.host().history().is_empty());
    }

    #[tokio::test]
    async fn test_pop_state() {
        let mut manager = manager("/")
            .register(Place::new("/"), || TestPage)
            .register(Place::new("/foo"), || TestPage);

        assert_eq!(manager.pop_state(None).await, None);
        assert_eq!(
            manager.pop_state(Some("/foo".into())).await,
            Some(Navigation::Arrived(Place::new("/foo")))
        );
        assert_eq!(manager.host().history(), vec!["/"]);
    }

    #[tokio::test]
    async fn test_custom_fallback_pages() {
        struct Text(String);

        impl Page<String> for Text {
            fn elements(&self, _: &Place, _: &Parameter, _: &LoadedData) -> Vec<String> {
                vec![self.0.clone()]
            }
        }

        let mut manager = manager("/")
            .not_found(|place: &Place| Text(format!("missing {}", place.route())))
            .error_page(|_: &Place, error: &str| Text(format!("failed: {error}")))
            .before_place(|place: &Place| {
                if place.route() == "/broken" {
                    anyhow::bail!("nope");
                }
                Ok(())
            })
            .register(Place::new("/broken"), || TestPage);

        manager.go_to("/gone/").await;
        assert_eq!(manager.host().mounted("body"), vec!["missing /gone"]);

        manager.go_to("/broken").await;
        assert_eq!(
            manager.host().mounted("body"),
            vec!["failed: Error in place before handler: nope"]
        );
    }
}
