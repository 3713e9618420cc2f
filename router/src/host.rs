//! # Host: Browser APIs as an External Collaborator
//!
//! The place manager never touches the DOM or the history API directly. It
//! talks to a [`Host`], which reports the current location, records history
//! entries, sets the document title and mounts page nodes under a root.
//!
//! [`MemoryHost`] keeps all of that in memory; it backs the tests and demos.

use crate::error::RouterError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

pub trait Host: Send + Sync {
    /// Node type produced by pages. `From<String>` builds text nodes for the
    /// built-in fallback pages.
    type Node: From<String> + Send + 'static;

    /// The current location path, e.g. `/app/records/1`.
    fn location(&self) -> String;

    fn push_state(&self, url: &str);

    fn replace_state(&self, url: &str);

    fn set_title(&self, title: &str);

    /// Replace the children of `root` with `nodes`.
    ///
    /// Returns [`RouterError::RootNotFound`] if `root` does not resolve.
    fn mount(&self, root: &str, nodes: Vec<Self::Node>) -> Result<(), RouterError>;
}

/// Navigation input delivered by the host's event bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    /// A same-origin link without a hash was activated.
    Link(String),
    /// The user moved through history. Carries the state stored with the entry.
    PopState(Option<String>),
}

#[derive(Debug, Default)]
struct MemoryState {
    location: String,
    history: Vec<String>,
    title: Option<String>,
    roots: HashMap<String, Vec<String>>,
}

/// An in-memory [`Host`] with `String` nodes.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryHost {
    /// A host at `location` with a single `body` root.
    pub fn new(location: impl Into<String>) -> Self {
        let location = location.into();
        let mut roots = HashMap::new();
        roots.insert("body".to_string(), Vec::new());
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                history: vec![location.clone()],
                location,
                title: None,
                roots,
            })),
        }
    }

    pub fn with_root(self, selector: impl Into<String>) -> Self {
        self.state.lock().roots.insert(selector.into(), Vec::new());
        self
    }

    pub fn set_location(&self, location: impl Into<String>) {
        self.state.lock().location = location.into();
    }

    pub fn history(&self) -> Vec<String> {
        self.state.lock().history.clone()
    }

    pub fn title(&self) -> Option<String> {
        self.state.lock().title.clone()
    }

    /// Nodes currently mounted under `root`.
    pub fn mounted(&self, root: &str) -> Vec<String> {
        self.state.lock().roots.get(root).cloned().unwrap_or_default()
    }
}

impl Host for MemoryHost {
    type Node = String;

    fn location(&self) -> String {
        self.state.lock().location.clone()
    }

    fn push_state(&self, url: &str) {
        let mut state = self.state.lock();
        state.location = url.to_string();
        state.history.push(url.to_string());
    }

    fn replace_state(&self, url: &str) {
        let mut state = self.state.lock();
        state.location = url.to_string();
        match state.history.last_mut() {
            Some(last) => *last = url.to_string(),
            None => state.history.push(url.to_string()),
        }
    }

    fn set_title(&self, title: &str) {
        self.state.lock().title = Some(title.to_string());
    }

    fn mount(&self, root: &str, nodes: Vec<String>) -> Result<(), RouterError> {
        let mut state = self.state.lock();
        let children = state
            .roots
            .get_mut(root)
            .ok_or_else(|| RouterError::RootNotFound(root.to_string()))?;
        *children = nodes;
        Ok(())
    }
}
