//! Loaders fetch data for a place before its page is created.

use crate::parameter::Parameter;
use crate::place::Place;
use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Data produced by a [`Loader`], handed to the page.
///
/// Holds any `Send + Sync` value; pages read it back with [`LoadedData::get`].
#[derive(Clone, Default)]
pub struct LoadedData {
    data: Option<Arc<dyn Any + Send + Sync>>,
}

impl LoadedData {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            data: Some(Arc::new(value)),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }

    /// Returns `None` if there is no data or it is not a `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.data.as_ref().and_then(|data| data.downcast_ref::<T>())
    }

    pub fn get_or<'a, T: Any>(&'a self, default: &'a T) -> &'a T {
        self.get::<T>().unwrap_or(default)
    }
}

impl fmt::Debug for LoadedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedData")
            .field("empty", &self.is_empty())
            .finish()
    }
}

/// Asynchronous data-fetch hook run before a page renders.
#[async_trait]
pub trait Loader: Send + Sync + 'static {
    async fn load(&self, place: &Place, parameter: &Parameter) -> anyhow::Result<LoadedData>;
}

/// A [`Loader`] backed by an async closure. Created by [`loader_fn`].
#[derive(Clone)]
pub struct LoaderFn<F> {
    f: F,
}

/// Wrap an async closure as a [`Loader`].
///
/// ```rust,ignore
/// let records = loader_fn(|_place, parameter| async move {
///     let id: u32 = parameter.get_or("id", "0").parse()?;
///     Ok(LoadedData::new(fetch_record(id).await?))
/// });
/// ```
pub fn loader_fn<F, Fut>(f: F) -> LoaderFn<F>
where
    F: Fn(Place, Parameter) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<LoadedData>> + Send + 'static,
{
    LoaderFn { f }
}

#[async_trait]
impl<F, Fut> Loader for LoaderFn<F>
where
    F: Fn(Place, Parameter) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<LoadedData>> + Send + 'static,
{
    async fn load(&self, place: &Place, parameter: &Parameter) -> anyhow::Result<LoadedData> {
        (self.f)(place.clone(), parameter.clone()).await
    }
}

/// How a place refers to its loader.
#[derive(Clone)]
pub enum LoaderRef {
    /// Looked up by name in the place manager's loader table.
    Named(String),
    Inline(Arc<dyn Loader>),
}

impl fmt::Debug for LoaderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderRef::Named(name) => f.debug_tuple("Named").field(name).finish(),
            LoaderRef::Inline(_) => f.write_str("Inline"),
        }
    }
}
