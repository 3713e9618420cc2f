use crate::context::{FlowContext, TaskResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// One unit of asynchronous work.
///
/// Receives the flow's context and resolves with it (possibly after pushing a
/// result) or rejects with a [`TaskError`](crate::TaskError).
#[async_trait]
pub trait Task: Send + Sync {
    async fn apply(&self, context: FlowContext) -> TaskResult;
}

pub type SharedTask = Arc<dyn Task>;

#[async_trait]
impl<T: Task + ?Sized> Task for Arc<T> {
    async fn apply(&self, context: FlowContext) -> TaskResult {
        (**self).apply(context).await
    }
}

#[async_trait]
impl<T: Task + ?Sized> Task for Box<T> {
    async fn apply(&self, context: FlowContext) -> TaskResult {
        (**self).apply(context).await
    }
}

/// A [`Task`] backed by an async closure. Created by [`task_fn`].
#[derive(Clone)]
pub struct TaskFn<F> {
    f: F,
}

/// Wrap an async closure as a [`Task`].
///
/// ```rust,ignore
/// let answer = task_fn(|context: FlowContext| async move {
///     context.resolve_with(42)
/// });
/// ```
pub fn task_fn<F, Fut>(f: F) -> TaskFn<F>
where
    F: Fn(FlowContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = TaskResult> + Send + 'static,
{
    TaskFn { f }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(FlowContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = TaskResult> + Send + 'static,
{
    async fn apply(&self, context: FlowContext) -> TaskResult {
        (self.f)(context).await
    }
}

/// Conversion into a [`SharedTask`] for task lists.
pub trait IntoShared {
    fn shared(self) -> SharedTask;
}

impl<T: Task + 'static> IntoShared for T {
    fn shared(self) -> SharedTask {
        Arc::new(self)
    }
}
