//! Parallel and sequential execution of a task list.

use crate::context::FlowContext;
use crate::error::{FlowError, TaskError};
use crate::flow::{Mode, drive, guarded};
use crate::task::{IntoShared, SharedTask, Task};
use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use std::time::Duration;
use waymark_core::FlowSettings;
use waymark_core::config::DEFAULT_FAIL_FAST;

/// Builder for a parallel or sequential flow. Created by
/// [`Flow::parallel`](crate::Flow::parallel) and
/// [`Flow::sequential`](crate::Flow::sequential).
#[must_use = "a sequence does nothing until it is executed or subscribed"]
pub struct Sequence {
    mode: Mode,
    context: FlowContext,
    tasks: Vec<SharedTask>,
    fail_fast: bool,
    timeout: Option<Duration>,
}

impl Sequence {
    pub(crate) fn new(mode: Mode, context: FlowContext, tasks: Vec<SharedTask>) -> Self {
        Self {
            mode,
            context,
            tasks,
            fail_fast: DEFAULT_FAIL_FAST,
            timeout: None,
        }
    }

    /// Append a task.
    pub fn then(mut self, task: impl Task + 'static) -> Self {
        self.tasks.push(task.shared());
        self
    }

    /// With fail-fast (the default) the first failing task fails the flow and
    /// abandons the others. Without it every task runs and the flow fails if
    /// any task failed.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Deadline for the whole flow.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn timeout_opt(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Apply a `[flow]` settings section.
    pub fn configure(mut self, settings: &FlowSettings) -> Self {
        self.fail_fast = settings.fail_fast;
        self.timeout = settings.timeout();
        self
    }

    pub fn context(&self) -> &FlowContext {
        &self.context
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run the flow and drive the context's status.
    pub async fn execute(self) -> Result<FlowContext, FlowError> {
        let context = self.context.clone();
        let mode = self.mode;
        drive(context, mode, self.run()).await
    }

    /// Run the flow and hand the final context to `callback`, whatever the
    /// terminal status.
    pub async fn subscribe<F, R>(self, callback: F) -> R
    where
        F: FnOnce(FlowContext) -> R,
    {
        let context = self.context.clone();
        let _ = self.execute().await;
        callback(context)
    }

    /// Run without touching the status. Used when nested inside another flow.
    pub(crate) async fn run(self) -> Result<FlowContext, FlowError> {
        let Sequence {
            mode,
            context,
            tasks,
            fail_fast,
            timeout,
        } = self;

        if tasks.is_empty() {
            return Ok(context);
        }
        let progress = context.progress();
        progress.reset(if tasks.len() > 1 { Some(tasks.len()) } else { None }, None);

        let scope = context.scoped();
        let work = async {
            match mode {
                Mode::Sequential => sequential(&scope, &tasks, fail_fast).await,
                _ => parallel(&scope, &tasks, fail_fast).await,
            }
        };
        guarded(&context, &scope, timeout, work).await?;

        context.progress().finish();
        Ok(context)
    }
}

async fn parallel(
    scope: &FlowContext,
    tasks: &[SharedTask],
    fail_fast: bool,
) -> Result<FlowContext, FlowError> {
    let mut running: FuturesUnordered<_> = tasks
        .iter()
        .map(|task| task.apply(scope.clone()))
        .collect();

    let mut failures = Vec::new();
    while let Some(result) = running.next().await {
        match result {
            Ok(_) => scope.progress().tick(None),
            Err(e) if fail_fast => {
                tracing::debug!("Task failed, abandoning {} running tasks: {}", running.len(), e);
                return Err(FlowError::Task(e));
            }
            Err(e) => {
                tracing::warn!("Task failed: {}", e);
                failures.push(e);
            }
        }
    }
    settle(scope, failures, tasks.len())
}

async fn sequential(
    scope: &FlowContext,
    tasks: &[SharedTask],
    fail_fast: bool,
) -> Result<FlowContext, FlowError> {
    let mut failures = Vec::new();
    for (index, task) in tasks.iter().enumerate() {
        match task.apply(scope.clone()).await {
            Ok(_) => {}
            Err(e) if fail_fast => return Err(FlowError::Task(e)),
            Err(e) => {
                tracing::warn!("Task {} failed: {}", index, e);
                failures.push(e);
            }
        }
        if index + 1 < tasks.len() {
            scope.progress().tick(None);
        }
    }
    settle(scope, failures, tasks.len())
}

fn settle(
    scope: &FlowContext,
    failures: Vec<TaskError>,
    total: usize,
) -> Result<FlowContext, FlowError> {
    if failures.is_empty() {
        Ok(scope.clone())
    } else {
        Err(FlowError::Failed { failures, total })
    }
}
