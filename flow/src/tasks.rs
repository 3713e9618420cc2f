//! Aggregates that are tasks themselves, so flows nest.
//!
//! An aggregate runs against the context it is applied to, unless it was
//! given its own. It never changes the status of the context; only the
//! top-level flow does.

use crate::context::{FlowContext, TaskResult};
use crate::error::TaskError;
use crate::flow::Flow;
use crate::repeat::Predicate;
use crate::task::{SharedTask, Task};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use waymark_core::config::{DEFAULT_FAIL_FAST, DEFAULT_INTERVAL_MS, DEFAULT_REPEAT_TIMEOUT_MS};

/// Runs its tasks concurrently.
#[derive(Clone)]
pub struct ParallelTasks {
    context: Option<FlowContext>,
    tasks: Vec<SharedTask>,
    fail_fast: bool,
    timeout: Option<Duration>,
}

impl ParallelTasks {
    pub fn new(tasks: impl IntoIterator<Item = SharedTask>) -> Self {
        Self {
            context: None,
            tasks: tasks.into_iter().collect(),
            fail_fast: DEFAULT_FAIL_FAST,
            timeout: None,
        }
    }

    /// Run against `context` instead of the context the task is applied to.
    pub fn with_context(mut self, context: FlowContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl Task for ParallelTasks {
    async fn apply(&self, context: FlowContext) -> TaskResult {
        let context = self.context.clone().unwrap_or(context);
        Flow::parallel(context, self.tasks.clone())
            .fail_fast(self.fail_fast)
            .timeout_opt(self.timeout)
            .run()
            .await
            .map_err(TaskError::from)
    }
}

/// Runs its tasks one after another.
#[derive(Clone)]
pub struct SequentialTasks {
    context: Option<FlowContext>,
    tasks: Vec<SharedTask>,
    fail_fast: bool,
    timeout: Option<Duration>,
}

impl SequentialTasks {
    pub fn new(tasks: impl IntoIterator<Item = SharedTask>) -> Self {
        Self {
            context: None,
            tasks: tasks.into_iter().collect(),
            fail_fast: DEFAULT_FAIL_FAST,
            timeout: None,
        }
    }

    pub fn with_context(mut self, context: FlowContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl Task for SequentialTasks {
    async fn apply(&self, context: FlowContext) -> TaskResult {
        let context = self.context.clone().unwrap_or(context);
        Flow::sequential(context, self.tasks.clone())
            .fail_fast(self.fail_fast)
            .timeout_opt(self.timeout)
            .run()
            .await
            .map_err(TaskError::from)
    }
}

/// Runs one task repeatedly while a predicate holds.
#[derive(Clone)]
pub struct RepeatTask {
    context: Option<FlowContext>,
    task: SharedTask,
    predicate: Predicate,
    fail_fast: bool,
    interval: Duration,
    timeout: Duration,
    iterations: Option<usize>,
}

impl RepeatTask {
    pub fn new<P>(task: impl Task + 'static, predicate: P) -> Self
    where
        P: Fn(&FlowContext) -> bool + Send + Sync + 'static,
    {
        Self {
            context: None,
            task: Arc::new(task),
            predicate: Arc::new(predicate),
            fail_fast: DEFAULT_FAIL_FAST,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            timeout: Duration::from_millis(DEFAULT_REPEAT_TIMEOUT_MS),
            iterations: None,
        }
    }

    pub fn with_context(mut self, context: FlowContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = Some(iterations);
        self
    }
}

#[async_trait]
impl Task for RepeatTask {
    async fn apply(&self, context: FlowContext) -> TaskResult {
        let context = self.context.clone().unwrap_or(context);
        Flow::repeat(context, self.task.clone())
            .predicate(self.predicate.clone())
            .fail_fast(self.fail_fast)
            .interval(self.interval)
            .timeout(self.timeout)
            .iterations_opt(self.iterations)
            .run()
            .await
            .map_err(TaskError::from)
    }
}
