//! Repeated execution of one task while a predicate holds.

use crate::context::FlowContext;
use crate::error::FlowError;
use crate::flow::{Mode, drive, guarded};
use crate::task::SharedTask;
use std::sync::Arc;
use std::time::Duration;
use waymark_core::FlowSettings;
use waymark_core::config::{DEFAULT_FAIL_FAST, DEFAULT_INTERVAL_MS, DEFAULT_REPEAT_TIMEOUT_MS};

pub(crate) type Predicate = Arc<dyn Fn(&FlowContext) -> bool + Send + Sync>;

/// Builder for a repeated flow. Created by [`Flow::repeat`](crate::Flow::repeat).
///
/// The task runs, then the flow waits `interval` and runs it again, until the
/// predicate turns false, the iteration limit is reached or `timeout` elapses.
/// A predicate that is false from the start finishes the flow without running
/// the task.
#[must_use = "a repeat does nothing until it is executed or subscribed"]
pub struct Repeat {
    context: FlowContext,
    task: SharedTask,
    predicate: Predicate,
    fail_fast: bool,
    interval: Duration,
    timeout: Duration,
    iterations: Option<usize>,
}

impl Repeat {
    pub(crate) fn new(context: FlowContext, task: SharedTask) -> Self {
        Self {
            context,
            task,
            predicate: Arc::new(|_: &FlowContext| true),
            fail_fast: DEFAULT_FAIL_FAST,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            timeout: Duration::from_millis(DEFAULT_REPEAT_TIMEOUT_MS),
            iterations: None,
        }
    }

    /// Keep repeating while `predicate` holds.
    pub fn while_<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&FlowContext) -> bool + Send + Sync + 'static,
    {
        self.predicate = Arc::new(predicate);
        self
    }

    pub(crate) fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = predicate;
        self
    }

    /// With fail-fast (the default) a failing run fails the flow. Without it
    /// the failure is logged and the task runs again on the next interval.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Pause between two runs.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Deadline for the whole flow.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Finish after `iterations` successful runs even if the predicate still holds.
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = Some(iterations).filter(|&n| n > 0);
        self
    }

    pub(crate) fn iterations_opt(mut self, iterations: Option<usize>) -> Self {
        self.iterations = iterations.filter(|&n| n > 0);
        self
    }

    /// Apply a `[flow]` settings section.
    pub fn configure(mut self, settings: &FlowSettings) -> Self {
        self.fail_fast = settings.fail_fast;
        self.interval = settings.interval();
        self.timeout = settings.repeat_timeout();
        self.iterations = settings.iterations.filter(|&n| n > 0);
        self
    }

    pub fn context(&self) -> &FlowContext {
        &self.context
    }

    /// Run the flow and drive the context's status.
    pub async fn execute(self) -> Result<FlowContext, FlowError> {
        let context = self.context.clone();
        drive(context, Mode::Repeat, self.run()).await
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
        let Repeat {
            context,
            task,
            predicate,
            fail_fast,
            interval,
            timeout,
            iterations,
        } = self;

        context.progress().reset(None, None);
        if !predicate(&context) {
            context.progress().finish();
            return Ok(context);
        }

        let scope = context.scoped();
        let work = async {
            let mut index = 0;
            loop {
                match task.apply(scope.clone()).await {
                    Ok(_) => {
                        index += 1;
                        scope.progress().tick(None);
                        let exhausted = iterations.is_some_and(|max| index >= max);
                        if exhausted || !predicate(&scope) {
                            tracing::debug!("Repeat finished after {} runs", index);
                            return Ok(scope.clone());
                        }
                    }
                    Err(e) if fail_fast => return Err(FlowError::Task(e)),
                    Err(e) => tracing::warn!("Run {} failed, retrying: {}", index + 1, e),
                }
                if interval.is_zero() {
                    tokio::task::yield_now().await;
                } else {
                    tokio::time::sleep(interval).await;
                }
            }
        };
        guarded(&context, &scope, Some(timeout), work).await?;

        context.progress().finish();
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Flow;
    use crate::error::TaskError;
    use crate::task::task_fn;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    fn counter_task(runs: Arc<AtomicUsize>) -> impl crate::Task + 'static {
        task_fn(move |context: FlowContext| {
            let runs = runs.clone();
            async move {
                let n = runs.fetch_add(1, Ordering::SeqCst) + 1;
                context.resolve_key("runs", n)
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_until_predicate_false() {
        let runs = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();
        let context = Flow::repeat(FlowContext::new(), counter_task(runs.clone()))
            .while_(|context: &FlowContext| context.get_or("runs", 0usize) < 3)
            .interval(Duration::from_millis(100))
            .execute()
            .await
            .unwrap();

        assert!(context.is_successful());
        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() < Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_false_predicate_finishes_immediately() {
        let runs = Arc::new(AtomicUsize::new(0));
        let context = Flow::repeat(FlowContext::new(), counter_task(runs.clone()))
            .while_(|_: &FlowContext| false)
            .execute()
            .await
            .unwrap();

        assert!(context.is_successful());
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_iterations_limit() {
        let runs = Arc::new(AtomicUsize::new(0));
        let result = Flow::repeat(FlowContext::new(), counter_task(runs.clone()))
            .interval(Duration::ZERO)
            .iterations(5)
            .execute()
            .await;

        assert!(result.is_ok());
        assert_eq!(runs.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_fast_aborts() {
        let context = FlowContext::new();
        let result = Flow::repeat(
            context.clone(),
            task_fn(|context: FlowContext| async move { context.reject("unavailable") }),
        )
        .execute()
        .await;

        assert_eq!(result.unwrap_err(), FlowError::Task(TaskError::rejected("unavailable")));
        assert!(context.is_failure());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_retried_without_fail_fast() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let task = task_fn(move |context: FlowContext| {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    return context.reject("not yet");
                }
                context.resolve_key("ready", true)
            }
        });

        let context = Flow::repeat(FlowContext::new(), task)
            .while_(|context: &FlowContext| !context.get_or("ready", false))
            .fail_fast(false)
            .interval(Duration::from_millis(10))
            .execute()
            .await
            .unwrap();

        assert!(context.is_successful());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_configure() {
        let settings = FlowSettings {
            fail_fast: false,
            interval_ms: 50,
            repeat_timeout_ms: 500,
            iterations: Some(0),
            ..FlowSettings::default()
        };
        let repeat = Flow::repeat(FlowContext::new(), counter_task(Arc::default())).configure(&settings);
        assert!(!repeat.fail_fast);
        assert_eq!(repeat.interval, Duration::from_millis(50));
        assert_eq!(repeat.timeout, Duration::from_millis(500));
        assert_eq!(repeat.iterations, None);
    }
}
