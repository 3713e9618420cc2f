//! Flow entry points and the execution driver shared by all runners.

use crate::context::FlowContext;
use crate::error::FlowError;
use crate::repeat::Repeat;
use crate::sequence::Sequence;
use crate::status::FlowStatus;
use crate::task::{IntoShared, SharedTask, Task};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Parallel,
    Sequential,
    Repeat,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Parallel => "parallel",
            Mode::Sequential => "sequential",
            Mode::Repeat => "repeat",
        })
    }
}

/// Entry points for running tasks against a context.
///
/// ```rust,ignore
/// Flow::parallel(FlowContext::new(), vec![fetch_time.shared(), delay.shared()])
///     .timeout(Duration::from_secs(1))
///     .subscribe(|context| println!("time: {}", context.pop_or("n/a".to_string())))
///     .await;
/// ```
pub struct Flow;

impl Flow {
    /// Run `tasks` concurrently.
    pub fn parallel(context: FlowContext, tasks: impl IntoIterator<Item = SharedTask>) -> Sequence {
        Sequence::new(Mode::Parallel, context, tasks.into_iter().collect())
    }

    /// Run `tasks` one after another, in order.
    pub fn sequential(context: FlowContext, tasks: impl IntoIterator<Item = SharedTask>) -> Sequence {
        Sequence::new(Mode::Sequential, context, tasks.into_iter().collect())
    }

    /// Run `task` repeatedly while a predicate holds.
    pub fn repeat(context: FlowContext, task: impl Task + 'static) -> Repeat {
        Repeat::new(context, task.shared())
    }
}

/// Drive the status of a top-level execution around `run`. A context runs
/// one top-level flow; a context that already started is left untouched.
pub(crate) async fn drive<F>(context: FlowContext, mode: Mode, run: F) -> Result<FlowContext, FlowError>
where
    F: Future<Output = Result<FlowContext, FlowError>>,
{
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "Flow",
        waymark.flow.mode = %mode,
        waymark.flow.run_id = %run_id
    );

    async move {
        if let Err(status) = context.begin() {
            tracing::error!("Flow not started, context is already {}", status);
            return Err(FlowError::AlreadyStarted(status));
        }
        let result = run.await;
        match &result {
            Ok(_) => {
                context.complete(FlowStatus::Success, None);
                tracing::info!("Flow finished successfully");
            }
            Err(e) if e.is_timeout() => {
                context.complete(FlowStatus::Timeout, None);
                tracing::warn!("Flow timed out: {}", e);
            }
            Err(e) => {
                context.complete(FlowStatus::Failure, Some(e.reason()));
                tracing::error!("Flow failed: {}", e);
            }
        }
        result
    }
    .instrument(span)
    .await
}

/// Run `work` under `scope`, bounded by `timeout` and by cancellation of the
/// enclosing context. The scope is cancelled whenever `work` is abandoned.
pub(crate) async fn guarded<F>(
    context: &FlowContext,
    scope: &FlowContext,
    timeout: Option<Duration>,
    work: F,
) -> Result<FlowContext, FlowError>
where
    F: Future<Output = Result<FlowContext, FlowError>>,
{
    let bounded = async {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, work)
                .await
                .unwrap_or(Err(FlowError::Timeout(limit))),
            None => work.await,
        }
    };

    let result = tokio::select! {
        biased;
        () = context.cancelled() => Err(FlowError::Cancelled),
        result = bounded => result,
    };
    if result.is_err() {
        scope.cancel();
    }
    result
}
