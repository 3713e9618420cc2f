use crate::status::FlowStatus;
use std::time::Duration;
use thiserror::Error;

/// Reason reported for a timed out flow.
pub const TIMEOUT_ERROR: &str = "flow.timeout";
/// Reason reported for a cancelled flow.
pub const CANCELLED_ERROR: &str = "flow.cancelled";

/// Why a single task did not complete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The task rejected with a reason.
    #[error("{0}")]
    Rejected(String),
    /// A nested flow ran into its timeout.
    #[error("flow.timeout")]
    Timeout,
    /// The task was cancelled.
    #[error("flow.cancelled")]
    Cancelled,
}

impl TaskError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        TaskError::Rejected(reason.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TaskError::Timeout)
    }
}

impl From<anyhow::Error> for TaskError {
    fn from(error: anyhow::Error) -> Self {
        TaskError::Rejected(format!("{error:#}"))
    }
}

impl From<String> for TaskError {
    fn from(reason: String) -> Self {
        TaskError::Rejected(reason)
    }
}

impl From<&str> for TaskError {
    fn from(reason: &str) -> Self {
        TaskError::Rejected(reason.to_string())
    }
}

/// Why a flow did not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// A task failed and fail-fast aborted the flow.
    #[error(transparent)]
    Task(#[from] TaskError),
    /// Without fail-fast: every task ran and at least one failed.
    #[error("{} of {total} tasks failed", .failures.len())]
    Failed {
        failures: Vec<TaskError>,
        total: usize,
    },
    #[error("flow.timeout after {0:?}")]
    Timeout(Duration),
    #[error("flow.cancelled")]
    Cancelled,
    /// The context already ran a flow. Nothing was executed.
    #[error("flow already started on this context ({0})")]
    AlreadyStarted(FlowStatus),
}

impl FlowError {
    /// True only when the flow's own deadline elapsed. A nested flow that
    /// timed out is a failed task of the enclosing flow.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FlowError::Timeout(_))
    }

    /// The failure reason stored in the context.
    pub fn reason(&self) -> String {
        match self {
            FlowError::Failed { failures, .. } => failures
                .first()
                .map(ToString::to_string)
                .unwrap_or_else(|| self.to_string()),
            other => other.to_string(),
        }
    }
}

impl From<FlowError> for TaskError {
    fn from(error: FlowError) -> Self {
        match error {
            FlowError::Task(error) => error,
            FlowError::Timeout(_) => TaskError::Timeout,
            FlowError::Cancelled => TaskError::Cancelled,
            started @ FlowError::AlreadyStarted(_) => TaskError::Rejected(started.to_string()),
            failed @ FlowError::Failed { .. } => TaskError::Rejected(failed.reason()),
        }
    }
}
