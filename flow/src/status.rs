use std::fmt;

/// Lifecycle of one flow execution.
///
/// `NotStarted -> InProgress -> {Success | Timeout | Failure}`. The three
/// terminal states are final for the execution that reached them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlowStatus {
    #[default]
    NotStarted,
    InProgress,
    Success,
    Timeout,
    Failure,
}

impl FlowStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            FlowStatus::Success | FlowStatus::Timeout | FlowStatus::Failure
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FlowStatus::NotStarted => "NOT_STARTED",
            FlowStatus::InProgress => "IN_PROGRESS",
            FlowStatus::Success => "SUCCESS",
            FlowStatus::Timeout => "TIMEOUT",
            FlowStatus::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
