//! # FlowContext: Shared State of One Flow Execution
//!
//! A cheap, cloneable handle. Every clone sees the same value stack, data map,
//! progress sink and status; tasks hand results to each other through it.
//!
//! Each aggregate runs its children under a child cancellation token, so a
//! fail-fast abort or a timeout can signal work spawned by a task without
//! touching the rest of the flow.

use crate::error::TaskError;
use crate::progress::{NoopProgress, Progress};
use crate::status::FlowStatus;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What a task resolves or rejects with.
pub type TaskResult = Result<FlowContext, TaskError>;

type Value = Box<dyn Any + Send + Sync>;

#[derive(Default)]
struct State {
    status: FlowStatus,
    failure: Option<String>,
}

struct Inner {
    stack: Mutex<Vec<Value>>,
    data: Mutex<HashMap<String, Value>>,
    state: Mutex<State>,
    progress: Arc<dyn Progress>,
}

#[derive(Clone)]
pub struct FlowContext {
    inner: Arc<Inner>,
    token: CancellationToken,
}

impl FlowContext {
    pub fn new() -> Self {
        Self::with_progress(NoopProgress)
    }

    pub fn with_progress(progress: impl Progress + 'static) -> Self {
        Self::with_shared_progress(Arc::new(progress))
    }

    pub fn with_shared_progress(progress: Arc<dyn Progress>) -> Self {
        Self {
            inner: Arc::new(Inner {
                stack: Mutex::new(Vec::new()),
                data: Mutex::new(HashMap::new()),
                state: Mutex::new(State::default()),
                progress,
            }),
            token: CancellationToken::new(),
        }
    }

    // --- Task results ---

    pub fn resolve(self) -> TaskResult {
        Ok(self)
    }

    /// Push `value` and resolve.
    pub fn resolve_with<T: Any + Send + Sync>(self, value: T) -> TaskResult {
        self.push(value);
        Ok(self)
    }

    /// Store `value` under `key` and resolve.
    pub fn resolve_key<T: Any + Send + Sync>(self, key: impl Into<String>, value: T) -> TaskResult {
        self.set(key, value);
        Ok(self)
    }

    pub fn reject(&self, reason: impl Into<String>) -> TaskResult {
        Err(TaskError::rejected(reason))
    }

    // --- Stack ---

    pub fn push<T: Any + Send + Sync>(&self, value: T) {
        self.inner.stack.lock().push(Box::new(value));
    }

    /// Pop the top value if it is a `T`. A value of another type stays on the stack.
    pub fn pop<T: Any + Send + Sync>(&self) -> Option<T> {
        let mut stack = self.inner.stack.lock();
        if !stack.last().is_some_and(|value| (**value).is::<T>()) {
            return None;
        }
        stack
            .pop()
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }

    /// Pop the top value, or `default` if the stack is empty or the top is not a `T`.
    pub fn pop_or<T: Any + Send + Sync>(&self, default: T) -> T {
        self.pop().unwrap_or(default)
    }

    pub fn peek<T: Any + Clone>(&self) -> Option<T> {
        self.inner
            .stack
            .lock()
            .last()
            .and_then(|value| (**value).downcast_ref::<T>())
            .cloned()
    }

    pub fn is_stack_empty(&self) -> bool {
        self.inner.stack.lock().is_empty()
    }

    pub fn stack_len(&self) -> usize {
        self.inner.stack.lock().len()
    }

    // --- Data ---

    pub fn set<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.inner.data.lock().insert(key.into(), Box::new(value));
    }

    /// The value under `key` if present and a `T`.
    pub fn get<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.inner
            .data
            .lock()
            .get(key)
            .and_then(|value| (**value).downcast_ref::<T>())
            .cloned()
    }

    pub fn get_or<T: Any + Clone>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn remove(&self, key: &str) -> bool {
        self.inner.data.lock().remove(key).is_some()
    }

    /// Keys of the data map, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.data.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// True if the data map is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.data.lock().is_empty()
    }

    // --- Status ---

    pub fn progress(&self) -> &dyn Progress {
        self.inner.progress.as_ref()
    }

    pub fn status(&self) -> FlowStatus {
        self.inner.state.lock().status
    }

    pub fn is_successful(&self) -> bool {
        self.status() == FlowStatus::Success
    }

    pub fn is_timeout(&self) -> bool {
        self.status() == FlowStatus::Timeout
    }

    pub fn is_failure(&self) -> bool {
        self.status() == FlowStatus::Failure
    }

    /// Set when the status is [`FlowStatus::Failure`].
    pub fn failure_reason(&self) -> Option<String> {
        self.inner.state.lock().failure.clone()
    }

    /// Start the execution. Refused unless the context has not started yet,
    /// returning the status it is in.
    pub(crate) fn begin(&self) -> Result<(), FlowStatus> {
        let mut state = self.inner.state.lock();
        if state.status != FlowStatus::NotStarted {
            return Err(state.status);
        }
        state.status = FlowStatus::InProgress;
        Ok(())
    }

    /// Enter a terminal state. Ignored unless the execution is in progress.
    pub(crate) fn complete(&self, status: FlowStatus, failure: Option<String>) -> bool {
        let mut state = self.inner.state.lock();
        if state.status != FlowStatus::InProgress {
            return false;
        }
        state.status = status;
        state.failure = failure;
        true
    }

    // --- Cancellation ---

    /// Resolves once this context (or an enclosing scope) is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel this context and every scope below it.
    pub fn cancel(&self) {
        self.token.cancel()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Same state, child cancellation token.
    pub(crate) fn scoped(&self) -> FlowContext {
        Self {
            inner: self.inner.clone(),
            token: self.token.child_token(),
        }
    }
}

impl Default for FlowContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FlowContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("FlowContext")
            .field("stack", &self.stack_len())
            .field("keys", &self.keys())
            .field("status", &state.status)
            .field("failure", &state.failure)
            .finish()
    }
}

impl fmt::Display for FlowContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        write!(
            f,
            "FlowContext {{stack: {} items, map: {:?}, status: {}",
            self.stack_len(),
            self.keys(),
            state.status
        )?;
        if let (FlowStatus::Failure, Some(failure)) = (state.status, &state.failure) {
            write!(f, "({failure})")?;
        }
        f.write_str("}")
    }
}
