//! Waymark Flow - asynchronous task combinators
//!
//! Runs a list of tasks concurrently or in order, or repeats one task until a
//! predicate is satisfied, against a shared `FlowContext`:
//! - `Flow::parallel` / `Flow::sequential` / `Flow::repeat`: top-level flows
//!   with fail-fast, timeout and a terminal `FlowStatus`
//! - `ParallelTasks` / `SequentialTasks` / `RepeatTask`: the same as tasks, so
//!   flows nest
//!
//! Timeouts and fail-fast aborts drop the abandoned futures and cancel the
//! scope's `CancellationToken`.

pub mod context;
pub mod error;
pub mod flow;
pub mod progress;
pub mod repeat;
pub mod sequence;
pub mod status;
pub mod task;
pub mod tasks;

pub use context::{FlowContext, TaskResult};
pub use error::{FlowError, TaskError};
pub use flow::{Flow, Mode};
pub use progress::{NoopProgress, Progress, TracingProgress};
pub use repeat::Repeat;
pub use sequence::Sequence;
pub use status::FlowStatus;
pub use task::{IntoShared, SharedTask, Task, TaskFn, task_fn};
pub use tasks::{ParallelTasks, RepeatTask, SequentialTasks};

pub mod prelude {
    pub use crate::context::{FlowContext, TaskResult};
    pub use crate::error::{FlowError, TaskError};
    pub use crate::flow::Flow;
    pub use crate::progress::Progress;
    pub use crate::status::FlowStatus;
    pub use crate::task::{IntoShared, SharedTask, Task, task_fn};
    pub use crate::tasks::{ParallelTasks, RepeatTask, SequentialTasks};
}
