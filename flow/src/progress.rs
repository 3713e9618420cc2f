//! Progress sinks.
//!
//! Runners reset the sink with the number of tasks (or `None` when the amount
//! of work is unknown), tick once per completed task and finish on success.

use parking_lot::Mutex;

pub trait Progress: Send + Sync {
    fn reset(&self, max: Option<usize>, label: Option<&str>);

    fn tick(&self, label: Option<&str>);

    fn finish(&self);
}

/// Ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl Progress for NoopProgress {
    fn reset(&self, _max: Option<usize>, _label: Option<&str>) {}

    fn tick(&self, _label: Option<&str>) {}

    fn finish(&self) {}
}

#[derive(Debug, Default)]
struct Counter {
    value: usize,
    max: Option<usize>,
}

/// Reports progress as `tracing` events.
#[derive(Debug)]
pub struct TracingProgress {
    name: String,
    counter: Mutex<Counter>,
}

impl TracingProgress {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            counter: Mutex::new(Counter::default()),
        }
    }

    /// Ticks since the last reset.
    pub fn value(&self) -> usize {
        self.counter.lock().value
    }
}

impl Progress for TracingProgress {
    fn reset(&self, max: Option<usize>, label: Option<&str>) {
        *self.counter.lock() = Counter { value: 0, max };
        tracing::debug!(progress = %self.name, ?max, label, "Progress reset");
    }

    fn tick(&self, label: Option<&str>) {
        let (value, max) = {
            let mut counter = self.counter.lock();
            counter.value += 1;
            (counter.value, counter.max)
        };
        match max {
            Some(max) => tracing::debug!(progress = %self.name, label, "{}/{}", value, max),
            None => tracing::debug!(progress = %self.name, label, "{}", value),
        }
    }

    fn finish(&self) {
        tracing::debug!(progress = %self.name, value = self.value(), "Progress finished");
    }
}
