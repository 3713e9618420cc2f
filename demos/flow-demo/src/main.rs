//! flow-demo
//!
//! Runs the three flow kinds against a simulated time service.

use anyhow::Result;
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use waymark::flow::TracingProgress;
use waymark::prelude::*;

#[derive(Debug, Deserialize)]
struct TimeResponse {
    datetime: String,
}

/// Stands in for an HTTP call returning `{"datetime": "..."}`.
struct TimeService {
    millis: AtomicU64,
}

impl TimeService {
    async fn fetch(&self) -> Result<String> {
        tokio::time::sleep(Duration::from_millis(150)).await;
        let millis = self.millis.fetch_add(137, Ordering::SeqCst);
        Ok(format!(
            r#"{{"datetime": "2022-03-31T11:03:{:02}.{:03}+02:00"}}"#,
            millis / 1_000 % 60,
            millis % 1_000
        ))
    }
}

fn current_time(service: Arc<TimeService>) -> SharedTask {
    task_fn(move |context: FlowContext| {
        let service = service.clone();
        async move {
            let body = service.fetch().await?;
            let response: TimeResponse = serde_json::from_str(&body).map_err(anyhow::Error::from)?;
            context.resolve_with(response.datetime[11..23].to_string())
        }
    })
    .shared()
}

fn delay(ms: u64) -> SharedTask {
    task_fn(move |context: FlowContext| async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        context.resolve()
    })
    .shared()
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_toml_str(
        r#"
        [logging]
        level = "info"

        [flow]
        interval_ms = 200
        repeat_timeout_ms = 5000
        iterations = 5
        "#,
    )?;
    waymark::core::logging::try_init(&settings.logging)?;

    let service = Arc::new(TimeService {
        millis: AtomicU64::new(0),
    });

    // the two tasks run in parallel
    let time = Flow::parallel(
        FlowContext::with_progress(TracingProgress::new("parallel")),
        vec![current_time(service.clone()), delay(400)],
    )
    .subscribe(|context| context.pop_or("n/a".to_string()))
    .await;
    println!("parallel: current time {time}");

    // the two tasks run in sequence and are cancelled after 300 ms
    let context = Flow::sequential(FlowContext::new(), vec![current_time(service.clone()), delay(400)])
        .timeout(Duration::from_millis(300))
        .subscribe(|context| context)
        .await;
    println!("sequential: {context}");

    // fetch the time until the milliseconds end with "0", at most five times
    let context = Flow::repeat(FlowContext::new(), current_time(service.clone()))
        .configure(&settings.flow)
        .while_(|context: &FlowContext| {
            !context
                .peek::<String>()
                .is_some_and(|time| time.ends_with('0'))
        })
        .subscribe(|context| context)
        .await;
    println!(
        "repeat: {} after {} fetches, last time {}",
        context.status(),
        context.stack_len(),
        context.peek::<String>().unwrap_or_default()
    );

    // nested: a parallel pair inside a sequence
    let nested = Flow::sequential(
        FlowContext::new(),
        vec![
            current_time(service.clone()),
            ParallelTasks::new(vec![current_time(service.clone()), delay(100)]).shared(),
        ],
    )
    .execute()
    .await;
    match nested {
        Ok(context) => println!("nested: {} times collected", context.stack_len()),
        Err(e) => tracing::error!("nested flow failed: {}", e),
    }

    Ok(())
}
