use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use waymark_flow::prelude::*;

#[tokio::test(start_paused = true)]
async fn parallel_fail_fast_reports_failure_without_waiting() {
    let settled = Arc::new(AtomicUsize::new(0));
    let tasks: Vec<SharedTask> = (0..7u64)
        .map(|i| {
            let settled = settled.clone();
            task_fn(move |context: FlowContext| {
                let settled = settled.clone();
                async move {
                    if i == 3 {
                        sleep(Duration::from_millis(100)).await;
                        return context.reject("task 3 failed");
                    }
                    sleep(Duration::from_secs(1 + i)).await;
                    settled.fetch_add(1, Ordering::SeqCst);
                    context.resolve_with(i)
                }
            })
            .shared()
        })
        .collect();

    let start = Instant::now();
    let callbacks = AtomicUsize::new(0);
    let context = Flow::parallel(FlowContext::new(), tasks)
        .fail_fast(true)
        .subscribe(|context| {
            callbacks.fetch_add(1, Ordering::SeqCst);
            context
        })
        .await;

    assert_eq!(context.status(), FlowStatus::Failure);
    assert_eq!(context.failure_reason().as_deref(), Some("task 3 failed"));
    assert_eq!(callbacks.load(Ordering::SeqCst), 1);
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(settled.load(Ordering::SeqCst), 0);

    // abandoned tasks are dropped, not merely ignored
    sleep(Duration::from_secs(10)).await;
    assert_eq!(settled.load(Ordering::SeqCst), 0);
    assert!(context.is_stack_empty());
}

#[tokio::test(start_paused = true)]
async fn repeat_without_sentinel_times_out() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let task = task_fn(move |context: FlowContext| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            context.resolve_with("tick".to_string())
        }
    });

    let start = Instant::now();
    let context = Flow::repeat(FlowContext::new(), task)
        .while_(|context: &FlowContext| context.peek::<String>().as_deref() != Some("sentinel"))
        .interval(Duration::from_millis(1_000))
        .timeout(Duration::from_millis(8_000))
        .subscribe(|context| context)
        .await;

    let elapsed = start.elapsed();
    assert_eq!(context.status(), FlowStatus::Timeout);
    assert_eq!(context.failure_reason(), None);
    assert!(elapsed >= Duration::from_millis(8_000), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(8_100), "elapsed {elapsed:?}");
    assert!((8..=9).contains(&runs.load(Ordering::SeqCst)));
}

#[tokio::test(start_paused = true)]
async fn timed_out_work_observes_cancellation() {
    let observed = Arc::new(AtomicUsize::new(0));
    let flag = observed.clone();
    let task = task_fn(move |context: FlowContext| {
        let flag = flag.clone();
        async move {
            let token = context.cancellation_token();
            tokio::spawn(async move {
                token.cancelled().await;
                flag.fetch_add(1, Ordering::SeqCst);
            });
            sleep(Duration::from_secs(60)).await;
            context.resolve()
        }
    });

    let result = Flow::sequential(FlowContext::new(), vec![task.shared()])
        .timeout(Duration::from_secs(2))
        .execute()
        .await;

    assert!(matches!(result, Err(FlowError::Timeout(_))));
    tokio::task::yield_now().await;
    assert_eq!(observed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn subscribe_delivers_every_terminal_state_once() {
    let calls = AtomicUsize::new(0);
    let ok = Flow::sequential(FlowContext::new(), Vec::new())
        .subscribe(|context| {
            calls.fetch_add(1, Ordering::SeqCst);
            context.status()
        })
        .await;
    let failed = Flow::sequential(
        FlowContext::new(),
        vec![task_fn(|context: FlowContext| async move { context.reject("no") }).shared()],
    )
    .subscribe(|context| {
        calls.fetch_add(1, Ordering::SeqCst);
        context.status()
    })
    .await;

    assert_eq!(ok, FlowStatus::Success);
    assert_eq!(failed, FlowStatus::Failure);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
