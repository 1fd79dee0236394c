//! S3: a task whose first attempt outlives `max_wait` is timed out and
//! re-queued, then succeeds on the retried dispatch — exactly one
//! completion reaches the caller.

mod common;

use std::time::{Duration, Instant};

use taskmesh::core::{Dispatcher, Task};

#[test]
fn timed_out_task_is_requeued_then_completes() {
    let (worker, listener) = common::bind_worker("slow");

    // First connection served is held open past the task's max_wait so the
    // dispatcher times it out; the retried dispatch is served promptly.
    let handle = common::spawn_executor(listener, 2, move |_kind, payload| {
        static FIRST_CALL: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);
        if FIRST_CALL.swap(false, std::sync::atomic::Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(600));
        }
        let v: serde_json::Value = serde_json::from_str(payload).unwrap();
        serde_json::json!({"success": "1", "v": v["v"]}).to_string()
    });

    let mut dispatcher = Dispatcher::new(vec![worker], false);
    dispatcher.enqueue(Task::dummy(0, Duration::from_millis(300), 10));

    let mut completed = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    while completed.is_empty() && Instant::now() < deadline {
        completed.extend(dispatcher.step());
        std::thread::sleep(Duration::from_millis(20));
    }

    assert_eq!(completed.len(), 1, "task must complete exactly once");
    assert!(completed[0].has_succeeded());
    assert!(dispatcher
        .history()
        .iter()
        .any(|entry| entry.message.contains("timed out")));

    handle.join().unwrap();
}
