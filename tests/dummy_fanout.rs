//! S1: two workers, six Dummy tasks, every result succeeds and each worker
//! handles a share of the batch.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use taskmesh::core::{Dispatcher, Task};

#[test]
fn six_dummy_tasks_complete_across_two_workers() {
    let (worker_a, listener_a) = common::bind_worker("a");
    let (worker_b, listener_b) = common::bind_worker("b");

    let hits_a = Arc::new(AtomicUsize::new(0));
    let hits_b = Arc::new(AtomicUsize::new(0));
    let (hits_a_counter, hits_b_counter) = (Arc::clone(&hits_a), Arc::clone(&hits_b));

    // Neither worker can be told in advance how many of the six tasks it
    // will receive, so the executor threads are left to run past the
    // test's own lifetime rather than joined.
    let _handle_a = common::spawn_executor(listener_a, 6, move |_kind, payload| {
        hits_a_counter.fetch_add(1, Ordering::Relaxed);
        let v: serde_json::Value = serde_json::from_str(payload).unwrap();
        serde_json::json!({"success": "1", "v": v["v"]}).to_string()
    });
    let _handle_b = common::spawn_executor(listener_b, 6, move |_kind, payload| {
        hits_b_counter.fetch_add(1, Ordering::Relaxed);
        let v: serde_json::Value = serde_json::from_str(payload).unwrap();
        serde_json::json!({"success": "1", "v": v["v"]}).to_string()
    });

    let mut dispatcher = Dispatcher::new(vec![worker_a, worker_b], false);
    for id in 0..6u64 {
        dispatcher.enqueue(Task::dummy(id, Duration::from_secs(5), 0));
    }

    let mut completed = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(10);
    while completed.len() < 6 && Instant::now() < deadline {
        completed.extend(dispatcher.step());
        std::thread::sleep(Duration::from_millis(20));
    }

    assert_eq!(completed.len(), 6);
    assert!(completed.iter().all(Task::has_succeeded));
    assert_eq!(dispatcher.nb_task_to_complete(), 0);

    // Both workers did some of the work; with a 2-worker pool and 6 tasks
    // dispatched two at a time neither can legitimately get all six.
    assert!(hits_a.load(Ordering::Relaxed) >= 1);
    assert!(hits_b.load(Ordering::Relaxed) >= 1);
    assert_eq!(
        hits_a.load(Ordering::Relaxed) + hits_b.load(Ordering::Relaxed),
        6
    );
}
