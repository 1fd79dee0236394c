//! S5: a result larger than the dispatcher's usual fixed-size reads still
//! arrives intact, because the body-read timeout scales with the
//! advertised size rather than using the flat socket timeout.

mod common;

use std::time::{Duration, Instant};

use taskmesh::core::{Dispatcher, Task};
use taskmesh::handlers::handle_benchmark;

#[test]
fn large_benchmark_result_is_read_in_full() {
    let (worker, listener) = common::bind_worker("big");
    let handle = common::spawn_executor(listener, 1, |_kind, payload| handle_benchmark(payload));

    let mut dispatcher = Dispatcher::new(vec![worker], false);
    dispatcher.enqueue(Task::benchmark(0, Duration::from_secs(20), 1, 1000));

    let mut completed = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(10);
    while completed.is_empty() && Instant::now() < deadline {
        completed.extend(dispatcher.step());
        std::thread::sleep(Duration::from_millis(20));
    }

    assert_eq!(completed.len(), 1);
    let task = &completed[0];
    assert!(task.has_succeeded());
    let result: serde_json::Value = serde_json::from_str(task.result.as_deref().unwrap()).unwrap();
    assert_eq!(result["v"].as_str().unwrap().len(), 1000);

    handle.join().unwrap();
}
