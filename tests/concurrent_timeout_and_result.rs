//! S6: when a result becomes available in the same step the deadline is
//! crossed, the result wins — `collect_results` checks the size-probe
//! before the timeout.

mod common;

use std::time::Duration;

use taskmesh::core::{Dispatcher, Task};

#[test]
fn ready_result_wins_over_a_crossed_deadline() {
    let (worker, listener) = common::bind_worker("just-in-time");

    // Replies immediately; the test lets real time run past max_wait
    // before calling step(), so both the result and the timeout are ready
    // to be observed in the same sweep.
    let handle = common::spawn_executor(listener, 1, |_kind, payload| {
        let v: serde_json::Value = serde_json::from_str(payload).unwrap();
        serde_json::json!({"success": "1", "v": v["v"]}).to_string()
    });

    let mut dispatcher = Dispatcher::new(vec![worker], false);
    dispatcher.enqueue(Task::dummy(0, Duration::from_millis(50), 0));

    // First step dispatches the task; give the executor time to answer and
    // to also cross the 50ms deadline before the next step observes it.
    let completed = dispatcher.step();
    assert!(completed.is_empty());
    std::thread::sleep(Duration::from_millis(200));

    let completed = dispatcher.step();

    assert_eq!(completed.len(), 1, "the ready result must be collected, not discarded as timed out");
    assert!(completed[0].has_succeeded());
    assert!(!dispatcher
        .history()
        .iter()
        .any(|entry| entry.message.contains("timed out")));

    handle.join().unwrap();
}
