//! S2: a worker nothing is listening on leaves a task pending and never
//! completed, with the attempt recorded in history.

use std::net::{Ipv4Addr, TcpListener};
use std::time::Duration;

use taskmesh::core::{Dispatcher, Task, WorkerInfo};

#[test]
fn unreachable_worker_leaves_task_pending() {
    // Bind then immediately drop the listener: the port is free again but
    // nothing answers a connection attempt to it.
    let port = {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        listener.local_addr().unwrap().port()
    };
    let worker = WorkerInfo::new("ghost", Ipv4Addr::LOCALHOST, port);

    let mut dispatcher = Dispatcher::new(vec![worker], false);
    dispatcher.enqueue(Task::dummy(0, Duration::from_secs(5), 0));

    let completed = dispatcher.step();

    assert!(completed.is_empty());
    assert_eq!(dispatcher.pending_len(), 1);
    assert_eq!(dispatcher.running_len(), 0);
    assert!(dispatcher
        .history()
        .iter()
        .any(|entry| entry.message.contains("can't connect")));
}
