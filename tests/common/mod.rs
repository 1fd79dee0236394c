//! Shared harness for the end-to-end scenarios in §8: a real `Dispatcher`
//! driven against an in-process executor stub listening on loopback TCP.

use std::net::{Ipv4Addr, TcpListener};
use std::thread::JoinHandle;

use taskmesh::core::{TaskKind, WorkerInfo};
use taskmesh::wire::ExecutorLink;

/// Bind a loopback listener on an OS-assigned port and wrap it as a worker.
pub fn bind_worker(name: &str) -> (WorkerInfo, TcpListener) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("bind loopback listener");
    let port = listener.local_addr().expect("listener has a local addr").port();
    (WorkerInfo::new(name, Ipv4Addr::LOCALHOST, port), listener)
}

/// Serve up to `n` requests on `listener`, replying to each with
/// `handler(kind, payload)`. Runs on a background thread.
pub fn spawn_executor<F>(listener: TcpListener, n: usize, handler: F) -> JoinHandle<()>
where
    F: Fn(TaskKind, &str) -> String + Send + 'static,
{
    std::thread::spawn(move || {
        for _ in 0..n {
            let mut link = match ExecutorLink::accept_one(&listener) {
                Ok(link) => link,
                Err(_) => return,
            };
            let header = match link.read_header() {
                Ok(header) => header,
                Err(_) => continue,
            };
            let Some(kind) = TaskKind::from_wire_code(header.kind) else {
                let _ = link.send_accept(false);
                continue;
            };
            if link.send_accept(true).is_err() {
                continue;
            }
            let payload = match link.read_payload() {
                Ok(payload) => payload,
                Err(_) => continue,
            };
            let payload = String::from_utf8_lossy(&payload).into_owned();
            let result = handler(kind, &payload);
            let _ = link.send_result(result.as_bytes());
        }
    })
}
