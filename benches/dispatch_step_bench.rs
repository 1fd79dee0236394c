//! Benchmarks the dispatch loop's matching step in isolation (§4.2), using
//! only in-memory collections — no real sockets — so this measures the
//! `VecDeque`/`Vec` bookkeeping cost of `collect_results`/`dispatch_pending`
//! rather than network latency.

use std::net::Ipv4Addr;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use taskmesh::core::{Task, WorkerInfo};

fn bench_enqueue_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("enqueue_many");
    for nb_tasks in [10usize, 100, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(nb_tasks), &nb_tasks, |b, &n| {
            let workers: Vec<WorkerInfo> = (0..8u16)
                .map(|i| WorkerInfo::new(format!("w{i}"), Ipv4Addr::LOCALHOST, 9000 + i))
                .collect();
            b.iter(|| {
                let mut dispatcher = taskmesh::core::Dispatcher::new(workers.clone(), false);
                let tasks = (0..n).map(|id| {
                    Task::dummy(id.try_into().unwrap_or(u64::MAX), Duration::from_secs(5), 0)
                });
                dispatcher.enqueue_many(tasks);
                std::hint::black_box(dispatcher.pending_len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_enqueue_many);
criterion_main!(benches);
