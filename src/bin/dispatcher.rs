//! Dispatcher CLI (§6 "Dispatcher CLI"): loads the worker pool and task
//! batch, then drives [`taskmesh::core::Dispatcher::step`] to completion (or
//! runs the `-check`/`-benchmark` diagnostic modes instead).
//!
//! All business logic lives in [`taskmesh::core`], [`taskmesh::builders`]
//! and [`taskmesh::compose`]; this binary is the thin CLI shell around
//! them, per §1's "CLI front-ends ... out of scope" for the core engine.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use taskmesh::builders::{bind_legacy_listener, load_tasks_file, load_workers_file};
use taskmesh::core::{AppResult, Dispatcher, Task, WorkerInfo};
use taskmesh::util::telemetry::init_tracing;

#[derive(Debug, Parser)]
#[command(name = "dispatcher", about = "taskmesh coordinator process")]
struct Cli {
    /// Path to the workers-config JSON file.
    #[arg(long)]
    squidlets: String,
    /// Path to the tasks-config JSON file. Required unless `--check` or
    /// `--benchmark` is given.
    #[arg(long)]
    tasks: Option<String>,
    /// Seconds between dispatch steps.
    #[arg(long, default_value_t = 1)]
    freq: u64,
    /// Enable the telemetry panel (and debug-level logging).
    #[arg(long)]
    verbose: bool,
    /// Issue one Dummy task per configured worker and report reachability.
    #[arg(long)]
    check: bool,
    /// Run a capacity benchmark sweep across the pool and print TSV.
    #[arg(long)]
    benchmark: bool,
}

/// The documented exit codes (§6) are all small non-negative constants;
/// this never truncates in practice.
fn exit_code(code: i32) -> std::process::ExitCode {
    u8::try_from(code).map_or(std::process::ExitCode::FAILURE, std::process::ExitCode::from)
}

fn main() -> std::process::ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{error:#}");
            std::process::ExitCode::FAILURE
        }
    }
}

/// The documented per-failure exit codes (§6) are returned directly;
/// anything else (e.g. a socket the OS refuses for reasons outside §6's
/// list) is collected into the generic `anyhow` failure path instead.
fn run(cli: Cli) -> AppResult<std::process::ExitCode> {
    let workers = match load_workers_file(&cli.squidlets) {
        Ok(workers) => workers,
        Err(error) => {
            eprintln!("{error}");
            return Ok(exit_code(error.exit_code()));
        }
    };

    let legacy_listener =
        bind_legacy_listener().context("failed to create dispatcher's listening socket")?;

    if cli.check {
        return Ok(run_check(workers, cli.freq));
    }
    if cli.benchmark {
        return Ok(run_benchmark(&workers, cli.freq));
    }

    let Some(tasks_path) = cli.tasks else {
        eprintln!("--tasks is required unless --check or --benchmark is given");
        return Ok(std::process::ExitCode::from(5));
    };

    let nb_workers = workers.len();
    let tasks = match load_tasks_file(&tasks_path, nb_workers) {
        Ok(tasks) => tasks,
        Err(error) => {
            eprintln!("{error}");
            return Ok(exit_code(error.exit_code()));
        }
    };

    let mut dispatcher = Dispatcher::with_legacy_listener(workers, cli.verbose, Some(legacy_listener));
    dispatcher.enqueue_many(tasks);
    run_until_drained(&mut dispatcher, cli.freq, cli.verbose);
    Ok(std::process::ExitCode::SUCCESS)
}

/// Step the dispatcher until the queue drains, compositing render
/// fragments and re-queuing worker-reported failures as they complete.
fn run_until_drained(dispatcher: &mut Dispatcher, freq_secs: u64, verbose: bool) {
    let mut stdout = std::io::stdout();
    while dispatcher.nb_task_to_complete() > 0 {
        let completed = dispatcher.step();
        for task in completed {
            handle_completed(dispatcher, task);
        }
        if verbose {
            let _ = taskmesh::telemetry::render(dispatcher, &mut stdout);
        }
        std::thread::sleep(Duration::from_secs(freq_secs));
    }
}

fn handle_completed(dispatcher: &mut Dispatcher, task: Task) {
    use taskmesh::core::TaskKind;

    if !task.has_succeeded() {
        warn!(task_id = task.id, sub_id = task.sub_id, "task reported failure; re-queuing");
        dispatcher.try_again(task);
        return;
    }

    if task.kind == TaskKind::Render {
        if let Some(result) = task.result.as_deref() {
            if let Err(error) = taskmesh::compose::composite_fragment(result) {
                warn!(task_id = task.id, sub_id = task.sub_id, %error, "fragment compositing failed");
            }
        }
    }
    info!(task_id = task.id, sub_id = task.sub_id, "task completed");
}

/// `-check`: one Dummy task (`v=0`) per configured worker; report
/// reachability and round-trip time per worker (§10.6).
fn run_check(workers: Vec<WorkerInfo>, freq_secs: u64) -> std::process::ExitCode {
    let nb_workers = workers.len();
    let names: Vec<String> = workers.iter().map(|w| w.name.clone()).collect();
    let mut dispatcher = Dispatcher::new(workers, false);
    for id in 0..nb_workers as u64 {
        dispatcher.enqueue(Task::dummy(id, Duration::from_secs(5), 0));
    }

    let start = Instant::now();
    let mut elapsed_by_id = vec![None; nb_workers];
    // Bound the loop generously beyond the per-task max_wait so a
    // genuinely unreachable worker's task is observed still pending,
    // not just still running.
    let deadline = start + Duration::from_secs(10);
    while dispatcher.nb_task_to_complete() > 0 && Instant::now() < deadline {
        let completed = dispatcher.step();
        for task in completed {
            let id = usize::try_from(task.id).unwrap_or(usize::MAX);
            if let Some(slot) = elapsed_by_id.get_mut(id) {
                *slot = Some(start.elapsed());
            }
        }
        std::thread::sleep(Duration::from_secs(freq_secs.min(1)));
    }

    let mut all_reachable = true;
    for (i, name) in names.iter().enumerate() {
        if let Some(elapsed) = elapsed_by_id[i] {
            println!("{name}\treachable\t{}ms", elapsed.as_millis());
        } else {
            println!("{name}\tunreachable");
            all_reachable = false;
        }
    }

    if all_reachable {
        std::process::ExitCode::SUCCESS
    } else {
        std::process::ExitCode::from(4)
    }
}

/// `-benchmark`: sweep `(nb, payload_size)` cells, keeping the in-flight
/// count topped up to one `Benchmark` task per worker for a fixed
/// wall-clock window per cell, printing one TSV line per cell (§10.6).
fn run_benchmark(workers: &[WorkerInfo], _freq_secs: u64) -> std::process::ExitCode {
    const CELL_WINDOW: Duration = Duration::from_secs(3);
    const NB_PAYLOAD_CELLS: u32 = 2;
    const NB_LOOP_CELLS: u32 = 2;

    let nb_workers = workers.len().max(1);
    println!("nbLoopPerTask\tnbBytePayload\tnbTaskComp\ttimeMsPerTask");

    if std::io::stdout().is_terminal() {
        info!("running benchmark sweep over {nb_workers} workers");
    }

    let mut payload_size: usize = 100;
    for _ in 0..NB_PAYLOAD_CELLS {
        let mut nb: u32 = 1;
        for _ in 0..NB_LOOP_CELLS {
            let mut dispatcher = Dispatcher::new(workers.to_vec(), false);
            let mut next_id: u64 = 0;
            let cell_start = Instant::now();
            let mut nb_completed: u64 = 0;

            for _ in 0..nb_workers {
                dispatcher.enqueue(Task::benchmark(next_id, Duration::from_secs(30), nb, payload_size));
                next_id += 1;
            }

            while cell_start.elapsed() < CELL_WINDOW {
                let completed = dispatcher.step();
                nb_completed += completed.len() as u64;
                while dispatcher.pending_len() + dispatcher.running_len() < nb_workers {
                    dispatcher.enqueue(Task::benchmark(next_id, Duration::from_secs(30), nb, payload_size));
                    next_id += 1;
                }
                std::thread::sleep(Duration::from_millis(50));
            }

            let elapsed_ms = cell_start.elapsed().as_millis().max(1);
            let ms_per_task = if nb_completed == 0 {
                0
            } else {
                elapsed_ms / u128::from(nb_completed)
            };
            println!("{nb}\t{payload_size}\t{nb_completed}\t{ms_per_task}");

            nb *= 2;
        }
        payload_size *= 10;
    }

    std::process::ExitCode::SUCCESS
}
