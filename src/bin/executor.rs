//! Executor CLI (§6 "Worker CLI"): binds a TCP listener, accepts one
//! connection at a time, runs the task-kind handler, replies, and loops.
//!
//! All business logic lives in [`taskmesh::handlers`] and
//! [`taskmesh::wire`]; this binary is the thin CLI shell around them, per
//! §1's "CLI front-ends ... out of scope" for the core engine.

use std::io::Write;
use std::net::{Ipv4Addr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use taskmesh::core::TaskKind;
use taskmesh::handlers::{handle_benchmark, handle_dummy, handle_render, probe_temperature};
use taskmesh::util::telemetry::init_tracing;
use taskmesh::wire::ExecutorLink;

const PORT_PROBE_RANGE: std::ops::RangeInclusive<u16> = 9000..=9999;

#[derive(Debug, Parser)]
#[command(name = "executor", about = "taskmesh worker process (the executor)")]
struct Cli {
    /// IPv4 address to bind the listening socket on.
    #[arg(long, default_value = "0.0.0.0")]
    ip: Ipv4Addr,
    /// TCP port to bind. If omitted, probes 9000..=9999 for the first free port.
    #[arg(long)]
    port: Option<u16>,
    /// Where to write the per-task accept log: `stdout` or `omit`. A
    /// filesystem path is also accepted and opened in append mode.
    #[arg(long, default_value = "stdout")]
    stream: String,
    /// Print the local chassis temperature once at startup, then continue.
    #[arg(long)]
    temp: bool,
}

fn bind_listener(ip: Ipv4Addr, port: Option<u16>) -> std::io::Result<TcpListener> {
    if let Some(port) = port {
        return TcpListener::bind((ip, port));
    }
    let mut last_err = None;
    for port in PORT_PROBE_RANGE {
        match TcpListener::bind((ip, port)) {
            Ok(listener) => return Ok(listener),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::AddrInUse, "no free port in 9000..=9999")
    }))
}

fn open_stream(spec: &str) -> Option<Box<dyn Write + Send>> {
    match spec {
        "omit" => None,
        "stdout" => Some(Box::new(std::io::stdout())),
        path => std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
            .map(|f| Box::new(f) as Box<dyn Write + Send>),
    }
}

fn main() -> std::process::ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(false);

    if cli.temp {
        match probe_temperature() {
            Some(t) => println!("temperature: {t:.1}C"),
            None => println!("temperature: unavailable"),
        }
    }

    let listener = match bind_listener(cli.ip, cli.port) {
        Ok(listener) => listener,
        Err(error) => {
            eprintln!("failed to bind listener: {error}");
            return std::process::ExitCode::FAILURE;
        }
    };
    let local_addr = listener.local_addr().expect("bound listener has an address");
    info!(%local_addr, "executor listening");

    let shutdown = Arc::new(AtomicBool::new(false));
    if let Err(error) = signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&shutdown)) {
        warn!(%error, "failed to install SIGINT handler");
    }
    let sigpipe_seen = Arc::new(AtomicBool::new(false));
    if let Err(error) =
        signal_hook::flag::register(signal_hook::consts::SIGPIPE, Arc::clone(&sigpipe_seen))
    {
        warn!(%error, "failed to install SIGPIPE handler");
    }

    let mut stream_log = open_stream(&cli.stream);
    listener
        .set_nonblocking(true)
        .expect("nonblocking mode must be settable on a fresh listener");

    while !shutdown.load(Ordering::Relaxed) {
        if sigpipe_seen.swap(false, Ordering::Relaxed) {
            warn!("SIGPIPE received; continuing");
        }

        let (stream, _) = match listener.accept() {
            Ok(pair) => pair,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(std::time::Duration::from_millis(50));
                continue;
            }
            Err(error) => {
                warn!(%error, "accept failed");
                continue;
            }
        };
        stream
            .set_nonblocking(false)
            .expect("blocking mode must be settable on an accepted stream");

        if let Err(error) = serve_one(stream, &mut stream_log) {
            warn!(%error, "request failed");
        }
    }

    info!("shutting down on SIGINT");
    std::process::ExitCode::SUCCESS
}

fn serve_one(
    stream: std::net::TcpStream,
    stream_log: &mut Option<Box<dyn Write + Send>>,
) -> Result<(), taskmesh::wire::WireError> {
    let mut link = ExecutorLink::from_stream(stream)?;
    let header = link.read_header()?;

    let Some(kind) = TaskKind::from_wire_code(header.kind) else {
        link.send_accept(false)?;
        return Ok(());
    };
    if kind == TaskKind::Null {
        link.send_accept(false)?;
        return Ok(());
    }
    link.send_accept(true)?;

    if let Some(out) = stream_log {
        let _ = writeln!(out, "accepted task {}/{} kind={kind:?}", header.id, header.sub_id);
    }

    let payload = link.read_payload()?;
    let payload = String::from_utf8_lossy(&payload);

    let result = match kind {
        TaskKind::Dummy => handle_dummy(&payload),
        TaskKind::Benchmark => handle_benchmark(&payload),
        TaskKind::Render => handle_render(&payload),
        TaskKind::Null => unreachable!("refused above"),
    };

    link.send_result(result.as_bytes())
}
