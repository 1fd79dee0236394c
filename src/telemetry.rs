//! Operator-facing telemetry panel (§4.6).
//!
//! A fixed-layout redraw driven entirely by data the [`crate::core::Dispatcher`]
//! already tracks — this module adds no state of its own beyond the cursor
//! position it resets every frame. `-verbose` absent means this module's
//! `render` is simply never called, so disabling it is zero-cost (§4.6,
//! §10.5).

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, QueueableCommand};

use crate::core::Dispatcher;

/// Maximum number of running/pending task lines shown (§4.6).
const MAX_TASK_LINES: usize = 32;

/// Redraw the fixed-layout panel: counters, the last 20 history lines, and
/// up to 32 task listings (running first, then pending).
pub fn render(dispatcher: &Dispatcher, out: &mut impl Write) -> io::Result<()> {
    execute!(out, MoveTo(0, 0), Clear(ClearType::FromCursorDown))?;

    writeln!(
        out,
        "running={} pending={} workers_available={}",
        dispatcher.running_len(),
        dispatcher.pending_len(),
        dispatcher.workers_available_len(),
    )?;

    writeln!(out, "-- history --")?;
    for entry in dispatcher.history().iter() {
        writeln!(out, "[{:>6}] {}", entry.seq, entry.message)?;
    }

    writeln!(out, "-- tasks --")?;
    let mut shown = 0usize;
    for task in dispatcher.running_tasks() {
        if shown >= MAX_TASK_LINES {
            break;
        }
        writeln!(out, "running  {}/{} {:?}", task.id, task.sub_id, task.kind)?;
        shown += 1;
    }
    for task in dispatcher.pending_tasks() {
        if shown >= MAX_TASK_LINES {
            break;
        }
        writeln!(out, "pending  {}/{} {:?}", task.id, task.sub_id, task.kind)?;
        shown += 1;
    }

    out.queue(Clear(ClearType::FromCursorDown))?;
    out.flush()
}
