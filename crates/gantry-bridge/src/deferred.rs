//! Generation-guarded deferred actions.
//!
//! The load-timeout monitor and the visibility fallback share one
//! mechanism: capture a ticket, sleep on a background task, and post a
//! completion action back to the owning context only while the ticket
//! is still live. Cancellation is cooperative, not interrupt-based:
//! advancing the generation makes every outstanding ticket dead, while
//! the timers themselves always run to completion and no-op.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::trace;

/// Monotonically increasing counter shared between the owning context
/// and background timers.
///
/// Increment-only and compared for exact equality, so it is read
/// without a lock: a stale read causes at most one extra liveness
/// check that resolves to a no-op, never a lost cancellation.
#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate all outstanding tickets. Returns the new generation.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    /// Capture the current generation as a ticket.
    pub fn ticket(&self) -> TimeoutTicket {
        TimeoutTicket {
            counter: Arc::clone(&self.0),
            captured: self.current(),
        }
    }
}

/// A claim on the current generation, valid until superseded.
#[derive(Debug, Clone)]
pub struct TimeoutTicket {
    counter: Arc<AtomicU64>,
    captured: u64,
}

impl TimeoutTicket {
    /// Whether the generation still equals the captured value.
    pub fn is_live(&self) -> bool {
        self.counter.load(Ordering::Relaxed) == self.captured
    }

    pub fn captured(&self) -> u64 {
        self.captured
    }
}

/// Completion actions posted back to the session's owning context.
///
/// Background tasks never touch session state directly; these are
/// drained and handled on the main context.
#[derive(Debug)]
pub enum SessionTask {
    /// A top-level load exceeded the configured timeout.
    LoadTimeout { ticket: TimeoutTicket, url: String },
    /// A finished page never became visible; force the spinner away.
    SpinnerFallback { ticket: TimeoutTicket },
}

impl SessionTask {
    pub fn ticket(&self) -> &TimeoutTicket {
        match self {
            SessionTask::LoadTimeout { ticket, .. } => ticket,
            SessionTask::SpinnerFallback { ticket } => ticket,
        }
    }
}

/// Sleep `delay` on a background task, then post `task` to the owning
/// context if its ticket is still live.
///
/// Requires a running Tokio runtime. The timer is never interrupted; a
/// dead ticket turns the post into a no-op. The handler re-checks
/// liveness at drain time, so a generation advanced between post and
/// drain still cancels the action.
pub fn schedule_guarded(
    delay: Duration,
    tx: &mpsc::UnboundedSender<SessionTask>,
    task: SessionTask,
) {
    let tx = tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if !task.ticket().is_live() {
            trace!(captured = task.ticket().captured(), "deferred action superseded");
            return;
        }
        // Receiver gone means the session is gone; nothing to do.
        let _ = tx.send(task);
    });
}
