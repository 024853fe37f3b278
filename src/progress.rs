//! Observable, cancellable progress handles
//!
//! A [`Progress`] represents one unit of asynchronous analysis work. It is
//! shared between the producer (fraction/description updates, completion)
//! and its observers (presenters, the coordinator's superseding cancel).
//!
//! State transitions are monotone: `Running` moves to `Finished` or
//! `Cancelled` exactly once, and field updates arriving after a terminal
//! transition are silently dropped so a slow producer cannot resurrect a
//! dismissed indicator. Cancellation is cooperative: `cancel()` signals
//! intent and the producer is expected to observe it promptly.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, Weak};

/// Lifecycle state of a progress handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    /// Work is in flight
    Running,
    /// Work completed naturally
    Finished,
    /// Work was cancelled (superseded or user-initiated)
    Cancelled,
}

impl ProgressPhase {
    /// Whether this is a terminal state
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, ProgressPhase::Running)
    }
}

/// Snapshot of a handle's observable fields, delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Fractional completion in `[0, 1]`
    pub fraction: f64,
    /// Human-readable status
    pub description: String,
    /// Current lifecycle state
    pub phase: ProgressPhase,
}

struct ProgressState {
    fraction: f64,
    description: String,
    phase: ProgressPhase,
    subscribers: Vec<Sender<ProgressEvent>>,
}

impl ProgressState {
    fn snapshot(&self) -> ProgressEvent {
        ProgressEvent {
            fraction: self.fraction,
            description: self.description.clone(),
            phase: self.phase,
        }
    }

    /// Deliver the current snapshot to all live subscribers, pruning
    /// disconnected ones.
    fn publish(&mut self) {
        let event = self.snapshot();
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Shared handle to one unit of cancellable analysis work
///
/// Cheap to clone; all clones observe and drive the same state.
#[derive(Clone)]
pub struct Progress {
    inner: Arc<Mutex<ProgressState>>,
}

impl Progress {
    /// Create a handle in the `Running` state
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ProgressState {
                fraction: 0.0,
                description: description.into(),
                phase: ProgressPhase::Running,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Current fractional completion
    pub fn fraction(&self) -> f64 {
        self.lock().fraction
    }

    /// Current status description
    pub fn description(&self) -> String {
        self.lock().description.clone()
    }

    /// Current lifecycle state
    pub fn phase(&self) -> ProgressPhase {
        self.lock().phase
    }

    /// Whether the handle is still running
    pub fn is_running(&self) -> bool {
        self.phase() == ProgressPhase::Running
    }

    /// Whether the handle was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.phase() == ProgressPhase::Cancelled
    }

    /// Whether the handle finished naturally
    pub fn is_finished(&self) -> bool {
        self.phase() == ProgressPhase::Finished
    }

    /// Update fractional completion
    ///
    /// Clamped into `[0, 1]` and never decreasing; dropped entirely once
    /// the handle is terminal.
    pub fn set_fraction(&self, fraction: f64) {
        let mut state = self.lock();
        if state.phase.is_terminal() {
            return;
        }
        let clamped = fraction.clamp(0.0, 1.0);
        if clamped <= state.fraction {
            return;
        }
        state.fraction = clamped;
        state.publish();
    }

    /// Update the status description; dropped once terminal
    pub fn set_description(&self, description: impl Into<String>) {
        let mut state = self.lock();
        if state.phase.is_terminal() {
            return;
        }
        state.description = description.into();
        state.publish();
    }

    /// Transition `Running → Finished`
    ///
    /// Called by the owning analysis on natural completion. No effect if
    /// the handle is already terminal, which guards the race where
    /// cancellation and completion arrive concurrently.
    pub fn complete(&self) {
        let mut state = self.lock();
        if state.phase.is_terminal() {
            return;
        }
        state.phase = ProgressPhase::Finished;
        tracing::debug!("analysis progress finished");
        state.publish();
    }

    /// Transition `Running → Cancelled`
    ///
    /// Idempotent; no effect if the handle is already terminal.
    pub fn cancel(&self) {
        let mut state = self.lock();
        if state.phase.is_terminal() {
            return;
        }
        state.phase = ProgressPhase::Cancelled;
        tracing::debug!("analysis progress cancelled");
        state.publish();
    }

    /// Subscribe to state changes
    ///
    /// The receiver is primed with an initial snapshot of the current
    /// state, then receives every subsequent accepted change. Dropping the
    /// receiver detaches the subscription.
    pub fn subscribe(&self) -> Receiver<ProgressEvent> {
        let (tx, rx) = mpsc::channel();
        let mut state = self.lock();
        let _ = tx.send(state.snapshot());
        state.subscribers.push(tx);
        rx
    }

    /// Downgrade to a weak handle that does not extend the lifetime
    pub fn downgrade(&self) -> WeakProgress {
        WeakProgress {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Whether two handles refer to the same underlying work
    pub fn same_handle(&self, other: &Progress) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProgressState> {
        // The guarded state is plain data; recover from a poisoned lock
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("Progress")
            .field("fraction", &state.fraction)
            .field("description", &state.description)
            .field("phase", &state.phase)
            .finish()
    }
}

/// Weak observer handle to a [`Progress`]
///
/// Presenters hold this form so observation never keeps a superseded
/// analysis alive.
#[derive(Clone)]
pub struct WeakProgress {
    inner: Weak<Mutex<ProgressState>>,
}

impl WeakProgress {
    /// Attempt to upgrade to a strong handle
    pub fn upgrade(&self) -> Option<Progress> {
        self.inner.upgrade().map(|inner| Progress { inner })
    }
}
