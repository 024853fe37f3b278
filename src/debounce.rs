//! Debounced task primitive
//!
//! Coalesces a burst of triggers into at most one delayed action: each
//! `schedule` replaces the pending action and restarts the delay, so the
//! latest call always wins. The pending action runs exactly once on a
//! dedicated timer thread after a full quiet period.
//!
//! Used to throttle secondary re-analysis (outline extraction) so it runs
//! at most once per quiet period instead of once per keystroke.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

type Action = Box<dyn FnOnce() + Send + 'static>;

enum TimerMsg {
    Schedule(Action),
    Cancel,
}

/// Single-slot debounce timer
///
/// At most one action is pending at a time; scheduling a new one discards
/// the previous pending action without running it. Dropping the task stops
/// the timer thread, also without running a pending action.
pub struct DebouncedTask {
    tx: Sender<TimerMsg>,
    delay: Duration,
}

impl DebouncedTask {
    /// Create a debounced task with the given quiet-period delay
    pub fn new(delay: Duration) -> Self {
        let (tx, rx) = mpsc::channel::<TimerMsg>();

        thread::spawn(move || {
            let mut pending: Option<Action> = None;
            let mut deadline: Option<Instant> = None;

            loop {
                let msg = match deadline {
                    Some(when) => {
                        let timeout = when.saturating_duration_since(Instant::now());
                        match rx.recv_timeout(timeout) {
                            Ok(msg) => Some(msg),
                            Err(RecvTimeoutError::Timeout) => None,
                            Err(RecvTimeoutError::Disconnected) => break,
                        }
                    }
                    // Nothing pending: park until the next message
                    None => match rx.recv() {
                        Ok(msg) => Some(msg),
                        Err(_) => break,
                    },
                };

                match msg {
                    Some(TimerMsg::Schedule(action)) => {
                        pending = Some(action);
                        deadline = Some(Instant::now() + delay);
                    }
                    Some(TimerMsg::Cancel) => {
                        pending = None;
                        deadline = None;
                    }
                    None => {
                        // Quiet period elapsed with no new trigger
                        deadline = None;
                        if let Some(action) = pending.take() {
                            tracing::trace!("debounce quiet period elapsed, running action");
                            action();
                        }
                    }
                }
            }
        });

        Self { tx, delay }
    }

    /// The configured quiet-period delay
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record `action` as the pending action and (re)start the delay
    ///
    /// If called again before the timer fires, the previous pending action
    /// is discarded, not run.
    pub fn schedule(&self, action: impl FnOnce() + Send + 'static) {
        let _ = self.tx.send(TimerMsg::Schedule(Box::new(action)));
    }

    /// Clear the pending action and stop the timer without running it
    ///
    /// Idempotent; safe to call when nothing is pending.
    pub fn cancel(&self) {
        let _ = self.tx.send(TimerMsg::Cancel);
    }
}
