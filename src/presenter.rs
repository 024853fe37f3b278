//! Progress presentation boundary
//!
//! [`ProgressSubscription`] implements the presenter-side observation
//! contract: an initial replay of the handle's current state, burst
//! coalescing with separate rate limits for fraction and description
//! updates, immediate delivery of terminal transitions, and the dismissal
//! rules around cancellation and completion.
//!
//! Rendering is external: a UI owns the subscription and polls it from its
//! own loop, the same non-blocking drain the host uses elsewhere. A
//! user-initiated cancel goes through
//! [`ProgressSubscription::request_cancel`], which only cancels the handle;
//! the coordinator discovers it through the handle's state, never through
//! presenter calls.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use crate::config::CoordinatorConfig;
use crate::progress::{Progress, ProgressEvent, ProgressPhase, WeakProgress};

/// Presenter-side tuning, usually derived from the coordinator config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenterOptions {
    /// Minimum interval between fraction updates
    pub fraction_throttle: Duration,
    /// Minimum interval between description updates
    pub description_throttle: Duration,
    /// Dismiss automatically when the analysis finishes
    pub auto_dismiss: bool,
}

impl Default for PresenterOptions {
    fn default() -> Self {
        Self {
            fraction_throttle: Duration::from_millis(200),
            description_throttle: Duration::from_millis(100),
            auto_dismiss: true,
        }
    }
}

impl PresenterOptions {
    /// Derive presenter options from the coordinator config
    pub fn from_config(config: &CoordinatorConfig) -> Self {
        Self {
            fraction_throttle: config.fraction_throttle(),
            description_throttle: config.description_throttle(),
            auto_dismiss: config.auto_dismiss,
        }
    }
}

/// What the UI should do after a poll
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterEvent {
    /// Render the given fraction/description
    Update(ProgressEvent),
    /// Analysis finished and auto-dismiss is off: show a terminal
    /// affordance and wait for [`ProgressSubscription::acknowledge`]
    ShowDone(ProgressEvent),
    /// Stop showing the indicator
    Dismiss,
}

/// One presenter's view of a [`Progress`] handle
///
/// Holds only a weak reference to the handle, so an attached presenter
/// never keeps a superseded analysis alive.
pub struct ProgressSubscription {
    handle: WeakProgress,
    rx: Receiver<ProgressEvent>,
    options: PresenterOptions,
    /// Latest undelivered snapshot; newer events replace it (burst
    /// coalescing — only the latest value in each interval is delivered)
    pending: Option<ProgressEvent>,
    shown_fraction: Option<f64>,
    shown_description: Option<String>,
    last_fraction_emit: Option<Instant>,
    last_description_emit: Option<Instant>,
    awaiting_ack: bool,
    detached: bool,
}

impl ProgressSubscription {
    /// Subscribe to a progress handle
    ///
    /// The handle's current state is replayed on the first poll.
    pub fn attach(progress: &Progress, options: PresenterOptions) -> Self {
        Self {
            handle: progress.downgrade(),
            rx: progress.subscribe(),
            options,
            pending: None,
            shown_fraction: None,
            shown_description: None,
            last_fraction_emit: None,
            last_description_emit: None,
            awaiting_ack: false,
            detached: false,
        }
    }

    /// Poll for the next presenter event (non-blocking)
    pub fn poll(&mut self) -> Option<PresenterEvent> {
        self.poll_at(Instant::now())
    }

    /// Deterministic variant of [`poll`](Self::poll) with an explicit clock
    pub fn poll_at(&mut self, now: Instant) -> Option<PresenterEvent> {
        if self.detached {
            return None;
        }

        let disconnected = self.drain();
        let Some(event) = self.pending.clone() else {
            if disconnected && !self.awaiting_ack {
                // The producer vanished without a terminal transition
                tracing::debug!("progress handle dropped; dismissing presenter");
                self.detached = true;
                return Some(PresenterEvent::Dismiss);
            }
            return None;
        };

        match event.phase {
            ProgressPhase::Cancelled => {
                // Immediate, regardless of configuration; any pending
                // render is dropped with it.
                self.pending = None;
                self.detached = true;
                Some(PresenterEvent::Dismiss)
            }
            ProgressPhase::Finished => {
                self.pending = None;
                if self.options.auto_dismiss {
                    self.detached = true;
                    Some(PresenterEvent::Dismiss)
                } else if !self.awaiting_ack {
                    self.awaiting_ack = true;
                    Some(PresenterEvent::ShowDone(event))
                } else {
                    None
                }
            }
            ProgressPhase::Running => self.emit_running(event, now),
        }
    }

    /// User-initiated cancel
    ///
    /// Cancels the handle; coordinator state is untouched. The resulting
    /// terminal transition comes back through the subscription like any
    /// other state change.
    pub fn request_cancel(&self) {
        if let Some(progress) = self.handle.upgrade() {
            progress.cancel();
        }
    }

    /// Acknowledge a [`PresenterEvent::ShowDone`] affordance
    pub fn acknowledge(&mut self) {
        if self.awaiting_ack {
            self.awaiting_ack = false;
            self.detached = true;
        }
    }

    /// Whether the subscription has ended
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Merge every queued event into the single pending slot
    ///
    /// Returns true when the channel is disconnected.
    fn drain(&mut self) -> bool {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.pending = Some(event),
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => return true,
            }
        }
    }

    fn emit_running(&mut self, event: ProgressEvent, now: Instant) -> Option<PresenterEvent> {
        let fraction_changed = self.shown_fraction != Some(event.fraction);
        let description_changed =
            self.shown_description.as_deref() != Some(event.description.as_str());
        if !fraction_changed && !description_changed {
            self.pending = None;
            return None;
        }

        let fraction_due = self
            .last_fraction_emit
            .is_none_or(|last| now.saturating_duration_since(last) >= self.options.fraction_throttle);
        let description_due = self.last_description_emit.is_none_or(|last| {
            now.saturating_duration_since(last) >= self.options.description_throttle
        });

        if (fraction_changed && fraction_due) || (description_changed && description_due) {
            self.pending = None;
            if fraction_changed {
                self.shown_fraction = Some(event.fraction);
                self.last_fraction_emit = Some(now);
            }
            if description_changed {
                self.shown_description = Some(event.description.clone());
                self.last_description_emit = Some(now);
            }
            Some(PresenterEvent::Update(event))
        } else {
            // Not due yet; the snapshot stays pending so a later poll can
            // deliver it even with no new events.
            None
        }
    }
}
