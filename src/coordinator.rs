//! Highlight coordination
//!
//! The heart of the pipeline: reacts to every text mutation, decides what
//! region of the document must be re-analyzed, cancels stale analysis
//! before starting new work, and decides whether an analysis is large
//! enough to warrant a visible progress indicator.
//!
//! ## Pipeline
//!
//! ```text
//! EditNotification → on_edit (filter + pending slot)
//!                  → process_pending (next main-loop turn) → invalidate
//!                  → cancel stale task → SyntaxParser::request_highlight
//!                  → Progress → (background analysis)
//!                  → apply_highlight (stale guard) → TextStorage
//! ```
//!
//! The coordinator never blocks: it only starts and cancels work, and all
//! of its entry points complete in bounded time on the host's control
//! thread. The parser's analysis runs elsewhere and talks back through the
//! [`Progress`] handle and the host's apply call.

use std::sync::Arc;

use crate::config::CoordinatorConfig;
use crate::debounce::DebouncedTask;
use crate::events::{EditNotification, InvalidationRange};
use crate::progress::Progress;
use crate::style::{HighlightSpan, StyleProvider, StyledSpan};

/// External syntax parser boundary
///
/// `request_highlight` must be non-blocking: it returns immediately with a
/// handle whose state evolves asynchronously. `request_outline` is
/// fire-and-forget and is invoked from the outline debounce timer thread,
/// so implementations must be callable off the control thread.
pub trait SyntaxParser: Send + Sync {
    /// Begin re-highlighting `range`
    fn request_highlight(&self, range: InvalidationRange) -> Progress;

    /// Re-derive the document outline
    fn request_outline(&self);
}

/// External text storage boundary
///
/// Called only after the producing task has passed the stale guard, so an
/// implementation never sees results from superseded work.
pub trait TextStorage {
    /// Write resolved highlight spans back to the buffer
    fn apply_highlight(&self, spans: &[StyledSpan]);
}

/// Progress presentation boundary
///
/// The coordinator only decides *whether* to attach; presenter visibility
/// lifetime is owned by the UI layer.
pub trait ProgressSink {
    /// Surface a progress handle for an analysis worth showing
    fn attach(&self, progress: Progress);
}

/// Monotonic pipeline counters
///
/// The no-op paths (stale discards, supersedes, failures) are deliberate
/// behavior; the counters make them observable in tests and debug views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorMetrics {
    /// `request_highlight` calls issued
    pub highlights_requested: u64,
    /// Running analyses cancelled because a newer edit arrived
    pub tasks_superseded: u64,
    /// Highlight results discarded because their task was no longer current
    pub stale_applies_discarded: u64,
    /// Analyses that reported an internal failure
    pub analyses_failed: u64,
    /// Outline refreshes scheduled (the debounce coalesces these into far
    /// fewer `request_outline` calls)
    pub outline_scheduled: u64,
}

/// One outstanding request to the parser
struct AnalysisTask {
    id: u64,
    progress: Progress,
    /// This task's creation cancelled a running predecessor
    superseded_predecessor: bool,
    /// At least one partial result from this task was applied
    applied: bool,
}

/// Coordinates edit-driven re-highlighting for one document session
///
/// At most one analysis task is active at any time; starting a new one
/// cancels and replaces the previous one. All methods are non-blocking and
/// belong on the host's control thread.
pub struct HighlightCoordinator {
    config: CoordinatorConfig,
    parser: Arc<dyn SyntaxParser>,
    storage: Arc<dyn TextStorage>,
    sink: Arc<dyn ProgressSink>,
    styles: Arc<dyn StyleProvider>,
    outline: DebouncedTask,
    current: Option<AnalysisTask>,
    /// Deferred invalidation recorded by `on_edit`; a single slot where the
    /// latest edit wins
    pending: Option<InvalidationRange>,
    sequence: u64,
    composing: bool,
    metrics: CoordinatorMetrics,
}

impl HighlightCoordinator {
    /// Create a coordinator for one document session
    pub fn new(
        config: CoordinatorConfig,
        parser: Arc<dyn SyntaxParser>,
        storage: Arc<dyn TextStorage>,
        sink: Arc<dyn ProgressSink>,
        styles: Arc<dyn StyleProvider>,
    ) -> Self {
        let outline = DebouncedTask::new(config.outline_debounce());
        Self {
            config,
            parser,
            storage,
            sink,
            styles,
            outline,
            current: None,
            pending: None,
            sequence: 0,
            composing: false,
            metrics: CoordinatorMetrics::default(),
        }
    }

    /// React to a completed buffer mutation
    ///
    /// Attribute-only edits and edits made while an input-method
    /// composition is in progress are ignored entirely, leaving the
    /// current task untouched. Otherwise the edit's range is recorded in
    /// the pending slot (the latest edit wins) for the next
    /// [`process_pending`](Self::process_pending) — never analyzed
    /// synchronously, because the buffer's dependent structures may not
    /// have caught up with the mutation yet.
    pub fn on_edit(&mut self, notification: &EditNotification) {
        if !notification.is_character_edit() {
            tracing::trace!("ignoring attribute-only edit");
            return;
        }
        if self.composing {
            tracing::trace!("ignoring edit during input-method composition");
            return;
        }

        self.pending = Some(match self.pending.take() {
            // An Entire request subsumes any later per-edit range
            Some(InvalidationRange::Entire) => InvalidationRange::Entire,
            _ => InvalidationRange::Span(notification.edited_range),
        });
        self.schedule_outline();
    }

    /// Run the deferred invalidation recorded by [`on_edit`](Self::on_edit)
    ///
    /// The host calls this once per main-loop turn, after the edit
    /// callback has fully returned.
    pub fn process_pending(&mut self) {
        if let Some(range) = self.pending.take() {
            self.invalidate(range);
        }
    }

    /// Cancel stale analysis and start a new one for `range`
    pub fn invalidate(&mut self, range: InvalidationRange) {
        let mut resolved = range;
        let mut superseded = false;

        if let Some(task) = self.current.take() {
            if task.progress.is_running() {
                // Superseding cancel: newer work replaces older work.
                // Not a failure, no user-visible signal.
                task.progress.cancel();
                superseded = true;
                self.metrics.tasks_superseded += 1;
                tracing::debug!(task = task.id, "superseded running analysis");

                if task.superseded_predecessor && !task.applied {
                    // Rapid edits piled up without any partial application;
                    // the accumulated partial ranges are not trustworthy.
                    resolved = InvalidationRange::Entire;
                }
            }
        }

        self.sequence += 1;
        let progress = self.parser.request_highlight(resolved);
        self.metrics.highlights_requested += 1;
        tracing::debug!(task = self.sequence, range = ?resolved, "requested highlight");

        if resolved.meets_threshold(self.config.visibility_threshold) {
            self.sink.attach(progress.clone());
        }

        self.current = Some(AnalysisTask {
            id: self.sequence,
            progress,
            superseded_predecessor: superseded,
            applied: false,
        });
    }

    /// Request a whole-document re-highlight (e.g. the syntax style changed)
    ///
    /// Recorded in the pending slot and honored by the next
    /// [`process_pending`](Self::process_pending).
    pub fn invalidate_entire(&mut self) {
        self.pending = Some(InvalidationRange::Entire);
    }

    /// Apply highlight results produced by `progress`
    ///
    /// Stale guard: the producing handle must still be the current task's
    /// handle and must not be cancelled; otherwise the spans are discarded
    /// without touching the buffer. Accepted spans are resolved through
    /// the style provider and forwarded to the text storage.
    pub fn apply_highlight(&mut self, progress: &Progress, spans: &[HighlightSpan]) {
        let is_current = self
            .current
            .as_ref()
            .is_some_and(|task| task.progress.same_handle(progress));
        if !is_current || progress.is_cancelled() {
            self.metrics.stale_applies_discarded += 1;
            tracing::debug!("discarding stale highlight result");
            return;
        }

        let styles = &self.styles;
        let resolved: Vec<StyledSpan> = spans
            .iter()
            .filter_map(|span| match styles.style_for(&span.capture) {
                Some(style) => Some(StyledSpan {
                    range: span.range,
                    style,
                }),
                None => {
                    tracing::trace!(capture = %span.capture, "no style for capture");
                    None
                }
            })
            .collect();

        if let Some(task) = self.current.as_mut() {
            task.applied = true;
        }
        self.storage.apply_highlight(&resolved);
    }

    /// Record an internal parser failure for the given analysis
    ///
    /// The handle transitions to Finished with nothing applied; no retry,
    /// no user-facing error. Editing continues uncolored until the next
    /// edit triggers a fresh attempt.
    pub fn analysis_failed(&mut self, progress: &Progress, error: &str) {
        self.metrics.analyses_failed += 1;
        tracing::warn!(%error, "syntax analysis failed; highlights left unchanged");
        progress.complete();
    }

    /// Note that an input-method composition began
    ///
    /// Character edits are ignored until the composition commits.
    pub fn composition_began(&mut self) {
        self.composing = true;
    }

    /// Note that the input-method composition committed
    ///
    /// Conservatively invalidates the entire document: every intermediate
    /// edit was deliberately skipped, so no per-edit range is trustworthy.
    pub fn composition_committed(&mut self) {
        self.composing = false;
        self.pending = Some(InvalidationRange::Entire);
    }

    /// Whether an input-method composition is in progress
    pub fn is_composing(&self) -> bool {
        self.composing
    }

    /// Tear down the session (document closed)
    ///
    /// Cancels the current task if running and drops pending work. No
    /// user-cancelled semantics reach the presenter.
    pub fn cancel_all(&mut self) {
        self.pending = None;
        self.outline.cancel();
        if let Some(task) = self.current.take() {
            if task.progress.is_running() {
                task.progress.cancel();
                tracing::debug!(task = task.id, "cancelled analysis on teardown");
            }
        }
    }

    /// The current task's progress handle, if any
    pub fn current_progress(&self) -> Option<Progress> {
        self.current.as_ref().map(|task| task.progress.clone())
    }

    /// Pipeline counters
    pub fn metrics(&self) -> CoordinatorMetrics {
        self.metrics
    }

    fn schedule_outline(&mut self) {
        self.metrics.outline_scheduled += 1;
        let parser = Arc::clone(&self.parser);
        self.outline.schedule(move || parser.request_outline());
    }
}

impl Drop for HighlightCoordinator {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
