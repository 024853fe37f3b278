//! Edit-to-highlight coordination core
//!
//! The scheduling and cancellation layer that sits between "user typed a
//! character" and "parser was asked to re-highlight the right range, and
//! nothing stale is left running". The syntax parser, text storage, style
//! lookup, and progress UI are external collaborators injected behind
//! narrow traits.
//!
//! ## Architecture
//!
//! ```text
//! EditNotification → HighlightCoordinator::on_edit (filter + pending slot)
//!                  → process_pending → invalidate (supersede-cancel)
//!                  → SyntaxParser::request_highlight → Progress
//!                  → (background analysis) → apply_highlight (stale guard)
//!                  → TextStorage::apply_highlight
//! ```
//!
//! Secondary re-analysis (outline extraction) is throttled through
//! [`DebouncedTask`] so a typing burst produces a single refresh. Large
//! analyses surface a [`Progress`] handle that a presenter observes via
//! [`presenter::ProgressSubscription`].

pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod events;
pub mod presenter;
pub mod progress;
pub mod style;
pub mod trace;

// Re-export commonly used types
pub use config::CoordinatorConfig;
pub use coordinator::{
    CoordinatorMetrics, HighlightCoordinator, ProgressSink, SyntaxParser, TextStorage,
};
pub use debounce::DebouncedTask;
pub use events::{EditFlags, EditNotification, InvalidationRange, TextRange};
pub use presenter::{PresenterEvent, PresenterOptions, ProgressSubscription};
pub use progress::{Progress, ProgressEvent, ProgressPhase, WeakProgress};
pub use style::{Color, HighlightSpan, Style, StyleProvider, StyledSpan};
