//! Shared test doubles for integration tests
//!
//! Note: Items may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tinct::{
    Color, CoordinatorConfig, HighlightCoordinator, InvalidationRange, Progress, ProgressSink,
    Style, StyleProvider, StyledSpan, SyntaxParser, TextStorage,
};

/// Records every highlight request and hands out the handles it created
#[derive(Default)]
pub struct RecordingParser {
    requests: Mutex<Vec<InvalidationRange>>,
    handles: Mutex<Vec<Progress>>,
    outline_calls: AtomicUsize,
}

impl RecordingParser {
    pub fn requests(&self) -> Vec<InvalidationRange> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Handle created for the nth request
    pub fn handle(&self, index: usize) -> Progress {
        self.handles.lock().unwrap()[index].clone()
    }

    pub fn last_handle(&self) -> Progress {
        self.handles.lock().unwrap().last().expect("no requests made").clone()
    }

    pub fn outline_calls(&self) -> usize {
        self.outline_calls.load(Ordering::SeqCst)
    }
}

impl SyntaxParser for RecordingParser {
    fn request_highlight(&self, range: InvalidationRange) -> Progress {
        self.requests.lock().unwrap().push(range);
        let progress = Progress::new("Coloring text…");
        self.handles.lock().unwrap().push(progress.clone());
        progress
    }

    fn request_outline(&self) {
        self.outline_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Records every apply that passed the stale guard
#[derive(Default)]
pub struct RecordingStorage {
    applies: Mutex<Vec<Vec<StyledSpan>>>,
}

impl RecordingStorage {
    pub fn applies(&self) -> Vec<Vec<StyledSpan>> {
        self.applies.lock().unwrap().clone()
    }

    pub fn apply_count(&self) -> usize {
        self.applies.lock().unwrap().len()
    }
}

impl TextStorage for RecordingStorage {
    fn apply_highlight(&self, spans: &[StyledSpan]) {
        self.applies.lock().unwrap().push(spans.to_vec());
    }
}

/// Records every handle the coordinator decided to surface
#[derive(Default)]
pub struct RecordingSink {
    attached: Mutex<Vec<Progress>>,
}

impl RecordingSink {
    pub fn attached(&self) -> Vec<Progress> {
        self.attached.lock().unwrap().clone()
    }

    pub fn attach_count(&self) -> usize {
        self.attached.lock().unwrap().len()
    }
}

impl ProgressSink for RecordingSink {
    fn attach(&self, progress: Progress) {
        self.attached.lock().unwrap().push(progress);
    }
}

/// Resolves every capture except "unknown" to a fixed style
pub struct TestStyles;

impl StyleProvider for TestStyles {
    fn style_for(&self, capture: &str) -> Option<Style> {
        (capture != "unknown").then(|| Style {
            foreground: Some(Color::rgb(0xc6, 0x78, 0xdd)),
            bold: false,
            italic: false,
        })
    }
}

/// A full pipeline with recording fakes at every boundary
pub struct Pipeline {
    pub parser: Arc<RecordingParser>,
    pub storage: Arc<RecordingStorage>,
    pub sink: Arc<RecordingSink>,
    pub coordinator: HighlightCoordinator,
}

impl Pipeline {
    pub fn new(config: CoordinatorConfig) -> Self {
        let parser = Arc::new(RecordingParser::default());
        let storage = Arc::new(RecordingStorage::default());
        let sink = Arc::new(RecordingSink::default());
        let coordinator = HighlightCoordinator::new(
            config,
            Arc::clone(&parser) as Arc<dyn SyntaxParser>,
            Arc::clone(&storage) as Arc<dyn TextStorage>,
            Arc::clone(&sink) as Arc<dyn ProgressSink>,
            Arc::new(TestStyles),
        );
        Self {
            parser,
            storage,
            sink,
            coordinator,
        }
    }
}
