//! Shared fixtures for the integration tests: recording collaborators and
//! logging setup.

#![allow(clippy::nursery)] // Test infra prioritizes clarity over pedantry
#![allow(clippy::pedantic)] // Test infra prioritizes clarity over pedantry
#![allow(dead_code)] // Each test binary uses a different subset

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Once;
use std::time::{Duration, Instant};

use textcore::text::{Clipboard, ClipboardKind, Committer, MonospaceMeasure, Scrollbar, TextMeasure};

pub fn setup_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_test_writer()
            .try_init();
    });
}

/// 10x20 pixel cells.
pub fn monospace() -> Option<Rc<dyn TextMeasure>> {
    Some(Rc::new(MonospaceMeasure::new(10.0, 20.0)))
}

/// A commit as seen by the data model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    pub path: String,
    pub value: String,
    pub undo_label: Option<String>,
}

/// Committer that records into a shared log.
#[derive(Clone, Default)]
pub struct RecordingCommitter {
    pub log: Rc<RefCell<Vec<Commit>>>,
}

impl RecordingCommitter {
    pub fn values(&self) -> Vec<String> {
        self.log.borrow().iter().map(|c| c.value.clone()).collect()
    }
}

impl Committer for RecordingCommitter {
    fn commit(&mut self, path: &str, value: &str, undo_label: Option<&str>) {
        self.log.borrow_mut().push(Commit {
            path: path.to_string(),
            value: value.to_string(),
            undo_label: undo_label.map(str::to_string),
        });
    }
}

/// In-memory clipboard.
#[derive(Default)]
pub struct MemoryClipboard {
    pub text: RefCell<Option<String>>,
}

impl Clipboard for MemoryClipboard {
    fn get_text(&self, kind: ClipboardKind) -> Option<String> {
        assert_eq!(kind, ClipboardKind::Text);
        self.text.borrow().clone()
    }

    fn set_text(&self, kind: ClipboardKind, value: &str) {
        assert_eq!(kind, ClipboardKind::Text);
        *self.text.borrow_mut() = Some(value.to_string());
    }
}

/// Scrollbar state as last pushed by the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BarState {
    pub total: f32,
    pub visible: f32,
    pub offset: f32,
}

#[derive(Clone, Default)]
pub struct RecordingScrollbar {
    pub state: Rc<RefCell<BarState>>,
}

impl Scrollbar for RecordingScrollbar {
    fn set_range(&mut self, total: f32, visible: f32) {
        let mut state = self.state.borrow_mut();
        state.total = total;
        state.visible = visible;
    }

    fn scroll_to(&mut self, offset: f32) {
        self.state.borrow_mut().offset = offset;
    }
}

/// Manually advanced clock shared with the core under test.
#[derive(Clone)]
pub struct TestClock {
    now: Rc<Cell<Instant>>,
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn now(&self) -> Instant {
        self.now.get()
    }

    pub fn advance(&self, by: Duration) -> Instant {
        self.now.set(self.now.get() + by);
        self.now.get()
    }

    pub fn source(&self) -> impl Fn() -> Instant + 'static {
        let now = Rc::clone(&self.now);
        move || now.get()
    }
}

/// Invalidate callback counter.
#[derive(Clone, Default)]
pub struct RepaintCounter {
    pub count: Rc<Cell<usize>>,
}

impl RepaintCounter {
    pub fn callback(&self) -> impl FnMut() + 'static {
        let count = Rc::clone(&self.count);
        move || count.set(count.get() + 1)
    }

    pub fn take(&self) -> usize {
        self.count.replace(0)
    }
}
