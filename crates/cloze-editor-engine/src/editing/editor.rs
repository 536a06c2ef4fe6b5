use std::time::{Duration, Instant};

use crate::debounce::Debounce;
use crate::editing::commands::Cmd;
use crate::editing::document::Document;
use crate::editing::keymap;
use crate::editing::position::Adjacency;
use crate::editing::snapshot::{is_unchanged, DocSnapshot};
use crate::parsing::parse_fragment;

/// Coalescing window for fragment insertion and the deferred caret capture.
const SETTLE_WINDOW: Duration = Duration::from_millis(100);

/// The editor controller: one live document, the pristine baseline it is
/// compared against, and the throttled entry points the host drives.
///
/// Time never comes from a global clock; the host passes `Instant`s in and
/// pumps [`Editor::tick`], so the whole controller is deterministic under
/// test.
pub struct Editor {
    doc: Document,
    source: String,
    baseline: DocSnapshot,
    insert_queue: Debounce<String>,
    caret_capture: Debounce<usize>,
    /// Where queued fragment insertions land; updated by clicks and, after
    /// a settle delay, by edits.
    insert_pos: usize,
    on_change: Option<Box<dyn FnMut(bool)>>,
}

impl Editor {
    /// Build an editor from source HTML and baseline it as unchanged.
    pub fn from_html(source: &str) -> Self {
        let doc = Document::from_html(source);
        let baseline = doc.snapshot();
        let insert_pos = doc.selection().start;
        Self {
            doc,
            source: source.to_string(),
            baseline,
            insert_queue: Debounce::new(SETTLE_WINDOW),
            caret_capture: Debounce::new(SETTLE_WINDOW),
            insert_pos,
            on_change: None,
        }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    /// Current caret offset.
    pub fn caret(&self) -> usize {
        self.doc.selection().start
    }

    /// Host-reported selection update, clamped to the document.
    pub fn set_selection(&mut self, selection: std::ops::Range<usize>) {
        self.doc.set_selection(selection);
    }

    /// Whether the document differs structurally from its baseline.
    pub fn is_dirty(&self) -> bool {
        !is_unchanged(&self.baseline, &self.doc.snapshot())
    }

    /// Register the change listener. Called with the dirty flag after every
    /// applied transformation and on reset.
    pub fn set_on_change(&mut self, callback: impl FnMut(bool) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn handle_enter(&mut self, now: Instant) -> bool {
        let version = self.doc.version();
        let handled = keymap::handle_enter(&mut self.doc);
        if self.doc.version() != version {
            self.after_change(now);
        }
        handled
    }

    /// Space always runs a transaction, even when classification leaves the
    /// document untouched, so the listener fires unconditionally.
    pub fn handle_space(&mut self, now: Instant) -> bool {
        let handled = keymap::handle_space(&mut self.doc);
        self.after_change(now);
        handled
    }

    pub fn handle_text_input(&mut self, from: usize, to: usize, text: &str, now: Instant) -> bool {
        let handled = keymap::handle_text_input(&mut self.doc, from, to, text);
        if handled {
            self.after_change(now);
        }
        handled
    }

    /// Record a click as the insertion point for queued fragments.
    pub fn note_click(&mut self, offset: usize) {
        self.insert_pos = offset.min(self.doc.content_size());
    }

    /// Queue an HTML fragment for insertion at the recorded point. Requests
    /// inside the settle window coalesce; only the latest survives.
    pub fn queue_insert_html(&mut self, html: &str, now: Instant) {
        self.insert_queue.submit(html.to_string(), now);
    }

    /// Pump the clock: deliver a due fragment insertion and a due caret
    /// capture.
    pub fn tick(&mut self, now: Instant) {
        if let Some(html) = self.insert_queue.poll(now) {
            self.insert_fragment(&html, now);
        }
        if let Some(pos) = self.caret_capture.poll(now) {
            self.insert_pos = pos;
        }
    }

    /// Rebuild from the original source and re-baseline. Pending throttled
    /// work is dropped and the listener hears unchanged.
    pub fn reset(&mut self) {
        self.doc = Document::from_html(&self.source);
        self.baseline = self.doc.snapshot();
        self.insert_pos = self.doc.selection().start;
        self.insert_queue.cancel();
        self.caret_capture.cancel();
        self.notify();
    }

    fn insert_fragment(&mut self, html: &str, now: Instant) {
        let content = parse_fragment(html);
        if content.is_empty() {
            return;
        }
        let pos = self.insert_pos;
        let at = match self.doc.classify(pos) {
            Adjacency::Inside(_) => pos,
            Adjacency::After(_) => pos - 1,
            Adjacency::Before(_) => pos + 1,
            Adjacency::Outside => return,
        };
        let cmd = Cmd::ReplaceWith {
            range: at..at,
            content,
        };
        let size = cmd.inserted_size();
        self.doc.apply(cmd);
        self.doc.set_caret_near(at + size);
        self.after_change(now);
    }

    fn after_change(&mut self, now: Instant) {
        self.caret_capture.submit(self.doc.selection().start, now);
        self.notify();
    }

    fn notify(&mut self) {
        let dirty = self.is_dirty();
        if let Some(callback) = self.on_change.as_mut() {
            callback(dirty);
        }
    }
}
