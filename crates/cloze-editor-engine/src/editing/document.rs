use std::ops::Range;

use crate::editing::commands::{apply_command, transform_selection_for_command, Cmd};
use crate::editing::node::Node;
use crate::editing::patch::Patch;
use crate::editing::position::{classify, nearest_caret, resolve, Adjacency, PositionError, ResolvedPos};
use crate::editing::snapshot::DocSnapshot;
use crate::parsing::parse_document;

/// The live document: a node tree plus the current selection and a version
/// counter for change detection.
///
/// The tree is owned exclusively by the editing surface and is only ever
/// replaced through [`Document::apply`]; offsets are valid against a single
/// version and are clamped (never fatal) when they go stale.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Node,
    /// Selection as a flattened-offset range; collapsed when start == end.
    selection: Range<usize>,
    version: u64,
}

impl Document {
    pub fn new(root: Node) -> Self {
        let mut doc = Self {
            root,
            selection: 0..0,
            version: 0,
        };
        let caret = doc.caret_near(0);
        doc.selection = caret..caret;
        doc
    }

    /// Build a document from source HTML, leniently: whatever the schema
    /// cannot place is dropped by the parser, never an error.
    pub fn from_html(html: &str) -> Self {
        Self::new(parse_document(html))
    }

    /// Apply a command, producing the new tree plus patch metadata. The
    /// selection is mapped mechanically through the edit; callers that need
    /// a policy-placed caret call [`Document::set_caret_near`] afterwards.
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        let (root, changed) = apply_command(&self.root, &cmd);
        self.root = root;

        let new_selection = transform_selection_for_command(&self.selection, &cmd);
        let new_selection = self.clamp_range(new_selection);
        self.selection = new_selection.clone();
        self.version += 1;

        Patch {
            changed,
            new_selection,
            version: self.version,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos<'_>, PositionError> {
        resolve(&self.root, pos)
    }

    pub fn classify(&self, offset: usize) -> Adjacency {
        classify(&self.root, offset)
    }

    /// Nearest valid caret position to `pos` in the current tree.
    pub fn caret_near(&self, pos: usize) -> usize {
        nearest_caret(&self.root, pos)
    }

    /// Collapse the selection to the nearest valid caret position, returning
    /// where it landed. Always called against the post-apply tree.
    pub fn set_caret_near(&mut self, pos: usize) -> usize {
        let caret = self.caret_near(pos);
        self.selection = caret..caret;
        caret
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    pub fn set_selection(&mut self, selection: Range<usize>) {
        self.selection = self.clamp_range(selection);
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Size of the root's content in the flattened coordinate space.
    pub fn content_size(&self) -> usize {
        self.root.content_size()
    }

    /// Concatenated text of the whole tree (structure ignored).
    pub fn text(&self) -> String {
        self.root.text_in()
    }

    pub fn snapshot(&self) -> DocSnapshot {
        DocSnapshot::of(&self.root)
    }

    fn clamp_range(&self, range: Range<usize>) -> Range<usize> {
        let size = self.content_size();
        let start = range.start.min(size);
        let end = range.end.clamp(start, size);
        start..end
    }
}
