use crate::editing::node::{Node, NodeKind};

/// Error for offsets that do not exist in the document being resolved.
///
/// Stale offsets (taken against an older document version) surface here;
/// callers treat the error as "no enclosing node" rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("position {pos} outside of document (content size {size})")]
pub struct PositionError {
    pub pos: usize,
    pub size: usize,
}

/// One level of a resolved position's ancestor chain.
#[derive(Debug, Clone, Copy)]
struct Frame<'a> {
    node: &'a Node,
    /// Absolute position where `node`'s content begins.
    content_start: usize,
    /// Child index the position falls at or inside.
    index: usize,
}

/// A document offset together with its ancestor chain, so adjacency can be
/// classified without re-walking the tree.
///
/// `node()` is the deepest node whose content encloses the offset: for an
/// offset in the middle of a paragraph's text that is the paragraph, for an
/// offset between two top-level blocks it is the document root.
#[derive(Debug, Clone)]
pub struct ResolvedPos<'a> {
    pos: usize,
    path: Vec<Frame<'a>>,
}

impl<'a> ResolvedPos<'a> {
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Deepest node enclosing the offset.
    pub fn node(&self) -> &'a Node {
        self.frame().node
    }

    /// Absolute position where the enclosing node's content starts.
    pub fn start(&self) -> usize {
        self.frame().content_start
    }

    /// Absolute position where the enclosing node's content ends.
    pub fn end(&self) -> usize {
        self.start() + self.node().content_size()
    }

    /// Offset into the enclosing node's content.
    pub fn parent_offset(&self) -> usize {
        self.pos - self.start()
    }

    /// Index of the child the offset falls at or inside.
    pub fn index(&self) -> usize {
        self.frame().index
    }

    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    /// Child index recorded at a given ancestor depth (0 = document root).
    pub(crate) fn index_at(&self, depth: usize) -> usize {
        self.path[depth].index
    }

    /// Absolute content start of the ancestor at a given depth.
    pub(crate) fn start_at(&self, depth: usize) -> usize {
        self.path[depth].content_start
    }

    fn frame(&self) -> &Frame<'a> {
        self.path
            .last()
            .expect("resolved position always has a root frame")
    }
}

/// Resolve an offset against a document root.
///
/// Walks down from the root: a position on a child boundary stops at the
/// current node, a position inside a text leaf stops at the leaf's parent,
/// a position inside an element child descends into it.
pub fn resolve(root: &Node, pos: usize) -> Result<ResolvedPos<'_>, PositionError> {
    let size = root.content_size();
    if pos > size {
        return Err(PositionError { pos, size });
    }

    let mut path = Vec::new();
    let mut node = root;
    let mut content_start = 0usize;

    loop {
        let rel = pos - content_start;
        let mut offset = 0usize;
        let mut index = node.children().len();
        let mut descend: Option<(&Node, usize)> = None;

        for (i, child) in node.children().iter().enumerate() {
            let child_end = offset + child.size();
            if rel == offset {
                // On the boundary before this child.
                index = i;
                break;
            }
            if rel < child_end {
                index = i;
                if !child.is_leaf() {
                    descend = Some((child, content_start + offset + 1));
                }
                break;
            }
            offset = child_end;
        }

        path.push(Frame {
            node,
            content_start,
            index,
        });

        match descend {
            Some((child, child_content_start)) => {
                node = child;
                content_start = child_content_start;
            }
            None => break,
        }
    }

    Ok(ResolvedPos { pos, path })
}

/// Content span of the paragraph matched by a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParagraphSpan {
    /// Absolute start of the paragraph's content.
    pub start: usize,
    /// Absolute end of the paragraph's content.
    pub end: usize,
}

/// Which structural case an offset falls into relative to the nearest
/// paragraph boundary. Drives every branch of the command handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjacency {
    /// The node enclosing the offset is a paragraph.
    Inside(ParagraphSpan),
    /// The node enclosing `offset - 1` is a paragraph but the node at the
    /// offset is not: the caret sits just after a paragraph end.
    After(ParagraphSpan),
    /// Symmetric to `After`, using `offset + 1`.
    Before(ParagraphSpan),
    /// Neither adjacent node is a paragraph.
    Outside,
}

/// Classify an offset against the nearest paragraph boundary.
///
/// Checked in order inside -> after -> before -> outside; the precedence is
/// load-bearing because it selects which handler branch fires.
pub fn classify(root: &Node, offset: usize) -> Adjacency {
    if let Some(span) = paragraph_span(root, offset) {
        return Adjacency::Inside(span);
    }
    if let Some(span) = paragraph_span(root, offset.max(1) - 1) {
        return Adjacency::After(span);
    }
    if let Some(span) = paragraph_span(root, offset + 1) {
        return Adjacency::Before(span);
    }
    Adjacency::Outside
}

/// Content span of the paragraph enclosing `offset`, if any. Out-of-range
/// offsets simply fail the match.
fn paragraph_span(root: &Node, offset: usize) -> Option<ParagraphSpan> {
    let rp = resolve(root, offset).ok()?;
    match rp.node().kind() {
        NodeKind::Paragraph => Some(ParagraphSpan {
            start: rp.start(),
            end: rp.end(),
        }),
        _ => None,
    }
}

/// Nearest position to `pos` where a caret may sit (directly inside a
/// textblock). Searches forward first, then backward, and falls back to the
/// clamped input when the document has no textblock at all.
pub fn nearest_caret(root: &Node, pos: usize) -> usize {
    let size = root.content_size();
    let pos = pos.min(size);

    let valid = |p: usize| {
        resolve(root, p)
            .map(|rp| rp.node().is_textblock())
            .unwrap_or(false)
    };

    if let Some(found) = (pos..=size).find(|&p| valid(p)) {
        return found;
    }
    if let Some(found) = (0..pos).rev().find(|&p| valid(p)) {
        return found;
    }
    pos
}
