use std::ops::Range;

use crate::editing::node::Node;
use crate::editing::position::resolve;

/// Commands that can be applied to the document.
///
/// A command is the whole of one atomic transformation: applying it yields a
/// new tree and can never leave paragraphs or blanks holding block content.
/// Positions are clamped to the document, so a stale command degrades to a
/// harmless edit near the end rather than a panic.
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Insert a single node at a position. A block node inserted inside a
    /// textblock is hoisted to the nearest block boundary (or splits the
    /// textblock when the position is strictly inside its content).
    InsertNode { at: usize, node: Node },
    /// Split the textblock containing `at` in two. With `force_paragraph`
    /// both halves become plain paragraphs regardless of the original kind.
    Split { at: usize, force_paragraph: bool },
    /// Replace a range with new content. The content is either a run of
    /// inline nodes or a run of blocks (the fragment parser normalizes
    /// mixed fragments before building a command).
    ReplaceWith {
        range: Range<usize>,
        content: Vec<Node>,
    },
}

impl Cmd {
    /// Flattened size of the content this command inserts.
    pub(crate) fn inserted_size(&self) -> usize {
        match self {
            Cmd::InsertNode { node, .. } => node.size(),
            // A split adds one close and one open boundary token.
            Cmd::Split { .. } => 2,
            Cmd::ReplaceWith { content, .. } => content.iter().map(Node::size).sum(),
        }
    }
}

/// Apply a command to a document root, producing the new root and the
/// changed ranges (post-edit coordinates).
pub(crate) fn apply_command(root: &Node, cmd: &Cmd) -> (Node, Vec<Range<usize>>) {
    let size = root.content_size();
    match cmd {
        Cmd::InsertNode { at, node } => {
            let at = (*at).min(size);
            let new_root = insert_content(root, at, std::slice::from_ref(node));
            (new_root, vec![at..at + node.size()])
        }
        Cmd::Split {
            at,
            force_paragraph,
        } => {
            let at = (*at).min(size);
            let new_root = split_textblock(root, at, *force_paragraph);
            (new_root, vec![at..at + 2])
        }
        Cmd::ReplaceWith { range, content } => {
            let start = range.start.min(size);
            let end = range.end.clamp(start, size);
            let deleted = delete_range(root, start..end);
            let new_root = insert_content(&deleted, start, content);
            let inserted: usize = content.iter().map(Node::size).sum();
            (new_root, vec![start..start + inserted])
        }
    }
}

/// Mechanical selection mapping through a command. Handlers that care about
/// exact caret placement re-resolve it explicitly afterwards; this keeps the
/// selection sane when they do not.
pub(crate) fn transform_selection_for_command(
    sel: &Range<usize>,
    cmd: &Cmd,
) -> Range<usize> {
    let map = |p: usize| match cmd {
        Cmd::InsertNode { at, node } => {
            if p >= *at {
                p + node.size()
            } else {
                p
            }
        }
        Cmd::Split { at, .. } => {
            if p >= *at {
                p + 2
            } else {
                p
            }
        }
        Cmd::ReplaceWith { range, content } => {
            let inserted: usize = content.iter().map(Node::size).sum();
            if p <= range.start {
                p
            } else if p >= range.end {
                p - range.len() + inserted
            } else {
                // Inside the replaced window: land just after the new content.
                range.start + inserted
            }
        }
    };
    map(sel.start)..map(sel.end).max(map(sel.start))
}

/// Insert content at a position. Inline content splices into the enclosing
/// node; block content lands at the nearest block boundary, splitting the
/// enclosing textblock when the position is strictly inside it.
fn insert_content(root: &Node, at: usize, content: &[Node]) -> Node {
    if content.is_empty() {
        return root.clone();
    }
    if content.iter().any(Node::is_block) {
        let blocks: Vec<Node> = content.iter().filter(|n| n.is_block()).cloned().collect();
        insert_blocks(root, at, blocks)
    } else {
        insert_inline(root, at, content)
    }
}

fn insert_blocks(root: &Node, at: usize, blocks: Vec<Node>) -> Node {
    let Ok(rp) = resolve(root, at) else {
        return root.clone();
    };

    let mut children = root.children().to_vec();
    if rp.depth() == 0 {
        let index = rp.index_at(0);
        children.splice(index..index, blocks);
        return root.with_children(children);
    }

    let block_index = rp.index_at(0);
    let block = &root.children()[block_index];
    let rel = at - rp.start_at(1);

    if rel == 0 {
        children.splice(block_index..block_index, blocks);
    } else if rel >= block.content_size() {
        children.splice(block_index + 1..block_index + 1, blocks);
    } else {
        // Strictly inside: split the textblock and drop the blocks between
        // the halves. This is what replacing an inline range with a new
        // paragraph relies on.
        let (left, right) = split_inline(block.children(), rel);
        let mut replacement = vec![block.with_children(coalesce_text(left))];
        replacement.extend(blocks);
        replacement.push(block.with_children(coalesce_text(right)));
        children.splice(block_index..block_index + 1, replacement);
    }
    root.with_children(children)
}

fn insert_inline(root: &Node, at: usize, content: &[Node]) -> Node {
    let Ok(rp) = resolve(root, at) else {
        return root.clone();
    };
    if rp.depth() == 0 {
        // Block boundary: inline content cannot sit at doc level, wrap it.
        return insert_blocks(root, at, vec![Node::paragraph(content.to_vec())]);
    }
    splice_inline_rec(root, at, content)
}

/// Recursive splice mirroring the resolve walk: descend until the position
/// is a boundary or falls inside a text leaf, then splice there.
fn splice_inline_rec(node: &Node, rel_pos: usize, content: &[Node]) -> Node {
    fn rec(node: &Node, rel: usize, content: &[Node]) -> Node {
        let mut offset = 0usize;
        for (i, child) in node.children().iter().enumerate() {
            let end = offset + child.size();
            if rel == offset {
                break;
            }
            if rel < end {
                if !child.is_leaf() {
                    let mut children = node.children().to_vec();
                    children[i] = rec(child, rel - offset - 1, content);
                    return node.with_children(children);
                }
                break;
            }
            offset = end;
        }
        let (left, right) = split_inline(node.children(), rel);
        let mut children = left;
        children.extend(content.iter().cloned());
        children.extend(right);
        node.with_children(coalesce_text(children))
    }
    // The root's content starts at absolute 0, so the position needs no shift.
    rec(node, rel_pos, content)
}

/// Split a run of inline children at a content offset. An offset inside a
/// text leaf splits its text; an offset inside an opaque inline node snaps
/// to the boundary before it.
fn split_inline(children: &[Node], rel: usize) -> (Vec<Node>, Vec<Node>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut offset = 0usize;

    for child in children {
        let end = offset + child.size();
        if end <= rel {
            left.push(child.clone());
        } else if offset >= rel {
            right.push(child.clone());
        } else if child.is_text() {
            let cut = rel - offset;
            let head: String = child.text_content().chars().take(cut).collect();
            let tail: String = child.text_content().chars().skip(cut).collect();
            if !head.is_empty() {
                left.push(Node::marked_text(head, child.marks().to_vec()));
            }
            if !tail.is_empty() {
                right.push(Node::marked_text(tail, child.marks().to_vec()));
            }
        } else {
            right.push(child.clone());
        }
        offset = end;
    }
    (left, right)
}

/// Split the textblock containing `at` into two blocks. No-op when the
/// position sits on a block boundary (there is nothing to split).
fn split_textblock(root: &Node, at: usize, force_paragraph: bool) -> Node {
    let Ok(rp) = resolve(root, at) else {
        return root.clone();
    };
    if rp.depth() == 0 {
        return root.clone();
    }

    let block_index = rp.index_at(0);
    let block = &root.children()[block_index];
    let rel = at - rp.start_at(1);
    let (left, right) = split_inline(block.children(), rel);

    let (left_node, right_node) = if force_paragraph {
        (
            Node::paragraph(coalesce_text(left)),
            Node::paragraph(coalesce_text(right)),
        )
    } else {
        (
            block.with_children(coalesce_text(left)),
            block.with_children(coalesce_text(right)),
        )
    };

    let mut children = root.children().to_vec();
    children.splice(block_index..block_index + 1, [left_node, right_node]);
    root.with_children(children)
}

/// Delete a range from the document. Blocks fully covered disappear;
/// partially covered blocks are trimmed, and when the range runs from
/// strictly inside one block to strictly inside a later one the two
/// remainders merge into a single block.
fn delete_range(root: &Node, range: Range<usize>) -> Node {
    if range.is_empty() {
        return root.clone();
    }

    let mut kept: Vec<Node> = Vec::new();
    let mut left_open: Option<Node> = None;
    let mut offset = 0usize;

    for child in root.children() {
        let start = offset;
        let end = offset + child.size();
        offset = end;

        if end <= range.start || start >= range.end {
            if let Some(open) = left_open.take() {
                kept.push(open);
            }
            kept.push(child.clone());
            continue;
        }
        if range.start <= start && range.end >= end {
            // Fully covered.
            continue;
        }

        let content_start = start + 1;
        let content_end = end - 1;
        let local_start = range.start.clamp(content_start, content_end) - content_start;
        let local_end = range.end.clamp(content_start, content_end) - content_start;
        let trimmed = delete_in_inline(child.children(), local_start..local_end);

        let starts_inside = range.start > start;
        let ends_inside = range.end < end;
        match (starts_inside, ends_inside) {
            (true, true) => {
                // Range contained in one block.
                kept.push(child.with_children(coalesce_text(trimmed)));
            }
            (true, false) => {
                // Left edge of a cross-block range: hold it open for merge.
                left_open = Some(child.with_children(coalesce_text(trimmed)));
            }
            (false, true) => {
                match left_open.take() {
                    Some(open) => {
                        // Merge the right remainder into the left one.
                        let mut merged = open.children().to_vec();
                        merged.extend(trimmed);
                        kept.push(open.with_children(coalesce_text(merged)));
                    }
                    None => kept.push(child.with_children(coalesce_text(trimmed))),
                }
            }
            (false, false) => unreachable!("fully covered blocks are dropped above"),
        }
    }
    if let Some(open) = left_open.take() {
        kept.push(open);
    }
    root.with_children(kept)
}

/// Delete a content-relative range from a run of inline children. Partially
/// covered text is trimmed; a partially covered opaque inline node is
/// dropped whole.
fn delete_in_inline(children: &[Node], range: Range<usize>) -> Vec<Node> {
    let mut out = Vec::new();
    let mut offset = 0usize;

    for child in children {
        let start = offset;
        let end = offset + child.size();
        offset = end;

        if end <= range.start || start >= range.end {
            out.push(child.clone());
            continue;
        }
        if child.is_text() {
            let head_len = range.start.saturating_sub(start);
            let tail_from = range.end.saturating_sub(start).min(child.size());
            let head: String = child.text_content().chars().take(head_len).collect();
            let tail: String = child.text_content().chars().skip(tail_from).collect();
            if !head.is_empty() {
                out.push(Node::marked_text(head, child.marks().to_vec()));
            }
            if !tail.is_empty() {
                out.push(Node::marked_text(tail, child.marks().to_vec()));
            }
        }
        // Overlapped non-text inline nodes are dropped entirely.
    }
    out
}

/// Merge adjacent text nodes with identical marks so edits do not leave the
/// tree fragmented.
fn coalesce_text(children: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::new();
    for child in children {
        if child.is_text() {
            if let Some(last) = out.last_mut() {
                if last.is_text() && last.marks() == child.marks() {
                    let merged = format!("{}{}", last.text_content(), child.text_content());
                    *last = Node::marked_text(merged, child.marks().to_vec());
                    continue;
                }
            }
        }
        out.push(child);
    }
    out
}
