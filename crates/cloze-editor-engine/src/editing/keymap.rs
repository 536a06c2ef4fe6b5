//! Per-key editing policy.
//!
//! Each handler classifies the caret against the nearest paragraph
//! boundary, builds one command, applies it, and re-resolves the caret
//! against the post-apply tree. The boolean result is the ownership signal:
//! `true` means the event is fully handled and default behavior must not
//! run, `false` defers to the default.

use crate::editing::commands::Cmd;
use crate::editing::document::Document;
use crate::editing::node::{Node, NodeKind};
use crate::editing::position::Adjacency;

/// Enter: paragraph splitting and insertion policy.
///
/// Owns the key completely: every branch reports handled, including the
/// no-change ones, so nothing else fires on Enter.
pub fn handle_enter(doc: &mut Document) -> bool {
    let sel = doc.selection();
    let (from, to) = (sel.start, sel.end);

    if from == to {
        match doc.classify(from) {
            Adjacency::Inside(para) => {
                let cmd = if from == para.end {
                    Cmd::InsertNode {
                        at: from,
                        node: Node::empty_paragraph(),
                    }
                } else {
                    Cmd::Split {
                        at: from,
                        force_paragraph: false,
                    }
                };
                doc.apply(cmd);
                doc.set_caret_near(from + 1);
            }
            Adjacency::After(_) => {
                // Content-preserving split just before the boundary, forcing
                // paragraph type on both halves.
                doc.apply(Cmd::Split {
                    at: from - 1,
                    force_paragraph: true,
                });
                doc.set_caret_near(from);
            }
            Adjacency::Before(para) => {
                let cmd = if from + 1 == para.end {
                    Cmd::InsertNode {
                        at: from + 1,
                        node: Node::empty_paragraph(),
                    }
                } else {
                    Cmd::Split {
                        at: from + 1,
                        force_paragraph: false,
                    }
                };
                doc.apply(cmd);
                doc.set_caret_near(from + 2);
            }
            Adjacency::Outside => {
                // No document change, but the event is still consumed.
            }
        }
        return true;
    }

    // Enter must never split inside a highlighted blank.
    if starts_in_blank(doc, from) {
        return true;
    }

    doc.apply(Cmd::ReplaceWith {
        range: from..to,
        content: vec![Node::empty_paragraph()],
    });
    doc.set_caret_near(from + 1);
    true
}

/// Space: replace the selection with a highlighted blank, shifting the
/// replacement window by the classification so the blank always lands
/// inside paragraph content.
pub fn handle_space(doc: &mut Document) -> bool {
    let sel = doc.selection();
    let (from, to) = (sel.start, sel.end);
    let blank = Node::blank();
    let size = blank.size();

    let window = match doc.classify(from) {
        Adjacency::Inside(_) => from..to,
        Adjacency::After(_) => from - 1..to - 1,
        Adjacency::Before(_) => from + 1..to + 1,
        Adjacency::Outside => {
            // Identity transaction: no edit, but the caret still resolves.
            doc.set_caret_near(from + 1);
            return true;
        }
    };

    let start = window.start;
    doc.apply(Cmd::ReplaceWith {
        range: window,
        content: vec![blank],
    });
    doc.set_caret_near(start + size);
    true
}

/// Plain character input: same window adjustment as Space, but inserting a
/// text node built from the literal input. Outside any paragraph the input
/// is rejected and default behavior decides.
pub fn handle_text_input(doc: &mut Document, from: usize, to: usize, text: &str) -> bool {
    let node = Node::text(text);
    let size = node.size();

    let window = match doc.classify(from) {
        Adjacency::Inside(_) => from..to,
        Adjacency::After(_) => from - 1..to - 1,
        Adjacency::Before(_) => from + 1..to + 1,
        Adjacency::Outside => return false,
    };

    let start = window.start;
    doc.apply(Cmd::ReplaceWith {
        range: window,
        content: vec![node],
    });
    doc.set_caret_near(start + size);
    true
}

fn starts_in_blank(doc: &Document, from: usize) -> bool {
    doc.resolve(from)
        .map(|rp| matches!(rp.node().kind(), NodeKind::Blank))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc_of(blocks: Vec<Node>) -> Document {
        Document::new(Node::doc(blocks))
    }

    // ============ Enter, collapsed selection ============

    #[test]
    fn enter_mid_paragraph_splits_it() {
        // "ab" with the caret between 'a' and 'b'.
        let mut doc = doc_of(vec![Node::paragraph(vec![Node::text("ab")])]);
        doc.set_selection(2..2);

        assert!(handle_enter(&mut doc));

        assert_eq!(
            doc.root(),
            &Node::doc(vec![
                Node::paragraph(vec![Node::text("a")]),
                Node::paragraph(vec![Node::text("b")]),
            ])
        );
        // Caret target from + 1 = 3 is a block boundary; it resolves into
        // the start of the second paragraph.
        assert_eq!(doc.selection(), 4..4);
    }

    #[test]
    fn enter_at_paragraph_end_appends_empty_paragraph() {
        let mut doc = doc_of(vec![Node::paragraph(vec![Node::text("ab")])]);
        doc.set_selection(3..3);

        assert!(handle_enter(&mut doc));

        assert_eq!(
            doc.root(),
            &Node::doc(vec![
                Node::paragraph(vec![Node::text("ab")]),
                Node::empty_paragraph(),
            ])
        );
        // Caret lands inside the new empty paragraph.
        assert_eq!(doc.selection(), 5..5);
    }

    #[test]
    fn enter_just_after_paragraph_splits_before_the_boundary() {
        // Caret at the document end, right after the paragraph close.
        let mut doc = doc_of(vec![Node::paragraph(vec![Node::text("ab")])]);
        doc.set_selection(4..4);

        assert!(handle_enter(&mut doc));

        assert_eq!(
            doc.root(),
            &Node::doc(vec![
                Node::paragraph(vec![Node::text("ab")]),
                Node::empty_paragraph(),
            ])
        );
        // Caret target stays at from = 4, resolving into the empty paragraph.
        assert_eq!(doc.selection(), 5..5);
    }

    #[test]
    fn enter_just_before_paragraph_splits_into_it() {
        // Caret at document start, before a non-empty paragraph.
        let mut doc = doc_of(vec![Node::paragraph(vec![Node::text("ab")])]);
        doc.set_selection(0..0);

        assert!(handle_enter(&mut doc));

        assert_eq!(
            doc.root(),
            &Node::doc(vec![
                Node::empty_paragraph(),
                Node::paragraph(vec![Node::text("ab")]),
            ])
        );
        assert_eq!(doc.selection(), 3..3);
    }

    #[test]
    fn enter_outside_any_paragraph_is_a_handled_no_op() {
        // A heading-only document: no adjacent paragraph anywhere.
        let mut doc = doc_of(vec![Node::other("h1", false, vec![Node::text("t")])]);
        let before = doc.root().clone();
        doc.set_selection(0..0);

        assert!(handle_enter(&mut doc));

        assert_eq!(doc.root(), &before);
        assert_eq!(doc.version(), 0);
    }

    // ============ Enter, non-collapsed selection ============

    #[test]
    fn enter_with_selection_in_blank_changes_nothing() {
        let mut doc = doc_of(vec![Node::paragraph(vec![
            Node::text("a"),
            Node::blank(),
            Node::text("b"),
        ])]);
        let before = doc.root().clone();
        // Blank content occupies [3, 4); select the space inside it.
        doc.set_selection(3..4);

        assert!(handle_enter(&mut doc));

        assert_eq!(doc.root(), &before);
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn enter_with_text_selection_replaces_it_with_empty_paragraph() {
        let mut doc = doc_of(vec![Node::paragraph(vec![Node::text("abcd")])]);
        doc.set_selection(2..4);

        assert!(handle_enter(&mut doc));

        assert_eq!(
            doc.root(),
            &Node::doc(vec![
                Node::paragraph(vec![Node::text("a")]),
                Node::empty_paragraph(),
                Node::paragraph(vec![Node::text("d")]),
            ])
        );
        // Caret target from + 1 = 3 lands in the empty paragraph.
        assert_eq!(doc.selection(), 4..4);
    }

    // ============ Space ============

    #[test]
    fn space_inside_paragraph_inserts_blank_and_places_caret_after() {
        let mut doc = doc_of(vec![Node::paragraph(vec![Node::text("ab")])]);
        doc.set_selection(2..2);

        assert!(handle_space(&mut doc));

        assert_eq!(
            doc.root(),
            &Node::doc(vec![Node::paragraph(vec![
                Node::text("a"),
                Node::blank(),
                Node::text("b"),
            ])])
        );
        // Insertion start 2 + blank size 3.
        assert_eq!(doc.selection(), 5..5);
    }

    #[test]
    fn space_just_after_paragraph_shifts_window_left() {
        let mut doc = doc_of(vec![Node::paragraph(vec![Node::text("ab")])]);
        doc.set_selection(4..4);

        assert!(handle_space(&mut doc));

        assert_eq!(
            doc.root(),
            &Node::doc(vec![Node::paragraph(vec![
                Node::text("ab"),
                Node::blank(),
            ])])
        );
        assert_eq!(doc.selection(), 6..6);
    }

    #[test]
    fn space_just_before_paragraph_shifts_window_right() {
        let mut doc = doc_of(vec![Node::paragraph(vec![Node::text("ab")])]);
        doc.set_selection(0..0);

        assert!(handle_space(&mut doc));

        assert_eq!(
            doc.root(),
            &Node::doc(vec![Node::paragraph(vec![
                Node::blank(),
                Node::text("ab"),
            ])])
        );
        assert_eq!(doc.selection(), 4..4);
    }

    #[test]
    fn space_replaces_selected_text_with_one_blank() {
        let mut doc = doc_of(vec![Node::paragraph(vec![Node::text("abcd")])]);
        doc.set_selection(2..4);

        assert!(handle_space(&mut doc));

        assert_eq!(
            doc.root(),
            &Node::doc(vec![Node::paragraph(vec![
                Node::text("a"),
                Node::blank(),
                Node::text("d"),
            ])])
        );
        assert_eq!(doc.selection(), 5..5);
    }

    #[test]
    fn space_outside_any_paragraph_is_handled_without_edit() {
        let mut doc = doc_of(vec![Node::other("h1", false, vec![Node::text("t")])]);
        let before = doc.root().clone();
        doc.set_selection(0..0);

        assert!(handle_space(&mut doc));

        assert_eq!(doc.root(), &before);
        assert_eq!(doc.version(), 0);
    }

    // ============ Plain text input ============

    #[test]
    fn text_input_inside_paragraph_inserts_literally() {
        let mut doc = doc_of(vec![Node::paragraph(vec![Node::text("ab")])]);

        assert!(handle_text_input(&mut doc, 2, 2, "xy"));

        assert_eq!(
            doc.root(),
            &Node::doc(vec![Node::paragraph(vec![Node::text("axyb")])])
        );
        assert_eq!(doc.selection(), 4..4);
    }

    #[test]
    fn text_input_after_paragraph_shifts_window_left() {
        let mut doc = doc_of(vec![Node::paragraph(vec![Node::text("ab")])]);

        assert!(handle_text_input(&mut doc, 4, 4, "c"));

        assert_eq!(
            doc.root(),
            &Node::doc(vec![Node::paragraph(vec![Node::text("abc")])])
        );
        assert_eq!(doc.selection(), 4..4);
    }

    #[test]
    fn text_input_outside_any_paragraph_is_rejected() {
        let mut doc = doc_of(vec![Node::other("h1", false, vec![Node::text("t")])]);
        let before = doc.root().clone();

        assert!(!handle_text_input(&mut doc, 0, 0, "x"));

        assert_eq!(doc.root(), &before);
    }
}
