use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::editing::node::{Mark, Node, NodeKind};

/// Serialized structural form of a node: kinds, attributes, marks, text and
/// child order are all significant; attribute key order is not (the map is
/// ordered). This is the form the dirty-state comparison runs over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    fn of(node: &Node) -> Self {
        Self {
            kind: node.kind().clone(),
            attrs: node.attrs().clone(),
            marks: node.marks().to_vec(),
            text: node.text_content().to_string(),
            content: node.children().iter().map(NodeSnapshot::of).collect(),
        }
    }
}

/// Immutable structural copy of a whole document. The baseline snapshot is
/// replaced, never mutated, exactly at construction and on reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocSnapshot {
    pub content: Vec<NodeSnapshot>,
}

impl DocSnapshot {
    pub fn of(root: &Node) -> Self {
        Self {
            content: root.children().iter().map(NodeSnapshot::of).collect(),
        }
    }
}

/// Structural deep equality between a baseline and the current snapshot.
pub fn is_unchanged(baseline: &DocSnapshot, current: &DocSnapshot) -> bool {
    baseline == current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_documents_compare_unchanged() {
        let a = Node::doc(vec![Node::paragraph(vec![Node::text("hi")])]);
        let b = Node::doc(vec![Node::paragraph(vec![Node::text("hi")])]);
        assert!(is_unchanged(&DocSnapshot::of(&a), &DocSnapshot::of(&b)));
    }

    #[test]
    fn text_difference_compares_changed() {
        let a = Node::doc(vec![Node::paragraph(vec![Node::text("hi")])]);
        let b = Node::doc(vec![Node::paragraph(vec![Node::text("ho")])]);
        assert!(!is_unchanged(&DocSnapshot::of(&a), &DocSnapshot::of(&b)));
    }

    #[test]
    fn block_order_is_significant() {
        let a = Node::doc(vec![
            Node::paragraph(vec![Node::text("1")]),
            Node::paragraph(vec![Node::text("2")]),
        ]);
        let b = Node::doc(vec![
            Node::paragraph(vec![Node::text("2")]),
            Node::paragraph(vec![Node::text("1")]),
        ]);
        assert!(!is_unchanged(&DocSnapshot::of(&a), &DocSnapshot::of(&b)));
    }

    #[test]
    fn attr_insertion_order_is_not_significant() {
        let mut ab = BTreeMap::new();
        ab.insert("class".to_string(), "x".to_string());
        ab.insert("style".to_string(), "y".to_string());
        let mut ba = BTreeMap::new();
        ba.insert("style".to_string(), "y".to_string());
        ba.insert("class".to_string(), "x".to_string());

        let a = Node::doc(vec![Node::paragraph(vec![Node::blank_with_attrs(
            ab,
            vec![Node::text(" ")],
        )])]);
        let b = Node::doc(vec![Node::paragraph(vec![Node::blank_with_attrs(
            ba,
            vec![Node::text(" ")],
        )])]);
        assert!(is_unchanged(&DocSnapshot::of(&a), &DocSnapshot::of(&b)));
    }

    #[test]
    fn snapshot_round_trips_through_serde() {
        let doc = Node::doc(vec![Node::paragraph(vec![
            Node::text("a"),
            Node::blank(),
        ])]);
        let snap = DocSnapshot::of(&doc);
        let json = serde_json::to_string(&snap).unwrap();
        let back: DocSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, back);
    }
}
