use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// CSS class carried by highlighted-blank spans so the surrounding UI can
/// style them distinctly.
pub const BLANK_CLASS: &str = "cloze-blank-hl";

/// Closed set of node kinds the editing policy dispatches on.
///
/// Keeping this a tagged enum (rather than comparing type-name strings)
/// means the compiler flags every match site when a new kind is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Document root. Contains block content only.
    Doc,
    /// Block-level unit containing only inline content.
    Paragraph,
    /// Inline highlighted-blank span. Contains only inline content,
    /// never block content.
    Blank,
    /// Text leaf.
    Text,
    /// Generic node from the base schema that the policy keeps but does
    /// not special-case (headings, hard breaks, ...).
    Other {
        name: String,
        /// Whether the node lives in inline context. Inline `Other`s are
        /// treated as leaves (size 1, like a hard break).
        inline: bool,
    },
}

/// Inline formatting marks carried by text nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    Strong,
    Em,
    Code,
}

/// A node in the document tree.
///
/// Positions follow the flattened coordinate convention: a text node
/// occupies one position per character, and every non-leaf node's open and
/// close boundary occupy one position each. `size` and `content_size` are
/// the only place this arithmetic lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    attrs: BTreeMap<String, String>,
    marks: Vec<Mark>,
    text: String,
    children: Vec<Node>,
}

impl Node {
    /// Document root wrapping block content. An empty document gets a
    /// single empty paragraph so there is always a valid caret position.
    pub fn doc(mut children: Vec<Node>) -> Self {
        children.retain(|c| c.is_block());
        if children.is_empty() {
            children.push(Node::empty_paragraph());
        }
        Self {
            kind: NodeKind::Doc,
            attrs: BTreeMap::new(),
            marks: Vec::new(),
            text: String::new(),
            children,
        }
    }

    /// Paragraph wrapping inline content. Block children are dropped,
    /// keeping the tree schema-valid by construction.
    pub fn paragraph(mut children: Vec<Node>) -> Self {
        children.retain(|c| c.is_inline());
        Self {
            kind: NodeKind::Paragraph,
            attrs: BTreeMap::new(),
            marks: Vec::new(),
            text: String::new(),
            children,
        }
    }

    pub fn empty_paragraph() -> Self {
        Self::paragraph(Vec::new())
    }

    /// The highlighted-blank span the Space command inserts: a single
    /// space wrapped in a span carrying the blank class.
    pub fn blank() -> Self {
        let mut attrs = BTreeMap::new();
        attrs.insert("class".to_string(), BLANK_CLASS.to_string());
        Self::blank_with_attrs(attrs, vec![Node::text(" ")])
    }

    /// Blank span with explicit attributes and content, as produced by the
    /// fragment parser. Block children are dropped.
    pub fn blank_with_attrs(attrs: BTreeMap<String, String>, mut children: Vec<Node>) -> Self {
        children.retain(|c| c.is_inline());
        Self {
            kind: NodeKind::Blank,
            attrs,
            marks: Vec::new(),
            text: String::new(),
            children,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::marked_text(text, Vec::new())
    }

    pub fn marked_text(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Self {
            kind: NodeKind::Text,
            attrs: BTreeMap::new(),
            marks,
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Generic node outside the policy's special cases. Inline `Other`s
    /// are leaves; block `Other`s behave like textblocks.
    pub fn other(name: impl Into<String>, inline: bool, mut children: Vec<Node>) -> Self {
        if inline {
            children.clear();
        } else {
            children.retain(|c| c.is_inline());
        }
        Self {
            kind: NodeKind::Other {
                name: name.into(),
                inline,
            },
            attrs: BTreeMap::new(),
            marks: Vec::new(),
            text: String::new(),
            children,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn attrs(&self) -> &BTreeMap<String, String> {
        &self.attrs
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Same node shell (kind, attrs) around new children.
    pub(crate) fn with_children(&self, children: Vec<Node>) -> Node {
        let mut node = self.clone();
        node.children = children;
        node
    }

    /// Text of this node if it is a text leaf.
    pub fn text_content(&self) -> &str {
        &self.text
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text)
    }

    pub fn is_inline(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Text | NodeKind::Blank | NodeKind::Other { inline: true, .. }
        )
    }

    pub fn is_block(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Paragraph | NodeKind::Other { inline: false, .. }
        )
    }

    /// Leaf nodes have no content positions of their own.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Text | NodeKind::Other { inline: true, .. }
        )
    }

    /// Textblocks are the only nodes a caret may sit directly inside.
    pub fn is_textblock(&self) -> bool {
        self.is_block()
    }

    /// Size of this node in the flattened coordinate space.
    pub fn size(&self) -> usize {
        match self.kind {
            NodeKind::Text => self.text.chars().count(),
            NodeKind::Other { inline: true, .. } => 1,
            _ => self.content_size() + 2,
        }
    }

    /// Size of this node's content (children), excluding its own boundary
    /// tokens.
    pub fn content_size(&self) -> usize {
        self.children.iter().map(Node::size).sum()
    }

    /// Concatenated text of this subtree, ignoring structure. Used by the
    /// split/merge tests and for debugging output.
    pub fn text_in(&self) -> String {
        if self.is_text() {
            return self.text.clone();
        }
        self.children.iter().map(Node::text_in).collect()
    }
}
