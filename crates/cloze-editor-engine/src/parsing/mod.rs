//! Lenient HTML fragment parsing.
//!
//! Clipboard and programmatic HTML is messy: unclosed tags, stray `<`,
//! unknown elements, comments. The parser never fails; anything it cannot
//! place under the schema is unwrapped or dropped, and whatever remains
//! becomes a well-formed node tree.
//!
//! Recognized structure: `p` and `h1`..`h6` as textblocks, `span` as a
//! highlighted blank (keeping `class` and `style`), `b`/`strong`/`i`/`em`/
//! `code` as marks, `br` as an inline leaf. Everything else contributes
//! only its text.

mod cursor;

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::editing::node::{Mark, Node};
use cursor::Cursor;

/// Parse an HTML fragment into nodes: either a run of inline nodes (when
/// no block tag appears) or a list of blocks, with loose inline runs
/// wrapped into paragraphs.
pub fn parse_fragment(html: &str) -> Vec<Node> {
    let mut builder = FragmentBuilder::default();
    for token in tokenize(html) {
        builder.push(token);
    }
    builder.finish()
}

/// Parse source HTML into a full document tree. An inline-only fragment
/// becomes a single paragraph; an empty one becomes an empty document
/// (which the root constructor pads with an editable paragraph).
pub fn parse_document(html: &str) -> Node {
    let nodes = parse_fragment(html);
    if nodes.iter().any(Node::is_inline) {
        Node::doc(vec![Node::paragraph(nodes)])
    } else {
        Node::doc(nodes)
    }
}

// ---------------------------------------------------------------------------
// Tokenizer

#[derive(Debug, PartialEq)]
enum Token {
    Open {
        name: String,
        attrs: BTreeMap<String, String>,
        self_closing: bool,
    },
    Close {
        name: String,
    },
    Text(String),
}

fn tokenize(html: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut cur = Cursor::new(html);

    while !cur.eof() {
        if cur.starts_with(b"<!--") {
            skip_comment(&mut cur);
            continue;
        }
        if cur.peek() == Some(b'<') {
            let saved = cur.clone();
            match parse_tag(&mut cur) {
                Some(tok) => {
                    flush_text(&mut text, &mut tokens);
                    tokens.push(tok);
                }
                None => {
                    // Not a tag after all; the '<' is literal text.
                    cur = saved;
                    cur.bump();
                    text.push('<');
                }
            }
        } else {
            text.push_str(cur.take_until(b'<'));
        }
    }
    flush_text(&mut text, &mut tokens);
    tokens
}

fn flush_text(text: &mut String, tokens: &mut Vec<Token>) {
    if !text.is_empty() {
        let decoded = html_escape::decode_html_entities(text.as_str()).into_owned();
        tokens.push(Token::Text(decoded));
        text.clear();
    }
}

fn skip_comment(cur: &mut Cursor<'_>) {
    cur.bump_n(4);
    while !cur.eof() {
        if cur.starts_with(b"-->") {
            cur.bump_n(3);
            return;
        }
        cur.bump();
    }
}

/// Parse one tag starting at `<`. Returns `None` (cursor state undefined,
/// caller restores) when the input is not a well-formed tag.
fn parse_tag(cur: &mut Cursor<'_>) -> Option<Token> {
    cur.bump();
    let closing = cur.peek() == Some(b'/');
    if closing {
        cur.bump();
    }

    let name_start = cur.i;
    if !cur.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    while cur.peek().is_some_and(|b| b.is_ascii_alphanumeric()) {
        cur.bump();
    }
    let name = cur.s[name_start..cur.i].to_ascii_lowercase();

    // Scan to the closing '>', honoring quoted attribute values.
    let rest_start = cur.i;
    let mut quote: Option<u8> = None;
    loop {
        match cur.peek() {
            None => return None,
            Some(b'>') if quote.is_none() => break,
            Some(b @ (b'"' | b'\'')) => {
                match quote {
                    Some(q) if q == b => quote = None,
                    None => quote = Some(b),
                    _ => {}
                }
                cur.bump();
            }
            Some(_) => {
                cur.bump();
            }
        }
    }
    let raw = &cur.s[rest_start..cur.i];
    cur.bump();

    if closing {
        return Some(Token::Close { name });
    }
    Some(Token::Open {
        name,
        attrs: parse_attrs(raw),
        self_closing: raw.trim_end().ends_with('/'),
    })
}

static ATTR_RE: OnceLock<Regex> = OnceLock::new();

fn attr_re() -> &'static Regex {
    ATTR_RE.get_or_init(|| {
        Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+))"#)
            .expect("attribute regex is valid")
    })
}

fn parse_attrs(raw: &str) -> BTreeMap<String, String> {
    let mut attrs = BTreeMap::new();
    for caps in attr_re().captures_iter(raw) {
        let key = caps[1].to_ascii_lowercase();
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        let value = html_escape::decode_html_entities(value).into_owned();
        attrs.insert(key, value);
    }
    attrs
}

// ---------------------------------------------------------------------------
// Tree builder

enum BlockShell {
    Paragraph,
    Other(String),
}

/// Incremental builder mapping the token stream onto the schema.
///
/// Inline nodes land in the innermost open span, else the open textblock,
/// else a loose top-level run. Once any block tag appears, loose runs are
/// wrapped into paragraphs of their own.
#[derive(Default)]
struct FragmentBuilder {
    blocks: Vec<Node>,
    loose: Vec<Node>,
    open_block: Option<(BlockShell, Vec<Node>)>,
    open_blanks: Vec<(BTreeMap<String, String>, Vec<Node>)>,
    marks: Vec<Mark>,
    saw_block: bool,
}

impl FragmentBuilder {
    fn push(&mut self, token: Token) {
        match token {
            Token::Text(text) => self.push_text(&text),
            Token::Open {
                name,
                attrs,
                self_closing,
            } => self.open(&name, attrs, self_closing),
            Token::Close { name } => self.close(&name),
        }
    }

    fn open(&mut self, name: &str, attrs: BTreeMap<String, String>, self_closing: bool) {
        match name {
            "br" => self.push_inline(Node::other("br", true, Vec::new())),
            "span" => {
                let attrs = blank_attrs(attrs);
                if self_closing {
                    self.push_inline(Node::blank_with_attrs(attrs, Vec::new()));
                } else {
                    self.open_blanks.push((attrs, Vec::new()));
                }
            }
            "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                if !self.open_blanks.is_empty() {
                    // Block tags cannot nest in inline context; unwrap them.
                    return;
                }
                self.close_block();
                self.flush_loose();
                self.saw_block = true;
                let shell = if name == "p" {
                    BlockShell::Paragraph
                } else {
                    BlockShell::Other(name.to_string())
                };
                if self_closing {
                    self.blocks.push(build_block(shell, Vec::new()));
                } else {
                    self.open_block = Some((shell, Vec::new()));
                }
            }
            "b" | "strong" => self.marks.push(Mark::Strong),
            "i" | "em" => self.marks.push(Mark::Em),
            "code" => self.marks.push(Mark::Code),
            _ => {}
        }
    }

    fn close(&mut self, name: &str) {
        match name {
            "span" => {
                if let Some((attrs, children)) = self.open_blanks.pop() {
                    self.push_inline(Node::blank_with_attrs(attrs, children));
                }
            }
            "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                if self.open_blanks.is_empty() {
                    self.close_block();
                }
            }
            "b" | "strong" => self.remove_mark(Mark::Strong),
            "i" | "em" => self.remove_mark(Mark::Em),
            "code" => self.remove_mark(Mark::Code),
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        // Whitespace between blocks is formatting, not content.
        if self.open_blanks.is_empty() && self.open_block.is_none() && text.trim().is_empty() {
            return;
        }
        self.push_inline(Node::marked_text(text, self.active_marks()));
    }

    fn push_inline(&mut self, node: Node) {
        let target = if let Some((_, children)) = self.open_blanks.last_mut() {
            children
        } else if let Some((_, children)) = self.open_block.as_mut() {
            children
        } else {
            &mut self.loose
        };
        // Adjacent identically-marked text merges into one leaf.
        if node.is_text() {
            if let Some(last) = target.last_mut() {
                if last.is_text() && last.marks() == node.marks() {
                    let merged = format!("{}{}", last.text_content(), node.text_content());
                    *last = Node::marked_text(merged, node.marks().to_vec());
                    return;
                }
            }
        }
        target.push(node);
    }

    fn active_marks(&self) -> Vec<Mark> {
        let mut marks = Vec::new();
        for &m in &self.marks {
            if !marks.contains(&m) {
                marks.push(m);
            }
        }
        marks
    }

    fn remove_mark(&mut self, mark: Mark) {
        if let Some(i) = self.marks.iter().rposition(|&m| m == mark) {
            self.marks.remove(i);
        }
    }

    fn close_block(&mut self) {
        if let Some((shell, children)) = self.open_block.take() {
            self.blocks.push(build_block(shell, children));
        }
    }

    fn flush_loose(&mut self) {
        if !self.loose.is_empty() {
            let run = std::mem::take(&mut self.loose);
            self.blocks.push(Node::paragraph(run));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while let Some((attrs, children)) = self.open_blanks.pop() {
            self.push_inline(Node::blank_with_attrs(attrs, children));
        }
        self.close_block();
        if self.saw_block {
            self.flush_loose();
            self.blocks
        } else {
            self.loose
        }
    }
}

fn build_block(shell: BlockShell, children: Vec<Node>) -> Node {
    match shell {
        BlockShell::Paragraph => Node::paragraph(children),
        BlockShell::Other(name) => Node::other(name, false, children),
    }
}

/// Spans carry only the attributes the blank schema declares.
fn blank_attrs(mut attrs: BTreeMap<String, String>) -> BTreeMap<String, String> {
    attrs.retain(|k, _| k == "class" || k == "style");
    attrs
}
