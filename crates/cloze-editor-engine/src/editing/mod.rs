/*!
 * # Editing Core Module
 *
 * The structured editing core for cloze documents: a small node tree, a
 * command algebra over it, and the key-handling policy built on top.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: the Node Tree
 * - The document is an owned **`Node`** tree (`Doc` → blocks → inline
 *   content) with schema validity enforced by construction
 * - Positions use the flattened coordinate convention: one position per
 *   text character, one per open/close boundary of every non-leaf node
 *
 * ### 2. Command-Based Editing
 * - All edits are **Commands** (`Cmd` enum): insert a node, split a
 *   textblock, replace a range with content
 * - `Document::apply(Cmd)` swaps in the new tree and returns a **`Patch`**
 *   with the changed ranges, mapped selection, and bumped version
 * - Stale or out-of-range offsets are clamped, never a panic
 *
 * ### 3. Position Classification
 * - **`resolve`** turns an offset into a `ResolvedPos` exposing the
 *   ancestor chain; **`classify`** reduces it to an `Adjacency` (inside a
 *   paragraph, just after one, just before one, or outside)
 * - The per-key policy in **`keymap`** is written entirely against
 *   adjacency, so every handler is a short match
 *
 * ### 4. Dirty Tracking via Snapshots
 * - **`DocSnapshot`** is the serializable structural form; the baseline
 *   taken at load (and on reset) is compared for deep equality after every
 *   edit
 *
 * ## Module Structure
 *
 * - **`node`**: `Node`, `NodeKind`, `Mark` and the schema-enforcing factory
 * - **`position`**: offset resolution, adjacency classification, nearest
 *   valid caret
 * - **`commands`**: `Cmd` enum and structural edit application
 * - **`keymap`**: Enter / Space / plain-text-input handlers
 * - **`document`**: `Document` (tree + selection + version) and `apply`
 * - **`patch`**: edit result metadata
 * - **`snapshot`**: structural serialization and the dirty comparator
 * - **`editor`**: the `Editor` controller (baseline, change listener,
 *   throttled fragment insertion, reset)
 *
 * ## Usage Pattern
 *
 * ```rust
 * use cloze_editor_engine::editing::*;
 *
 * // 1. Build a document from source HTML
 * let mut doc = Document::from_html("<p>hello</p>");
 *
 * // 2. Apply edits via commands
 * let patch = doc.apply(Cmd::ReplaceWith {
 *     range: 6..6,
 *     content: vec![Node::text("!")],
 * });
 * assert_eq!(patch.version, 1);
 *
 * // 3. Compare against a baseline for dirty state
 * let baseline = DocSnapshot::of(Document::from_html("<p>hello</p>").root());
 * assert!(!is_unchanged(&baseline, &doc.snapshot()));
 * ```
 */

// Module exports
pub mod commands;
pub mod document;
pub mod editor;
pub mod keymap;
pub mod node;
pub mod patch;
pub mod position;
pub mod snapshot;

// Public API re-exports
pub use commands::Cmd;
pub use document::Document;
pub use editor::Editor;
pub use keymap::{handle_enter, handle_space, handle_text_input};
pub use node::{Mark, Node, NodeKind, BLANK_CLASS};
pub use patch::Patch;
pub use position::{classify, nearest_caret, resolve, Adjacency, ParagraphSpan, PositionError, ResolvedPos};
pub use snapshot::{is_unchanged, DocSnapshot, NodeSnapshot};
