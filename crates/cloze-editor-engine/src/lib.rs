pub mod debounce;
pub mod editing;
pub mod parsing;

// Re-export key types for easier usage
pub use debounce::Debounce;
pub use editing::{commands::*, document::*, editor::*, node::*, patch::*, position::*, snapshot::*};
pub use parsing::{parse_document, parse_fragment};
