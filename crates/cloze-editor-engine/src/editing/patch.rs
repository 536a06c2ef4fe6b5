/// Result of applying a command to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Ranges touched by the edit, in post-edit coordinates.
    pub changed: Vec<std::ops::Range<usize>>,
    /// Selection after the mechanical transform through the edit.
    pub new_selection: std::ops::Range<usize>,
    /// Document version after the edit.
    pub version: u64,
}
