//! Editor modes as seen by the command line.
//!
//! Only the distinctions the command line cares about are modeled: which mode
//! to return to on escape, and whether an in-progress command line or search
//! is showing (live decorations key off this).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Normal,
    Insert,
    Visual,
    VisualLine,
    VisualBlock,
    /// A `:` command line is open and being edited.
    CommandLineInProgress,
    /// A `/` or `?` search line is open and being edited.
    SearchInProgress,
}
