//! Per-session line editing state.

use crate::mode::EditorMode;

/// The mutable editing state every command-line session carries: cursor
/// offset, the mode to return to, and history browsing position.
///
/// `cursor` is a byte offset into the session text, always on a grapheme
/// cluster boundary.
#[derive(Debug, Clone)]
pub struct LineEdit {
    pub cursor: usize,
    /// Mode the editor was in when this line opened; escape and run return
    /// here.
    pub previous_mode: EditorMode,
    /// Index into the history entries while browsing with up/down, `None`
    /// when editing live text.
    pub history_index: Option<usize>,
    /// The live text snapshotted when history browsing began, restored when
    /// the user scrolls back past the newest entry.
    pub saved_text: String,
}

impl LineEdit {
    pub fn new(previous_mode: EditorMode) -> Self {
        Self {
            cursor: 0,
            previous_mode,
            history_index: None,
            saved_text: String::new(),
        }
    }
}
