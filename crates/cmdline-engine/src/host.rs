//! Host integration traits.
//!
//! The command line never touches a buffer, a status bar, or a register
//! directly; everything goes through these traits so the engine stays
//! embeddable. A host editor implements them once and hands a [`HostContext`]
//! to each keystroke handler.

use cmdline_search::{DocumentSnapshot, SearchDirection};
use cmdline_text::Position;

use crate::mode::EditorMode;

/// Mutable view of the host editor: mode, cursor, buffer lines, viewport.
pub trait EditorOps {
    fn mode(&self) -> EditorMode;
    fn set_mode(&mut self, mode: EditorMode);

    fn cursor(&self) -> Position;
    fn set_cursor(&mut self, pos: Position);

    fn line_count(&self) -> usize;
    /// Line content without a trailing newline; `None` past the end.
    fn line(&self, index: usize) -> Option<String>;
    fn replace_line(&mut self, index: usize, text: String);

    /// Topmost buffer line currently visible in the viewport.
    fn first_visible_line(&self) -> usize;
    /// Scroll the viewport by `delta` lines (negative = up), without moving
    /// the cursor.
    fn scroll_by(&mut self, delta: isize);

    /// The count typed before the command that opened this line (`3/foo`
    /// means "third match"). Hosts without count support return 1.
    fn pending_count(&self) -> usize {
        1
    }

    /// Record whether the command that just ran may be repeated with `.`.
    fn set_dot_repeatable(&mut self, repeatable: bool);
}

/// Where user-facing messages go.
pub trait StatusLine {
    fn set_text(&mut self, text: &str, is_error: bool);

    /// Announce a successful search landing: `index` is zero-based in
    /// document order, shown to the user as "match {index+1} of {total}".
    fn report_search_result(&mut self, index: usize, total: usize) {
        self.set_text(&format!("match {} of {}", index + 1, total), false);
    }
}

/// What a readonly register receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterContent {
    Text(String),
    /// The executed line as individual keystrokes. The `:` register
    /// historically records keys, not text.
    Keys(Vec<char>),
}

/// Write-only access to the host's registers. The engine records the last
/// command (`:`) and last search (`/`); it never reads registers back.
pub trait RegisterFile {
    fn set_readonly(&mut self, name: char, content: RegisterContent);
}

/// Output of an external command engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutput {
    pub display_text: String,
    pub is_error: bool,
}

/// A richer ex implementation the host may provide (an embedded interpreter,
/// a remote process). When present, capable commands are delegated to it.
pub trait ExternalEngine {
    fn run(&mut self, command: &str) -> anyhow::Result<EngineOutput>;
}

/// Optional richer surfaces a host may offer on Ctrl-F. Defaults are no-ops
/// so minimal hosts implement nothing.
pub trait PickerHost {
    /// Open a full line editor seeded with the partially typed command.
    fn open_ex_editor(&mut self, initial: &str) {
        let _ = initial;
    }

    /// Open a picker over past searches in `direction`.
    fn open_search_picker(&mut self, direction: SearchDirection) {
        let _ = direction;
    }

    /// Let the user choose one of `items`; `None` means dismissed.
    fn pick(&mut self, items: &[String]) -> Option<usize> {
        let _ = items;
        None
    }
}

/// Everything a command-line operation may touch on the host, borrowed for
/// the duration of one keystroke.
pub struct HostContext<'a> {
    pub editor: &'a mut dyn EditorOps,
    pub status: &'a mut dyn StatusLine,
    pub registers: &'a mut dyn RegisterFile,
    pub engine: Option<&'a mut dyn ExternalEngine>,
    pub picker: &'a mut dyn PickerHost,
}

/// Adapter presenting an editor buffer as a searchable document.
pub struct EditorDocument<'a>(pub &'a dyn EditorOps);

impl DocumentSnapshot for EditorDocument<'_> {
    fn line_count(&self) -> usize {
        self.0.line_count()
    }

    fn line(&self, index: usize) -> Option<String> {
        self.0.line(index)
    }
}
