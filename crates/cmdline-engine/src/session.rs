//! The command-line session trait and its shared editing behavior.
//!
//! `:` command lines and `/`,`?` search lines differ in what happens on run,
//! escape, and Ctrl-F; everything about editing the line itself (cursor
//! motion, word operations, history browsing, display) is identical and
//! lives here as provided methods over a small accessor surface.

use cmdline_search::SearchState;
use cmdline_text::{big_word_left, big_word_right, next_boundary, prev_boundary, word_left};

use crate::context::{CommandLineContext, CommandLineKind};
use crate::decoration::SearchDecorations;
use crate::edit::LineEdit;
use crate::host::{EditorOps, HostContext};

/// One open command line. Implementors supply text storage and the
/// mode-specific operations; line editing comes for free.
pub trait CommandLine {
    fn kind(&self) -> CommandLineKind;

    /// The character shown before the text: `:`, `/` or `?`.
    fn prefix(&self) -> char;

    fn text(&self) -> &str;

    /// Replace the whole text. Implementations keep derived state in sync
    /// (re-parsing, pattern splitting) and clamp the cursor.
    fn set_text(&mut self, text: String);

    fn edit(&self) -> &LineEdit;
    fn edit_mut(&mut self) -> &mut LineEdit;

    /// The live search state, for search sessions.
    fn search_state(&self) -> Option<&SearchState> {
        None
    }

    /// Decorations to render while this line is open.
    fn decorations(
        &self,
        ctx: &CommandLineContext,
        editor: &dyn EditorOps,
    ) -> Option<SearchDecorations>;

    /// Commit the line (Enter).
    fn run(&mut self, ctx: &mut CommandLineContext, host: &mut HostContext<'_>);

    /// Abandon the line (Escape).
    fn escape(&mut self, ctx: &mut CommandLineContext, host: &mut HostContext<'_>);

    /// Hand off to the host's richer editing surface (Ctrl-F).
    fn ctrl_f(&mut self, ctx: &mut CommandLineContext, host: &mut HostContext<'_>);

    // Everything below is shared line editing.

    /// The line as rendered on the status row: prefix plus text with control
    /// characters in caret notation.
    fn display(&self) -> String {
        let mut out = String::with_capacity(self.text().len() + 1);
        out.push(self.prefix());
        out.push_str(&caret_escape(self.text()));
        out
    }

    /// Where the cursor sits within [`display`](Self::display), as a
    /// character column (caret escapes widen the text).
    fn display_cursor(&self) -> usize {
        let cursor = self.edit().cursor.min(self.text().len());
        1 + caret_escape(&self.text()[..cursor]).chars().count()
    }

    /// Insert typed characters at the cursor. Leaves history browsing.
    fn type_text(&mut self, input: &str) {
        let cursor = self.edit().cursor.min(self.text().len());
        let mut text = self.text().to_string();
        text.insert_str(cursor, input);
        self.set_text(text);
        self.edit_mut().cursor = cursor + input.len();
        self.edit_mut().history_index = None;
    }

    /// Step to the previous (older) history entry, snapshotting the live
    /// text on the first step.
    fn history_back(&mut self, ctx: &CommandLineContext) {
        let entries = ctx.history_entries(self.kind());
        if entries.is_empty() {
            return;
        }
        let next = match self.edit().history_index {
            None => {
                let snapshot = self.text().to_string();
                self.edit_mut().saved_text = snapshot;
                entries.len() - 1
            }
            Some(0) => return,
            Some(index) => index - 1,
        };
        let entry = entries[next].clone();
        self.edit_mut().history_index = Some(next);
        self.set_text(entry);
        let end = self.text().len();
        self.edit_mut().cursor = end;
    }

    /// Step to the next (newer) history entry; past the newest, restore the
    /// snapshotted live text.
    fn history_forward(&mut self, ctx: &CommandLineContext) {
        let Some(index) = self.edit().history_index else {
            return;
        };
        let entries = ctx.history_entries(self.kind());
        if index + 1 < entries.len() {
            let entry = entries[index + 1].clone();
            self.edit_mut().history_index = Some(index + 1);
            self.set_text(entry);
        } else {
            let saved = std::mem::take(&mut self.edit_mut().saved_text);
            self.edit_mut().history_index = None;
            self.set_text(saved);
        }
        let end = self.text().len();
        self.edit_mut().cursor = end;
    }

    /// Backspace. On an empty line this dismisses the session.
    fn backspace(&mut self, ctx: &mut CommandLineContext, host: &mut HostContext<'_>) {
        if self.text().is_empty() && self.edit().cursor == 0 {
            self.escape(ctx, host);
            return;
        }
        self.delete_char_back();
    }

    /// Forward delete. At the end of the line it acts as backspace, and on
    /// an empty line it dismisses the session.
    fn delete(&mut self, ctx: &mut CommandLineContext, host: &mut HostContext<'_>) {
        if self.text().is_empty() {
            self.escape(ctx, host);
            return;
        }
        if self.edit().cursor >= self.text().len() {
            self.delete_char_back();
        } else {
            self.delete_char_forward();
        }
    }

    /// Remove the grapheme cluster before the cursor.
    fn delete_char_back(&mut self) {
        let cursor = self.edit().cursor.min(self.text().len());
        if cursor == 0 {
            return;
        }
        let prev = prev_boundary(self.text(), cursor);
        let mut text = self.text().to_string();
        text.replace_range(prev..cursor, "");
        self.set_text(text);
        self.edit_mut().cursor = prev;
    }

    /// Remove the grapheme cluster after the cursor.
    fn delete_char_forward(&mut self) {
        let cursor = self.edit().cursor.min(self.text().len());
        if cursor >= self.text().len() {
            return;
        }
        let next = next_boundary(self.text(), cursor);
        let mut text = self.text().to_string();
        text.replace_range(cursor..next, "");
        self.set_text(text);
        self.edit_mut().cursor = cursor;
    }

    fn move_home(&mut self) {
        self.edit_mut().cursor = 0;
    }

    fn move_end(&mut self) {
        let end = self.text().len();
        self.edit_mut().cursor = end;
    }

    /// Move to the start of the big word at or before the cursor.
    fn move_word_left(&mut self) {
        let cursor = self.edit().cursor;
        self.edit_mut().cursor = big_word_left(self.text(), cursor).unwrap_or(0);
    }

    /// Move to the start of the next big word.
    fn move_word_right(&mut self) {
        let cursor = self.edit().cursor;
        let end = self.text().len();
        self.edit_mut().cursor = big_word_right(self.text(), cursor).unwrap_or(end);
    }

    /// Ctrl-W: delete back to the previous normal-word boundary.
    fn delete_word(&mut self) {
        let cursor = self.edit().cursor.min(self.text().len());
        let Some(boundary) = word_left(self.text(), cursor) else {
            return;
        };
        let mut text = self.text().to_string();
        text.replace_range(boundary..cursor, "");
        self.set_text(text);
        self.edit_mut().cursor = boundary;
    }

    /// Ctrl-U: delete everything before the cursor.
    fn delete_to_beginning(&mut self) {
        let cursor = self.edit().cursor.min(self.text().len());
        let mut text = self.text().to_string();
        text.replace_range(..cursor, "");
        self.set_text(text);
        self.edit_mut().cursor = 0;
    }
}

/// Control characters in caret notation (`^I`, `^[`, `^?`), everything else
/// verbatim.
pub fn caret_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\x7f' => out.push_str("^?"),
            c if (c as u32) < 0x20 => {
                out.push('^');
                out.push(char::from(c as u8 + 0x40));
            }
            c => out.push(c),
        }
    }
    out
}
