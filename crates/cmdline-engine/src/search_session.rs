//! The `/` and `?` incremental search session.

use cmdline_search::{SearchDirection, SearchState};
use cmdline_text::Span;
use tracing::info;

use crate::context::{CommandLineContext, CommandLineKind};
use crate::decoration::{SearchDecorations, decorations_for_search_match_ranges};
use crate::edit::LineEdit;
use crate::error::VimError;
use crate::host::{EditorDocument, EditorOps, HostContext, RegisterContent};
use crate::mode::EditorMode;
use crate::session::CommandLine;

pub struct SearchSession {
    edit: LineEdit,
    state: SearchState,
    /// How many matches past the default landing spot Ctrl-G/Ctrl-T have
    /// walked, in units of the typed count. Resets when the pattern is
    /// cleared.
    displacement: isize,
    /// Viewport top when the search opened; escape undoes any scrolling the
    /// incremental preview caused.
    initial_first_visible_line: usize,
}

impl SearchSession {
    pub fn new(direction: SearchDirection, previous_mode: EditorMode, editor: &dyn EditorOps) -> Self {
        Self {
            edit: LineEdit::new(previous_mode),
            state: SearchState::new(direction, editor.cursor()),
            displacement: 0,
            initial_first_visible_line: editor.first_visible_line(),
        }
    }

    pub fn displacement(&self) -> isize {
        self.displacement
    }

    /// The match the cursor will land on: its span, zero-based index in
    /// document order, and the total count.
    ///
    /// The landing spot is the `count`-th match in the search direction from
    /// the origin, shifted `displacement` counts further. Without `wrapscan`
    /// a shift past either end fails with the corresponding hit-top or
    /// hit-bottom error.
    pub fn current_match(
        &self,
        ctx: &CommandLineContext,
        editor: &dyn EditorOps,
    ) -> Result<(Span, usize, usize), VimError> {
        let doc = EditorDocument(editor);
        let opts = ctx.search_options();
        let spans = self.state.match_spans(&doc, &opts);
        if spans.is_empty() {
            return Err(VimError::PatternNotFound(self.state.pattern().to_string()));
        }

        let hit_end = |direction: SearchDirection| match direction {
            SearchDirection::Forward => {
                VimError::SearchHitBottom(self.state.pattern().to_string())
            }
            SearchDirection::Backward => VimError::SearchHitTop(self.state.pattern().to_string()),
        };

        // First match in the search direction from the origin.
        let base = self
            .state
            .next_match_in(&spans, self.state.start, SearchDirection::Forward, &opts)
            .ok_or_else(|| hit_end(self.state.direction))?;

        let total = spans.len() as isize;
        let count = editor.pending_count().max(1) as isize;
        let rank = (count - 1) + self.displacement * count;
        let index = base.1 as isize + self.state.direction.signum() * rank;
        let index = if opts.wrapscan {
            index.rem_euclid(total)
        } else if index < 0 {
            return Err(hit_end(SearchDirection::Backward));
        } else if index >= total {
            return Err(hit_end(SearchDirection::Forward));
        } else {
            index
        };
        Ok((spans[index as usize], index as usize, total as usize))
    }

    /// Ctrl-G / Ctrl-T: walk the landing spot one count in `key_direction`.
    /// The key direction is composed with the search direction so that
    /// "next" always walks forward through the document, on `?` searches
    /// too. Rolls back when the shifted spot does not resolve, and reports
    /// whether anything changed.
    pub fn advance_current_match(
        &mut self,
        ctx: &CommandLineContext,
        editor: &dyn EditorOps,
        key_direction: SearchDirection,
    ) -> bool {
        let delta = key_direction.signum() * self.state.direction.signum();
        let previous = self.displacement;
        self.displacement += delta;
        if self.current_match(ctx, editor).is_err() {
            self.displacement = previous;
            return false;
        }
        true
    }
}

impl CommandLine for SearchSession {
    fn kind(&self) -> CommandLineKind {
        CommandLineKind::Search
    }

    fn prefix(&self) -> char {
        self.state.direction.prefix()
    }

    fn text(&self) -> &str {
        self.state.pattern()
    }

    fn set_text(&mut self, text: String) {
        self.state.set_pattern(&text);
        if text.is_empty() {
            self.displacement = 0;
        }
        self.edit.cursor = self.edit.cursor.min(text.len());
    }

    fn edit(&self) -> &LineEdit {
        &self.edit
    }

    fn edit_mut(&mut self) -> &mut LineEdit {
        &mut self.edit
    }

    fn search_state(&self) -> Option<&SearchState> {
        Some(&self.state)
    }

    fn decorations(
        &self,
        ctx: &CommandLineContext,
        editor: &dyn EditorOps,
    ) -> Option<SearchDecorations> {
        if editor.mode() != EditorMode::SearchInProgress {
            return None;
        }
        if self.state.needle().is_empty() {
            return None;
        }
        let doc = EditorDocument(editor);
        let opts = ctx.search_options();
        let spans = self.state.match_spans(&doc, &opts);
        if spans.is_empty() {
            return None;
        }
        let current = self
            .current_match(ctx, editor)
            .ok()
            .map(|(_, index, _)| index);
        let line_len = |l: usize| editor.line(l).map(|s| s.chars().count()).unwrap_or(0);
        Some(decorations_for_search_match_ranges(&spans, current, line_len))
    }

    fn run(&mut self, ctx: &mut CommandLineContext, host: &mut HostContext<'_>) {
        if self.state.pattern().is_empty() {
            // A bare `/` or `?` repeats the most recent search.
            let Some(previous) = ctx.previous_searches().last() else {
                host.editor.set_mode(self.edit.previous_mode);
                return;
            };
            let pattern = previous.pattern().to_string();
            self.state.set_pattern(&pattern);
        }
        let pattern = self.state.pattern().to_string();
        self.edit.cursor = 0;
        self.edit.history_index = None;
        info!(target: "cmdline.search", pattern = %pattern, direction = ?self.state.direction, "run_search");

        host.editor.set_mode(self.edit.previous_mode);
        host.registers
            .set_readonly('/', RegisterContent::Text(pattern));
        ctx.push_previous_search(&self.state);
        ctx.set_last_search(self.state.clone());
        ctx.set_highlight_matches(true);

        match self.current_match(ctx, &*host.editor) {
            Err(err) => host.status.set_text(&err.to_string(), true),
            Ok((span, index, total)) => {
                let target = {
                    let doc = EditorDocument(&*host.editor);
                    self.state.resolve_cursor(&doc, span)
                };
                host.editor.set_cursor(target);
                host.status.report_search_result(index, total);
            }
        }
    }

    fn escape(&mut self, ctx: &mut CommandLineContext, host: &mut HostContext<'_>) {
        host.editor.set_cursor(self.state.start);
        ctx.sync_last_search();
        if host.editor.mode() == EditorMode::SearchInProgress {
            // Undo viewport movement the live preview caused.
            let drift =
                host.editor.first_visible_line() as isize - self.initial_first_visible_line as isize;
            if drift != 0 {
                host.editor.scroll_by(-drift);
            }
        }
        host.editor.set_mode(self.edit.previous_mode);
        if !self.state.pattern().is_empty() {
            ctx.push_previous_search(&self.state);
        }
    }

    fn ctrl_f(&mut self, _ctx: &mut CommandLineContext, host: &mut HostContext<'_>) {
        host.picker.open_search_picker(self.state.direction);
    }
}
