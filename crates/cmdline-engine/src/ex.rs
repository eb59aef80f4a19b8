//! The `:` command-line session.

use tracing::{debug, error, info};

use crate::builtin::BuiltinExParser;
use crate::context::{CommandLineContext, CommandLineKind};
use crate::decoration::SearchDecorations;
use crate::dispatch::{CommandKind, ExParser, ParsedLine};
use crate::edit::LineEdit;
use crate::error::{ExecError, VimError};
use crate::host::{EditorOps, HostContext, RegisterContent};
use crate::mode::EditorMode;
use crate::session::CommandLine;

pub struct ExSession {
    text: String,
    edit: LineEdit,
    parser: Box<dyn ExParser>,
    /// Current parse of `text`, refreshed on every edit; `None` while the
    /// line is not a valid command.
    parsed: Option<ParsedLine>,
}

impl ExSession {
    pub fn new(previous_mode: EditorMode) -> Self {
        Self::with_parser(previous_mode, Box::new(BuiltinExParser))
    }

    /// A session using the host's own grammar instead of the builtin one.
    pub fn with_parser(previous_mode: EditorMode, parser: Box<dyn ExParser>) -> Self {
        Self {
            text: String::new(),
            edit: LineEdit::new(previous_mode),
            parser,
            parsed: None,
        }
    }

    /// A session pre-filled with text, cursor at the end (`:` after a visual
    /// selection, or a host seeding `s/`).
    pub fn with_text(previous_mode: EditorMode, initial: &str) -> Self {
        let mut session = Self::new(previous_mode);
        session.set_text(initial.to_string());
        session.edit.cursor = session.text.len();
        session
    }

    pub fn parsed(&self) -> Option<&ParsedLine> {
        self.parsed.as_ref()
    }

    fn reparse(&mut self) {
        self.parsed = match self.parser.parse(&self.text) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!(target: "cmdline.ex", line = %self.text, error = %e, "parse_incomplete");
                None
            }
        };
    }
}

/// Run `text` through the external engine and put its output on the status
/// line.
fn delegate(host: &mut HostContext<'_>, text: &str) -> Result<(), ExecError> {
    let Some(engine) = host.engine.as_deref_mut() else {
        return Err(VimError::NotAnEditorCommand(text.to_string()).into());
    };
    let output = engine.run(text).map_err(ExecError::Unexpected)?;
    host.status.set_text(&output.display_text, output.is_error);
    Ok(())
}

impl CommandLine for ExSession {
    fn kind(&self) -> CommandLineKind {
        CommandLineKind::Ex
    }

    fn prefix(&self) -> char {
        ':'
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
        self.edit.cursor = self.edit.cursor.min(self.text.len());
        self.reparse();
    }

    fn edit(&self) -> &LineEdit {
        &self.edit
    }

    fn edit_mut(&mut self) -> &mut LineEdit {
        &mut self.edit
    }

    fn decorations(
        &self,
        ctx: &CommandLineContext,
        editor: &dyn EditorOps,
    ) -> Option<SearchDecorations> {
        if editor.mode() != EditorMode::CommandLineInProgress {
            return None;
        }
        let parsed = self.parsed.as_ref()?;
        if parsed.command.kind() != CommandKind::Substitute {
            return None;
        }
        parsed
            .command
            .decorations(editor, parsed.range.as_ref(), ctx.config().display.tabstop)
    }

    fn run(&mut self, ctx: &mut CommandLineContext, host: &mut HostContext<'_>) {
        let text = self.text.clone();
        info!(target: "cmdline.ex", command = %text, "run_ex");
        ctx.add_history(CommandLineKind::Ex, &text);
        self.edit.history_index = None;
        host.editor.set_mode(self.edit.previous_mode);

        // The executed line lands in the ':' register as keystrokes, except
        // when the command itself is a register command.
        let register_kind = self
            .parsed
            .as_ref()
            .is_some_and(|p| p.command.kind() == CommandKind::Register);
        if !register_kind {
            host.registers
                .set_readonly(':', RegisterContent::Keys(text.chars().collect()));
        }

        let result = match &self.parsed {
            None => Err(VimError::NotAnEditorCommand(text.clone()).into()),
            Some(parsed) => {
                if parsed.command.externally_capable() && host.engine.is_some() {
                    delegate(host, &text)
                } else if let Some(range) = &parsed.range {
                    parsed.command.execute_with_range(ctx, host, range)
                } else {
                    parsed.command.execute(ctx, host)
                }
            }
        };

        // A command the builtin grammar does not know may still be one the
        // external engine understands.
        let result = match result {
            Err(ExecError::Vim(VimError::NotAnEditorCommand(_))) if host.engine.is_some() => {
                delegate(host, &text)
            }
            other => other,
        };

        let unexpected = matches!(result, Err(ExecError::Unexpected(_)));
        match result {
            Ok(()) => {}
            Err(ExecError::Vim(err)) => host.status.set_text(&err.to_string(), true),
            Err(ExecError::Unexpected(e)) => {
                error!(target: "cmdline.ex", command = %text, error = %e, "ex_command_failed");
            }
        }

        if !unexpected && let Some(parsed) = &self.parsed {
            host.editor
                .set_dot_repeatable(parsed.command.repeatable_with_dot());
        }
    }

    fn escape(&mut self, ctx: &mut CommandLineContext, host: &mut HostContext<'_>) {
        host.editor.set_mode(self.edit.previous_mode);
        if !self.text.is_empty() {
            ctx.add_history(CommandLineKind::Ex, &self.text);
        }
    }

    fn ctrl_f(&mut self, _ctx: &mut CommandLineContext, host: &mut HostContext<'_>) {
        host.picker.open_ex_editor(&self.text);
    }
}
