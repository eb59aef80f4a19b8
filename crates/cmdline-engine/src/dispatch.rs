//! The ex command contract: parser and command traits, line ranges.
//!
//! Hosts may install their own [`ExParser`] to extend or replace the builtin
//! grammar; the session only depends on these traits.

use crate::context::CommandLineContext;
use crate::decoration::SearchDecorations;
use crate::error::{ExecError, ParseError};
use crate::host::{EditorOps, HostContext};

/// Coarse classification driving session behavior that differs per command
/// family (register quirk, substitute preview).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Substitute,
    Register,
    Other,
}

/// A single line address, resolved against editor state at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Address {
    /// The cursor line (`.`).
    Current,
    /// The last line of the buffer (`$`).
    Last,
    /// A 1-based absolute line number.
    Absolute(usize),
}

impl Address {
    fn resolve(self, editor: &dyn EditorOps) -> isize {
        match self {
            Address::Current => editor.cursor().line as isize,
            Address::Last => editor.line_count().saturating_sub(1) as isize,
            Address::Absolute(n) => n as isize - 1,
        }
    }
}

/// An address plus its trailing `+N`/`-N` adjustments (`.+2`, `$-1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressedLine {
    pub base: Address,
    pub offset: isize,
}

impl AddressedLine {
    pub const fn new(base: Address) -> Self {
        Self { base, offset: 0 }
    }

    fn resolve(self, editor: &dyn EditorOps) -> usize {
        let line = self.base.resolve(editor) + self.offset;
        let last = editor.line_count().saturating_sub(1) as isize;
        line.clamp(0, last.max(0)) as usize
    }
}

/// A line range as typed (`%`, `1,5`, `.,+3`), kept symbolic until a command
/// resolves it against the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: AddressedLine,
    pub end: AddressedLine,
}

impl LineRange {
    pub const fn new(start: AddressedLine, end: AddressedLine) -> Self {
        Self { start, end }
    }

    pub const fn single(address: AddressedLine) -> Self {
        Self {
            start: address,
            end: address,
        }
    }

    /// The whole buffer (`%`).
    pub const fn whole_buffer() -> Self {
        Self {
            start: AddressedLine::new(Address::Absolute(1)),
            end: AddressedLine::new(Address::Last),
        }
    }

    /// Resolve to 0-based inclusive line indices, clamped to the buffer and
    /// normalized so the first is not after the second.
    pub fn resolve(&self, editor: &dyn EditorOps) -> (usize, usize) {
        let a = self.start.resolve(editor);
        let b = self.end.resolve(editor);
        (a.min(b), a.max(b))
    }
}

/// One executable ex command. Implementations are produced by an
/// [`ExParser`] and run at most once.
pub trait ExCommand {
    fn name(&self) -> &str;

    fn kind(&self) -> CommandKind {
        CommandKind::Other
    }

    /// Whether an external engine, when configured, should run this command
    /// instead of the local implementation.
    fn externally_capable(&self) -> bool {
        false
    }

    /// Whether `.` may repeat this command after it runs.
    fn repeatable_with_dot(&self) -> bool {
        false
    }

    fn execute(
        &self,
        ctx: &mut CommandLineContext,
        host: &mut HostContext<'_>,
    ) -> Result<(), ExecError>;

    /// Run over an explicit range. Commands that ignore ranges fall back to
    /// plain execution.
    fn execute_with_range(
        &self,
        ctx: &mut CommandLineContext,
        host: &mut HostContext<'_>,
        range: &LineRange,
    ) -> Result<(), ExecError> {
        let _ = range;
        self.execute(ctx, host)
    }

    /// Live preview decorations while the line is still being typed. Only
    /// substitute-family commands produce any.
    fn decorations(
        &self,
        editor: &dyn EditorOps,
        range: Option<&LineRange>,
        tabstop: usize,
    ) -> Option<SearchDecorations> {
        let _ = (editor, range, tabstop);
        None
    }
}

/// A successfully parsed command line.
pub struct ParsedLine {
    pub range: Option<LineRange>,
    pub command: Box<dyn ExCommand>,
}

impl std::fmt::Debug for ParsedLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedLine")
            .field("range", &self.range)
            .field("command", &self.command.name())
            .finish()
    }
}

/// Turns typed text into an executable command. The builtin implementation
/// covers a small core grammar; hosts can layer their own on top.
pub trait ExParser {
    fn parse(&self, line: &str) -> Result<ParsedLine, ParseError>;
}
