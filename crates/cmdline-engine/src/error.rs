//! Error taxonomy: parse errors, Vim-style user errors, and the unexpected.
//!
//! Three tiers, handled differently at the run boundary:
//! * [`ParseError`] — the typed line is not understandable; surfaces as E492.
//! * [`VimError`] — user-visible failures with Vim error numbers; always
//!   rendered on the status line, never propagated.
//! * `anyhow::Error` — everything else (I/O, host failures); logged and
//!   swallowed so a keystroke can never crash the session.

use thiserror::Error;

/// A command line that could not be parsed. Carries enough detail for
/// diagnostics; users only ever see the resulting [`VimError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command line")]
    Empty,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("invalid range: {0}")]
    InvalidRange(String),
    #[error("malformed arguments: {0}")]
    BadArguments(String),
}

/// User-visible failures, formatted exactly as Vim reports them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VimError {
    #[error("E35: No previous regular expression")]
    NoPreviousRegex,
    #[error("E492: Not an editor command: {0}")]
    NotAnEditorCommand(String),
    #[error("E486: Pattern not found: {0}")]
    PatternNotFound(String),
    #[error("E384: search hit TOP without match for: {0}")]
    SearchHitTop(String),
    #[error("E385: search hit BOTTOM without match for: {0}")]
    SearchHitBottom(String),
}

/// Failure of a dispatched ex command: either a typed Vim error (shown to the
/// user) or an unexpected one (logged).
#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Vim(#[from] VimError),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}
