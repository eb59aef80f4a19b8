//! Modal command-line engine: `:` ex lines and `/`,`?` incremental search.
//!
//! The engine is host-agnostic. A host editor implements the traits in
//! [`host`], keeps one [`CommandLineContext`] alive, and opens an
//! [`ExSession`] or [`SearchSession`] when the user types `:`, `/` or `?`.
//! Each keystroke maps to one method on the open session; the session talks
//! back to the host exclusively through [`HostContext`].
//!
//! User-visible failures (unknown command, pattern not found, search hit
//! top/bottom) are typed [`VimError`]s rendered on the status line with
//! their Vim error numbers. Unexpected failures are logged and swallowed at
//! the run boundary; a keystroke never crashes the session.

pub mod builtin;
pub mod context;
pub mod decoration;
pub mod dispatch;
pub mod edit;
pub mod error;
pub mod ex;
pub mod host;
pub mod mode;
pub mod search_session;
pub mod session;

pub use builtin::BuiltinExParser;
pub use context::{CommandLineContext, CommandLineKind};
pub use decoration::{Decoration, SearchDecorations};
pub use dispatch::{Address, AddressedLine, CommandKind, ExCommand, ExParser, LineRange, ParsedLine};
pub use edit::LineEdit;
pub use error::{ExecError, ParseError, VimError};
pub use ex::ExSession;
pub use host::{
    EditorDocument, EditorOps, EngineOutput, ExternalEngine, HostContext, PickerHost,
    RegisterContent, RegisterFile, StatusLine,
};
pub use mode::EditorMode;
pub use search_session::SearchSession;
pub use session::CommandLine;
