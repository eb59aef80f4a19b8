//! The builtin ex grammar: ranges, command registry, and core commands.
//!
//! Deliberately small. A host wanting `:write` or `:tabnew` either installs
//! its own [`ExParser`] or configures an external engine; everything the
//! command-line machinery itself needs (substitute with preview, registers,
//! nohlsearch, bare line numbers) is here.

use cmdline_text::{Position, Span};
use regex::{Regex, RegexBuilder};

use crate::context::CommandLineContext;
use crate::decoration::{
    Decoration, SearchDecorations, ensure_visible, format_decoration_text,
};
use crate::dispatch::{
    Address, AddressedLine, CommandKind, ExCommand, ExParser, LineRange, ParsedLine,
};
use crate::error::{ExecError, ParseError, VimError};
use crate::host::{EditorOps, HostContext};

pub struct BuiltinExParser;

impl ExParser for BuiltinExParser {
    fn parse(&self, line: &str) -> Result<ParsedLine, ParseError> {
        let mut s = line.trim_start();
        // Vim tolerates stacked colons (`::w`).
        while let Some(rest) = s.strip_prefix(':') {
            s = rest.trim_start();
        }
        if s.is_empty() {
            return Err(ParseError::Empty);
        }

        let (range, rest) = parse_range(s);
        let rest = rest.trim_start();
        if rest.is_empty() {
            // A bare range moves the cursor: `:5`, `:$`.
            return match range {
                Some(range) => Ok(ParsedLine {
                    range: Some(range),
                    command: Box::new(GotoLineCommand),
                }),
                None => Err(ParseError::Empty),
            };
        }

        let name_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let (name, args) = rest.split_at(name_len);
        if name.is_empty() {
            return Err(ParseError::UnknownCommand(rest.to_string()));
        }

        let command: Box<dyn ExCommand> = if abbreviates(name, "substitute", 1) {
            Box::new(SubstituteCommand::parse(args)?)
        } else if abbreviates(name, "registers", 3) {
            Box::new(RegistersCommand)
        } else if abbreviates(name, "nohlsearch", 3) {
            Box::new(NohlsearchCommand)
        } else {
            return Err(ParseError::UnknownCommand(name.to_string()));
        };
        Ok(ParsedLine { range, command })
    }
}

/// True when `name` is an accepted abbreviation of `full` of at least `min`
/// characters (`:s`, `:sub`, `:substitute`).
fn abbreviates(name: &str, full: &str, min: usize) -> bool {
    name.len() >= min && full.starts_with(name)
}

/// Parse an optional leading range, returning it and the remaining input.
/// Text that is not a range is left for command-name parsing.
fn parse_range(input: &str) -> (Option<LineRange>, &str) {
    if let Some(rest) = input.strip_prefix('%') {
        return (Some(LineRange::whole_buffer()), rest);
    }
    let Some((first, rest)) = parse_addressed_line(input) else {
        return (None, input);
    };
    let rest_trimmed = rest.trim_start();
    if let Some(after_comma) = rest_trimmed.strip_prefix([',', ';']) {
        let after_comma = after_comma.trim_start();
        match parse_addressed_line(after_comma) {
            Some((second, rest2)) => (Some(LineRange::new(first, second)), rest2),
            // `5,` means "from 5 to the cursor line".
            None => (
                Some(LineRange::new(first, AddressedLine::new(Address::Current))),
                after_comma,
            ),
        }
    } else {
        (Some(LineRange::single(first)), rest)
    }
}

/// One address with its `+N`/`-N` tail: `.`, `$-1`, `12`, `+3`.
fn parse_addressed_line(input: &str) -> Option<(AddressedLine, &str)> {
    let mut rest = input;
    let base = if let Some(r) = rest.strip_prefix('.') {
        rest = r;
        Address::Current
    } else if let Some(r) = rest.strip_prefix('$') {
        rest = r;
        Address::Last
    } else if rest.starts_with(|c: char| c.is_ascii_digit()) {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let n: usize = rest[..end].parse().ok()?;
        rest = &rest[end..];
        Address::Absolute(n)
    } else if rest.starts_with(['+', '-']) {
        // A bare offset is relative to the cursor.
        Address::Current
    } else {
        return None;
    };

    let mut offset = 0isize;
    loop {
        let sign = if let Some(r) = rest.strip_prefix('+') {
            rest = r;
            1
        } else if let Some(r) = rest.strip_prefix('-') {
            rest = r;
            -1
        } else {
            break;
        };
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let n: isize = if end == 0 { 1 } else { rest[..end].parse().ok()? };
        rest = &rest[end..];
        offset += sign * n;
    }
    Some((AddressedLine { base, offset }, rest))
}

/// Split at the first unescaped `sep`; the second half excludes the
/// separator itself.
fn split_unescaped(s: &str, sep: char) -> (&str, Option<&str>) {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        if c == sep {
            return (&s[..i], Some(&s[i + c.len_utf8()..]));
        }
    }
    (s, None)
}

/// Translate a Vim replacement string into the regex crate's `$`-expansion
/// syntax: `&` and `\0`..`\9` reference captures, `\\` and `\&` escape, and
/// literal `$` must be doubled so it is not treated as a reference.
fn convert_replacement(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars();
    while let Some(c) = chars.next() {
        match c {
            '$' => out.push_str("$$"),
            '&' => out.push_str("${0}"),
            '\\' => match chars.next() {
                Some(d @ '0'..='9') => {
                    out.push_str("${");
                    out.push(d);
                    out.push('}');
                }
                Some('&') => out.push('&'),
                Some('\\') => out.push('\\'),
                Some(d) => out.push(d),
                None => {}
            },
            c => out.push(c),
        }
    }
    out
}

/// `:[range]s/pattern/replacement/flags`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstituteCommand {
    pattern: String,
    replacement: String,
    global: bool,
    ignore_case: bool,
}

impl SubstituteCommand {
    pub fn parse(args: &str) -> Result<Self, ParseError> {
        let args = args.trim_start();
        let mut chars = args.chars();
        let sep = chars
            .next()
            .ok_or_else(|| ParseError::BadArguments("substitute needs a pattern".into()))?;
        if sep.is_ascii_alphanumeric() || sep == '\\' || sep == '"' || sep == '|' {
            return Err(ParseError::BadArguments(format!(
                "invalid substitute separator: {sep}"
            )));
        }
        let body = chars.as_str();
        let (pattern, rest) = split_unescaped(body, sep);
        let (replacement, flag_text) = match rest {
            Some(rest) => {
                let (replacement, flags) = split_unescaped(rest, sep);
                (replacement, flags.unwrap_or(""))
            }
            None => ("", ""),
        };

        let mut global = false;
        let mut ignore_case = false;
        for c in flag_text.trim().chars() {
            match c {
                'g' => global = true,
                'i' => ignore_case = true,
                // Confirm and suppress-error flags are accepted but inert.
                'c' | 'e' => {}
                c => {
                    return Err(ParseError::BadArguments(format!(
                        "unsupported substitute flag: {c}"
                    )));
                }
            }
        }
        Ok(Self {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
            global,
            ignore_case,
        })
    }

    /// An empty pattern reuses the last search, like `:s//x/`.
    fn effective_pattern(&self, ctx: &CommandLineContext) -> Result<String, VimError> {
        if !self.pattern.is_empty() {
            return Ok(self.pattern.clone());
        }
        ctx.last_search()
            .map(|s| s.needle().to_string())
            .filter(|needle| !needle.is_empty())
            .ok_or(VimError::NoPreviousRegex)
    }

    fn compile(&self, pattern: &str) -> Result<Regex, VimError> {
        RegexBuilder::new(pattern)
            .case_insensitive(self.ignore_case)
            .build()
            .map_err(|_| VimError::PatternNotFound(pattern.to_string()))
    }
}

impl ExCommand for SubstituteCommand {
    fn name(&self) -> &str {
        "substitute"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::Substitute
    }

    fn externally_capable(&self) -> bool {
        true
    }

    fn repeatable_with_dot(&self) -> bool {
        true
    }

    fn execute(
        &self,
        ctx: &mut CommandLineContext,
        host: &mut HostContext<'_>,
    ) -> Result<(), ExecError> {
        let current = LineRange::single(AddressedLine::new(Address::Current));
        self.execute_with_range(ctx, host, &current)
    }

    fn execute_with_range(
        &self,
        ctx: &mut CommandLineContext,
        host: &mut HostContext<'_>,
        range: &LineRange,
    ) -> Result<(), ExecError> {
        let pattern = self.effective_pattern(ctx)?;
        let regex = self.compile(&pattern)?;
        let replacement = convert_replacement(&self.replacement);
        let (start, end) = range.resolve(&*host.editor);

        let mut substitutions = 0usize;
        let mut lines_changed = 0usize;
        let mut last_changed = None;
        for index in start..=end {
            let Some(line) = host.editor.line(index) else {
                break;
            };
            let matches = regex.find_iter(&line).count();
            if matches == 0 {
                continue;
            }
            let new_line = if self.global {
                regex.replace_all(&line, replacement.as_str())
            } else {
                regex.replace(&line, replacement.as_str())
            }
            .into_owned();
            host.editor.replace_line(index, new_line);
            substitutions += if self.global { matches } else { 1 };
            lines_changed += 1;
            last_changed = Some(index);
        }

        let Some(line) = last_changed else {
            return Err(VimError::PatternNotFound(pattern).into());
        };
        host.editor.set_cursor(Position::new(line, 0));
        // Reported only past the 'report' threshold, which defaults to 2.
        if substitutions > 2 {
            host.status.set_text(
                &format!("{substitutions} substitutions on {lines_changed} lines"),
                false,
            );
        }
        Ok(())
    }

    fn decorations(
        &self,
        editor: &dyn EditorOps,
        range: Option<&LineRange>,
        tabstop: usize,
    ) -> Option<SearchDecorations> {
        if self.pattern.is_empty() {
            return None;
        }
        let regex = RegexBuilder::new(&self.pattern)
            .case_insensitive(self.ignore_case)
            .build()
            .ok()?;
        let replacement = convert_replacement(&self.replacement);
        let (start, end) = match range {
            Some(range) => range.resolve(editor),
            None => {
                let line = editor.cursor().line;
                (line, line)
            }
        };
        let line_len = |l: usize| editor.line(l).map(|s| s.chars().count()).unwrap_or(0);

        let mut decorations = SearchDecorations::default();
        for index in start..=end {
            let Some(line) = editor.line(index) else {
                break;
            };
            for (nth, caps) in regex.captures_iter(&line).enumerate() {
                if !self.global && nth > 0 {
                    break;
                }
                let Some(m) = caps.get(0) else { continue };
                let start_col = line[..m.start()].chars().count();
                let end_col = line[..m.end()].chars().count();
                let span = Span::new(
                    Position::new(index, start_col),
                    Position::new(index, end_col),
                );
                let mut preview = String::new();
                caps.expand(&replacement, &mut preview);
                decorations
                    .substitution_replace
                    .push(ensure_visible(span, &line_len));
                decorations.substitution_append.push(Decoration {
                    span: Span::new(span.end, span.end),
                    after: Some(format_decoration_text(&preview, tabstop)),
                });
            }
        }
        if decorations.substitution_replace.is_empty() {
            None
        } else {
            Some(decorations)
        }
    }
}

/// `:registers`. Registers are write-only from the engine's side, so the
/// builtin only acknowledges the command; listing contents needs the host or
/// an external engine. Recognizing it still matters: this is the one command
/// that must not overwrite the `:` register with its own invocation.
pub struct RegistersCommand;

impl ExCommand for RegistersCommand {
    fn name(&self) -> &str {
        "registers"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::Register
    }

    fn externally_capable(&self) -> bool {
        true
    }

    fn execute(
        &self,
        _ctx: &mut CommandLineContext,
        host: &mut HostContext<'_>,
    ) -> Result<(), ExecError> {
        host.status.set_text("--- Registers ---", false);
        Ok(())
    }
}

/// `:nohlsearch` clears match highlighting until the next search.
pub struct NohlsearchCommand;

impl ExCommand for NohlsearchCommand {
    fn name(&self) -> &str {
        "nohlsearch"
    }

    fn execute(
        &self,
        ctx: &mut CommandLineContext,
        _host: &mut HostContext<'_>,
    ) -> Result<(), ExecError> {
        ctx.set_highlight_matches(false);
        Ok(())
    }
}

/// A bare range (`:5`, `:$`, `:.+2`) moves the cursor to its last line.
pub struct GotoLineCommand;

impl ExCommand for GotoLineCommand {
    fn name(&self) -> &str {
        "goto-line"
    }

    fn execute(
        &self,
        _ctx: &mut CommandLineContext,
        _host: &mut HostContext<'_>,
    ) -> Result<(), ExecError> {
        Ok(())
    }

    fn execute_with_range(
        &self,
        _ctx: &mut CommandLineContext,
        host: &mut HostContext<'_>,
        range: &LineRange,
    ) -> Result<(), ExecError> {
        let (_, end) = range.resolve(&*host.editor);
        host.editor.set_cursor(Position::new(end, 0));
        Ok(())
    }
}
