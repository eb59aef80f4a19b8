//! Search state: pattern, direction, start position, and match computation.
//!
//! A `SearchState` owns everything one `/` or `?` invocation needs: the raw
//! typed pattern (needle plus optional search offset), the direction, and the
//! cursor position the search started from. Match spans are derived against a
//! `DocumentSnapshot` on demand — the state caches nothing about the
//! document, so a stale-cache class of bugs cannot exist.
//!
//! Pattern semantics follow Vim:
//! * the needle is a regular expression; if it fails to compile, every regex
//!   metacharacter is escaped and the search degrades to a literal one;
//! * `\c` / `\C` anywhere in the needle force case-insensitive/-sensitive
//!   matching (first occurrence wins, all are stripped);
//! * `ignorecase` + `smartcase` options apply otherwise;
//! * an unescaped `/` (forward) or `?` (backward) splits off a search offset:
//!   `N` lines, `b±N` from the match beginning, `e±N` from the match end.

use cmdline_text::{Position, Span};
use regex::RegexBuilder;
use tracing::debug;

/// Hard cap on computed match spans, so a one-character needle against a huge
/// document cannot stall the keystroke that typed it.
const MAX_SEARCH_RANGES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Forward,
    Backward,
}

impl SearchDirection {
    /// +1 forward, -1 backward; used for the displacement arithmetic where
    /// composing two directions must square to identity.
    pub const fn signum(self) -> isize {
        match self {
            SearchDirection::Forward => 1,
            SearchDirection::Backward => -1,
        }
    }

    /// The command-line prefix that starts a search in this direction.
    pub const fn prefix(self) -> char {
        match self {
            SearchDirection::Forward => '/',
            SearchDirection::Backward => '?',
        }
    }

    pub const fn reversed(self) -> Self {
        match self {
            SearchDirection::Forward => SearchDirection::Backward,
            SearchDirection::Backward => SearchDirection::Forward,
        }
    }

    /// Compose a navigation key direction with this search direction. Two
    /// negatives cancel: "next match" on a backward search still walks
    /// forward through the document.
    pub const fn compose(self, other: Self) -> Self {
        if self.signum() * other.signum() == 1 {
            SearchDirection::Forward
        } else {
            SearchDirection::Backward
        }
    }
}

/// Read access to the document being searched. Lines are returned without a
/// trailing newline.
pub trait DocumentSnapshot {
    fn line_count(&self) -> usize;
    fn line(&self, index: usize) -> Option<String>;
}

impl DocumentSnapshot for [String] {
    fn line_count(&self) -> usize {
        self.len()
    }
    fn line(&self, index: usize) -> Option<String> {
        self.get(index).cloned()
    }
}

impl DocumentSnapshot for Vec<String> {
    fn line_count(&self) -> usize {
        self.len()
    }
    fn line(&self, index: usize) -> Option<String> {
        self.get(index).cloned()
    }
}

impl DocumentSnapshot for [&str] {
    fn line_count(&self) -> usize {
        self.len()
    }
    fn line(&self, index: usize) -> Option<String> {
        self.get(index).map(|s| (*s).to_string())
    }
}

/// Options influencing match computation, lifted from configuration by the
/// caller so this crate stays config-agnostic.
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub ignorecase: bool,
    pub smartcase: bool,
    pub wrapscan: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            ignorecase: true,
            smartcase: true,
            wrapscan: true,
        }
    }
}

/// How to adjust the cursor after landing on a match.
///
/// `/abc/3` jumps three lines below the match, `/abc/b-2` two characters left
/// of its beginning, `/abc/e2` two characters right of its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOffset {
    Line(isize),
    Beginning(isize),
    End(isize),
}

#[derive(Debug, Clone)]
pub struct SearchState {
    pub direction: SearchDirection,
    /// Cursor position when the search began; escape returns here.
    pub start: Position,
    raw: String,
    needle: String,
    offset: Option<SearchOffset>,
}

impl SearchState {
    pub fn new(direction: SearchDirection, start: Position) -> Self {
        Self {
            direction,
            start,
            raw: String::new(),
            needle: String::new(),
            offset: None,
        }
    }

    /// The raw pattern as typed, including any search offset suffix.
    pub fn pattern(&self) -> &str {
        &self.raw
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    pub fn offset(&self) -> Option<SearchOffset> {
        self.offset
    }

    /// Replace the raw pattern, re-splitting needle and offset. The offset
    /// separator is the first unescaped occurrence of this direction's prefix
    /// character, never the leading character itself.
    pub fn set_pattern(&mut self, pattern: &str) {
        if self.raw == pattern {
            return;
        }
        self.raw = pattern.to_string();
        self.offset = None;
        match split_offset(pattern, self.direction.prefix()) {
            Some((needle, suffix)) => {
                self.needle = needle.to_string();
                self.offset = parse_offset(suffix);
            }
            None => {
                self.needle = pattern.to_string();
            }
        }
    }

    /// Every span in the document matching the needle, in document order.
    pub fn match_spans(&self, doc: &dyn DocumentSnapshot, opts: &SearchOptions) -> Vec<Span> {
        if self.needle.is_empty() {
            return Vec::new();
        }
        let Some(regex) = compile(&self.needle, opts) else {
            return Vec::new();
        };
        let lines: Vec<String> = (0..doc.line_count())
            .map(|i| doc.line(i).unwrap_or_default())
            .collect();
        let text = lines.join("\n");
        // Byte offset at which each line begins within the joined text.
        let mut line_starts = Vec::with_capacity(lines.len());
        let mut acc = 0usize;
        for line in &lines {
            line_starts.push(acc);
            acc += line.len() + 1;
        }
        let to_position = |byte: usize| -> Position {
            let line = match line_starts.binary_search(&byte) {
                Ok(i) => i,
                Err(i) => i - 1,
            };
            let col = text[line_starts[line]..byte].chars().count();
            Position::new(line, col)
        };

        let mut spans = Vec::new();
        for m in regex.find_iter(&text) {
            spans.push(Span::new(to_position(m.start()), to_position(m.end())));
            if spans.len() >= MAX_SEARCH_RANGES {
                debug!(target: "search", cap = MAX_SEARCH_RANGES, "match_cap_reached");
                break;
            }
        }
        spans
    }

    /// The next match from `from`, composing `key_direction` with the search
    /// direction (so `key_direction = Forward` means "in the direction of the
    /// search"). Returns the span and its index in document order, wrapping
    /// only when `wrapscan` allows it.
    pub fn next_match(
        &self,
        doc: &dyn DocumentSnapshot,
        from: Position,
        key_direction: SearchDirection,
        opts: &SearchOptions,
    ) -> Option<(Span, usize)> {
        let spans = self.match_spans(doc, opts);
        self.next_match_in(&spans, from, key_direction, opts)
    }

    /// As `next_match`, against an already computed span list.
    pub fn next_match_in(
        &self,
        spans: &[Span],
        from: Position,
        key_direction: SearchDirection,
        opts: &SearchOptions,
    ) -> Option<(Span, usize)> {
        if spans.is_empty() {
            return None;
        }
        match self.direction.compose(key_direction) {
            SearchDirection::Forward => {
                for (index, span) in spans.iter().enumerate() {
                    if span.start > from {
                        return Some((*span, index));
                    }
                }
                opts.wrapscan.then(|| (spans[0], 0))
            }
            SearchDirection::Backward => {
                for (index, span) in spans.iter().enumerate().rev() {
                    if span.end <= from {
                        return Some((*span, index));
                    }
                }
                opts.wrapscan
                    .then(|| (spans[spans.len() - 1], spans.len() - 1))
            }
        }
    }

    /// The match containing `pos`, if any.
    pub fn match_containing(
        &self,
        doc: &dyn DocumentSnapshot,
        pos: Position,
        opts: &SearchOptions,
    ) -> Option<(Span, usize)> {
        self.match_spans(doc, opts)
            .into_iter()
            .enumerate()
            .find(|(_, span)| span.contains(pos))
            .map(|(index, span)| (span, index))
    }

    /// Final cursor position for a resolved match, with the search offset
    /// applied.
    pub fn resolve_cursor(&self, doc: &dyn DocumentSnapshot, span: Span) -> Position {
        match self.offset {
            None => span.start,
            Some(SearchOffset::Line(n)) => {
                let line = clamp_line(span.start.line as isize + n, doc.line_count());
                Position::new(line, 0)
            }
            Some(SearchOffset::Beginning(n)) => walk_chars(doc, span.start, n),
            Some(SearchOffset::End(n)) => walk_chars(doc, span.end, n - 1),
        }
    }
}

/// Split `raw` at its first unescaped `separator`, excluding position 0 (a
/// pattern cannot be empty just because it starts with the separator).
fn split_offset(raw: &str, separator: char) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (i, c) in raw.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        if c == separator && i > 0 {
            return Some((&raw[..i], &raw[i + separator.len_utf8()..]));
        }
    }
    None
}

/// Parse the offset suffix. A bare or signed integer is a line offset; `b` or
/// `e` with an optional signed integer offsets from the match beginning/end.
/// Anything else (including the historical `s`/`;` forms) is ignored.
fn parse_offset(suffix: &str) -> Option<SearchOffset> {
    if let Ok(n) = suffix.parse::<isize>() {
        return Some(SearchOffset::Line(n));
    }
    let (head, rest) = {
        let mut chars = suffix.chars();
        (chars.next()?, chars.as_str())
    };
    let num = if rest.is_empty() {
        0
    } else {
        rest.parse::<isize>().ok()?
    };
    match head {
        'b' => Some(SearchOffset::Beginning(num)),
        'e' => Some(SearchOffset::End(num)),
        _ => None,
    }
}

/// Compile the needle honoring case options and inline `\c`/`\C` overrides.
fn compile(needle: &str, opts: &SearchOptions) -> Option<regex::Regex> {
    let mut ignorecase = opts.ignorecase;
    if ignorecase && opts.smartcase && needle.chars().any(|c| c.is_uppercase()) {
        ignorecase = false;
    }

    // Vim strips every \c and \C but obeys the first one.
    let mut stripped = String::with_capacity(needle.len());
    let mut override_case: Option<bool> = None;
    let mut chars = needle.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(&next) = chars.peek()
            && (next == 'c' || next == 'C')
        {
            if override_case.is_none() {
                override_case = Some(next == 'c');
            }
            chars.next();
            continue;
        }
        stripped.push(c);
        if c == '\\'
            && let Some(next) = chars.next()
        {
            stripped.push(next);
        }
    }
    if let Some(insensitive) = override_case {
        ignorecase = insensitive;
    }

    let build = |pattern: &str| {
        RegexBuilder::new(pattern)
            .case_insensitive(ignorecase)
            .multi_line(true)
            .build()
    };
    match build(&stripped) {
        Ok(re) => Some(re),
        Err(_) => {
            // Invalid as a regex; retry as a literal.
            match build(&regex::escape(&stripped)) {
                Ok(re) => Some(re),
                Err(e) => {
                    debug!(target: "search", error = %e, "pattern_unusable");
                    None
                }
            }
        }
    }
}

fn clamp_line(line: isize, line_count: usize) -> usize {
    if line < 0 {
        0
    } else {
        (line as usize).min(line_count.saturating_sub(1))
    }
}

/// Move `n` characters from `pos` (negative = backward), treating each line
/// break as a single character and clamping at document bounds.
fn walk_chars(doc: &dyn DocumentSnapshot, pos: Position, n: isize) -> Position {
    let mut line = pos.line.min(doc.line_count().saturating_sub(1));
    let mut col = pos.col as isize;
    let mut remaining = n;
    let line_len = |l: usize| doc.line(l).map(|s| s.chars().count()).unwrap_or(0) as isize;
    col = col.min(line_len(line));
    while remaining > 0 {
        if col < line_len(line) {
            col += 1;
        } else if line + 1 < doc.line_count() {
            line += 1;
            col = 0;
        } else {
            break;
        }
        remaining -= 1;
    }
    while remaining < 0 {
        if col > 0 {
            col -= 1;
        } else if line > 0 {
            line -= 1;
            col = line_len(line);
        } else {
            break;
        }
        remaining += 1;
    }
    Position::new(line, col as usize)
}
