//! Inline decoration computation for live search and substitute previews.
//!
//! Everything here is pure: spans in, decoration buckets out. The host is
//! responsible for rendering (colors, virtual text placement); this module
//! only decides *where* decorations go and what replacement text they carry.

use cmdline_text::{Position, Span};

/// Placeholder shown for a match that would otherwise render with zero
/// width (it sits at the end of its line).
pub const END_OF_LINE_MARKER: &str = "$";

/// Default stand-in for a newline inside inline virtual text.
pub const NEWLINE_GLYPH: &str = "\u{23ce}";

/// One decoration: a document span, optionally with virtual text rendered
/// after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub span: Span,
    pub after: Option<String>,
}

/// The decoration buckets a host renders with distinct styles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchDecorations {
    /// All matches except the current one.
    pub search_highlight: Vec<Decoration>,
    /// The match the cursor would land on.
    pub search_match: Vec<Decoration>,
    /// Virtual replacement text appended after each substitute match.
    pub substitution_append: Vec<Decoration>,
    /// The matched text a pending substitute would replace.
    pub substitution_replace: Vec<Decoration>,
}

/// Make a span renderable. A zero-width span (or one that only covers a
/// line break) at the end of a line would paint nothing, so it collapses to
/// an end-of-line marker; any other zero-width span is widened one
/// character to the right.
pub fn ensure_visible(span: Span, line_len: impl Fn(usize) -> usize) -> Decoration {
    let at_line_end = span.start.col >= line_len(span.start.line);
    let covers_nothing_visible =
        span.is_empty() || (span.end.line > span.start.line && span.end.col == 0);
    if covers_nothing_visible && at_line_end {
        return Decoration {
            span: Span::new(span.start, span.start),
            after: Some(END_OF_LINE_MARKER.to_string()),
        };
    }
    if span.is_empty() {
        return Decoration {
            span: Span::new(span.start, Position::new(span.end.line, span.end.col + 1)),
            after: None,
        };
    }
    Decoration { span, after: None }
}

/// [`format_decoration_text_with`] using the [`NEWLINE_GLYPH`] default.
pub fn format_decoration_text(text: &str, tabstop: usize) -> String {
    format_decoration_text_with(text, tabstop, NEWLINE_GLYPH)
}

/// Prepare replacement text for inline rendering: tabs expand to `tabstop`
/// non-breaking spaces, spaces become non-breaking (inline text collapses
/// real whitespace), and each newline sequence (`\r\n`, `\r` or `\n`)
/// becomes `newline_replacement` since a decoration cannot span visual
/// lines. The result is bracketed in zero-width spaces so hosts do not trim
/// it.
pub fn format_decoration_text_with(
    text: &str,
    tabstop: usize,
    newline_replacement: &str,
) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\u{200b}');
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\t' => {
                for _ in 0..tabstop {
                    out.push('\u{a0}');
                }
            }
            ' ' => out.push('\u{a0}'),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str(newline_replacement);
            }
            '\n' => out.push_str(newline_replacement),
            c => out.push(c),
        }
    }
    out.push('\u{200b}');
    out
}

/// Partition match spans into the current match and the rest, each made
/// renderable.
pub fn decorations_for_search_match_ranges(
    spans: &[Span],
    current: Option<usize>,
    line_len: impl Fn(usize) -> usize,
) -> SearchDecorations {
    let mut decorations = SearchDecorations::default();
    for (index, span) in spans.iter().enumerate() {
        let decoration = ensure_visible(*span, &line_len);
        if Some(index) == current {
            decorations.search_match.push(decoration);
        } else {
            decorations.search_highlight.push(decoration);
        }
    }
    decorations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_len(len: usize) -> impl Fn(usize) -> usize {
        move |_| len
    }

    #[test]
    fn nonempty_span_passes_through() {
        let span = Span::new(Position::new(0, 2), Position::new(0, 5));
        let d = ensure_visible(span, fixed_len(10));
        assert_eq!(d.span, span);
        assert_eq!(d.after, None);
    }

    #[test]
    fn empty_span_mid_line_widens_right() {
        let span = Span::new(Position::new(0, 3), Position::new(0, 3));
        let d = ensure_visible(span, fixed_len(10));
        assert_eq!(d.span, Span::new(Position::new(0, 3), Position::new(0, 4)));
        assert_eq!(d.after, None);
    }

    #[test]
    fn empty_span_at_line_end_gets_marker() {
        let span = Span::new(Position::new(0, 5), Position::new(0, 5));
        let d = ensure_visible(span, fixed_len(5));
        assert!(d.span.is_empty());
        assert_eq!(d.after.as_deref(), Some(END_OF_LINE_MARKER));
    }

    #[test]
    fn newline_only_match_at_line_end_gets_marker() {
        // A match covering just the line break spans to column 0 of the
        // next line but paints nothing.
        let span = Span::new(Position::new(0, 5), Position::new(1, 0));
        let d = ensure_visible(span, fixed_len(5));
        assert_eq!(d.span, Span::new(Position::new(0, 5), Position::new(0, 5)));
        assert_eq!(d.after.as_deref(), Some(END_OF_LINE_MARKER));
    }

    #[test]
    fn format_expands_tabs_and_protects_spaces() {
        assert_eq!(format_decoration_text("a b", 8), "\u{200b}a\u{a0}b\u{200b}");
        assert_eq!(format_decoration_text("\t", 2), "\u{200b}\u{a0}\u{a0}\u{200b}");
    }

    #[test]
    fn format_brackets_output_in_zero_width_spaces() {
        for text in ["", "x", "a b"] {
            let out = format_decoration_text(text, 8);
            assert!(out.starts_with('\u{200b}'), "{out:?}");
            assert!(out.ends_with('\u{200b}'), "{out:?}");
        }
    }

    #[test]
    fn format_collapses_newline_sequences() {
        assert_eq!(
            format_decoration_text("a\nb", 8),
            format!("\u{200b}a{NEWLINE_GLYPH}b\u{200b}")
        );
        // \r\n is one line break, a lone \r also counts as one.
        assert_eq!(
            format_decoration_text("a\r\nb\rc", 8),
            format!("\u{200b}a{NEWLINE_GLYPH}b{NEWLINE_GLYPH}c\u{200b}")
        );
        assert!(!format_decoration_text("a\r\nb", 8).contains('\r'));
    }

    #[test]
    fn format_newline_replacement_is_configurable() {
        assert_eq!(
            format_decoration_text_with("a\nb", 8, "|"),
            "\u{200b}a|b\u{200b}"
        );
    }

    #[test]
    fn partition_separates_current_match() {
        let spans = [
            Span::new(Position::new(0, 0), Position::new(0, 3)),
            Span::new(Position::new(0, 8), Position::new(0, 11)),
            Span::new(Position::new(1, 0), Position::new(1, 3)),
        ];
        let d = decorations_for_search_match_ranges(&spans, Some(1), fixed_len(20));
        assert_eq!(d.search_match.len(), 1);
        assert_eq!(d.search_match[0].span, spans[1]);
        assert_eq!(d.search_highlight.len(), 2);
    }

    #[test]
    fn partition_without_current_highlights_all() {
        let spans = [Span::new(Position::new(0, 0), Position::new(0, 3))];
        let d = decorations_for_search_match_ranges(&spans, None, fixed_len(20));
        assert!(d.search_match.is_empty());
        assert_eq!(d.search_highlight.len(), 1);
    }
}
