//! Single-line text navigation primitives.
//!
//! Everything in this crate operates on one line of text (the command-line
//! buffer, or one line of a document) and is free of editor state. Cursor
//! offsets are byte indices that always sit on grapheme cluster boundaries;
//! the scanning helpers below never produce an offset inside a cluster.
//!
//! Two word flavors exist, matching Vim's terminology:
//! * a "big word" is delimited purely by whitespace (`W`-style motions);
//! * a "normal word" additionally breaks on punctuation (`w`-style motions),
//!   where a word character is alphanumeric or `_`.

use unicode_segmentation::UnicodeSegmentation;

pub mod position;

pub use position::{Position, Span};

/// Byte offset of the next grapheme cluster boundary after `at`.
/// Returns `text.len()` when `at` is already at or past the end.
pub fn next_boundary(text: &str, at: usize) -> usize {
    if at >= text.len() {
        return text.len();
    }
    text[at..]
        .grapheme_indices(true)
        .nth(1)
        .map(|(i, _)| at + i)
        .unwrap_or(text.len())
}

/// Byte offset of the previous grapheme cluster boundary before `at`.
/// Returns 0 when `at` is at the start.
pub fn prev_boundary(text: &str, at: usize) -> usize {
    let at = at.min(text.len());
    text[..at]
        .grapheme_indices(true)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Character class used by normal-word scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Whitespace,
    Word,
    Punctuation,
}

fn classify(c: char) -> CharClass {
    if c.is_whitespace() {
        CharClass::Whitespace
    } else if c.is_alphanumeric() || c == '_' {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

/// Start of the big word ending at or before `from`, scanning left.
///
/// Skips any whitespace immediately left of `from`, then runs to the start of
/// the non-whitespace token. `None` when there is nothing but whitespace (or
/// nothing at all) left of `from`; callers clamp to 0 in that case.
pub fn big_word_left(text: &str, from: usize) -> Option<usize> {
    let mut chars: Vec<(usize, char)> = text[..from.min(text.len())].char_indices().collect();
    // Strip trailing whitespace.
    while matches!(chars.last(), Some((_, c)) if c.is_whitespace()) {
        chars.pop();
    }
    let (mut boundary, _) = *chars.last()?;
    for &(i, c) in chars.iter().rev() {
        if c.is_whitespace() {
            break;
        }
        boundary = i;
    }
    Some(boundary)
}

/// Start of the next big word strictly after `from`, scanning right.
///
/// Skips the remainder of the current token (if `from` sits inside one), then
/// any whitespace. `None` when no further token exists; callers clamp to
/// `text.len()`.
pub fn big_word_right(text: &str, from: usize) -> Option<usize> {
    let mut it = text[from.min(text.len())..]
        .char_indices()
        .map(|(i, c)| (from + i, c))
        .peekable();
    // Skip the rest of the current non-whitespace run.
    while matches!(it.peek(), Some((_, c)) if !c.is_whitespace()) {
        it.next();
    }
    // Skip the whitespace gap.
    while matches!(it.peek(), Some((_, c)) if c.is_whitespace()) {
        it.next();
    }
    it.peek().map(|&(i, _)| i)
}

/// Start of the normal word ending at or before `from`, scanning left.
///
/// Skips whitespace immediately left of `from`, then runs to the start of the
/// contiguous run sharing the class (word vs punctuation) of the first
/// non-whitespace character found. This is the boundary Ctrl-W deletes back
/// to. `None` when only whitespace (or nothing) lies left of `from`.
pub fn word_left(text: &str, from: usize) -> Option<usize> {
    let mut chars: Vec<(usize, char)> = text[..from.min(text.len())].char_indices().collect();
    while matches!(chars.last(), Some((_, c)) if c.is_whitespace()) {
        chars.pop();
    }
    let &(mut boundary, last) = chars.last()?;
    let class = classify(last);
    for &(i, c) in chars.iter().rev() {
        if classify(c) != class {
            break;
        }
        boundary = i;
    }
    Some(boundary)
}
