//! Pattern scanning shared by the sanitizer passes.
//!
//! Every search takes an explicit start offset and returns byte ranges, so
//! callers keep one cursor per match class on their own stack. All patterns
//! start with an ASCII byte, which makes `start + 1` a valid restart offset.

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// Pre-compiled sanitizer patterns.
struct ScanPatterns {
    /// Single, double or back-tick quoted span
    quote: Regex,
    /// Block comment, or line comment including its line terminator
    comment: Regex,
    /// `limit` keyword followed by a numeral
    limit: Regex,
}

impl ScanPatterns {
    fn instance() -> &'static Self {
        static PATTERNS: OnceLock<ScanPatterns> = OnceLock::new();
        PATTERNS.get_or_init(Self::compile)
    }

    #[allow(clippy::expect_used)]
    fn compile() -> Self {
        Self {
            quote: Regex::new(r#""[^"]*"|'[^']*'|`[^`]*`"#).expect("Invalid quote pattern"),
            comment: Regex::new(r"(?s:/\*.*?\*/)|--[^\r\n]*(?:\r\n|\r|\n)?")
                .expect("Invalid comment pattern"),
            limit: Regex::new(r"(?i)\blimit\s+([0-9]+)\b").expect("Invalid limit pattern"),
        }
    }
}

/// A `limit N` clause located in query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct LimitClause {
    /// Whole clause, keyword included
    pub(super) clause: Range<usize>,
    /// The numeral only
    pub(super) digits: Range<usize>,
}

pub(super) fn find_quote(text: &str, from: usize) -> Option<Range<usize>> {
    ScanPatterns::instance()
        .quote
        .find_at(text, from)
        .map(|m| m.range())
}

pub(super) fn find_comment(text: &str, from: usize) -> Option<Range<usize>> {
    ScanPatterns::instance()
        .comment
        .find_at(text, from)
        .map(|m| m.range())
}

pub(super) fn find_terminator(text: &str, from: usize) -> Option<usize> {
    text.get(from..)?
        .find(';')
        .map(|offset| from.saturating_add(offset))
}

pub(super) fn find_limit(text: &str, from: usize) -> Option<LimitClause> {
    let captures = ScanPatterns::instance().limit.captures_at(text, from)?;
    let clause = captures.get(0)?.range();
    let digits = captures.get(1)?.range();
    Some(LimitClause { clause, digits })
}

/// Advances a quote cursor until its match starts at or after `end`.
pub(super) fn quote_at_or_after(
    text: &str,
    mut quote: Option<Range<usize>>,
    end: usize,
) -> Option<Range<usize>> {
    while let Some(current) = quote.clone() {
        if current.start >= end {
            break;
        }
        // may not be a real quote; retry one byte later
        quote = find_quote(text, current.start.saturating_add(1));
    }
    quote
}
