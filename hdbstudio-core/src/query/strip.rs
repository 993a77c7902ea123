//! Comment and trailing-statement removal.

use super::QueryRewrite;
use super::scan::{find_comment, find_quote, find_terminator, quote_at_or_after};
use std::ops::Range;

/// Nearest non-quote match in the text.
enum Candidate {
    Comment(Range<usize>),
    Terminator(usize),
}

impl Candidate {
    fn start(&self) -> usize {
        match self {
            Candidate::Comment(range) => range.start,
            Candidate::Terminator(position) => *position,
        }
    }
}

/// Removes comments and everything from the first top-level `;` onwards.
///
/// Text inside single, double or back-tick quotes is copied through
/// unchanged. Passes repeat until nothing more is removed, so deleting a
/// comment can never leave a freshly spliced comment token behind and the
/// function is idempotent.
///
/// # Example
/// ```rust
/// use hdbstudio_core::query::strip_comments;
///
/// let result = strip_comments("SELECT ';' AS s FROM t -- note\n; DROP TABLE t");
/// assert_eq!(result.text, "SELECT ';' AS s FROM t ");
/// assert!(!result.unchanged);
/// ```
pub fn strip_comments(text: &str) -> QueryRewrite {
    let first = strip_pass(text);
    if first.unchanged {
        return first;
    }

    let mut current = first.text;
    loop {
        let next = strip_pass(&current);
        if next.unchanged {
            return QueryRewrite::rewritten(current);
        }
        current = next.text;
    }
}

fn strip_pass(text: &str) -> QueryRewrite {
    let mut quote = find_quote(text, 0);
    let mut comment = find_comment(text, 0);
    let mut terminator = find_terminator(text, 0);

    let mut stripped = String::with_capacity(text.len());
    let mut last = 0;
    let mut removed = false;

    loop {
        let candidate = match (&comment, terminator) {
            (Some(range), Some(position)) if range.start < position => {
                Candidate::Comment(range.clone())
            }
            (_, Some(position)) => Candidate::Terminator(position),
            (Some(range), None) => Candidate::Comment(range.clone()),
            (None, None) => break,
        };
        let start = candidate.start();

        if let Some(span) = quote.clone()
            && span.start < start
        {
            if span.end > start {
                // inside a quoted span, so not a real comment or terminator
                match candidate {
                    Candidate::Comment(range) => {
                        comment = find_comment(text, range.start.saturating_add(1));
                    }
                    Candidate::Terminator(position) => {
                        terminator = find_terminator(text, position.saturating_add(1));
                    }
                }
            } else {
                stripped.push_str(&text[last..span.end]);
                last = span.end;
                quote = find_quote(text, span.end);
            }
            continue;
        }

        match candidate {
            Candidate::Comment(range) => {
                stripped.push_str(&text[last..range.start]);
                last = range.end;
                quote = quote_at_or_after(text, quote, range.end);
                while let Some(position) = terminator {
                    if position >= range.end {
                        break;
                    }
                    terminator = find_terminator(text, position.saturating_add(1));
                }
                comment = find_comment(text, range.end);
                removed = true;
            }
            Candidate::Terminator(position) => {
                stripped.push_str(&text[last..position]);
                return QueryRewrite::rewritten(stripped);
            }
        }
    }

    if !removed {
        return QueryRewrite::untouched(text);
    }
    stripped.push_str(&text[last..]);
    QueryRewrite::rewritten(stripped)
}
