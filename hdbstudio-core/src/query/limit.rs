//! Row-limit normalization.

use super::QueryRewrite;
use super::scan::{find_limit, find_quote};

/// Caps the first unquoted `LIMIT N` clause at `max_rows`.
///
/// Only the numeral is rewritten, and only when it exceeds `max_rows`. A
/// query without a limit clause gets `" LIMIT <max_rows>"` appended, so the
/// text must already be free of comments and trailing statements (see
/// [`strip_comments`](super::strip_comments)).
///
/// # Example
/// ```rust
/// use hdbstudio_core::query::cap_limit;
///
/// assert_eq!(cap_limit("SELECT * FROM t LIMIT 5000", 100).text, "SELECT * FROM t LIMIT 100");
/// assert!(cap_limit("SELECT * FROM t LIMIT 50", 100).unchanged);
/// assert_eq!(cap_limit("SELECT * FROM t", 100).text, "SELECT * FROM t LIMIT 100");
/// ```
pub fn cap_limit(text: &str, max_rows: u32) -> QueryRewrite {
    let mut quote = find_quote(text, 0);
    let mut limit = find_limit(text, 0);

    while let Some(found) = limit.clone() {
        if let Some(span) = quote.clone()
            && span.start < found.clause.start
        {
            if span.end > found.clause.start {
                // keyword is quoted text; look for the next candidate
                limit = find_limit(text, found.clause.start.saturating_add(1));
            } else {
                quote = find_quote(text, span.end);
            }
            continue;
        }

        if !exceeds(&text[found.digits.clone()], max_rows) {
            return QueryRewrite::untouched(text);
        }

        let replacement = max_rows.to_string();
        let mut capped = String::with_capacity(text.len().saturating_add(replacement.len()));
        capped.push_str(&text[..found.digits.start]);
        capped.push_str(&replacement);
        capped.push_str(&text[found.digits.end..]);
        return QueryRewrite::rewritten(capped);
    }

    QueryRewrite::rewritten(format!("{} LIMIT {}", text, max_rows))
}

/// Numerals too long for `u64` are always larger than any `u32` cap.
fn exceeds(digits: &str, max_rows: u32) -> bool {
    digits
        .parse::<u64>()
        .map_or(true, |value| value > u64::from(max_rows))
}
