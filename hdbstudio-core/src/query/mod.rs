//! Query sanitization before text is sent to the remote database.
//!
//! The sanitizer never parses SQL. It scans for three classes of match
//! (quoted spans, comments and the `;` statement terminator) and treats
//! anything inside quotes as opaque:
//! - [`strip_comments`]: removes comments and trailing statements
//! - [`cap_limit`]: bounds the row-limit clause
//! - [`prepare`]: both, in the order the transport expects
//!
//! All functions are pure. Scan positions are local to each call, so the
//! sanitizer is safe to call from any number of threads at once.

mod limit;
mod scan;
mod source;
mod strip;

pub use limit::cap_limit;
pub use source::QuerySource;
pub use strip::strip_comments;

/// Output of a sanitizer pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRewrite {
    /// Resulting query text
    pub text: String,
    /// True when `text` is byte-identical to the input
    pub unchanged: bool,
}

impl QueryRewrite {
    pub(crate) fn untouched(text: &str) -> Self {
        Self {
            text: text.to_string(),
            unchanged: true,
        }
    }

    pub(crate) fn rewritten(text: String) -> Self {
        Self {
            text,
            unchanged: false,
        }
    }
}

/// Strips comments and trailing statements, then caps the row limit.
pub fn prepare(text: &str, max_rows: u32) -> String {
    let stripped = strip_comments(text);
    if !stripped.unchanged {
        tracing::debug!("Removed comments or trailing statements from query");
    }

    let capped = cap_limit(&stripped.text, max_rows);
    if !capped.unchanged {
        tracing::debug!("Row limit capped at {}", max_rows);
    }

    capped.text
}
