//! JSON Pointer (RFC 6901) addressing with an array-iteration extension.
//!
//! An empty segment applied to an array consumes the next value from a
//! caller-supplied index list, so one pointer such as `/items//name` can
//! address every element of `items` in turn:
//!
//! ```rust
//! use hdbstudio_core::pointer::resolve;
//! use serde_json::json;
//!
//! let doc = json!({"items": [{"name": "a"}, {"name": "b"}, {"name": "c"}]});
//! assert_eq!(resolve(&doc, "/items//name", &[2]), Some(&json!("c")));
//! ```
//!
//! A missing value is `None`, never an error. Errors are reserved for callers
//! that hand over malformed index lists or segments.

use crate::{Result, error::HdbStudioError};
use serde_json::{Map, Value};

/// One segment used to build a pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object key, escaped when the pointer is built
    Key(String),
    /// Array position
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Resolves `pointer` inside `root`.
///
/// The leading `/` is optional and an empty pointer returns `root`. Each
/// object key is unescaped (`~1` to `/`, then `~0` to `~`). Returns `None`
/// when the location does not exist: a missing key, an out-of-range or
/// non-numeric array segment, a segment applied to a scalar, or an empty
/// array segment after `indices` ran out.
pub fn resolve<'a>(root: &'a Value, pointer: &str, indices: &[usize]) -> Option<&'a Value> {
    if pointer.is_empty() {
        return Some(root);
    }

    let mut remaining = indices.iter();
    split_segments(pointer)
        .try_fold(root, |current, segment| step(current, segment, &mut remaining))
}

/// Resolves `pointer` inside a record without wrapping it in a [`Value`].
///
/// Behaves like [`resolve`], except that the empty pointer yields `None`
/// because the record itself is not a JSON value.
pub fn resolve_in_record<'a>(
    record: &'a Map<String, Value>,
    pointer: &str,
    indices: &[usize],
) -> Option<&'a Value> {
    if pointer.is_empty() {
        return None;
    }

    let mut remaining = indices.iter();
    let mut segments = split_segments(pointer);
    let first = record.get(&unescape(segments.next()?))?;
    segments.try_fold(first, |current, segment| step(current, segment, &mut remaining))
}

fn split_segments(pointer: &str) -> std::str::Split<'_, char> {
    pointer.strip_prefix('/').unwrap_or(pointer).split('/')
}

fn step<'a>(
    current: &'a Value,
    segment: &str,
    remaining: &mut std::slice::Iter<'_, usize>,
) -> Option<&'a Value> {
    match current {
        Value::Array(items) => {
            let position = if segment.is_empty() {
                *remaining.next()?
            } else {
                parse_array_index(segment)?
            };
            items.get(position)
        }
        Value::Object(map) => map.get(&unescape(segment)),
        _ => None,
    }
}

/// Resolves `pointer` with an index list supplied as loosely typed JSON.
///
/// `indices` may be `null` (no indices), one non-negative integer, or an
/// array of non-negative integers.
///
/// # Errors
/// Returns a contract violation for any other shape of `indices`.
pub fn resolve_with_indices<'a>(
    root: &'a Value,
    pointer: &str,
    indices: &Value,
) -> Result<Option<&'a Value>> {
    let indices = index_list(indices)?;
    Ok(resolve(root, pointer, &indices))
}

/// Builds a pointer from key and index segments.
///
/// `~` is escaped before `/` so an existing `~1` in a key cannot be
/// double-escaped. An empty sequence yields the empty pointer.
///
/// ```rust
/// use hdbstudio_core::pointer::{PathSegment, build};
///
/// assert_eq!(build(["a/b", "m~n"]), "/a~1b/m~0n");
/// assert_eq!(build([PathSegment::from("items"), PathSegment::from(2_usize)]), "/items/2");
/// assert_eq!(build(Vec::<PathSegment>::new()), "");
/// ```
pub fn build<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: Into<PathSegment>,
{
    let mut pointer = String::new();
    for segment in segments {
        pointer.push('/');
        match segment.into() {
            PathSegment::Key(key) => pointer.push_str(&escape(&key)),
            PathSegment::Index(index) => pointer.push_str(&index.to_string()),
        }
    }
    pointer
}

/// Builds a pointer from loosely typed JSON segments.
///
/// Strings, numbers and booleans become their text; `null` becomes an empty
/// segment.
///
/// # Errors
/// Returns a contract violation for object or array segments.
pub fn build_from_values(segments: &[Value]) -> Result<String> {
    let keys = segments
        .iter()
        .enumerate()
        .map(|(position, segment)| match segment {
            Value::Null => Ok(String::new()),
            Value::String(key) => Ok(key.clone()),
            Value::Number(number) => Ok(number.to_string()),
            Value::Bool(flag) => Ok(flag.to_string()),
            Value::Array(_) | Value::Object(_) => Err(HdbStudioError::contract_violation(
                format!(
                    "pointer segment {} is an object or array, expected a string or number",
                    position
                ),
            )),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(build(keys))
}

fn escape(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn parse_array_index(segment: &str) -> Option<usize> {
    if segment.bytes().all(|b| b.is_ascii_digit()) {
        segment.parse().ok()
    } else {
        None
    }
}

fn index_list(indices: &Value) -> Result<Vec<usize>> {
    match indices {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.iter().map(index_value).collect(),
        single @ Value::Number(_) => Ok(vec![index_value(single)?]),
        other => Err(HdbStudioError::contract_violation(format!(
            "pointer indices must be a number or an array of numbers, got {}",
            json_kind(other)
        ))),
    }
}

fn index_value(value: &Value) -> Result<usize> {
    value
        .as_u64()
        .and_then(|index| usize::try_from(index).ok())
        .ok_or_else(|| {
            HdbStudioError::contract_violation(format!(
                "pointer index {} is not a non-negative integer",
                value
            ))
        })
}

/// Name of a JSON value's kind, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
