//! The path language: a small JSONPath dialect.
//!
//! ```text
//! $.store.book[0].title      literal keys and indices
//! $..author                  recursive descent
//! $.store.*                  wildcard
//! $.list[1:3]  $.list[-1]    slices
//! $['a key', 'other']        quoted keys and unions
//! ```
//!
//! A path string is tokenized by [`Tokenizer`], compiled by [`compile`] into
//! a [`CompiledPath`] (cached on the string), and evaluated by [`PathIter`].

mod compiler;
mod iter;
pub mod lexer;
mod segment;
mod traverse;

#[cfg(test)]
mod iter_test;
#[cfg(test)]
mod lexer_test;

use std::fmt;

pub use compiler::{CompiledPath, Segment, compile, compile_str};
pub use iter::{Match, PathIter, path_iter};
pub use lexer::{SliceBounds, Token, Tokenizer};
pub use segment::{Alternative, Cursor, Descent};
pub use traverse::{Slot, lookup, traverse, traverse_keys};

use crate::activation::{Activation, Throws};
use crate::errors::TraversalError;
use crate::syntax::string_literal::{escape_key, is_bare_key};
use crate::values::Value;

/// One component of a concrete path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathKey {
    Key(String),
    Index(usize),
}

impl PathKey {
    /// A key from a string or a non-negative integer.
    pub fn from_value(value: &Value) -> Result<PathKey, TraversalError> {
        match value {
            Value::Str(key) => Ok(PathKey::Key(key.text())),
            Value::Int(index) if *index >= 0 => Ok(PathKey::Index(*index as usize)),
            other => Err(TraversalError::InvalidKey(other.to_string())),
        }
    }

    /// Keys of a programmatic path: a single key or an array of keys, with
    /// nested arrays flattened.
    pub fn flatten(value: &Value) -> Result<Vec<PathKey>, TraversalError> {
        let mut keys = Vec::new();
        flatten_into(value, &mut keys)?;
        Ok(keys)
    }

    pub fn to_value(&self) -> Value {
        match self {
            PathKey::Key(key) => Value::string(key.as_str()),
            PathKey::Index(index) => Value::from(*index),
        }
    }

    /// The index this key addresses in an array: an index, or a string of
    /// decimal digits.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathKey::Index(index) => Some(*index),
            PathKey::Key(key) if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) => {
                key.parse().ok()
            }
            PathKey::Key(_) => None,
        }
    }

    /// The key this addresses in a hash; indices use their decimal text.
    pub fn to_key_string(&self) -> String {
        match self {
            PathKey::Key(key) => key.clone(),
            PathKey::Index(index) => index.to_string(),
        }
    }
}

fn flatten_into(value: &Value, keys: &mut Vec<PathKey>) -> Result<(), TraversalError> {
    match value {
        Value::Array(items) => {
            for item in items.borrow().iter() {
                flatten_into(item, keys)?;
            }
            Ok(())
        }
        other => {
            keys.push(PathKey::from_value(other)?);
            Ok(())
        }
    }
}

/// Path text for one step: `.key`, `['a key']` or `[3]`.
impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Key(key) if is_bare_key(key) => write!(f, ".{}", key),
            PathKey::Key(key) => {
                f.write_str("[")?;
                escape_key(f, key)?;
                f.write_str("]")
            }
            PathKey::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Render a concrete path as normalized path text, e.g. `$.foo[0]['a key']`.
pub fn render_path(keys: &[PathKey]) -> String {
    let mut text = String::from("$");
    for key in keys {
        text.push_str(&key.to_string());
    }
    text
}

/// The value at the first location `path` matches, if any.
pub fn get(cx: &mut Activation, data: &Value, path: &Value) -> Throws<Option<Value>> {
    let mut root = data.clone();
    let mut iter = path_iter(cx, &mut root, path, false)?;
    Ok(iter.next(cx)?.map(|found| found.value()))
}

/// Store `value` at every location `path` matches, creating missing
/// containers. Returns the number of locations written.
pub fn set(cx: &mut Activation, data: &mut Value, path: &Value, value: &Value) -> Throws<usize> {
    let mut iter = path_iter(cx, data, path, true)?;
    let mut written = 0;
    while let Some(mut found) = iter.next(cx)? {
        found.set(value.clone());
        written += 1;
    }
    Ok(written)
}

/// Concrete paths of every existing location `path` matches.
pub fn paths(cx: &mut Activation, data: &Value, path: &Value) -> Throws<Vec<Vec<PathKey>>> {
    let mut root = data.clone();
    path_iter(cx, &mut root, path, false)?.collect_paths(cx)
}
