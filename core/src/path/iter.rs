//! Depth-first path iteration.
//!
//! A compiled path is a pipeline of segments; each segment enumerates
//! alternatives relative to the location its predecessor chose. The iterator
//! keeps one bound [`Cursor`] per entered segment on an explicit stack and
//! resumes from the innermost one on every call, so matches come out one at a
//! time with no recursion.

use std::rc::Rc;

use tracing::trace;

use crate::activation::{Activation, Throws};
use crate::path::compiler::{CompiledPath, compile};
use crate::path::segment::Cursor;
use crate::path::traverse::{Slot, lookup, traverse_keys};
use crate::path::{PathKey, render_path};
use crate::values::Value;

struct Level {
    cursor: Cursor,
    keys_len: usize,
    captures_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fresh,
    Running,
    Done,
}

/// Iterator over the locations a path matches in a data tree.
///
/// This is a lending iterator: each [`Match`] borrows the iterator, and
/// through it the data, until it is dropped.
pub struct PathIter<'a> {
    data: &'a mut Value,
    path: Rc<CompiledPath>,
    vivify: bool,
    stack: Vec<Level>,
    keys: Vec<PathKey>,
    captures: Vec<Value>,
    state: State,
}

/// One matched location.
#[derive(Debug)]
pub struct Match<'m> {
    /// The concrete path, relative to the data root.
    pub path: Vec<PathKey>,
    /// Alternatives chosen by the non-literal segments, in segment order.
    pub captures: Vec<Value>,
    pub slot: Slot<'m>,
}

impl Match<'_> {
    /// Shared handle on the matched value.
    pub fn value(&self) -> Value {
        self.slot.get()
    }

    pub fn set(&mut self, value: Value) {
        self.slot.set(value);
    }

    /// The concrete path as normalized path text.
    pub fn path_text(&self) -> String {
        render_path(&self.path)
    }

    /// The concrete path as an array of keys and indices.
    pub fn path_value(&self) -> Value {
        self.path.iter().map(PathKey::to_value).collect()
    }
}

/// Start iterating `path` over `data`.
///
/// With `vivify`, every match gets a slot, creating missing containers on
/// the way; without it, matches whose location does not exist are skipped.
pub fn path_iter<'a>(
    cx: &mut Activation,
    data: &'a mut Value,
    path: &Value,
    vivify: bool,
) -> Throws<PathIter<'a>> {
    let path = compile(cx, path)?;
    Ok(PathIter::new(data, path, vivify))
}

impl<'a> PathIter<'a> {
    pub fn new(data: &'a mut Value, path: Rc<CompiledPath>, vivify: bool) -> Self {
        Self {
            data,
            path,
            vivify,
            stack: Vec::new(),
            keys: Vec::new(),
            captures: Vec::new(),
            state: State::Fresh,
        }
    }

    pub fn path(&self) -> &CompiledPath {
        &self.path
    }

    /// Advance to the next match.
    pub fn next(&mut self, cx: &mut Activation) -> Throws<Option<Match<'_>>> {
        loop {
            if !self.advance() {
                return Ok(None);
            }
            if self.vivify || lookup(self.data, &self.keys).is_some() {
                break;
            }
        }
        trace!(path = %render_path(&self.keys), "path match");

        let slot = traverse_keys(cx, self.data, &self.keys, self.vivify)?;
        Ok(slot.map(|slot| Match {
            path: self.keys.clone(),
            captures: self.captures.clone(),
            slot,
        }))
    }

    /// Drain the iterator, collecting the concrete path of every match.
    pub fn collect_paths(&mut self, cx: &mut Activation) -> Throws<Vec<Vec<PathKey>>> {
        let mut paths = Vec::new();
        while let Some(found) = self.next(cx)? {
            paths.push(found.path);
        }
        Ok(paths)
    }

    /// Position `keys` and `captures` on the next full-depth alternative.
    fn advance(&mut self) -> bool {
        match self.state {
            State::Done => return false,
            State::Fresh => {
                self.state = State::Running;
                if self.path.is_empty() {
                    self.state = State::Done;
                    return true;
                }
                let root = self.data.clone();
                self.enter(0, &root);
            }
            State::Running => {}
        }

        loop {
            let Some(level) = self.stack.last_mut() else {
                self.state = State::Done;
                return false;
            };
            self.keys.truncate(level.keys_len);
            self.captures.truncate(level.captures_len);
            let Some(alternative) = level.cursor.next() else {
                self.stack.pop();
                continue;
            };

            let depth = self.stack.len();
            if let Some(capture) = self.path.segments()[depth - 1].capture(&alternative) {
                self.captures.push(capture);
            }
            self.keys.extend(alternative);
            if depth == self.path.len() {
                return true;
            }

            match lookup(self.data, &self.keys) {
                Some(context) => self.enter(depth, &context),
                None if self.vivify => self.enter(depth, &Value::Void),
                None => {}
            }
        }
    }

    fn enter(&mut self, segment: usize, context: &Value) {
        let cursor = self.path.segments()[segment].bind(context);
        self.stack.push(Level {
            cursor,
            keys_len: self.keys.len(),
            captures_len: self.captures.len(),
        });
    }
}
