//! Segment evaluation: bind a segment to a context, then enumerate the
//! alternatives it matches there.

use std::collections::VecDeque;

use crate::path::PathKey;
use crate::path::compiler::Segment;
use crate::path::traverse::lookup;
use crate::values::Value;

/// A relative key sequence chosen by one segment.
pub type Alternative = Vec<PathKey>;

impl Segment {
    /// Bind this segment to `context`, producing a fresh cursor.
    ///
    /// Cursors are independent of each other and of the segment, so one
    /// compiled path can be evaluated against many contexts at once.
    pub fn bind(&self, context: &Value) -> Cursor {
        match self {
            Segment::Root => Cursor::Once(Some(Vec::new())),
            Segment::Key(key) => Cursor::Once(Some(vec![PathKey::Key(key.clone())])),
            Segment::Index(index) => Cursor::Once(Some(vec![PathKey::Index(*index)])),
            Segment::Wildcard => Cursor::Keys(children(context).into_iter()),
            Segment::Slice(bounds) => {
                let keys = match context {
                    Value::Array(items) => bounds.resolve(items.len()).map(PathKey::Index).collect(),
                    _ => Vec::new(),
                };
                Cursor::Keys(keys.into_iter())
            }
            Segment::Union(members) => {
                Cursor::Union(members.iter().map(|member| member.bind(context)).collect())
            }
            Segment::Descent => Cursor::Descent(Descent::new(context.clone())),
        }
    }

    /// The capture bound by choosing `alternative`, if this segment captures.
    ///
    /// Literal segments capture nothing. Recursive descent captures the key
    /// list of the node it reached; every other segment captures its key.
    pub fn capture(&self, alternative: &[PathKey]) -> Option<Value> {
        match self {
            _ if self.is_literal() => None,
            Segment::Descent => Some(alternative.iter().map(PathKey::to_value).collect()),
            _ => alternative.first().map(PathKey::to_value),
        }
    }
}

/// Enumerator over the alternatives of a bound segment.
#[derive(Debug)]
pub enum Cursor {
    /// Exactly one alternative, whatever the context holds.
    Once(Option<Alternative>),
    /// One single-key alternative per listed key.
    Keys(std::vec::IntoIter<PathKey>),
    /// Members in order.
    Union(VecDeque<Cursor>),
    Descent(Descent),
}

impl Iterator for Cursor {
    type Item = Alternative;

    fn next(&mut self) -> Option<Alternative> {
        match self {
            Cursor::Once(alternative) => alternative.take(),
            Cursor::Keys(keys) => keys.next().map(|key| vec![key]),
            Cursor::Union(members) => {
                while let Some(front) = members.front_mut() {
                    if let Some(alternative) = front.next() {
                        return Some(alternative);
                    }
                    members.pop_front();
                }
                None
            }
            Cursor::Descent(walk) => walk.next(),
        }
    }
}

/// Pre-order walk of the subtree under a context, the context included.
///
/// A node's children are listed, with handles on their values, when the walk
/// reaches the node. Nodes written into the tree after that point are not
/// visited, so the walk ends even when the caller writes through every slot.
#[derive(Debug)]
pub struct Descent {
    pending: Vec<(Alternative, Value)>,
}

impl Descent {
    fn new(root: Value) -> Self {
        Self {
            pending: vec![(Vec::new(), root)],
        }
    }
}

impl Iterator for Descent {
    type Item = Alternative;

    fn next(&mut self) -> Option<Alternative> {
        let (path, node) = self.pending.pop()?;
        for key in children(&node).into_iter().rev() {
            let Some(child) = lookup(&node, std::slice::from_ref(&key)) else {
                continue;
            };
            let mut child_path = path.clone();
            child_path.push(key);
            self.pending.push((child_path, child));
        }
        Some(path)
    }
}

/// Keys of a hash in sorted order, or indices of an array.
fn children(node: &Value) -> Vec<PathKey> {
    match node {
        Value::Hash(map) => map.keys().into_iter().map(PathKey::Key).collect(),
        Value::Array(items) => (0..items.len()).map(PathKey::Index).collect(),
        _ => Vec::new(),
    }
}
