//! Single-shot traversal to a slot, with optional vivification.

use crate::activation::{Activation, Throws};
use crate::errors::TraversalError;
use crate::path::PathKey;
use crate::values::{Array, Hash, Value};

/// A writable location in a data tree.
///
/// Element and entry slots hold a handle on their container, so a slot stays
/// valid however the surrounding tree is rebound.
#[derive(Debug)]
pub enum Slot<'a> {
    /// The data root itself.
    Root(&'a mut Value),
    Element { array: Array, index: usize },
    Entry { hash: Hash, key: String },
}

impl Slot<'_> {
    /// Shared handle on the value in the slot; void when it is empty.
    pub fn get(&self) -> Value {
        match self {
            Slot::Root(value) => (**value).clone(),
            Slot::Element { array, index } => array.get(*index).unwrap_or_default(),
            Slot::Entry { hash, key } => hash.get(key).unwrap_or_default(),
        }
    }

    /// Store `value` in the slot, releasing what was there.
    pub fn set(&mut self, value: Value) {
        match self {
            Slot::Root(root) => **root = value,
            Slot::Element { array, index } => array.set(*index, value),
            Slot::Entry { hash, key } => {
                hash.insert(key.clone(), value);
            }
        }
    }

    /// Whether the location holds a value (possibly void).
    pub fn exists(&self) -> bool {
        match self {
            Slot::Root(_) => true,
            Slot::Element { array, index } => *index < array.len(),
            Slot::Entry { hash, key } => hash.contains_key(key),
        }
    }
}

/// Walk `data` along one key or an array of keys.
///
/// With `vivify`, missing containers are created on the way: an array when
/// the key is an index (or an all-digit string), a hash otherwise. Arrays are
/// padded with voids up to the target index. A key that does not fit the
/// container it meets is a type conflict and is thrown. Without `vivify`, a
/// missing or mismatched location yields `None`.
pub fn traverse<'a>(
    cx: &mut Activation,
    data: &'a mut Value,
    key: &Value,
    vivify: bool,
) -> Throws<Option<Slot<'a>>> {
    let keys = match PathKey::flatten(key) {
        Ok(keys) => keys,
        Err(err) => return Err(cx.throw(err.to_string())),
    };
    traverse_keys(cx, data, &keys, vivify)
}

/// [`traverse`] with the keys already resolved.
pub fn traverse_keys<'a>(
    cx: &mut Activation,
    data: &'a mut Value,
    keys: &[PathKey],
    vivify: bool,
) -> Throws<Option<Slot<'a>>> {
    let Some((last, parents)) = keys.split_last() else {
        return Ok(Some(Slot::Root(data)));
    };
    if vivify && data.is_void() {
        *data = container_for(&keys[0]);
    }

    let mut container = data.clone();
    for (depth, key) in parents.iter().enumerate() {
        let Some(mut slot) = step_into(cx, &container, key, vivify)? else {
            return Ok(None);
        };
        let mut child = slot.get();
        if vivify && child.is_void() {
            child = container_for(&keys[depth + 1]);
            slot.set(child.clone());
        }
        container = child;
    }
    step_into(cx, &container, last, vivify)
}

/// Resolve `key` against one container into a slot.
///
/// In vivify mode the slot is created if needed; otherwise it must exist.
fn step_into(
    cx: &mut Activation,
    container: &Value,
    key: &PathKey,
    vivify: bool,
) -> Throws<Option<Slot<'static>>> {
    let slot = match (container, key.as_index()) {
        (Value::Array(array), Some(index)) => {
            if vivify && index >= array.len() {
                array.set(index, Value::Void);
            }
            Slot::Element {
                array: array.clone(),
                index,
            }
        }
        (Value::Hash(hash), _) => {
            let key = key.to_key_string();
            if vivify && !hash.contains_key(&key) {
                hash.insert(key.clone(), Value::Void);
            }
            Slot::Entry {
                hash: hash.clone(),
                key,
            }
        }
        (other, _) => {
            if !vivify {
                return Ok(None);
            }
            let err = TraversalError::TypeConflict {
                key: key.to_key_string(),
                kind: other.kind(),
            };
            return Err(cx.throw(err.to_string()));
        }
    };
    Ok(slot.exists().then_some(slot))
}

/// Read-only walk: a handle on the value at `keys`, if it exists.
pub fn lookup(data: &Value, keys: &[PathKey]) -> Option<Value> {
    let mut current = data.clone();
    for key in keys {
        let next = match (&current, key.as_index()) {
            (Value::Array(array), Some(index)) => array.get(index)?,
            (Value::Hash(hash), _) => hash.get(&key.to_key_string())?,
            _ => return None,
        };
        current = next;
    }
    Some(current)
}

fn container_for(key: &PathKey) -> Value {
    match key.as_index() {
        Some(_) => Value::Array(Array::new()),
        None => Value::Hash(Hash::new()),
    }
}
