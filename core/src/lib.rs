//! Core of `jsondata`: a refcounted JSON-like value model, an activation stack
//! for scoped cleanup and exceptions, and a small JSONPath dialect for
//! reading, writing and iterating locations in a value tree.

pub mod activation;
pub mod errors;
pub mod format;
pub mod json;
pub mod path;
pub mod strings;
pub mod syntax;
pub mod values;


pub use activation::{Activation, Throws, Unwind};
pub use path::{CompiledPath, Match, PathIter, PathKey, Slot, compile, path_iter, traverse};
pub use values::{Array, Hash, Kind, Str, Value};
