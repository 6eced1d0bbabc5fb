//! The dynamic value model.
//!
//! A [`Value`] is a closed sum over void, booleans, integers, reals, strings,
//! arrays, hashes and opaque objects. Strings and containers live in shared,
//! reference-counted stores; see [`Value`] for the assignment rules.

mod object;
mod value;

pub use object::{Finalizer, NativeObject};
pub use value::{Annex, Array, Hash, Kind, Str, Value, stringify};
