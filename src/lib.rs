//! jsondata - refcounted JSON-like values addressed by a small JSONPath dialect
//!
//! # Overview
//!
//! The crate bundles three pieces that work together:
//!
//! - [`Value`]: a dynamically typed, reference-counted tree of scalars,
//!   strings, arrays and hashes. Containers are shared stores, so an
//!   assignment aliases instead of copying.
//! - [`Activation`]: a stack of cleanup frames with exceptions. Fallible
//!   operations return [`Throws`] and propagate with `?` to the nearest
//!   [`Activation::scope`] or [`Activation::try_catch`].
//! - The path engine: [`compile`] turns path text such as `$..author` or
//!   `$.store.book[0:2].title` into a [`CompiledPath`] (cached on the string),
//!   and [`path_iter`] walks every location it matches, optionally creating
//!   missing containers on the way.
//!
//! # Quick Start
//!
//! ```ignore
//! use jsondata::{Activation, Value, json, path_iter};
//!
//! let mut data = json::decode(r#"{"books":[{"title":"A"},{"title":"B"}]}"#)?;
//! let mut cx = Activation::new();
//! let titles = cx.try_catch(|cx| {
//!     let mut iter = path_iter(cx, &mut data, &Value::from("$.books[*].title"), false)?;
//!     let mut titles = Vec::new();
//!     while let Some(found) = iter.next(cx)? {
//!         titles.push(found.value().to_string());
//!     }
//!     Ok(titles)
//! });
//! assert_eq!(titles.unwrap(), vec!["A", "B"]);
//! ```
//!
//! # Writing
//!
//! With `vivify` set, every match gets a slot, creating hashes for string
//! keys and arrays for indices:
//!
//! ```ignore
//! let mut data = Value::Void;
//! let mut cx = Activation::new();
//! cx.try_catch(|cx| path::set(cx, &mut data, &Value::from("$.a[1].b"), &Value::from(true)))?;
//! assert_eq!(json::encode(&data)?, r#"{"a":[null,{"b":true}]}"#);
//! ```

// Re-export the public API from jsondata_core
pub use jsondata_core::activation::{Activation, Frame, Throws, Unwind};
pub use jsondata_core::path::{
    self, CompiledPath, Match, PathIter, PathKey, Slot, compile, compile_str, path_iter,
    render_path, traverse,
};
pub use jsondata_core::values::{self, Array, Hash, Kind, NativeObject, Str, Value};
pub use jsondata_core::{format, json, strings, throw};

// Re-export errors
pub use jsondata_core::errors::{
    FormatError, JsonError, PathSyntaxError, PathSyntaxErrorKind, TraversalError,
};
