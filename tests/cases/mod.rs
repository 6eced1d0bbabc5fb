//! Shared helpers for the query and update tests.
//!
//! `query_case!` runs a path over a JSON document in read mode and compares
//! the matched values (as JSON) or the thrown message; `update_case!` stores
//! a value at every match with vivification and compares the document.

#![allow(dead_code)]

use jsondata::{Activation, Value, json, path};

/// Values matched by `path` in `data`, each encoded as JSON.
pub fn query(data: &str, path: &str) -> Result<Vec<String>, String> {
    let mut data = json::decode(data).map_err(|e| e.to_string())?;
    let mut cx = Activation::new();
    let values = cx
        .try_catch(|cx| {
            let mut iter = jsondata::path_iter(cx, &mut data, &Value::from(path), false)?;
            let mut values = Vec::new();
            while let Some(found) = iter.next(cx)? {
                values.push(found.value());
            }
            Ok(values)
        })
        .map_err(|payload| payload.to_string())?;
    values
        .iter()
        .map(|value| json::encode(value).map_err(|e| e.to_string()))
        .collect()
}

/// `data` after storing `value` at every location `path` matches.
pub fn update(data: &str, path: &str, value: &str) -> Result<String, String> {
    let mut data = json::decode(data).map_err(|e| e.to_string())?;
    let value = json::decode(value).map_err(|e| e.to_string())?;
    let mut cx = Activation::new();
    cx.try_catch(|cx| path::set(cx, &mut data, &Value::from(path), &value))
        .map_err(|payload| payload.to_string())?;
    json::encode(&data).map_err(|e| e.to_string())
}

#[macro_export]
macro_rules! query_case {
    ($name:ident, data: $data:expr, path: $path:expr, values: $expected:expr $(,)?) => {
        #[test]
        fn $name() {
            let expected: Result<Vec<&str>, &str> = $expected;
            let expected = expected
                .map(|values| values.into_iter().map(String::from).collect::<Vec<_>>())
                .map_err(String::from);
            pretty_assertions::assert_eq!($crate::cases::query($data, $path), expected);
        }
    };
}

#[macro_export]
macro_rules! update_case {
    ($name:ident, data: $data:expr, path: $path:expr, value: $value:expr, updated: $expected:expr $(,)?) => {
        #[test]
        fn $name() {
            let expected: Result<&str, &str> = $expected;
            pretty_assertions::assert_eq!(
                $crate::cases::update($data, $path, $value),
                expected.map(String::from).map_err(String::from)
            );
        }
    };
}
