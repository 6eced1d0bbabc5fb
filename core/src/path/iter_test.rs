use pretty_assertions::assert_eq;

use super::{get, path_iter, paths, render_path, set};
use crate::activation::{Activation, Throws};
use crate::json;
use crate::values::Value;

fn data(text: &str) -> Value {
    json::decode(text).unwrap_or_else(|e| panic!("bad fixture {:?}: {}", text, e))
}

fn to_json(value: &Value) -> String {
    json::encode(value).unwrap()
}

/// Drain `path` over `source`, returning each match as
/// `"<concrete path> <captures as JSON>"`.
fn walk(source: &mut Value, path: &str, vivify: bool) -> Vec<String> {
    let mut cx = Activation::new();
    cx.try_catch(|cx| {
        let mut iter = path_iter(cx, source, &Value::from(path), vivify)?;
        let mut seen = Vec::new();
        while let Some(found) = iter.next(cx)? {
            let captures: Value = found.captures.iter().cloned().collect();
            seen.push(format!("{} {}", found.path_text(), to_json(&captures)));
        }
        Ok(seen)
    })
    .unwrap_or_else(|e| panic!("iterating {:?} should succeed: {}", path, e))
}

fn walk_paths(source: &str, path: &str) -> Vec<String> {
    walk(&mut data(source), path, false)
        .into_iter()
        .map(|line| line.split(' ').next().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_literal_key_read() {
    let mut source = data(r#"{"id":[1,2,3]}"#);
    assert_eq!(walk(&mut source, "id", false), vec!["$.id []"]);
    assert_eq!(to_json(&source), r#"{"id":[1,2,3]}"#);
}

#[test]
fn test_root_matches_once() {
    assert_eq!(walk_paths("[1]", "$"), vec!["$"]);
    assert_eq!(walk_paths("[1]", ""), vec!["$"]);
}

#[test]
fn test_wildcard_over_hash_and_array() {
    let mut source = data(r#"{"foo":{"this":12,"that":true}}"#);
    assert_eq!(
        walk(&mut source, "$.foo.*", false),
        vec![r#"$.foo.that ["that"]"#, r#"$.foo.this ["this"]"#]
    );
    assert_eq!(
        walk(&mut data("[5,6]"), "$[*]", false),
        vec!["$[0] [0]", "$[1] [1]"]
    );
    assert!(walk_paths("3", "$.*").is_empty());
}

#[test]
fn test_missing_locations_are_skipped_without_vivify() {
    assert_eq!(walk_paths(r#"{"a":1}"#, "$['a','zz']"), vec!["$.a"]);
    assert_eq!(walk_paths(r#"{"a":[1,2]}"#, "$.a[5]"), Vec::<String>::new());
    assert_eq!(walk_paths(r#"{"a":[1,2]}"#, "$.a.x"), Vec::<String>::new());
}

#[test]
fn test_slices_and_negative_indices() {
    let source = "[0,1,2,3,4]";
    assert_eq!(walk_paths(source, "$[1:3]"), vec!["$[1]", "$[2]"]);
    assert_eq!(walk_paths(source, "$[-2:]"), vec!["$[3]", "$[4]"]);
    assert_eq!(walk_paths(source, "$[-1]"), vec!["$[4]"]);
    assert_eq!(walk_paths(source, "$[-2]"), vec!["$[3]"]);
    assert_eq!(walk_paths(source, "$[:]").len(), 5);
    assert!(walk_paths(source, "$[3:1]").is_empty());
}

#[test]
fn test_union_keeps_member_order() {
    assert_eq!(
        walk(&mut data(r#"{"a":1,"b":2}"#), "$['b','a']", false),
        vec![r#"$.b ["b"]"#, r#"$.a ["a"]"#]
    );
    assert_eq!(
        walk_paths("[0,1,2,3]", "$[3,0:2]"),
        vec!["$[3]", "$[0]", "$[1]"]
    );
}

#[test]
fn test_descent_is_preorder() {
    let source = r#"{"a":{"b":1},"c":[2,3]}"#;
    assert_eq!(
        walk(&mut data(source), "$..", false),
        vec![
            "$ [[]]",
            r#"$.a [["a"]]"#,
            r#"$.a.b [["a","b"]]"#,
            r#"$.c [["c"]]"#,
            r#"$.c[0] [["c",0]]"#,
            r#"$.c[1] [["c",1]]"#,
        ]
    );
}

#[test]
fn test_descent_then_key() {
    let source = r#"{"name":"root","kids":[{"name":"k0"},{"age":3},{"name":"k2"}]}"#;
    assert_eq!(
        walk_paths(source, "$..name"),
        vec!["$.name", "$.kids[0].name", "$.kids[2].name"]
    );
    let mut cx = Activation::new();
    let names: Vec<String> = cx
        .try_catch(|cx| {
            let mut root = data(source);
            let mut iter = path_iter(cx, &mut root, &Value::from("$..name"), false)?;
            let mut names = Vec::new();
            while let Some(found) = iter.next(cx)? {
                names.push(found.value().to_string());
            }
            Ok(names)
        })
        .unwrap();
    assert_eq!(names, vec!["root", "k0", "k2"]);
}

#[test]
fn test_descent_skips_nodes_written_after_visit() {
    let mut cx = Activation::new();
    let mut root = data(r#"{"a":{}}"#);
    let seen = cx
        .try_catch(|cx| {
            let mut iter = path_iter(cx, &mut root, &Value::from("$.."), false)?;
            let mut seen = Vec::new();
            while let Some(mut found) = iter.next(cx)? {
                if found.path_text() == "$.a" {
                    found.set(data(r#"{"c":3}"#));
                }
                seen.push(found.path_text());
            }
            Ok(seen)
        })
        .unwrap();
    assert_eq!(seen, vec!["$", "$.a"]);
    assert_eq!(to_json(&root), r#"{"a":{"c":3}}"#);
}

#[test]
fn test_assign_concrete_path_into_each_slot() {
    let mut cx = Activation::new();
    let mut root = data(r#"{"x":1,"y":{"z":2}}"#);
    cx.try_catch(|cx| -> Throws<()> {
        let mut iter = path_iter(cx, &mut root, &Value::from("$.*"), false)?;
        while let Some(mut found) = iter.next(cx)? {
            let path = found.path_value();
            found.set(path);
        }
        Ok(())
    })
    .unwrap();
    assert_eq!(to_json(&root), r#"{"x":["x"],"y":["y"]}"#);
}

#[test]
fn test_vivify_creates_containers() {
    let mut root = Value::Void;
    assert_eq!(walk(&mut root, "$.a.b[2]", true), vec!["$.a.b[2] []"]);
    assert_eq!(to_json(&root), r#"{"a":{"b":[null,null,null]}}"#);

    let mut root = data(r#"{"list":[{},{}]}"#);
    assert_eq!(walk(&mut root, "$.list[*].id", true).len(), 2);
    assert_eq!(to_json(&root), r#"{"list":[{"id":null},{"id":null}]}"#);
}

#[test]
fn test_vivify_type_conflict_throws() {
    let mut cx = Activation::new();
    let mut root = data(r#"{"a":[1]}"#);
    let payload = cx
        .try_catch(|cx| -> Throws<()> {
            let mut iter = path_iter(cx, &mut root, &Value::from("$.a.name"), true)?;
            while iter.next(cx)?.is_some() {}
            Ok(())
        })
        .unwrap_err();
    assert_eq!(
        payload.to_string(),
        "cannot use key 'name' on a value of kind array"
    );
    assert_eq!(cx.depth(), 0);
}

#[test]
fn test_bad_path_throws() {
    let mut cx = Activation::new();
    let mut root = Value::hash();
    let payload = cx
        .try_catch(|cx| path_iter(cx, &mut root, &Value::from("$.a["), false).map(|_| ()))
        .unwrap_err();
    assert!(payload.to_string().starts_with("unclosed '['"));
}

#[test]
fn test_programmatic_path() {
    let mut source = data(r#"{"a key":[10,20]}"#);
    let mut cx = Activation::new();
    let found = cx
        .try_catch(|cx| {
            let mut iter = path_iter(cx, &mut source, &data(r#"["a key",1]"#), false)?;
            Ok(iter.next(cx)?.map(|found| (found.path_text(), found.value())))
        })
        .unwrap();
    assert_eq!(
        found,
        Some(("$['a key'][1]".to_string(), Value::Int(20)))
    );
}

#[test]
fn test_iterator_is_exhausted_for_good() {
    let mut cx = Activation::new();
    let mut root = data("[1]");
    cx.try_catch(|cx| -> Throws<()> {
        let mut iter = path_iter(cx, &mut root, &Value::from("$[0]"), false)?;
        assert!(iter.next(cx)?.is_some());
        assert!(iter.next(cx)?.is_none());
        assert!(iter.next(cx)?.is_none());
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_get_set_and_paths() {
    let mut cx = Activation::new();
    let mut root = data(r#"{"users":[{"name":"ann"},{"name":"bob"}]}"#);
    cx.try_catch(|cx| -> Throws<()> {
        let first = get(cx, &root, &Value::from("$.users[*].name"))?;
        assert_eq!(first.map(|v| v.to_string()), Some("ann".to_string()));
        assert_eq!(get(cx, &root, &Value::from("$.nobody"))?, None);

        let written = set(cx, &mut root, &Value::from("$.users[*].admin"), &Value::from(false))?;
        assert_eq!(written, 2);

        let found = paths(cx, &root, &Value::from("$..admin"))?;
        let rendered: Vec<String> = found.iter().map(|keys| render_path(keys)).collect();
        assert_eq!(rendered, vec!["$.users[0].admin", "$.users[1].admin"]);
        Ok(())
    })
    .unwrap();
    assert_eq!(
        to_json(&root),
        r#"{"users":[{"admin":false,"name":"ann"},{"admin":false,"name":"bob"}]}"#
    );
}
