//! Table-driven path iteration tests.
//!
//! Every fixture runs its path over a fresh copy of its data, records the
//! concrete path of each match, and then writes that path (as an array of
//! keys) into the matched slot. Both the visit order and the resulting tree
//! are compared against the expected values.

use jsondata_core::{Activation, Value, json, path, path_iter};
use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;

struct Fixture {
    name: &'static str,
    path: &'static str,
    data: &'static str,
    vivify: bool,
    visits: &'static [&'static str],
    after: &'static str,
}

static FIXTURES: Lazy<Vec<Fixture>> = Lazy::new(|| {
    vec![
        Fixture {
            name: "single_key",
            path: "$.id",
            data: r#"{"id":[1,2,3]}"#,
            vivify: false,
            visits: &["$.id"],
            after: r#"{"id":["id"]}"#,
        },
        Fixture {
            name: "key_without_root",
            path: "name",
            data: r#"{"name":"x","other":1}"#,
            vivify: false,
            visits: &["$.name"],
            after: r#"{"name":["name"],"other":1}"#,
        },
        Fixture {
            name: "index",
            path: "$.list[1]",
            data: r#"{"list":["a","b","c"]}"#,
            vivify: false,
            visits: &["$.list[1]"],
            after: r#"{"list":["a",["list",1],"c"]}"#,
        },
        Fixture {
            name: "wildcard_sorted",
            path: "$.*",
            data: r#"{"b":1,"a":2,"c":3}"#,
            vivify: false,
            visits: &["$.a", "$.b", "$.c"],
            after: r#"{"a":["a"],"b":["b"],"c":["c"]}"#,
        },
        Fixture {
            name: "wildcard_then_key",
            path: "$.people[*].age",
            data: r#"{"people":[{"age":30},{"name":"nobody"},{"age":41}]}"#,
            vivify: false,
            visits: &["$.people[0].age", "$.people[2].age"],
            after: r#"{"people":[{"age":["people",0,"age"]},{"name":"nobody"},{"age":["people",2,"age"]}]}"#,
        },
        Fixture {
            name: "wildcard_then_key_vivified",
            path: "$.people[*].age",
            data: r#"{"people":[{"age":30},{"name":"nobody"}]}"#,
            vivify: true,
            visits: &["$.people[0].age", "$.people[1].age"],
            after: r#"{"people":[{"age":["people",0,"age"]},{"age":["people",1,"age"],"name":"nobody"}]}"#,
        },
        Fixture {
            name: "slice",
            path: "$[1:3]",
            data: "[0,1,2,3]",
            vivify: false,
            visits: &["$[1]", "$[2]"],
            after: "[0,[1],[2],3]",
        },
        Fixture {
            name: "negative_index",
            path: "$[-1]",
            data: "[0,1,2]",
            vivify: false,
            visits: &["$[2]"],
            after: "[0,1,[2]]",
        },
        Fixture {
            name: "quoted_union",
            path: "$['a key','b']",
            data: r#"{"a key":1,"b":2,"c":3}"#,
            vivify: false,
            visits: &["$['a key']", "$.b"],
            after: r#"{"a key":["a key"],"b":["b"],"c":3}"#,
        },
        Fixture {
            name: "descent_to_key",
            path: "$..id",
            data: r#"{"id":1,"items":[{"id":2},{"sub":{"id":3}}]}"#,
            vivify: false,
            visits: &["$.id", "$.items[0].id", "$.items[1].sub.id"],
            after: r#"{"id":["id"],"items":[{"id":["items",0,"id"]},{"sub":{"id":["items",1,"sub","id"]}}]}"#,
        },
        Fixture {
            name: "descent_wildcard_with_writes",
            path: "$..*",
            data: r#"{"a":1}"#,
            vivify: false,
            visits: &["$.a", "$.a[0]"],
            after: r#"{"a":["a",["a",0]]}"#,
        },
        Fixture {
            name: "descent_wildcard_nested_with_writes",
            path: "$..*",
            data: r#"{"a":{"b":1}}"#,
            vivify: false,
            visits: &["$.a", "$.a[0]"],
            after: r#"{"a":["a",["a",0]]}"#,
        },
        Fixture {
            name: "descent_vivify",
            path: "$..foo",
            data: "{}",
            vivify: true,
            visits: &["$.foo"],
            after: r#"{"foo":["foo"]}"#,
        },
        Fixture {
            name: "vivify_from_nothing",
            path: "$.a[1].b",
            data: "null",
            vivify: true,
            visits: &["$.a[1].b"],
            after: r#"{"a":[null,{"b":["a",1,"b"]}]}"#,
        },
        Fixture {
            name: "missing_without_vivify",
            path: "$.a.b",
            data: r#"{"a":{}}"#,
            vivify: false,
            visits: &[],
            after: r#"{"a":{}}"#,
        },
        Fixture {
            name: "key_on_scalar",
            path: "$.a.b",
            data: r#"{"a":5}"#,
            vivify: false,
            visits: &[],
            after: r#"{"a":5}"#,
        },
    ]
});

fn run(fixture: &Fixture) -> (Vec<String>, String) {
    let mut data = json::decode(fixture.data)
        .unwrap_or_else(|e| panic!("{}: bad fixture data: {}", fixture.name, e));
    let mut cx = Activation::new();
    let visits = cx
        .try_catch(|cx| {
            let mut iter = path_iter(cx, &mut data, &Value::from(fixture.path), fixture.vivify)?;
            let mut visits = Vec::new();
            while let Some(mut found) = iter.next(cx)? {
                visits.push(found.path_text());
                let path = found.path_value();
                found.set(path);
            }
            Ok(visits)
        })
        .unwrap_or_else(|e| panic!("{}: iteration threw: {}", fixture.name, e));
    let after = json::encode(&data).unwrap();
    (visits, after)
}

#[test]
fn test_path_fixtures() {
    for fixture in FIXTURES.iter() {
        let (visits, after) = run(fixture);
        assert_eq!(visits, fixture.visits, "visits of {}", fixture.name);
        assert_eq!(after, fixture.after, "data after {}", fixture.name);
    }
}

#[test]
fn test_fixture_paths_round_trip_through_compile() {
    for fixture in FIXTURES.iter() {
        let (visits, _) = run(fixture);
        for visit in visits {
            let mut data = json::decode(fixture.after).unwrap();
            let mut cx = Activation::new();
            let hits = cx
                .try_catch(|cx| {
                    let mut iter = path_iter(cx, &mut data, &Value::from(visit.as_str()), false)?;
                    let mut hits = Vec::new();
                    while let Some(found) = iter.next(cx)? {
                        hits.push(found.path_text());
                    }
                    Ok(hits)
                })
                .unwrap();
            assert_eq!(hits, vec![visit.clone()], "re-running {}", visit);
        }
    }
}

fn set_all(data: &str, path: &str, value: &str) -> (usize, String) {
    let mut data = json::decode(data).unwrap();
    let value = json::decode(value).unwrap();
    let mut cx = Activation::new();
    let written = cx
        .try_catch(|cx| path::set(cx, &mut data, &Value::from(path), &value))
        .unwrap_or_else(|e| panic!("setting {} threw: {}", path, e));
    (written, json::encode(&data).unwrap())
}

#[test]
fn test_set_container_through_descent() {
    assert_eq!(set_all("{}", "$..foo", "{}"), (1, r#"{"foo":{}}"#.to_string()));
    assert_eq!(
        set_all(r#"{"a":{}}"#, "$..foo", "{}"),
        (2, r#"{"a":{"foo":{}},"foo":{}}"#.to_string())
    );
    assert_eq!(
        set_all(r#"{"a":{"b":{}}}"#, "$..foo", "1"),
        (3, r#"{"a":{"b":{"foo":1},"foo":1},"foo":1}"#.to_string())
    );
}

#[test]
fn test_set_through_descent_does_not_alias_the_value_into_itself() {
    let mut data = json::decode("{}").unwrap();
    let value = Value::hash();
    let mut cx = Activation::new();
    cx.try_catch(|cx| path::set(cx, &mut data, &Value::from("$..foo"), &value))
        .unwrap();
    assert!(value.as_hash().unwrap().is_empty());
    assert_eq!(value.refcount(), 2);
}
