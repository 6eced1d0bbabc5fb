mod cases;

update_case!(
    set_existing_key,
    data: r#"{"a":1}"#,
    path: "$.a",
    value: "2",
    updated: Ok(r#"{"a":2}"#),
);

update_case!(
    vivify_nested_hashes,
    data: "{}",
    path: "$.a.b.c",
    value: "true",
    updated: Ok(r#"{"a":{"b":{"c":true}}}"#),
);

update_case!(
    vivify_array_with_padding,
    data: "null",
    path: "$.list[2]",
    value: r#""x""#,
    updated: Ok(r#"{"list":[null,null,"x"]}"#),
);

update_case!(
    set_every_wildcard_match,
    data: r#"{"users":[{"name":"ann"},{"name":"bob"}]}"#,
    path: "$.users[*].active",
    value: "false",
    updated: Ok(r#"{"users":[{"active":false,"name":"ann"},{"active":false,"name":"bob"}]}"#),
);

update_case!(
    set_union_members,
    data: "[0,0,0]",
    path: "$[0,2]",
    value: "1",
    updated: Ok("[1,0,1]"),
);

update_case!(
    set_shares_containers,
    data: r#"{"a":null}"#,
    path: "$.a",
    value: r#"{"deep":[1,{"x":2}]}"#,
    updated: Ok(r#"{"a":{"deep":[1,{"x":2}]}}"#),
);

update_case!(
    type_conflict,
    data: r#"{"a":[1]}"#,
    path: "$.a.name",
    value: "1",
    updated: Err("cannot use key 'name' on a value of kind array"),
);

update_case!(
    type_conflict_on_scalar,
    data: r#"{"a":"text"}"#,
    path: "$.a[0]",
    value: "1",
    updated: Err("cannot use key '0' on a value of kind string"),
);
