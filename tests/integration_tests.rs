use serde_json::json;
use sqlpath::{EvalError, Input, Mode, Value, ValueConfig, Variables, compile};

fn eval_with(
    path: &str,
    input: impl Into<Input>,
    config: &ValueConfig,
) -> Result<Vec<serde_json::Value>, EvalError> {
    let statement = compile(path).unwrap_or_else(|e| panic!("{path}: {e}"));
    statement
        .value(input, config)
        .map(|result| result.map(serde_json::Value::from))
        .collect()
}

fn eval(path: &str, input: serde_json::Value) -> Result<Vec<serde_json::Value>, EvalError> {
    eval_with(path, input, &ValueConfig::default())
}

fn items(values: Vec<serde_json::Value>) -> Input {
    Input::Sequence(values.into_iter().map(Value::from).collect())
}

// ============================================================================
// Member access
// ============================================================================

#[test]
fn test_member_access() {
    let doc = json!({"name": "John", "address": {"city": "Oslo"}});
    assert_eq!(eval("$.name", doc.clone()).unwrap(), vec![json!("John")]);
    assert_eq!(eval("$.address.city", doc.clone()).unwrap(), vec![json!("Oslo")]);
    assert_eq!(eval("$.\"name\"", doc).unwrap(), vec![json!("John")]);
}

#[test]
fn test_missing_member() {
    let doc = json!({"a": 1});
    assert_eq!(eval("$.b", doc.clone()).unwrap(), Vec::<serde_json::Value>::new());
    assert_eq!(
        eval("strict $.b", doc).unwrap_err(),
        EvalError::KeyNotFound("b".into())
    );
}

#[test]
fn test_lax_member_unwraps_array() {
    let doc = json!([{"a": 1}, {"b": 2}, {"a": 3}]);
    assert_eq!(eval("$.a", doc.clone()).unwrap(), vec![json!(1), json!(3)]);
    assert!(matches!(
        eval("strict $.a", doc),
        Err(EvalError::NotAnObject { .. })
    ));
}

#[test]
fn test_member_of_scalar() {
    assert!(eval("$.a", json!(5)).unwrap().is_empty());
    assert!(matches!(
        eval("strict $.a", json!(5)),
        Err(EvalError::NotAnObject { .. })
    ));
}

#[test]
fn test_member_wildcard_keeps_order() {
    let doc = json!({"b": 1, "a": 2, "c": {"d": 3}});
    assert_eq!(
        eval("$.*", doc).unwrap(),
        vec![json!(1), json!(2), json!({"d": 3})]
    );
}

#[test]
fn test_unicode_member_names() {
    let doc = json!({"😀": 1, "👨‍👩‍👧": 2});
    assert_eq!(eval("$.😀", doc.clone()).unwrap(), vec![json!(1)]);
    assert_eq!(eval("$.👨‍👩‍👧", doc).unwrap(), vec![json!(2)]);
}

// ============================================================================
// Arrays
// ============================================================================

#[test]
fn test_index() {
    let doc = json!(["x", "y"]);
    assert_eq!(eval("$[1]", doc.clone()).unwrap(), vec![json!("y")]);
    assert!(eval("$[100]", doc.clone()).unwrap().is_empty());
    assert_eq!(
        eval("strict $[100]", doc).unwrap_err(),
        EvalError::IndexOutOfRange { index: 100, len: 2 }
    );
}

#[test]
fn test_range() {
    let doc = json!(["a", "b", "c", "d", [6, 7]]);
    assert_eq!(
        eval("$[1 to 3]", doc.clone()).unwrap(),
        vec![json!("b"), json!("c"), json!("d")]
    );
    assert_eq!(eval("$[last]", doc.clone()).unwrap(), vec![json!([6, 7])]);
    assert_eq!(
        eval("$[last - 1 to last]", doc).unwrap(),
        vec![json!("d"), json!([6, 7])]
    );
}

#[test]
fn test_float_subscripts_truncate() {
    assert_eq!(eval("$[1.9]", json!([10, 20, 30])).unwrap(), vec![json!(20)]);
}

#[test]
fn test_non_numeric_subscript() {
    assert!(matches!(
        eval("$[\"a\"]", json!([1])),
        Err(EvalError::TypeMismatch(_))
    ));
}

#[test]
fn test_nested_last_sees_its_own_array() {
    let doc = json!({"a": [10, 20, 30], "idx": [0, 2]});
    assert_eq!(eval("$.a[$.idx[last]]", doc).unwrap(), vec![json!(30)]);
}

#[test]
fn test_element_wildcard() {
    assert_eq!(eval("$[*]", json!([1, 2])).unwrap(), vec![json!(1), json!(2)]);
    assert_eq!(eval("$[*]", json!("x")).unwrap(), vec![json!("x")]);
    assert!(matches!(
        eval("strict $[*]", json!("x")),
        Err(EvalError::NotAnArray { .. })
    ));
}

#[test]
fn test_lax_subscript_wraps_scalars() {
    assert_eq!(eval("$[0]", json!({"a": 1})).unwrap(), vec![json!({"a": 1})]);
    assert!(matches!(
        eval("strict $[0]", json!({"a": 1})),
        Err(EvalError::NotAnArray { .. })
    ));
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_filter_keeps_true_only() {
    let doc = json!({"items": [
        {"name": "pen", "price": 2},
        {"name": "lamp", "price": 30},
        {"name": "free"},
        {"name": "odd", "price": "cheap"},
    ]});
    assert_eq!(
        eval("$.items[*] ? (@.price > 10).name", doc.clone()).unwrap(),
        vec![json!("lamp")]
    );
    assert_eq!(
        eval("$.items ? (@.price < 10).name", doc).unwrap(),
        vec![json!("pen")]
    );
}

#[test]
fn test_filter_refers_to_root() {
    let doc = json!({"limit": 5, "values": [3, 6, 9]});
    assert_eq!(
        eval("$.values[*] ? (@ > $.limit)", doc).unwrap(),
        vec![json!(6), json!(9)]
    );
}

#[test]
fn test_filter_excludes_erroring_candidates() {
    let doc = json!([{"a": "x"}, {"a": 5}]);
    assert_eq!(eval("$ ? (@.a + 1 > 2)", doc).unwrap(), vec![json!({"a": 5})]);
}

#[test]
fn test_strict_filter_does_not_unwrap() {
    assert!(eval("strict $ ? (@ == 1)", json!([1])).unwrap().is_empty());
    assert_eq!(eval("strict $[*] ? (@ == 1)", json!([1, 2])).unwrap(), vec![json!(1)]);
}

#[test]
fn test_query_matches_type_and_value() {
    let statement = compile("$ ? (@ == 1)").unwrap();
    let input = items(vec![json!(1), json!("1"), json!(2), json!(1.0), json!(true)]);
    let matched: Vec<Value> = statement
        .query(input, &Variables::new())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(matched, vec![Value::Integer(1), Value::Float(1.0)]);
}

#[test]
fn test_is_unknown_filter() {
    let statement = compile("$ ? ((@.a == 1) is unknown)").unwrap();
    let input = items(vec![json!({"a": "x"}), json!({"a": 1}), json!({"a": 2})]);
    let matched: Vec<Value> = statement
        .query(input, &Variables::new())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(matched, vec![Value::from(json!({"a": "x"}))]);
}

#[test]
fn test_not_unknown_is_true() {
    assert_eq!(
        eval("$ ? (!(@.a == 1))", json!([{"a": "x"}, {"a": 1}])).unwrap(),
        vec![json!({"a": "x"})]
    );
}

#[test]
fn test_and_or() {
    let doc = json!([
        {"a": 1, "b": 2},
        {"a": 1, "b": 3},
        {"a": 2, "b": 2},
    ]);
    assert_eq!(
        eval("$ ? (@.a == 1 && @.b == 2)", doc.clone()).unwrap(),
        vec![json!({"a": 1, "b": 2})]
    );
    assert_eq!(
        eval("$ ? (@.a == 2 || @.b == 3)", doc).unwrap(),
        vec![json!({"a": 1, "b": 3}), json!({"a": 2, "b": 2})]
    );
}

#[test]
fn test_exists_predicate() {
    let doc = json!([{"a": 1}, {"b": 2}, {"a": "x"}]);
    assert_eq!(
        eval("$ ? (exists(@.a))", doc.clone()).unwrap(),
        vec![json!({"a": 1}), json!({"a": "x"})]
    );
    // Arithmetic on a missing or non-numeric member fails, so exists() is unknown
    assert_eq!(
        eval("$ ? ((exists(@.a + 1)) is unknown)", doc).unwrap(),
        vec![json!({"b": 2}), json!({"a": "x"})]
    );
}

#[test]
fn test_starts_with() {
    assert_eq!(
        eval("$[*] ? (@ starts with \"ab\")", json!(["abc", "xab", 1])).unwrap(),
        vec![json!("abc")]
    );

    let config = ValueConfig::default().with_variable("p", "x");
    assert_eq!(
        eval_with("$[*] ? (@ starts with $p)", json!(["xy", "yx"]), &config).unwrap(),
        vec![json!("xy")]
    );
}

#[test]
fn test_like_regex() {
    assert_eq!(
        eval(
            "$[*] ? (@ like_regex \"^a\" flag \"i\")",
            json!(["apple", "Avocado", "banana", 7])
        )
        .unwrap(),
        vec![json!("apple"), json!("Avocado")]
    );
}

// ============================================================================
// Predicate statements
// ============================================================================

#[test]
fn test_predicate_statement_returns_boolean() {
    assert_eq!(eval("$.a == 1", json!({"a": 1})).unwrap(), vec![json!(true)]);
    assert_eq!(eval("$.a == 2", json!({"a": 1})).unwrap(), vec![json!(false)]);
    assert_eq!(eval("$.a == \"1\"", json!({"a": 1})).unwrap(), vec![json!(null)]);
    assert_eq!(eval("exists($.b)", json!({"a": 1})).unwrap(), vec![json!(false)]);
}

#[test]
fn test_sequence_comparison_needs_one_true_pair() {
    let doc = json!(["x", 1]);
    assert_eq!(eval("$[*] == 1", doc.clone()).unwrap(), vec![json!(true)]);
    assert_eq!(eval("strict $[*] == 1", doc).unwrap(), vec![json!(true)]);
    assert_eq!(eval("strict $[*] == 1", json!(["x", 2])).unwrap(), vec![json!(null)]);
    assert_eq!(eval("$[*] == 1", json!([])).unwrap(), vec![json!(false)]);
}

#[test]
fn test_strict_filter_keeps_candidate_with_one_true_pair() {
    assert_eq!(
        eval("strict $ ? (@[*] == 1)", json!([1, "x"])).unwrap(),
        vec![json!([1, "x"])]
    );
    assert_eq!(
        eval("lax $ ? (@[*] == 1)", json!([[1, "x"]])).unwrap(),
        vec![json!([1, "x"])]
    );
}

#[test]
fn test_exists_is_unknown_on_a_later_error() {
    assert_eq!(
        eval("$ ? ((exists(@[*].double())) is unknown)", json!([["1", "x"], ["2"]])).unwrap(),
        vec![json!(["1", "x"])]
    );
    assert_eq!(eval("exists($[*].double())", json!(["1", "x"])).unwrap(), vec![json!(null)]);
}

#[test]
fn test_container_equality() {
    let doc = json!({"a": [1, 2], "b": [1.0, 2], "c": {"x": 1}});
    assert_eq!(eval("$.a == $.b", doc.clone()).unwrap(), vec![json!(true)]);
    assert_eq!(eval("$.a < $.b", doc.clone()).unwrap(), vec![json!(null)]);
    assert_eq!(eval("$.c != $.c", doc).unwrap(), vec![json!(false)]);
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_arithmetic() {
    let doc = json!({"a": 1, "b": 2.5, "c": [3]});
    assert_eq!(eval("$.a + $.b * 2", doc.clone()).unwrap(), vec![json!(6)]);
    assert_eq!(eval("$.b - 1", doc.clone()).unwrap(), vec![json!(1.5)]);
    assert_eq!(eval("$.c + 1", doc.clone()).unwrap(), vec![json!(4)]);
    assert_eq!(eval("-$.a", doc.clone()).unwrap(), vec![json!(-1)]);
    assert_eq!(eval("7 % 4", doc).unwrap(), vec![json!(3)]);
}

#[test]
fn test_arithmetic_errors() {
    assert_eq!(eval("$ / 0", json!(1)).unwrap_err(), EvalError::DivisionByZero);
    assert!(matches!(
        eval("$ + 1", json!("x")),
        Err(EvalError::UnsupportedOperator { .. })
    ));
    assert!(matches!(
        eval("$[*] + 1", json!([1, 2])),
        Err(EvalError::TypeMismatch(_))
    ));
}

// ============================================================================
// Item methods
// ============================================================================

#[test]
fn test_type_and_size() {
    let doc = json!({"a": [1, 2, 3], "s": "x", "n": null});
    assert_eq!(eval("$.a.type()", doc.clone()).unwrap(), vec![json!("array")]);
    assert_eq!(eval("$.n.type()", doc.clone()).unwrap(), vec![json!("null")]);
    assert_eq!(eval("$.a.size()", doc.clone()).unwrap(), vec![json!(3)]);
    assert_eq!(eval("$.s.size()", doc).unwrap(), vec![json!(1)]);
}

#[test]
fn test_numeric_methods() {
    let doc = json!({"s": "1.5e1", "f": -1.5, "bad": "abc"});
    assert_eq!(eval("$.s.double()", doc.clone()).unwrap(), vec![json!(15.0)]);
    assert_eq!(eval("$.f.ceiling()", doc.clone()).unwrap(), vec![json!(-1)]);
    assert_eq!(eval("$.f.floor()", doc.clone()).unwrap(), vec![json!(-2)]);
    assert_eq!(eval("$.f.abs()", doc.clone()).unwrap(), vec![json!(1.5)]);
    assert!(matches!(
        eval("$.bad.double()", doc.clone()),
        Err(EvalError::UnparsableValue { .. })
    ));
    assert!(matches!(
        eval("$.s.abs()", doc),
        Err(EvalError::TypeMismatch(_))
    ));
}

#[test]
fn test_keyvalue() {
    assert_eq!(
        eval("$.keyvalue()", json!({"x": 1, "y": "z"})).unwrap(),
        vec![
            json!({"id": 0, "key": "x", "value": 1}),
            json!({"id": 0, "key": "y", "value": "z"}),
        ]
    );
    assert_eq!(
        eval("$.keyvalue() ? (@.value > 1).key", json!({"a": 1, "b": 2})).unwrap(),
        vec![json!("b")]
    );
}

#[test]
fn test_datetime() {
    assert_eq!(
        eval("$.d.datetime()", json!({"d": "2024-03-01"})).unwrap(),
        vec![json!("2024-03-01T00:00:00Z")]
    );
    assert_eq!(
        eval("$.d.datetime(\"DD/MM/YYYY\").type()", json!({"d": "05/11/2023"})).unwrap(),
        vec![json!("date")]
    );
    assert!(matches!(
        eval("$.d.datetime()", json!({"d": "someday"})),
        Err(EvalError::UnparsableValue { .. })
    ));
}

#[test]
fn test_datetime_comparison() {
    let doc = json!([
        {"id": 1, "at": "2019-06-01T10:00:00Z"},
        {"id": 2, "at": "2021-01-01T00:00:00+02:00"},
    ]);
    assert_eq!(
        eval("$ ? (@.at.datetime() > \"2020-01-01\".datetime()).id", doc).unwrap(),
        vec![json!(2)]
    );
}

#[test]
fn test_invalid_datetime_template() {
    assert!(compile("$.datetime(\"[\")").is_ok());
    assert!(compile("$.a.datetime(1)").is_err());
}

// ============================================================================
// Variables
// ============================================================================

#[test]
fn test_variables() {
    let config = ValueConfig::default()
        .with_variable("min", 3i64)
        .with_variable("my var", "b");
    let doc = json!({"a": [1, 4, 7], "b": "bee"});
    assert_eq!(
        eval_with("$.a[*] ? (@ >= $min)", doc.clone(), &config).unwrap(),
        vec![json!(4), json!(7)]
    );
    assert_eq!(eval_with("$\"my var\"", doc, &config).unwrap(), vec![json!("b")]);
}

#[test]
fn test_unknown_variable() {
    assert_eq!(
        eval("$nope", json!(null)).unwrap_err(),
        EvalError::UnknownVariable("nope".into())
    );
}

// ============================================================================
// Statement driver
// ============================================================================

#[test]
fn test_source_round_trip() {
    for source in ["$", "strict $.a[*] ? (@ > 1)", "lax   $.x.size()"] {
        assert_eq!(compile(source).unwrap().source(), source);
    }
    assert_eq!(compile("strict $").unwrap().mode(), Mode::Strict);
}

#[test]
fn test_single_value_is_one_item() {
    assert_eq!(eval("$", json!([1, 2])).unwrap(), vec![json!([1, 2])]);
    let statement = compile("$").unwrap();
    let values: Vec<Value> = statement
        .value(items(vec![json!(1), json!(2)]), &ValueConfig::default())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(values, vec![Value::Integer(1), Value::Integer(2)]);
}

#[test]
fn test_exists() {
    let statement = compile("$.a").unwrap();
    let found: Vec<bool> = statement
        .exists(items(vec![json!({"a": 1}), json!({"b": 1})]), &Variables::new())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(found, vec![true, false]);

    let strict = compile("strict $.a").unwrap();
    let mut results = strict.exists(json!({"b": 1}), &Variables::new());
    assert_eq!(results.next(), Some(Err(EvalError::KeyNotFound("a".into()))));
}

#[test]
fn test_exists_on_predicate_statement() {
    let statement = compile("$.a == 1").unwrap();
    let input = items(vec![json!({"a": 1}), json!({"a": 2}), json!({"a": "x"})]);
    let found: Vec<bool> = statement
        .exists(input, &Variables::new())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(found, vec![true, false, false]);
}

#[test]
fn test_query_on_predicate_statement() {
    let statement = compile("$.a == 1").unwrap();
    let input = items(vec![json!({"a": 2}), json!({"a": 1}), json!({"a": "x"})]);
    let matched: Vec<Value> = statement
        .query(input, &Variables::new())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(matched, vec![Value::from(json!({"a": 1}))]);

    let strict = compile("strict $.a + 1 > 0").unwrap();
    let mut results = strict.query(json!({"b": 1}), &Variables::new());
    assert_eq!(results.next(), Some(Err(EvalError::KeyNotFound("a".into()))));
}

#[test]
fn test_default_on_empty() {
    let config = ValueConfig::default().with_default_on_empty(Value::Null);
    assert_eq!(eval_with("$.missing", json!({}), &config).unwrap(), vec![json!(null)]);
    assert_eq!(eval_with("$.a", json!({"a": 1}), &config).unwrap(), vec![json!(1)]);
}

#[test]
fn test_default_on_error() {
    let config = ValueConfig::default().with_default_on_error("oops");
    assert_eq!(
        eval_with("strict $.missing", json!({}), &config).unwrap(),
        vec![json!("oops")]
    );
}

#[test]
fn test_error_after_values_is_not_replaced() {
    let statement = compile("strict $[*].a").unwrap();
    let config = ValueConfig::default().with_default_on_error("oops");
    let results: Vec<_> = statement
        .value(json!([{"a": 1}, {"b": 2}]), &config)
        .collect();
    assert_eq!(
        results,
        vec![Ok(Value::Integer(1)), Err(EvalError::KeyNotFound("a".into()))]
    );
}

#[test]
fn test_errors_do_not_stop_other_items() {
    let statement = compile("strict $.a").unwrap();
    let results: Vec<_> = statement
        .value(items(vec![json!({}), json!({"a": 5})]), &ValueConfig::default())
        .collect();
    assert_eq!(
        results,
        vec![Err(EvalError::KeyNotFound("a".into())), Ok(Value::Integer(5))]
    );
}

#[test]
fn test_idempotence() {
    let statement = compile("$.items[*] ? (@.n > 1).n").unwrap();
    let doc = Value::from(json!({"items": [{"n": 1}, {"n": 2}, {"n": 3}]}));
    let first: Vec<_> = statement.value(doc.clone(), &ValueConfig::default()).collect();
    let second: Vec<_> = statement.value(doc, &ValueConfig::default()).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn test_evaluate_is_lazy() {
    let statement = compile("$[*]").unwrap();
    let mut results = statement.evaluate(Value::from(json!([1, 2, 3])), &Variables::new());
    assert_eq!(results.next(), Some(Ok(Value::Integer(1))));
}

#[test]
fn test_statement_shared_between_threads() {
    let statement = compile("$.n * 2").unwrap();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let statement = &statement;
                scope.spawn(move || {
                    statement
                        .value(json!({"n": n}), &ValueConfig::default())
                        .collect::<Result<Vec<_>, _>>()
                        .unwrap()
                })
            })
            .collect();
        for (n, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), vec![Value::Integer(n as i64 * 2)]);
        }
    });
}

#[test]
fn test_compile_errors() {
    let err = compile("$.a ? (@.b = 1)").unwrap_err();
    assert_eq!(err.position().column, 12);
    assert!(compile("$.a[").is_err());
    assert!(compile("@").is_err());
}
