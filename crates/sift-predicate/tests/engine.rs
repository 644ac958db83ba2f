//! End-to-end tests for sift-predicate.
//!
//! Each test feeds literal query text through `parse_and_compile` and checks the resulting
//! predicate tree.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{collections::BTreeSet, sync::Arc, thread};

use sift_predicate::{
    AliasTable, CompileOptions, Engine, EngineError, FieldAliases, IdentityResolver,
    PatternKind, Predicate, RangeKind, TextMode, UnknownFieldPolicy, parse_and_compile,
};
use sift_query::{SyntaxErrorKind, Value};

/// Compiles `query` with every field resolving to itself.
fn identity(query: &str) -> Predicate {
    parse_and_compile(query, &IdentityResolver).unwrap()
}

/// Collects the `(field, value)` pairs of every `Eq` leaf, failing on duplicates.
fn eq_pairs(predicate: &Predicate, out: &mut BTreeSet<(String, String)>) {
    match predicate {
        Predicate::Eq { field, value } => {
            assert!(
                out.insert((field.clone(), value.to_string())),
                "duplicate leaf {field} = {value}"
            );
        }
        Predicate::And { children } | Predicate::Or { children } => {
            for child in children {
                eq_pairs(child, out);
            }
        }
        other => panic!("unexpected leaf {other:?}"),
    }
}

#[test]
fn scenario_exists() {
    assert_eq!(identity("exists|pos"), Predicate::exists("pos"));
}

#[test]
fn scenario_and() {
    assert_eq!(
        identity("and(exists|pos‖exists|vb)"),
        Predicate::And {
            children: vec![Predicate::exists("pos"), Predicate::exists("vb")]
        }
    );
}

#[test]
fn scenario_equals_quoted() {
    assert_eq!(
        identity("equals|pos|\"nn\""),
        Predicate::Eq {
            field: "pos".into(),
            value: Value::String("nn".into()),
        }
    );
}

#[test]
fn scenario_gt() {
    assert_eq!(
        identity("gt|val|2"),
        Predicate::range("val", RangeKind::Gt, Value::Integer(2))
    );
}

#[test]
fn scenario_not() {
    assert_eq!(
        identity("not(equals|pos|\"nn\")"),
        Predicate::not(Predicate::eq("pos", "nn"))
    );
}

#[test]
fn scenario_missing_value() {
    let err = parse_and_compile("equals|field", &IdentityResolver).unwrap_err();
    let EngineError::Syntax(syntax) = &err else {
        panic!("expected syntax error, got {err:?}");
    };
    assert_eq!(syntax.kind, SyntaxErrorKind::Arity);
    assert!(!err.message().is_empty());
}

#[test]
fn surplus_operand_is_rejected() {
    assert!(matches!(
        parse_and_compile("exists|field|extra", &IdentityResolver),
        Err(EngineError::Syntax(_))
    ));
}

#[test]
fn alias_expansion() {
    let fields = AliasTable::new().with("field", FieldAliases::new("field", ["v_other.field"]));
    assert_eq!(
        parse_and_compile("exists|field", &fields).unwrap(),
        Predicate::Or {
            children: vec![
                Predicate::exists("field"),
                Predicate::exists("v_other.field"),
            ]
        }
    );
}

#[test]
fn cross_product_covers_every_pair_once() {
    let predicate = identity("equals|or(f1‖f2)|or(v1‖v2)");

    let Predicate::Or { children } = &predicate else {
        panic!("expected or, got {predicate:?}");
    };
    assert_eq!(children.len(), 2);
    assert!(
        children
            .iter()
            .all(|child| matches!(child, Predicate::Or { children } if children.len() == 2))
    );

    let mut pairs = BTreeSet::new();
    eq_pairs(&predicate, &mut pairs);
    let expected: BTreeSet<(String, String)> = [
        ("f1", "v1"),
        ("f1", "v2"),
        ("f2", "v1"),
        ("f2", "v2"),
    ]
    .into_iter()
    .map(|(field, value)| (field.to_string(), Value::from(value).to_string()))
    .collect();
    assert_eq!(pairs, expected);
}

#[test]
fn cross_product_with_aliases() {
    let fields = AliasTable::new()
        .with("a", FieldAliases::new("a", ["v_x.a"]))
        .with("b", FieldAliases::single("b"));
    let predicate = parse_and_compile("equals|or(a‖b)|or(1‖2)", &fields).unwrap();
    let mut pairs = BTreeSet::new();
    eq_pairs(&predicate, &mut pairs);
    assert_eq!(pairs.len(), 6);
    assert_eq!(predicate.leaf_count(), 6);
}

#[test]
fn compile_is_deterministic() {
    let fields = AliasTable::new()
        .with("state", FieldAliases::new("state", ["v_municipality.state"]))
        .with_fallback_identity();
    let query = "and(equals|or(state‖name)|not(a‖b)‖gte|val|1‖lt|val|9.5‖freetext|\"x y\")";
    let first = parse_and_compile(query, &fields).unwrap();
    for _ in 0..10 {
        assert_eq!(parse_and_compile(query, &fields).unwrap(), first);
    }
}

#[test]
fn value_typing() {
    assert_eq!(
        identity("equals|n|3"),
        Predicate::eq("n", Value::Integer(3))
    );
    assert_eq!(
        identity("equals|n|3.25"),
        Predicate::eq("n", Value::Float(3.25))
    );
    assert_eq!(
        identity("equals|n|3.14.1"),
        Predicate::eq("n", Value::String("3.14.1".into()))
    );
    assert_eq!(
        identity("equals|n|\"3\""),
        Predicate::eq("n", Value::String("3".into()))
    );
}

#[test]
fn wide_integers_are_not_rounded() {
    let predicate =
        identity("and(equals|id|18446744073709551617‖equals|id|18446744073709551616)");
    let json = serde_json::to_value(&predicate).unwrap();
    assert_eq!(json["children"][0]["value"], "18446744073709551617");
    assert_eq!(json["children"][1]["value"], "18446744073709551616");

    let huge = "9".repeat(400);
    let json = serde_json::to_value(identity(&format!("equals|n|{huge}"))).unwrap();
    assert_eq!(json["value"], huge.as_str());
}

#[test]
fn pattern_operators() {
    for (keyword, kind) in [
        ("contains", PatternKind::Contains),
        ("startswith", PatternKind::StartsWith),
        ("endswith", PatternKind::EndsWith),
        ("regexp", PatternKind::Regexp),
    ] {
        assert_eq!(
            identity(&format!("{keyword}|title|\"ab\"")),
            Predicate::pattern("title", kind, "ab")
        );
    }
}

#[test]
fn free_text_modes() {
    assert_eq!(
        identity("freetext|\"rust book\""),
        Predicate::free_text("rust book", TextMode::Terms)
    );
    assert_eq!(
        identity("freergxp|\"ru.t\""),
        Predicate::free_text("ru.t", TextMode::Regexp)
    );
}

#[test]
fn none_of_group() {
    assert_eq!(
        identity("equals|not(a‖b)|1"),
        Predicate::not(Predicate::or(vec![
            Predicate::eq("a", Value::Integer(1)),
            Predicate::eq("b", Value::Integer(1)),
        ]))
    );
}

#[test]
fn unknown_field_policies() {
    let fields = AliasTable::new().with("known", FieldAliases::single("known"));
    assert_eq!(
        parse_and_compile("and(exists|known‖exists|other)", &fields),
        Err(EngineError::UnknownField {
            name: "other".into()
        })
    );

    let lenient = Engine {
        options: CompileOptions {
            unknown_fields: UnknownFieldPolicy::PassThrough,
            ..CompileOptions::default()
        },
        ..Engine::default()
    };
    assert_eq!(
        lenient.run("and(exists|known‖exists|other)", &fields),
        Ok(Predicate::and(vec![
            Predicate::exists("known"),
            Predicate::exists("other"),
        ]))
    );
}

#[test]
fn ranges_merge_under_and() {
    let predicate = identity("and(gte|val|1‖lt|val|5‖exists|pos)");
    let Predicate::And { children } = predicate else {
        panic!("expected and");
    };
    assert_eq!(children.len(), 2);
    let Predicate::Range { lower, upper, .. } = &children[0] else {
        panic!("expected range");
    };
    assert_eq!(lower.as_ref().map(|bound| bound.inclusive), Some(true));
    assert_eq!(upper.as_ref().map(|bound| bound.inclusive), Some(false));
}

#[test]
fn json_shape() {
    let predicate = identity("and(equals|pos|nn‖gt|val|2)");
    assert_eq!(
        serde_json::to_value(&predicate).unwrap(),
        serde_json::json!({
            "type": "and",
            "children": [
                {"type": "eq", "field": "pos", "value": "nn"},
                {"type": "range", "field": "val", "lower": {"value": 2, "inclusive": false}}
            ]
        })
    );
}

#[test]
fn shared_across_threads() {
    let fields = Arc::new(
        AliasTable::new().with("state", FieldAliases::new("state", ["v_municipality.state"])),
    );
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let fields = Arc::clone(&fields);
            thread::spawn(move || parse_and_compile("exists|state", &fields).unwrap())
        })
        .collect();
    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
}
