//! End-to-end exploration tests
//!
//! Covers the observable contract: odometer ordering, product counts,
//! scope shadowing, native type preservation, delimiter escaping, and the
//! error taxonomy.

use paramgrid::{explore, ExploreError};
use serde_json::{json, Value};

fn collect(document: Value) -> Vec<Value> {
    explore(&document)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn canonical_example_in_odometer_order() {
    let combos = collect(json!({
        "p": { "a": [1, 2], "b": ["$a * 2$", 9] },
        "q": "x",
    }));

    assert_eq!(
        combos,
        vec![
            json!({"p": {"a": 1, "b": 2}, "q": "x"}),
            json!({"p": {"a": 1, "b": 9}, "q": "x"}),
            json!({"p": {"a": 2, "b": 4}, "q": "x"}),
            json!({"p": {"a": 2, "b": 9}, "q": "x"}),
        ]
    );
}

#[test]
fn sequence_length_is_the_product_of_list_lengths() {
    // No expressions: 2 * 3 at the root times 2 in the nested group
    let combos = collect(json!({
        "a": [1, 2],
        "b": ["x", "y", "z"],
        "g": { "c": [true, false] },
    }));
    assert_eq!(combos.len(), 2 * 3 * 2);

    // Odometer order: rightmost (deepest-last) advances fastest
    assert_eq!(combos[0], json!({"a": 1, "b": "x", "g": {"c": true}}));
    assert_eq!(combos[1], json!({"a": 1, "b": "x", "g": {"c": false}}));
    assert_eq!(combos[2], json!({"a": 1, "b": "y", "g": {"c": true}}));
    assert_eq!(combos.last().unwrap(), &json!({"a": 2, "b": "z", "g": {"c": false}}));
}

#[test]
fn sole_expression_preserves_native_type() {
    let combos = collect(json!({"a": 3, "b": "$a * 2$"}));
    assert_eq!(combos, vec![json!({"a": 3, "b": 6})]);
}

#[test]
fn mixed_template_yields_a_string() {
    let combos = collect(json!({"a": 3, "b": "value=$a * 2$!"}));
    assert_eq!(combos, vec![json!({"a": 3, "b": "value=6!"})]);
}

#[test]
fn reference_resolves_to_nearest_enclosing_declaration() {
    let combos = collect(json!({
        "a": 1,
        "group": { "a": 2, "b": "$a$" },
    }));
    assert_eq!(combos, vec![json!({"a": 1, "group": {"a": 2, "b": 2}})]);
}

#[test]
fn ancestor_reference_tracks_the_enclosing_iteration() {
    let combos = collect(json!({
        "q": [1, 2],
        "g": { "x": "$q * 10$" },
    }));
    assert_eq!(
        combos,
        vec![
            json!({"q": 1, "g": {"x": 10}}),
            json!({"q": 2, "g": {"x": 20}}),
        ]
    );
}

#[test]
fn group_declared_before_the_parameter_it_references() {
    // The group's expression must follow the outer list in lock-step even
    // though the group is the slower (leftmost) dimension.
    let combos = collect(json!({
        "g": { "x": "$q$" },
        "q": [1, 2],
    }));
    assert_eq!(
        combos,
        vec![
            json!({"g": {"x": 1}, "q": 1}),
            json!({"g": {"x": 2}, "q": 2}),
        ]
    );
}

#[test]
fn nested_groups_with_candidate_lists_restart_cleanly() {
    let combos = collect(json!({
        "outer": ["A", "B"],
        "g": { "inner": [1, 2] },
    }));
    assert_eq!(
        combos,
        vec![
            json!({"outer": "A", "g": {"inner": 1}}),
            json!({"outer": "A", "g": {"inner": 2}}),
            json!({"outer": "B", "g": {"inner": 1}}),
            json!({"outer": "B", "g": {"inner": 2}}),
        ]
    );
}

#[test]
fn mutual_reference_is_a_circular_dependency() {
    let mut explorer = explore(&json!({"a": "$b$", "b": "$a$"})).unwrap();
    let first = explorer.next().unwrap();
    assert!(matches!(
        first,
        Err(ExploreError::CircularDependency { .. })
    ));
}

#[test]
fn undefined_variable_fails_at_construction() {
    let err = explore(&json!({"a": "$ghost + 1$"})).unwrap_err();
    assert!(matches!(
        err,
        ExploreError::UndefinedVariable { name, .. } if name == "ghost"
    ));
}

#[test]
fn double_delimiter_is_one_literal_delimiter() {
    let combos = collect(json!({"money": "$$"}));
    assert_eq!(combos, vec![json!({"money": "$"})]);
}

#[test]
fn string_repetition_in_expressions() {
    // The original exploration-document shape: a string parameter repeated
    let combos = collect(json!({
        "param1": { "c": "$param2 * 3$" },
        "param2": "a",
    }));
    assert_eq!(
        combos,
        vec![json!({"param1": {"c": "aaa"}, "param2": "a"})]
    );
}

#[test]
fn full_document_combination_count() {
    let combos = collect(json!({
        "param1": {
            "a": [1, 2, 3],
            "b": ["$a * 2$", "$a * 4$", 1024],
            "c": "$param2 * 3$",
        },
        "param2": "a",
        "param3": [{"hey": 1, "bye": 2}],
        "param4": [4, 5, 6],
    }));

    assert_eq!(combos.len(), 3 * 3 * 3);
    assert_eq!(
        combos[0],
        json!({
            "param1": {"a": 1, "b": 2, "c": "aaa"},
            "param2": "a",
            "param3": {"hey": 1, "bye": 2},
            "param4": 4,
        })
    );
    // param4 is the fastest dimension; b's literal third candidate shows
    // up once the two expression candidates are exhausted
    assert_eq!(combos[1]["param4"], json!(5));
    assert_eq!(combos[6]["param1"]["b"], json!(1024));
}

#[test]
fn chained_references_across_scopes() {
    let combos = collect(json!({
        "base": [1, 2],
        "derived": "$base * 10$",
        "g": { "deeper": "$derived + base$" },
    }));
    assert_eq!(
        combos,
        vec![
            json!({"base": 1, "derived": 10, "g": {"deeper": 11}}),
            json!({"base": 2, "derived": 20, "g": {"deeper": 22}}),
        ]
    );
}

#[test]
fn expression_inside_a_nested_list_candidate() {
    let combos = collect(json!({
        "a": 4,
        "xs": [[1, "$a$"], [2]],
    }));
    assert_eq!(
        combos,
        vec![
            json!({"a": 4, "xs": [1, 4]}),
            json!({"a": 4, "xs": [2]}),
        ]
    );
}

#[test]
fn empty_candidate_list_yields_no_combinations() {
    let mut explorer = explore(&json!({"a": [], "b": [1, 2]})).unwrap();
    assert!(explorer.next().is_none());
}

#[test]
fn booleans_and_comparisons() {
    let combos = collect(json!({
        "n": [1, 5],
        "big": "$n > 3$",
    }));
    assert_eq!(
        combos,
        vec![
            json!({"n": 1, "big": false}),
            json!({"n": 5, "big": true}),
        ]
    );
}

#[test]
fn subscope_reference_substitutes_a_nested_mapping() {
    let combos = collect(json!({
        "g": { "x": 1 },
        "same": "$g == g$",
    }));
    assert_eq!(combos, vec![json!({"g": {"x": 1}, "same": true})]);
}
