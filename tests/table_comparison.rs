mod common;

use common::{evaluate, identified, person};
use dataset_assert::{
    Row, Value,
    comparison::{RowComparison, TableComparison},
    equality::TypedEquality,
    identifier::IdentifierPolicy,
};

#[test]
fn differing_column_is_reported_on_best_comparison() {
    let expected = vec![person(1, "a"), person(2, "b")];
    let actual = vec![person(1, "a"), person(2, "c")];

    let table = evaluate(false, expected, actual);

    assert_eq!(table.missing_rows().count(), 0);
    assert!(!table.is_match());
    let best = table.best_row_comparison(1).expect("best comparison for second row");
    assert_eq!(best.score(), 1);
    let difference = &best.column_differences()[0];
    assert_eq!(difference.column, "name");
    assert_eq!(difference.expected, Value::from("b"));
    assert_eq!(difference.actual, Some(Value::from("c")));
    assert!(table.best_row_comparison(0).is_none());
    assert!(table.matched_row_comparison(0).is_some());
}

#[test]
fn differing_row_is_not_counted_as_extra_in_strict_tables() {
    let table = evaluate(
        true,
        vec![person(1, "a"), person(2, "b")],
        vec![person(1, "a"), person(2, "c")],
    );
    assert!(!table.is_expected_no_more_records_but_found_more());
    assert!(!table.is_match());
    assert_eq!(table.unexpected_rows().count(), 0);
}

#[test]
fn extra_row_fails_only_strict_tables() {
    let expected = vec![person(1, "a")];
    let actual = vec![person(1, "a"), person(2, "z")];

    let strict = evaluate(true, expected.clone(), actual.clone());
    assert!(strict.is_expected_no_more_records_but_found_more());
    assert!(!strict.is_match());
    let extra = strict.unexpected_rows().collect::<Vec<_>>();
    assert_eq!(extra.len(), 1);
    assert_eq!(extra[0].value("id"), Some(&Value::Integer(2)));

    let lenient = evaluate(false, expected, actual);
    assert!(!lenient.is_expected_no_more_records_but_found_more());
    assert!(lenient.is_match());
}

#[test]
fn perfect_strict_match() {
    let rows = vec![person(1, "a"), person(2, "b"), person(3, "c")];
    let table = evaluate(true, rows.clone(), rows);
    assert!(table.is_match());
    assert_eq!(table.best_row_comparisons().count(), 0);
    assert_eq!(table.matched_row_comparisons().count(), 3);
}

#[test]
fn removing_sole_partner_reports_missing_row() {
    let expected = vec![person(1, "a"), person(2, "b")];
    let table = evaluate(false, expected.clone(), vec![person(1, "a"), person(2, "b")]);
    assert!(table.is_match());

    let table = evaluate(false, expected, vec![person(1, "a")]);
    assert!(!table.is_match());
    let missing = table.missing_rows().collect::<Vec<_>>();
    assert_eq!(missing, vec![&person(2, "b")]);
    assert_eq!(table.missing_row_indices(), &[1]);
}

#[test]
fn expected_rows_against_empty_table_are_all_missing() {
    let table = evaluate(false, vec![person(1, "a"), person(2, "b")], Vec::new());
    assert_eq!(table.missing_row_indices(), &[0, 1]);
    assert!(!table.is_match());
}

#[test]
fn first_perfect_match_wins_even_when_suboptimal() {
    let loose = Row::builder().column("name", "a").build().unwrap();
    let tight = person(1, "a");
    // The loose row claims the only actual row that would satisfy the tight one.
    let table = evaluate(false, vec![loose, tight], vec![person(1, "a"), person(2, "a")]);

    let loose_match = table.matched_row_comparison(0).expect("loose row matched");
    assert_eq!(loose_match.actual_index(), 0);
    let tight_best = table.best_row_comparison(1).expect("tight row unresolved");
    assert_eq!(tight_best.actual_index(), 1);
    assert_eq!(tight_best.score(), 1);
    assert!(!table.is_match());
}

#[test]
fn equal_scores_keep_the_first_seen_actual_row() {
    let expected = vec![person(9, "x")];
    let actual = vec![person(1, "x"), person(2, "x"), person(9, "y")];
    let table = evaluate(false, expected, actual);
    let best = table.best_row_comparison(0).unwrap();
    assert_eq!(best.score(), 1);
    assert_eq!(best.actual_index(), 0);
}

#[test]
fn duplicate_expected_rows_need_distinct_actual_rows() {
    let expected = vec![person(1, "a"), person(1, "a")];

    let table = evaluate(false, expected.clone(), vec![person(1, "a")]);
    assert!(!table.is_match());
    assert_eq!(table.missing_row_indices(), &[1]);

    let table = evaluate(false, expected, vec![person(1, "a"), person(1, "a")]);
    assert!(table.is_match());
    let claimed = table.matched_actual_row_identifiers().collect::<Vec<_>>();
    assert_eq!(claimed, vec!["row:0", "row:1"]);
}

#[test]
fn negative_rows_flag_matching_actual_rows() {
    let forbidden = Row::builder().column("name", "root").not_exists().build().unwrap();

    let table = evaluate(
        false,
        vec![person(1, "a"), forbidden.clone()],
        vec![person(1, "a"), person(2, "root")],
    );
    assert!(!table.is_match());
    let flagged = table.rows_that_should_not_have_matched().collect::<Vec<_>>();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].value("id"), Some(&Value::Integer(2)));
    assert_eq!(table.missing_rows().count(), 0);

    let table = evaluate(false, vec![person(1, "a"), forbidden], vec![person(1, "a")]);
    assert!(table.is_match());
}

#[test]
fn forbidden_rows_are_not_also_extra_in_strict_tables() {
    let forbidden = Row::builder().column("name", "root").not_exists().build().unwrap();
    let table = evaluate(
        true,
        vec![person(1, "a"), forbidden],
        vec![person(1, "a"), person(2, "root")],
    );
    assert!(!table.is_match());
    assert_eq!(table.rows_that_should_not_have_matched().count(), 1);
    assert!(!table.is_expected_no_more_records_but_found_more());
    assert_eq!(table.unexpected_rows().count(), 0);
}

#[test]
fn ignored_and_null_columns_match_any_and_null() {
    let expected = Row::builder()
        .column("id", 1)
        .ignored("updated_at")
        .null("deleted_at")
        .build()
        .unwrap();
    let actual = Row::builder()
        .column("id", 1)
        .column("updated_at", "2024-02-01 08:00:00")
        .null("deleted_at")
        .build()
        .unwrap();
    assert!(evaluate(true, vec![expected], vec![actual]).is_match());
}

#[test]
fn replace_if_better_never_accepts_equal_or_worse() {
    let policy = TypedEquality::default();
    let expected = person(1, "a");
    let actual = identified(vec![person(2, "a"), person(3, "a"), person(4, "b")]);
    let mut table = TableComparison::new(
        IdentifierPolicy::default().qualify("people"),
        false,
        vec![expected.clone()],
        actual.clone(),
    );

    let first = RowComparison::compare(0, &expected, 0, &actual[0], &policy);
    let equal = RowComparison::compare(0, &expected, 1, &actual[1], &policy);
    let worse = RowComparison::compare(0, &expected, 2, &actual[2], &policy);

    table.replace_if_better_row_comparison(first.clone());
    table.replace_if_better_row_comparison(equal);
    table.replace_if_better_row_comparison(worse);
    assert_eq!(table.best_row_comparison(0), Some(&first));
}

#[test]
fn set_matching_row_refuses_claimed_rows() {
    let policy = TypedEquality::default();
    let expected = vec![person(1, "a"), person(1, "a")];
    let actual = identified(vec![person(1, "a")]);
    let mut table = TableComparison::new(
        IdentifierPolicy::default().qualify("people"),
        false,
        expected.clone(),
        actual.clone(),
    );

    let first = RowComparison::compare(0, &expected[0], 0, &actual[0], &policy);
    let second = RowComparison::compare(1, &expected[1], 0, &actual[0], &policy);
    assert!(table.set_matching_row(first));
    assert!(table.is_matching_row("row:0"));
    assert!(!table.set_matching_row(second));
    assert!(table.matched_row_comparison(1).is_none());
}

#[test]
fn serialized_table_lists_discrepancies() {
    let table = evaluate(true, vec![person(2, "b")], vec![person(2, "c")]);
    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(json["table"], "people");
    assert_eq!(json["match"], false);
    assert_eq!(json["differences"][0]["column_differences"][0]["column"], "name");
    assert_eq!(json["differences"][0]["actual"]["columns"][1]["value"], "c");
}
