use std::{borrow::Cow, collections::HashSet};

use indexmap::IndexMap;
use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::{
    comparison::row::RowComparison, equality::EqualityPolicy, identifier::QualifiedTableName,
    row::Row,
};

/// The differences between the expected and actual rows of one table.
///
/// Rows are kept in two arenas (expected in declaration order, actual in scan
/// order) and everything else refers to them by index. Expected rows that
/// found a perfect, unclaimed partner move from the best comparisons into the
/// matched comparisons; whatever is left in the best comparisons is the
/// discrepancy to report.
#[derive(Debug, Clone)]
pub struct TableComparison {
    qualified_table_name: QualifiedTableName,
    strict: bool,
    expected_rows: Vec<Row>,
    actual_rows: Vec<Row>,
    expected_no_more_records_but_found_more: bool,
    missing_rows: Vec<usize>,
    rows_that_should_not_have_matched: Vec<usize>,
    best_row_comparisons: IndexMap<usize, RowComparison>,
    matched_row_comparisons: IndexMap<usize, RowComparison>,
    matched_actual_row_identifiers: HashSet<String>,
}

impl TableComparison {
    /// Creates an empty comparison. Actual rows must already carry identifiers.
    pub fn new(
        qualified_table_name: QualifiedTableName,
        strict: bool,
        expected_rows: Vec<Row>,
        actual_rows: Vec<Row>,
    ) -> Self {
        Self {
            qualified_table_name,
            strict,
            expected_rows,
            actual_rows,
            expected_no_more_records_but_found_more: false,
            missing_rows: Vec::new(),
            rows_that_should_not_have_matched: Vec::new(),
            best_row_comparisons: IndexMap::new(),
            matched_row_comparisons: IndexMap::new(),
            matched_actual_row_identifiers: HashSet::new(),
        }
    }

    /// Builds the comparison and matches every expected row against the actual rows.
    pub fn evaluate(
        qualified_table_name: QualifiedTableName,
        strict: bool,
        expected_rows: Vec<Row>,
        actual_rows: Vec<Row>,
        policy: &dyn EqualityPolicy,
    ) -> Self {
        let mut comparison = Self::new(qualified_table_name, strict, expected_rows, actual_rows);
        comparison.match_rows(policy);
        comparison
    }

    /// Greedy matching: actual rows in scan order, each offered to the
    /// still-unmatched expected rows in declaration order. The first perfect
    /// match claims the actual row for good.
    fn match_rows(&mut self, policy: &dyn EqualityPolicy) {
        let (negative, mut searching): (Vec<usize>, Vec<usize>) =
            (0..self.expected_rows.len()).partition(|idx| self.expected_rows[*idx].is_not_exists());
        let mut unclaimed = Vec::new();

        for actual_index in 0..self.actual_rows.len() {
            if self.is_matching_row(&self.actual_identifier(actual_index)) {
                continue;
            }
            let actual = &self.actual_rows[actual_index];

            // Columns a negative row leaves out, key columns included, match anything.
            let forbidden = negative.iter().any(|&expected_index| {
                RowComparison::compare(
                    expected_index,
                    &self.expected_rows[expected_index],
                    actual_index,
                    actual,
                    policy,
                )
                .score()
                    == 0
            });
            if forbidden {
                self.set_matching_row_that_should_not_have_matched(actual_index);
            }

            let mut claimed = false;
            for position in 0..searching.len() {
                let expected_index = searching[position];
                let comparison = RowComparison::compare(
                    expected_index,
                    &self.expected_rows[expected_index],
                    actual_index,
                    &self.actual_rows[actual_index],
                    policy,
                );
                if comparison.is_match() && self.set_matching_row(comparison.clone()) {
                    searching.remove(position);
                    claimed = true;
                    break;
                }
                self.replace_if_better_row_comparison(comparison);
            }
            if !claimed {
                unclaimed.push(actual_index);
            }
        }

        if self.strict {
            let explained = self.explained_actual_rows();
            if unclaimed.iter().any(|idx| !explained.contains(idx)) {
                self.set_expected_no_more_records_but_found_more(true);
            }
        }

        for expected_index in searching {
            if !self.best_row_comparisons.contains_key(&expected_index) {
                self.add_missing_row(expected_index);
            }
        }
    }

    /// Keeps `comparison` as the best one for its expected row when there is
    /// none yet or it has a strictly lower score.
    pub fn replace_if_better_row_comparison(&mut self, comparison: RowComparison) {
        let expected_index = comparison.expected_index();
        let better = match self.best_row_comparisons.get(&expected_index) {
            Some(current) => comparison.is_better_match(current),
            None => true,
        };
        if better {
            self.best_row_comparisons.insert(expected_index, comparison);
        }
    }

    /// Promotes a perfect comparison to a final match and claims its actual
    /// row. Returns `false`, changing nothing, when the actual row was
    /// already claimed.
    pub fn set_matching_row(&mut self, comparison: RowComparison) -> bool {
        if !self
            .matched_actual_row_identifiers
            .insert(comparison.actual_identifier().to_string())
        {
            return false;
        }
        let expected_index = comparison.expected_index();
        self.best_row_comparisons.shift_remove(&expected_index);
        self.matched_row_comparisons.insert(expected_index, comparison);
        true
    }

    pub fn set_matching_row_that_should_not_have_matched(&mut self, actual_index: usize) {
        self.rows_that_should_not_have_matched.push(actual_index);
    }

    pub fn add_missing_row(&mut self, expected_index: usize) {
        self.missing_rows.push(expected_index);
    }

    pub fn set_expected_no_more_records_but_found_more(&mut self, found_more: bool) {
        self.expected_no_more_records_but_found_more = found_more;
    }

    /// True if the actual row with this identifier was already used for a match.
    pub fn is_matching_row(&self, identifier: &str) -> bool {
        self.matched_actual_row_identifiers.contains(identifier)
    }

    pub fn qualified_table_name(&self) -> &QualifiedTableName {
        &self.qualified_table_name
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn expected_rows(&self) -> &[Row] {
        &self.expected_rows
    }

    pub fn actual_rows(&self) -> &[Row] {
        &self.actual_rows
    }

    pub fn is_expected_no_more_records_but_found_more(&self) -> bool {
        self.expected_no_more_records_but_found_more
    }

    pub fn missing_row_indices(&self) -> &[usize] {
        &self.missing_rows
    }

    /// Expected rows for which no actual row was ever compared.
    pub fn missing_rows(&self) -> impl Iterator<Item = &Row> {
        self.missing_rows.iter().map(|idx| &self.expected_rows[*idx])
    }

    /// Actual rows that matched a row declared as not existing.
    pub fn rows_that_should_not_have_matched(&self) -> impl Iterator<Item = &Row> {
        self.rows_that_should_not_have_matched
            .iter()
            .map(|idx| &self.actual_rows[*idx])
    }

    /// Actual rows that no expected row claimed and no remaining discrepancy refers to.
    /// Rows already reported as forbidden are not listed again.
    pub fn unexpected_rows(&self) -> impl Iterator<Item = &Row> {
        let explained = self.explained_actual_rows();
        self.actual_rows.iter().enumerate().filter_map(move |(idx, row)| {
            let claimed = self.is_matching_row(&self.actual_identifier(idx));
            (!claimed && !explained.contains(&idx)).then_some(row)
        })
    }

    fn explained_actual_rows(&self) -> HashSet<usize> {
        self.best_row_comparisons
            .values()
            .map(RowComparison::actual_index)
            .chain(self.rows_that_should_not_have_matched.iter().copied())
            .collect()
    }

    fn actual_identifier(&self, actual_index: usize) -> Cow<'_, str> {
        match self.actual_rows[actual_index].identifier() {
            Some(identifier) => Cow::Borrowed(identifier),
            None => Cow::Owned(format!("row:{actual_index}")),
        }
    }

    /// Best comparisons of the expected rows that did not find a perfect match.
    pub fn best_row_comparisons(&self) -> impl Iterator<Item = &RowComparison> {
        self.best_row_comparisons.values()
    }

    pub fn best_row_comparison(&self, expected_index: usize) -> Option<&RowComparison> {
        self.best_row_comparisons.get(&expected_index)
    }

    pub fn matched_row_comparisons(&self) -> impl Iterator<Item = &RowComparison> {
        self.matched_row_comparisons.values()
    }

    pub fn matched_row_comparison(&self, expected_index: usize) -> Option<&RowComparison> {
        self.matched_row_comparisons.get(&expected_index)
    }

    pub fn matched_actual_row_identifiers(&self) -> impl Iterator<Item = &str> {
        self.matched_row_comparisons
            .values()
            .map(RowComparison::actual_identifier)
    }

    pub fn is_match(&self) -> bool {
        if self.expected_no_more_records_but_found_more {
            return false;
        }
        if !self.missing_rows.is_empty() {
            return false;
        }
        if !self.rows_that_should_not_have_matched.is_empty() {
            return false;
        }
        self.best_row_comparisons
            .values()
            .all(RowComparison::is_match)
    }
}

impl Serialize for TableComparison {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        struct Discrepancy<'a> {
            expected: &'a Row,
            actual: &'a Row,
            #[serde(flatten)]
            comparison: &'a RowComparison,
        }

        let discrepancies = self
            .best_row_comparisons
            .values()
            .map(|comparison| Discrepancy {
                expected: &self.expected_rows[comparison.expected_index()],
                actual: &self.actual_rows[comparison.actual_index()],
                comparison,
            })
            .collect::<Vec<_>>();

        let mut state = serializer.serialize_struct("TableComparison", 8)?;
        state.serialize_field("table", &self.qualified_table_name)?;
        state.serialize_field("match", &self.is_match())?;
        state.serialize_field("strict", &self.strict)?;
        state.serialize_field(
            "expected_no_more_records_but_found_more",
            &self.expected_no_more_records_but_found_more,
        )?;
        state.serialize_field("missing_rows", &self.missing_rows().collect::<Vec<_>>())?;
        state.serialize_field(
            "rows_that_should_not_have_matched",
            &self.rows_that_should_not_have_matched().collect::<Vec<_>>(),
        )?;
        state.serialize_field("unexpected_rows", &self.unexpected_rows().collect::<Vec<_>>())?;
        state.serialize_field("differences", &discrepancies)?;
        state.end()
    }
}
