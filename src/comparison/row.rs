use serde::Serialize;

use crate::{equality::EqualityPolicy, row::Row, value::Value};

/// One expected column whose actual value did not satisfy it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDifference {
    pub column: String,
    pub expected: Value,
    /// `None` when the actual row has no such column.
    pub actual: Option<Value>,
}

/// Result of comparing one expected row with one actual row.
///
/// Rows are referenced by their position in the owning table comparison.
/// The comparison is driven by the expected row: actual columns that the
/// expected row does not mention are not looked at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowComparison {
    expected_index: usize,
    actual_index: usize,
    actual_identifier: String,
    column_differences: Vec<ColumnDifference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unused_primary_key_columns: Vec<String>,
}

impl RowComparison {
    pub fn compare(
        expected_index: usize,
        expected: &Row,
        actual_index: usize,
        actual: &Row,
        policy: &dyn EqualityPolicy,
    ) -> Self {
        let mut column_differences = Vec::new();
        for column in expected.columns() {
            if column.value.is_ignore() {
                continue;
            }
            match actual.value(&column.name) {
                None => column_differences.push(ColumnDifference {
                    column: column.name.clone(),
                    expected: column.value.clone(),
                    actual: None,
                }),
                Some(value) if column.value.is_null() && value.is_null() => {}
                Some(value) => {
                    if !policy.values_equal(&column.value, value) {
                        column_differences.push(ColumnDifference {
                            column: column.name.clone(),
                            expected: column.value.clone(),
                            actual: Some(value.clone()),
                        });
                    }
                }
            }
        }

        // Key columns only become ambiguous when the expected row pins some of them.
        let (declared, undeclared): (Vec<&str>, Vec<&str>) = actual
            .primary_key_columns()
            .map(|column| column.name.as_str())
            .partition(|name| expected.column(name).is_some());
        let unused_primary_key_columns = if declared.is_empty() {
            Vec::new()
        } else {
            undeclared.into_iter().map(str::to_string).collect()
        };

        Self {
            expected_index,
            actual_index,
            actual_identifier: actual
                .identifier()
                .map(str::to_string)
                .unwrap_or_else(|| format!("row:{actual_index}")),
            column_differences,
            unused_primary_key_columns,
        }
    }

    pub fn expected_index(&self) -> usize {
        self.expected_index
    }

    pub fn actual_index(&self) -> usize {
        self.actual_index
    }

    pub fn actual_identifier(&self) -> &str {
        &self.actual_identifier
    }

    pub fn column_differences(&self) -> &[ColumnDifference] {
        &self.column_differences
    }

    pub fn unused_primary_key_columns(&self) -> &[String] {
        &self.unused_primary_key_columns
    }

    /// Number of differing columns, lower is better.
    pub fn score(&self) -> usize {
        self.column_differences.len()
    }

    pub fn is_match(&self) -> bool {
        self.column_differences.is_empty() && self.unused_primary_key_columns.is_empty()
    }

    /// Strictly better than `other`; equal scores keep the earlier comparison.
    pub fn is_better_match(&self, other: &RowComparison) -> bool {
        self.score() < other.score()
    }
}
