//! Collaborator interfaces consumed by the comparison engine.
//!
//! [`DataSetSource`] hands out the expected tables of a data set, once.
//! [`ActualRowAccessor`] returns the current contents of a table. Both have
//! in-memory implementations here; file-backed ones live in
//! [`dataset_file`](crate::dataset_file) and [`csv_accessor`](crate::csv_accessor).

use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::{
    error::{AccessError, ComparisonError},
    identifier::{IdentifierPolicy, QualifiedTableName},
    row::Row,
};

/// One table block of an expected data set.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedTable {
    pub name: String,
    /// `None` defers to the engine's configured default.
    pub strict: Option<bool>,
    pub rows: Vec<Row>,
}

impl ExpectedTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strict: None,
            rows: Vec::new(),
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    pub fn row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Row>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Declares every row of this block as a row that must not exist.
    pub fn negative(mut self) -> Self {
        self.rows = self.rows.into_iter().map(Row::mark_not_exists).collect();
        self
    }
}

/// Produces the expected tables of one data set in declaration order.
///
/// A source is consumed by a single comparison pass; comparing again means
/// building a new source.
pub trait DataSetSource {
    fn next_table(&mut self) -> Result<Option<ExpectedTable>, ComparisonError>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    tables: VecDeque<ExpectedTable>,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table: ExpectedTable) -> Self {
        self.tables.push_back(table);
        self
    }

    pub fn push(&mut self, table: ExpectedTable) {
        self.tables.push_back(table);
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn tables(&self) -> impl Iterator<Item = &ExpectedTable> {
        self.tables.iter()
    }
}

impl FromIterator<ExpectedTable> for DataSet {
    fn from_iter<I: IntoIterator<Item = ExpectedTable>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}

impl DataSetSource for DataSet {
    fn next_table(&mut self) -> Result<Option<ExpectedTable>, ComparisonError> {
        Ok(self.tables.pop_front())
    }
}

/// Current contents of one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActualTable {
    pub columns: Vec<String>,
    pub primary_key: Vec<String>,
    pub rows: Vec<Row>,
}

impl ActualTable {
    /// An empty table with a known shape.
    pub fn new(columns: Vec<String>, primary_key: Vec<String>) -> Self {
        Self {
            columns,
            primary_key,
            rows: Vec::new(),
        }
    }

    /// A table whose columns are the union of the given rows' columns, in first-seen order.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for name in row.column_names() {
                if !columns.iter().any(|existing| existing == name) {
                    columns.push(name.to_string());
                }
            }
        }
        let primary_key = rows
            .first()
            .map(|row| {
                row.primary_key_columns()
                    .map(|column| column.name.clone())
                    .collect()
            })
            .unwrap_or_default();
        Self {
            columns,
            primary_key,
            rows,
        }
    }

    pub fn with_primary_key(mut self, primary_key: Vec<String>) -> Self {
        self.primary_key = primary_key;
        self
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }
}

/// Reads the full current row set of a table.
///
/// Implementations must report a missing table as
/// [`AccessError::TableNotFound`], never as an empty table.
pub trait ActualRowAccessor {
    fn fetch(&self, table: &QualifiedTableName) -> Result<ActualTable, AccessError>;
}

/// Accessor over tables held in memory, keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccessor {
    policy: IdentifierPolicy,
    tables: IndexMap<QualifiedTableName, ActualTable>,
}

impl InMemoryAccessor {
    pub fn new(policy: IdentifierPolicy) -> Self {
        Self {
            policy,
            tables: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, name: &str, table: ActualTable) {
        self.tables.insert(self.policy.qualify(name), table);
    }

    pub fn with_table(mut self, name: &str, table: ActualTable) -> Self {
        self.insert(name, table);
        self
    }
}

impl ActualRowAccessor for InMemoryAccessor {
    fn fetch(&self, table: &QualifiedTableName) -> Result<ActualTable, AccessError> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| AccessError::TableNotFound(table.clone()))
    }
}
