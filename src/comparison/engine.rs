use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    comparison::table::TableComparison,
    config::ComparisonConfig,
    equality::{EqualityPolicy, TypedEquality},
    error::ComparisonError,
    identifier::{IdentifierPolicy, QualifiedTableName},
    row::Row,
    source::{ActualRowAccessor, ActualTable, DataSetSource},
    value::Value,
};

/// Outcome of comparing a whole data set.
#[derive(Debug, Clone, Serialize)]
pub struct DataSetComparison {
    #[serde(rename = "match")]
    is_match: bool,
    tables: IndexMap<QualifiedTableName, TableComparison>,
}

impl DataSetComparison {
    pub fn is_match(&self) -> bool {
        self.is_match
    }

    /// Table comparisons in the order the data set declared the tables.
    pub fn tables(&self) -> impl Iterator<Item = &TableComparison> {
        self.tables.values()
    }

    pub fn table(&self, name: &QualifiedTableName) -> Option<&TableComparison> {
        self.tables.get(name)
    }

    pub fn failed_tables(&self) -> impl Iterator<Item = &TableComparison> {
        self.tables.values().filter(|table| !table.is_match())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

struct PendingTable {
    strict: bool,
    rows: Vec<Row>,
}

/// Compares expected data sets against the actual table contents.
///
/// The engine holds no state between passes; the same engine can compare any
/// number of data sets, one pass per [`ComparisonEngine::compare`] call.
#[derive(Debug)]
pub struct ComparisonEngine {
    config: ComparisonConfig,
    identifiers: IdentifierPolicy,
    equality: Box<dyn EqualityPolicy>,
}

impl Default for ComparisonEngine {
    fn default() -> Self {
        Self::new(ComparisonConfig::default())
    }
}

impl ComparisonEngine {
    pub fn new(config: ComparisonConfig) -> Self {
        let equality = TypedEquality::new(config.trim_strings);
        Self::with_policy(config, equality)
    }

    pub fn with_policy(config: ComparisonConfig, equality: impl EqualityPolicy + 'static) -> Self {
        Self {
            identifiers: config.identifier_policy(),
            config,
            equality: Box::new(equality),
        }
    }

    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    pub fn identifier_policy(&self) -> &IdentifierPolicy {
        &self.identifiers
    }

    /// Runs one comparison pass. The first structural error aborts the whole pass.
    pub fn compare<S, A>(
        &self,
        source: &mut S,
        accessor: &A,
    ) -> Result<DataSetComparison, ComparisonError>
    where
        S: DataSetSource + ?Sized,
        A: ActualRowAccessor + ?Sized,
    {
        let mut pending: IndexMap<QualifiedTableName, PendingTable> = IndexMap::new();
        while let Some(table) = source.next_table()? {
            let name = self.identifiers.qualify(&table.name);
            let strict = table.strict.unwrap_or(self.config.default_strict);
            let entry = pending.entry(name).or_insert_with(|| PendingTable {
                strict: false,
                rows: Vec::new(),
            });
            entry.strict |= strict;
            entry.rows.extend(table.rows);
        }

        let mut tables = IndexMap::with_capacity(pending.len());
        for (name, table) in pending {
            let actual = accessor.fetch(&name)?;
            let comparison = self.compare_table(name.clone(), table.strict, table.rows, actual)?;
            tables.insert(name, comparison);
        }
        let is_match = tables.values().all(TableComparison::is_match);
        Ok(DataSetComparison { is_match, tables })
    }

    /// Compares the expected rows of one table against its actual contents.
    ///
    /// A table with no expected rows must be empty, whatever `strict` says.
    pub fn compare_table(
        &self,
        name: QualifiedTableName,
        strict: bool,
        expected_rows: Vec<Row>,
        actual: ActualTable,
    ) -> Result<TableComparison, ComparisonError> {
        let columns = self.identifiers.normalize_all(&actual.columns);
        let primary_key = self.identifiers.normalize_all(&actual.primary_key);

        let expected_rows = expected_rows
            .iter()
            .map(|row| {
                let row = row.normalized(&self.identifiers)?;
                if let Some(unknown) = row
                    .column_names()
                    .find(|column| !columns.iter().any(|known| known == column))
                {
                    return Err(ComparisonError::UnknownColumn {
                        table: name.clone(),
                        column: unknown.to_string(),
                    });
                }
                Ok(row.map_values(|value| self.substitute_tokens(value)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut identifiers = HashSet::with_capacity(actual.rows.len());
        let actual_rows = actual
            .rows
            .iter()
            .enumerate()
            .map(|(position, row)| {
                let row = row.normalized(&self.identifiers)?.identify(position, &primary_key);
                let identifier = row.identifier().unwrap_or_default().to_string();
                if !identifiers.insert(identifier.clone()) {
                    return Err(ComparisonError::DuplicateRowIdentifier {
                        table: name.clone(),
                        identifier,
                    });
                }
                Ok(row)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let strict = strict || expected_rows.is_empty();
        Ok(TableComparison::evaluate(
            name,
            strict,
            expected_rows,
            actual_rows,
            self.equality.as_ref(),
        ))
    }

    fn substitute_tokens(&self, value: Value) -> Value {
        match value {
            Value::String(text) if text == self.config.null_token => Value::Null,
            Value::String(text) if text == self.config.ignore_token => Value::Ignore,
            other => other,
        }
    }
}
