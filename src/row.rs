//! Expected and actual rows.
//!
//! A [`Row`] is an ordered set of uniquely named columns. Rows are built once
//! through [`RowBuilder`] and are not mutated afterwards, apart from the
//! normalization and identification the comparison engine applies before a
//! pass.

use std::collections::HashSet;

use serde::Serialize;

use crate::{error::ComparisonError, identifier::IdentifierPolicy, value::Value};

const KEY_SEPARATOR: &str = "\u{1f}";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub value: Value,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    columns: Vec<Column>,
    #[serde(skip_serializing_if = "Option::is_none")]
    identifier: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    not_exists: bool,
}

impl Row {
    pub fn builder() -> RowBuilder {
        RowBuilder::default()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.column(name).map(|column| &column.value)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|column| column.primary_key)
    }

    /// Key of an actual row, assigned by [`Row::identify`].
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// True for an expected row that must not be present in the table.
    pub fn is_not_exists(&self) -> bool {
        self.not_exists
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Copy of this row with every column name normalized under `policy`.
    pub fn normalized(&self, policy: &IdentifierPolicy) -> Result<Row, ComparisonError> {
        let columns = self
            .columns
            .iter()
            .map(|column| Column {
                name: policy.normalize(&column.name),
                value: column.value.clone(),
                primary_key: column.primary_key,
            })
            .collect::<Vec<_>>();
        ensure_unique(&columns)?;
        Ok(Row {
            columns,
            identifier: self.identifier.clone(),
            not_exists: self.not_exists,
        })
    }

    /// Flags the primary-key columns and derives the row identifier.
    ///
    /// The identifier is built from the key values when every key column is
    /// present and non-null, and from the row position otherwise.
    pub fn identify(mut self, position: usize, primary_key: &[String]) -> Row {
        for column in &mut self.columns {
            column.primary_key = column.primary_key || primary_key.contains(&column.name);
        }
        let key = primary_key
            .iter()
            .map(|name| {
                self.value(name)
                    .filter(|value| !value.is_null())
                    .map(Value::as_display)
            })
            .collect::<Option<Vec<_>>>()
            .filter(|values| !values.is_empty());
        let identifier = match key {
            Some(values) => format!("pk:{}", values.join(KEY_SEPARATOR)),
            None => format!("row:{position}"),
        };
        self.identifier = Some(identifier);
        self
    }

    pub(crate) fn map_values(mut self, f: impl Fn(Value) -> Value) -> Row {
        for column in &mut self.columns {
            let value = std::mem::replace(&mut column.value, Value::Null);
            column.value = f(value);
        }
        self
    }

    pub(crate) fn mark_not_exists(mut self) -> Row {
        self.not_exists = true;
        self
    }
}

#[derive(Debug, Default)]
pub struct RowBuilder {
    columns: Vec<Column>,
    not_exists: bool,
}

impl RowBuilder {
    pub fn column(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.push(Column {
            name: name.into(),
            value: value.into(),
            primary_key: false,
        });
        self
    }

    pub fn key_column(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.push(Column {
            name: name.into(),
            value: value.into(),
            primary_key: true,
        });
        self
    }

    pub fn null(self, name: impl Into<String>) -> Self {
        self.column(name, Value::Null)
    }

    pub fn ignored(self, name: impl Into<String>) -> Self {
        self.column(name, Value::Ignore)
    }

    pub fn not_exists(mut self) -> Self {
        self.not_exists = true;
        self
    }

    pub fn build(self) -> Result<Row, ComparisonError> {
        ensure_unique(&self.columns)?;
        Ok(Row {
            columns: self.columns,
            identifier: None,
            not_exists: self.not_exists,
        })
    }
}

fn ensure_unique(columns: &[Column]) -> Result<(), ComparisonError> {
    let mut seen = HashSet::with_capacity(columns.len());
    for column in columns {
        if !seen.insert(column.name.as_str()) {
            return Err(ComparisonError::DuplicateColumn {
                column: column.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::IdentifierCase;

    #[test]
    fn builder_rejects_duplicate_columns() {
        let err = Row::builder()
            .column("id", 1)
            .column("id", 2)
            .build()
            .unwrap_err();
        assert!(matches!(err, ComparisonError::DuplicateColumn { column } if column == "id"));
    }

    #[test]
    fn normalization_can_surface_duplicates() {
        let row = Row::builder()
            .column("Name", "a")
            .column("NAME", "b")
            .build()
            .unwrap();
        assert!(row.normalized(&IdentifierPolicy::default()).is_err());
        assert!(
            row.normalized(&IdentifierPolicy::new(IdentifierCase::Preserve))
                .is_ok()
        );
    }

    #[test]
    fn identify_uses_key_values_when_complete() {
        let row = Row::builder()
            .column("id", 7)
            .column("region", "eu")
            .column("name", "x")
            .build()
            .unwrap()
            .identify(3, &["id".to_string(), "region".to_string()]);
        assert_eq!(row.identifier(), Some("pk:7\u{1f}eu"));
        let keys = row.primary_key_columns().map(|c| c.name.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["id", "region"]);
    }

    #[test]
    fn identify_falls_back_to_position() {
        let row = Row::builder().null("id").build().unwrap();
        assert_eq!(
            row.clone().identify(4, &["id".to_string()]).identifier(),
            Some("row:4")
        );
        assert_eq!(row.identify(0, &[]).identifier(), Some("row:0"));
    }
}
