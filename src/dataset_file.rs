//! YAML data set files.
//!
//! ```yaml
//! tables:
//!   - name: public.orders
//!     strict: true
//!     rows:
//!       - { id: 1, status: shipped, note: "[ignore]" }
//!     not_exists:
//!       - { id: 99 }
//! ```
//!
//! Scalars keep their YAML kind (integers, floats, booleans, `~`); quoted and
//! plain text stays text and is compared type-aware against the actual column.

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use serde_yaml::Value as YamlValue;

use crate::{
    row::Row,
    source::{DataSet, ExpectedTable},
    value::Value,
};

type RowEntry = IndexMap<String, YamlValue>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DataSetFile {
    #[serde(default)]
    tables: Vec<TableEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableEntry {
    name: String,
    #[serde(default)]
    strict: Option<bool>,
    #[serde(default)]
    negative: bool,
    #[serde(default)]
    rows: Vec<RowEntry>,
    #[serde(default)]
    not_exists: Vec<RowEntry>,
}

pub fn load_data_set(path: &Path) -> Result<DataSet> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("Opening data set file {path:?}"))?;
    parse_data_set(&raw).with_context(|| format!("Parsing data set file {path:?}"))
}

pub fn parse_data_set(raw: &str) -> Result<DataSet> {
    let file: DataSetFile = serde_yaml::from_str(raw)?;
    let mut data_set = DataSet::new();
    for entry in file.tables {
        let mut table = ExpectedTable::new(entry.name.clone());
        table.strict = entry.strict;
        for (idx, row) in entry.rows.iter().enumerate() {
            let row = build_row(row, false)
                .with_context(|| format!("Table '{}' row {}", entry.name, idx + 1))?;
            table.rows.push(row);
        }
        if entry.negative {
            table = table.negative();
        }
        for (idx, row) in entry.not_exists.iter().enumerate() {
            let row = build_row(row, true)
                .with_context(|| format!("Table '{}' not_exists row {}", entry.name, idx + 1))?;
            table.rows.push(row);
        }
        debug!(
            "Loaded {} expected row(s) for table '{}'",
            table.rows.len(),
            entry.name
        );
        data_set.push(table);
    }
    Ok(data_set)
}

fn build_row(entry: &RowEntry, not_exists: bool) -> Result<Row> {
    let mut builder = Row::builder();
    for (column, raw) in entry {
        let value =
            yaml_to_value(raw).with_context(|| format!("Column '{column}'"))?;
        builder = builder.column(column.clone(), value);
    }
    if not_exists {
        builder = builder.not_exists();
    }
    Ok(builder.build()?)
}

fn yaml_to_value(raw: &YamlValue) -> Result<Value> {
    let value = match raw {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Boolean(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                bail!("Unsupported number '{n}'")
            }
        }
        YamlValue::String(s) => Value::String(s.clone()),
        YamlValue::Tagged(tagged) => return yaml_to_value(&tagged.value),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => {
            bail!("Column values must be scalars")
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::DataSetSource;

    #[test]
    fn parses_tables_rows_and_negative_rows() {
        let mut data_set = parse_data_set(
            r#"
tables:
  - name: public.orders
    strict: true
    rows:
      - { id: 1, total: 12.5, paid: true, note: "[ignore]", closed_at: ~ }
    not_exists:
      - { id: 99 }
  - name: audit
"#,
        )
        .unwrap();
        assert_eq!(data_set.len(), 2);

        let orders = data_set.next_table().unwrap().unwrap();
        assert_eq!(orders.name, "public.orders");
        assert_eq!(orders.strict, Some(true));
        assert_eq!(orders.rows.len(), 2);
        let first = &orders.rows[0];
        assert_eq!(first.value("id"), Some(&Value::Integer(1)));
        assert_eq!(first.value("total"), Some(&Value::Float(12.5)));
        assert_eq!(first.value("note"), Some(&Value::from("[ignore]")));
        assert_eq!(first.value("closed_at"), Some(&Value::Null));
        assert!(!first.is_not_exists());
        assert!(orders.rows[1].is_not_exists());

        let audit = data_set.next_table().unwrap().unwrap();
        assert!(audit.rows.is_empty());
        assert_eq!(audit.strict, None);
        assert!(data_set.next_table().unwrap().is_none());
    }

    #[test]
    fn negative_tables_mark_every_row() {
        let mut data_set = parse_data_set(
            "tables:\n  - name: users\n    negative: true\n    rows:\n      - { name: root }\n",
        )
        .unwrap();
        let users = data_set.next_table().unwrap().unwrap();
        assert!(users.rows.iter().all(Row::is_not_exists));
    }

    #[test]
    fn nested_values_are_rejected() {
        let err = parse_data_set("tables:\n  - name: t\n    rows:\n      - { tags: [a, b] }\n")
            .unwrap_err();
        assert!(format!("{err:#}").contains("Column values must be scalars"));
    }
}
