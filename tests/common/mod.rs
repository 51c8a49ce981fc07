#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use dataset_assert::{
    Row, Value,
    comparison::TableComparison,
    equality::TypedEquality,
    identifier::IdentifierPolicy,
};
use tempfile::{TempDir, tempdir};

/// Builds a row from `(column, value)` pairs.
pub fn row<V: Into<Value> + Clone>(cells: &[(&str, V)]) -> Row {
    cells
        .iter()
        .fold(Row::builder(), |builder, (name, value)| {
            builder.column(*name, value.clone())
        })
        .build()
        .expect("unique columns")
}

/// Row with an integer `id` and a text `name`, the shape most scenarios use.
pub fn person(id: i64, name: &str) -> Row {
    Row::builder()
        .column("id", id)
        .column("name", name)
        .build()
        .expect("unique columns")
}

/// Identifies actual rows by position, the way the engine does for keyless tables.
pub fn identified(rows: Vec<Row>) -> Vec<Row> {
    rows.into_iter()
        .enumerate()
        .map(|(position, row)| row.identify(position, &[]))
        .collect()
}

pub fn evaluate(strict: bool, expected: Vec<Row>, actual: Vec<Row>) -> TableComparison {
    TableComparison::evaluate(
        IdentifierPolicy::default().qualify("people"),
        strict,
        expected,
        identified(actual),
        &TypedEquality::default(),
    )
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file contents");
        path
    }
}
