use thiserror::Error;

use crate::identifier::QualifiedTableName;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by an [`ActualRowAccessor`](crate::source::ActualRowAccessor).
///
/// A missing table is kept apart from read failures: an absent table and an
/// empty table mean different things to the comparison.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("table {0} does not exist")]
    TableNotFound(QualifiedTableName),
    #[error("unable to read rows of table {table}")]
    Read {
        table: QualifiedTableName,
        #[source]
        source: BoxError,
    },
}

/// Structural errors that abort a comparison pass.
///
/// Data mismatches are never reported through this type; they live in the
/// comparison results.
#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("table {0} declared in the data set does not exist in the database")]
    TableNotFound(QualifiedTableName),
    #[error("data set row for table {table} references unknown column '{column}'")]
    UnknownColumn {
        table: QualifiedTableName,
        column: String,
    },
    #[error("column '{column}' is declared more than once in the same row")]
    DuplicateColumn { column: String },
    #[error("table {table} holds more than one row identified by '{identifier}'")]
    DuplicateRowIdentifier {
        table: QualifiedTableName,
        identifier: String,
    },
    #[error("unable to read the expected data set")]
    DataSet {
        #[source]
        source: BoxError,
    },
    #[error("unable to read actual rows for table {table}")]
    Access {
        table: QualifiedTableName,
        #[source]
        source: BoxError,
    },
}

impl From<AccessError> for ComparisonError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::TableNotFound(table) => ComparisonError::TableNotFound(table),
            AccessError::Read { table, source } => ComparisonError::Access { table, source },
        }
    }
}
