//! Expected-versus-actual comparison: per row, per table, per data set.

pub mod engine;
pub mod row;
pub mod table;

pub use engine::{ComparisonEngine, DataSetComparison};
pub use row::{ColumnDifference, RowComparison};
pub use table::TableComparison;
