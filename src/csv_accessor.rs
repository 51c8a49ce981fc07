//! Actual rows read from a directory of CSV snapshots, one file per table.
//!
//! A table `schema.table` is looked up as `schema.table.csv`, then
//! `table.csv`, then the `.tsv` variants. The header row provides the table
//! columns; cells are typed with [`Value::infer`], empty cells read as `NULL`.

use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    error::AccessError,
    identifier::{IdentifierPolicy, QualifiedTableName},
    row::Row,
    source::{ActualRowAccessor, ActualTable},
    value::Value,
};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

#[derive(Debug, Clone)]
pub struct CsvDirectoryAccessor {
    root: PathBuf,
    policy: IdentifierPolicy,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
    primary_keys: HashMap<QualifiedTableName, Vec<String>>,
}

impl CsvDirectoryAccessor {
    pub fn new(root: impl Into<PathBuf>, policy: IdentifierPolicy) -> Self {
        Self {
            root: root.into(),
            policy,
            delimiter: None,
            encoding: UTF_8,
            primary_keys: HashMap::new(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: Option<u8>) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_primary_key(mut self, table: &str, columns: Vec<String>) -> Self {
        self.primary_keys.insert(self.policy.qualify(table), columns);
        self
    }

    fn locate(&self, table: &QualifiedTableName) -> Option<PathBuf> {
        let mut stems = vec![table.plain()];
        if table.schema().is_some() {
            stems.push(table.table().to_string());
        }
        stems
            .iter()
            .flat_map(|stem| ["csv", "tsv"].map(|ext| self.root.join(format!("{stem}.{ext}"))))
            .find(|candidate| candidate.is_file())
    }

    fn read_table(&self, table: &QualifiedTableName, path: &Path) -> Result<ActualTable> {
        let delimiter = resolve_input_delimiter(path, self.delimiter);
        let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .double_quote(true)
            .flexible(false)
            .from_reader(BufReader::new(file));

        let headers = decode_record(reader.byte_headers()?, self.encoding)?;
        let mut rows = Vec::new();
        for (row_idx, record) in reader.byte_records().enumerate() {
            let record =
                record.with_context(|| format!("Reading row {} in {:?}", row_idx + 2, path))?;
            let cells = decode_record(&record, self.encoding)?;
            let row = headers
                .iter()
                .zip(cells.iter())
                .fold(Row::builder(), |builder, (name, cell)| {
                    builder.column(name.clone(), Value::infer(cell))
                })
                .build()
                .with_context(|| format!("Row {} in {:?}", row_idx + 2, path))?;
            rows.push(row);
        }
        debug!("Read {} row(s) for table {} from {:?}", rows.len(), table, path);

        let primary_key = self.primary_keys.get(table).cloned().unwrap_or_default();
        Ok(ActualTable::new(headers, primary_key).with_rows(rows))
    }
}

impl ActualRowAccessor for CsvDirectoryAccessor {
    fn fetch(&self, table: &QualifiedTableName) -> Result<ActualTable, AccessError> {
        let path = self
            .locate(table)
            .ok_or_else(|| AccessError::TableNotFound(table.clone()))?;
        self.read_table(table, &path)
            .map_err(|source| AccessError::Read {
                table: table.clone(),
                source: source.into(),
            })
    }
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| {
            let (text, _, had_errors) = encoding.decode(field);
            if had_errors {
                Err(anyhow!(
                    "Failed to decode text with encoding {}",
                    encoding.name()
                ))
            } else {
                Ok(text.into_owned())
            }
        })
        .collect()
}
