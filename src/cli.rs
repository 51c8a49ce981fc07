use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Assert that database tables hold an expected data set", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compare an expected YAML data set against CSV snapshots of the actual tables
    Compare(CompareArgs),
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Expected data set file (YAML)
    #[arg(short = 'e', long = "expected")]
    pub expected: PathBuf,
    /// Directory holding one CSV/TSV file per actual table
    #[arg(short = 'a', long = "actual-dir")]
    pub actual_dir: PathBuf,
    /// Primary key of a table as `table=col_a,col_b` (repeatable)
    #[arg(long = "primary-key", value_parser = parse_primary_key, action = clap::ArgAction::Append)]
    pub primary_keys: Vec<(String, Vec<String>)>,
    /// Comparison settings file (YAML)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Keep the exact spelling of unquoted table and column names
    #[arg(long = "case-sensitive")]
    pub case_sensitive: bool,
    /// Treat tables without an explicit `strict` flag as strict
    #[arg(long)]
    pub strict: bool,
    /// Output format of the comparison report
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the actual table files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum ReportFormat {
    Text,
    Json,
}

pub fn parse_primary_key(value: &str) -> Result<(String, Vec<String>), String> {
    let (table, columns) = value
        .split_once('=')
        .ok_or_else(|| format!("Primary key '{value}' must look like table=col_a,col_b"))?;
    let table = table.trim();
    if table.is_empty() {
        return Err("Primary key table name cannot be empty".to_string());
    }
    let columns = columns
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    if columns.is_empty() {
        return Err(format!("Primary key for '{table}' lists no columns"));
    }
    Ok((table.to_string(), columns))
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_key_splits_table_and_columns() {
        assert_eq!(
            parse_primary_key("sales.orders = id, region").unwrap(),
            (
                "sales.orders".to_string(),
                vec!["id".to_string(), "region".to_string()]
            )
        );
        assert!(parse_primary_key("orders").is_err());
        assert!(parse_primary_key("orders=").is_err());
        assert!(parse_primary_key("=id").is_err());
    }

    #[test]
    fn delimiter_accepts_names_and_single_characters() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert!(parse_delimiter("ab").is_err());
    }
}
