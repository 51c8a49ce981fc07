//! Column and table identifier normalization.
//!
//! Unquoted identifiers are folded to the configured [`IdentifierCase`];
//! identifiers wrapped in double quotes keep their exact spelling and are
//! therefore case-sensitive. A qualified table name renders each part quoted
//! when folding would have changed it, so the rendered form qualifies back to
//! the same name.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierCase {
    #[default]
    Lower,
    Upper,
    Preserve,
}

impl IdentifierCase {
    fn fold(self, value: &str) -> String {
        match self {
            IdentifierCase::Lower => value.to_lowercase(),
            IdentifierCase::Upper => value.to_uppercase(),
            IdentifierCase::Preserve => value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdentifierPolicy {
    case: IdentifierCase,
}

impl IdentifierPolicy {
    pub fn new(case: IdentifierCase) -> Self {
        Self { case }
    }

    /// Policy under which every identifier keeps its exact spelling.
    pub fn case_sensitive() -> Self {
        Self::new(IdentifierCase::Preserve)
    }

    pub fn case(&self) -> IdentifierCase {
        self.case
    }

    /// Normalizes a single identifier (column name or one part of a table name).
    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        match unquote(trimmed) {
            Some(inner) => inner.replace("\"\"", "\""),
            None => self.case.fold(trimmed),
        }
    }

    pub fn normalize_all<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        names.iter().map(|name| self.normalize(name.as_ref())).collect()
    }

    /// Splits `schema.table` on the first dot outside quotes and normalizes both parts.
    pub fn qualify(&self, raw: &str) -> QualifiedTableName {
        let trimmed = raw.trim();
        match split_qualified(trimmed) {
            Some((schema, table)) => QualifiedTableName {
                schema: Some(self.normalize(schema)),
                table: self.normalize(table),
                case: self.case,
            },
            None => QualifiedTableName {
                schema: None,
                table: self.normalize(trimmed),
                case: self.case,
            },
        }
    }
}

/// Schema-qualified, case-normalized table identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedTableName {
    schema: Option<String>,
    table: String,
    case: IdentifierCase,
}

impl QualifiedTableName {
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Unquoted `schema.table` (or `table`) form, used to locate table files.
    pub fn plain(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.table),
            None => self.table.clone(),
        }
    }

    fn render_part(&self, part: &str) -> String {
        let needs_quotes = self.case.fold(part) != part
            || part.is_empty()
            || part.contains(|c: char| c == '.' || c == '"' || c.is_whitespace());
        if needs_quotes {
            format!("\"{}\"", part.replace('"', "\"\""))
        } else {
            part.to_string()
        }
    }
}

impl fmt::Display for QualifiedTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{}.", self.render_part(schema))?;
        }
        write!(f, "{}", self.render_part(&self.table))
    }
}

impl Serialize for QualifiedTableName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

fn unquote(value: &str) -> Option<&str> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Some(&value[1..value.len() - 1])
    } else {
        None
    }
}

fn split_qualified(value: &str) -> Option<(&str, &str)> {
    let mut in_quotes = false;
    for (idx, ch) in value.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => return Some((&value[..idx], &value[idx + 1..])),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquoted_names_fold_to_policy_case() {
        let lower = IdentifierPolicy::default();
        assert_eq!(lower.normalize(" Order_ID "), "order_id");
        let upper = IdentifierPolicy::new(IdentifierCase::Upper);
        assert_eq!(upper.normalize("order_id"), "ORDER_ID");
        assert_eq!(IdentifierPolicy::case_sensitive().normalize("MiXed"), "MiXed");
    }

    #[test]
    fn quoted_names_keep_their_spelling() {
        let policy = IdentifierPolicy::default();
        assert_eq!(policy.normalize("\"Order ID\""), "Order ID");
        assert_eq!(policy.normalize("\"a\"\"b\""), "a\"b");
    }

    #[test]
    fn qualify_splits_schema_outside_quotes() {
        let policy = IdentifierPolicy::default();
        let name = policy.qualify("Sales.\"Order.Lines\"");
        assert_eq!(name.schema(), Some("sales"));
        assert_eq!(name.table(), "Order.Lines");
        assert_eq!(name.to_string(), "sales.\"Order.Lines\"");
    }

    #[test]
    fn rendered_name_qualifies_back_to_itself() {
        let policy = IdentifierPolicy::default();
        for raw in ["orders", "public.ORDERS", "\"Public\".\"Orders\"", "x.\"a b\""] {
            let name = policy.qualify(raw);
            assert_eq!(policy.qualify(&name.to_string()), name, "{raw}");
        }
    }

    #[test]
    fn case_sensitive_names_render_quoted() {
        let policy = IdentifierPolicy::default();
        assert_eq!(policy.qualify("\"Orders\"").to_string(), "\"Orders\"");
        assert_eq!(policy.qualify("Orders").to_string(), "orders");
        assert_eq!(policy.qualify("\"Orders\"").plain(), "Orders");
    }
}
