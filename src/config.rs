use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::identifier::{IdentifierCase, IdentifierPolicy};

pub const DEFAULT_NULL_TOKEN: &str = "[null]";
pub const DEFAULT_IGNORE_TOKEN: &str = "[ignore]";

/// Settings shared by every table of a comparison pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparisonConfig {
    /// Case folding applied to unquoted table and column names.
    pub identifier_case: IdentifierCase,
    /// Strictness of tables that do not declare it themselves.
    pub default_strict: bool,
    /// Expected text standing for an explicit `NULL`.
    pub null_token: String,
    /// Expected text accepting any actual value.
    pub ignore_token: String,
    /// Compare text values with surrounding whitespace removed.
    pub trim_strings: bool,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            identifier_case: IdentifierCase::default(),
            default_strict: false,
            null_token: DEFAULT_NULL_TOKEN.to_string(),
            ignore_token: DEFAULT_IGNORE_TOKEN.to_string(),
            trim_strings: false,
        }
    }
}

impl ComparisonConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Opening configuration file {path:?}"))?;
        Self::from_yaml(&raw).with_context(|| format!("Parsing configuration file {path:?}"))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn identifier_policy(&self) -> IdentifierPolicy {
        IdentifierPolicy::new(self.identifier_case)
    }
}
