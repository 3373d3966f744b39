//! Analysis configuration, loadable from `typical.toml`

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diagnostic::Severity;
use crate::error::CoreError;

/// Conventional suffix of schema files
pub const SCHEMA_SUFFIX: &str = ".t";

/// Name of the configuration file looked up by tools
pub const CONFIG_FILE_NAME: &str = "typical.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Suffix every import path must carry
    #[serde(default = "default_schema_suffix")]
    pub schema_suffix: String,
    /// Severity of `Import not used.`
    #[serde(default = "default_warning")]
    pub unused_import: Severity,
    /// Severity of `Index <n> should be deleted.` on a live field
    #[serde(default = "default_error")]
    pub deleted_field: Severity,
    /// Severity of `Index <n> is still being referenced by <field>.` on a deleted block
    #[serde(default = "default_warning")]
    pub deleted_index_in_use: Severity,
}

fn default_schema_suffix() -> String {
    SCHEMA_SUFFIX.to_string()
}

fn default_warning() -> Severity {
    Severity::Warning
}

fn default_error() -> Severity {
    Severity::Error
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            schema_suffix: default_schema_suffix(),
            unused_import: default_warning(),
            deleted_field: default_error(),
            deleted_index_in_use: default_warning(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CoreError::Config(format!("Failed to read config: {}", e)))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, CoreError> {
        toml::from_str(content)
            .map_err(|e| CoreError::Config(format!("Failed to parse config: {}", e)))
    }
}

impl FromStr for AnalysisConfig {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
