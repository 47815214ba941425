//! Configuration loading from enumstr.toml.
//!
//! The file is optional and lives in the package directory. Command-line
//! values always take precedence over file values.

use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::{EnumstrError, EnumstrResult, IoResultExt};

/// File name looked up in the package directory.
pub const CONFIG_FILE: &str = "enumstr.toml";

/// Contents of enumstr.toml.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EnumstrConfig {
    /// Types to generate String methods for.
    pub types: Option<Vec<String>>,
    /// Output file name, or "-" for standard output.
    pub output: Option<String>,
    /// Extra build tags used when selecting source files.
    pub tags: Option<Vec<String>>,
}

impl EnumstrConfig {
    /// Layers `other` on top of `self`: every value set in `other` wins.
    pub fn merged(self, other: EnumstrConfig) -> EnumstrConfig {
        EnumstrConfig {
            types: other.types.or(self.types),
            output: other.output.or(self.output),
            tags: other.tags.or(self.tags),
        }
    }
}

/// Loads configuration from enumstr.toml if it exists.
pub fn load_config(dir: &Path) -> EnumstrResult<Option<EnumstrConfig>> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).with_path(&path)?;
    let cfg = toml::from_str(&content).map_err(|e| EnumstrError::config(&path, e.to_string()))?;
    Ok(Some(cfg))
}

/// Splits a comma-delimited list, trimming entries and dropping empty ones.
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
