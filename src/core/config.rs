//! Optional per-tree configuration loaded from `modelbump.json`.
//!
//! The original one-shot script baked the root path and extension list into
//! the program; here both are injectable. Resolution order: CLI flags >
//! `modelbump.json` in the target root > built-in defaults.

use crate::error::{Error, Result};
use crate::rewrite::DEFAULT_EXTENSIONS;
use crate::table::Replacement;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "modelbump.json";

/// Root configuration structure for modelbump.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelbumpConfig {
    /// File extensions eligible for rewriting (no leading dot).
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Extra directory names to skip during traversal.
    #[serde(default)]
    pub skip_dirs: Vec<String>,

    /// Custom replacement table overriding the builtin one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Vec<Replacement>>,
}

impl Default for ModelbumpConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            skip_dirs: Vec::new(),
            table: None,
        }
    }
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

/// Load configuration from `modelbump.json` under `root`, falling back to
/// defaults when the file does not exist.
pub fn load(root: &Path) -> Result<ModelbumpConfig> {
    let path = root.join(CONFIG_FILE);
    if !path.is_file() {
        return Ok(ModelbumpConfig::default());
    }

    let raw = std::fs::read_to_string(&path).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    serde_json::from_str(&raw).map_err(|e| Error::config_invalid_json(path.display().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = load(dir.path()).unwrap();
        assert_eq!(config.extensions, default_extensions());
        assert!(config.skip_dirs.is_empty());
        assert!(config.table.is_none());
    }

    #[test]
    fn file_overrides_extensions_and_table() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"extensions": ["vue"], "table": [{"from": "x", "to": "y"}]}"#,
        )
        .unwrap();

        let config = load(dir.path()).unwrap();
        assert_eq!(config.extensions, vec!["vue".to_string()]);
        let table = config.table.unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].from, "x");
    }

    #[test]
    fn unset_fields_keep_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"skip_dirs": ["generated"]}"#,
        )
        .unwrap();

        let config = load(dir.path()).unwrap();
        assert_eq!(config.extensions, default_extensions());
        assert_eq!(config.skip_dirs, vec!["generated".to_string()]);
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{ nope").unwrap();

        let err = load(dir.path()).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_json");
    }
}
