//! Replacement table — ordered literal old→new string pairs.
//!
//! Entries are matched as exact substrings (never regex, never
//! word-boundary aware) and applied in table order. Because each entry
//! rewrites the accumulating buffer, a later key can match text introduced
//! by an earlier value; table order is the contract.

use crate::error::{Error, Result};
use crate::utils::io;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One ordered literal pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

/// Ordered collection of replacements. Insertion order is application order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplacementTable {
    entries: Vec<Replacement>,
}

/// The model-bump pairs the tool ships with: display names (including the
/// CJK-suffixed variants) followed by quoted machine identifiers in both
/// quote styles. The `GPT-5.2` self-mapping guards against double-replacing
/// already-bumped text and is intentionally inert.
const BUILTIN_PAIRS: &[(&str, &str)] = &[
    // Display names
    ("GPT-4o", "GPT-5.2"),
    ("GPT-4o (通用)", "GPT-5.2 (旗舰通用)"),
    ("Claude 3 Opus", "Claude 4.6 Opus"),
    ("Claude 3 Opus (高精度)", "Claude 4.6 Opus (超长推理)"),
    ("Claude 3 Sonnet", "Claude 4.6 Sonnet"),
    ("Gemini 1.5 Pro", "Gemini 3.1 Pro"),
    ("Gemini 1.5 Pro (多模态)", "Gemini 3.1 Pro (深度逻辑)"),
    ("Qwen 3.5", "Qwen 3.5 (原生多模态版)"),
    ("GPT-5.2", "GPT-5.2"),
    // Model identifiers
    ("'gpt-4o'", "'gpt-5.2'"),
    ("\"gpt-4o\"", "\"gpt-5.2\""),
    ("'claude-3-opus'", "'claude-4.6-opus'"),
    ("\"claude-3-opus\"", "\"claude-4.6-opus\""),
    ("'claude-3-sonnet'", "'claude-4.6-sonnet'"),
    ("\"claude-3-sonnet\"", "\"claude-4.6-sonnet\""),
    ("'gemini-1.5-pro'", "'gemini-3.1-pro'"),
    ("\"gemini-1.5-pro\"", "\"gemini-3.1-pro\""),
    ("'gemini-1.5-flash'", "'gemini-3.1-flash'"),
    ("\"gemini-1.5-flash\"", "\"gemini-3.1-flash\""),
    ("'qwen-turbo'", "'qwen3.5-turbo'"),
    ("\"qwen-turbo\"", "\"qwen3.5-turbo\""),
    ("'qwen-plus'", "'qwen3.5-plus'"),
    ("\"qwen-plus\"", "\"qwen3.5-plus\""),
    ("'qwen-max'", "'qwen3.5-max'"),
    ("\"qwen-max\"", "\"qwen3.5-max\""),
];

impl ReplacementTable {
    /// Create a table from explicit entries, validating them.
    pub fn new(entries: Vec<Replacement>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::config_invalid_value(
                "table",
                None,
                "Replacement table is empty",
            ));
        }

        for (i, entry) in entries.iter().enumerate() {
            if entry.from.is_empty() {
                return Err(Error::config_invalid_value(
                    "table",
                    Some(entry.to.clone()),
                    format!("Entry {} has an empty 'from' string", i),
                ));
            }
        }

        Ok(Self { entries })
    }

    /// The fixed table the tool ships with.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_PAIRS
                .iter()
                .map(|(from, to)| Replacement {
                    from: (*from).to_string(),
                    to: (*to).to_string(),
                })
                .collect(),
        }
    }

    /// Parse a table from a JSON array of `{"from": …, "to": …}` objects.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let entries: Vec<Replacement> = serde_json::from_str(raw)
            .map_err(|e| Error::validation_invalid_json(e, Some("parse replacement table".to_string())))?;
        Self::new(entries)
    }

    /// Load a table from a JSON file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = io::read_file(path, &format!("read table {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    pub fn entries(&self) -> &[Replacement] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
