//! Rewrite engine — walk a directory tree and apply the replacement table
//! to every file with a recognized extension.
//!
//! 1. Walks the tree, filtering by the extension allow-list
//! 2. Rewrites each file's content in memory, in table order
//! 3. Collects pending edits for files whose content actually changed
//! 4. Applies edits to disk (or returns a dry-run preview)

use crate::config::CONFIG_FILE;
use crate::error::{Error, Result};
use crate::table::ReplacementTable;
use crate::utils::io;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Extensions the tool inspects by default — the markup/styling/config/data
/// file types of a front-end source tree.
pub const DEFAULT_EXTENSIONS: &[&str] = &["ts", "tsx", "less", "css", "json", "html"];

/// Dependency/VCS directories skipped at any depth.
const ALWAYS_SKIP_DIRS: &[&str] = &["node_modules", "vendor", ".git", ".svn", ".hg"];

/// Traversal and filtering options for a rewrite run.
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    /// File extensions eligible for rewriting (no leading dot).
    pub extensions: Vec<String>,
    /// Extra directory names to skip, on top of the built-in VCS/dependency list.
    pub skip_dirs: Vec<String>,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            skip_dirs: Vec::new(),
        }
    }
}

/// A pending edit to a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileEdit {
    /// File path relative to root.
    pub file: String,
    /// Number of effective replacements in this file.
    pub replacements: usize,
    /// New content after all replacements.
    #[serde(skip)]
    pub new_content: String,
}

/// The full result of a rewrite run.
#[derive(Debug, Clone, Serialize)]
pub struct RewriteResult {
    /// Edits for files whose content changed.
    pub edits: Vec<FileEdit>,
    /// Number of files inspected (recognized extensions only).
    pub files_scanned: usize,
    /// Sum of effective replacements across all edits.
    pub total_replacements: usize,
    /// Whether changes were written to disk.
    pub applied: bool,
}

// ============================================================================
// Content rewriting
// ============================================================================

/// Apply every table entry in order over an accumulating buffer.
///
/// Returns the rewritten content and the number of effective replacements.
/// Self-mapping entries (`from == to`) cannot change content and are never
/// counted. All occurrences of a key are replaced in one pass before the
/// next entry is considered, so a later key may match text introduced by an
/// earlier value.
pub fn rewrite_content(content: &str, table: &ReplacementTable) -> (String, usize) {
    let mut out = content.to_string();
    let mut count = 0;

    for entry in table.entries() {
        if entry.from == entry.to {
            continue;
        }
        if out.contains(&entry.from) {
            count += out.matches(&entry.from).count();
            out = out.replace(&entry.from, &entry.to);
        }
    }

    (out, count)
}

/// Rewrite a single file in memory, returning a pending edit if the content
/// changed. Nothing is written to disk here.
///
/// The file must be valid UTF-8; decode failures and filesystem errors
/// propagate (no skip-and-continue).
fn scan_file(path: &Path, relative: &str, table: &ReplacementTable) -> Result<Option<FileEdit>> {
    let content = io::read_file(path, &format!("read {}", path.display()))?;
    let (new_content, replacements) = rewrite_content(&content, table);

    if new_content == content {
        return Ok(None);
    }

    Ok(Some(FileEdit {
        file: relative.to_string(),
        replacements,
        new_content,
    }))
}

/// Rewrite a single file in place. Reads, rewrites, compares, and writes
/// back only when the content changed. Returns the edit that was applied,
/// or `None` when the file was already up to date.
pub fn rewrite_file(path: &Path, table: &ReplacementTable) -> Result<Option<FileEdit>> {
    let relative = path.to_string_lossy().to_string();
    let Some(edit) = scan_file(path, &relative, table)? else {
        return Ok(None);
    };

    io::write_file(path, &edit.new_content, &format!("write {}", path.display()))?;
    Ok(Some(edit))
}

// ============================================================================
// Tree traversal
// ============================================================================

fn should_skip_dir(name: &str, opts: &RewriteOptions) -> bool {
    ALWAYS_SKIP_DIRS.contains(&name) || opts.skip_dirs.iter().any(|d| d == name)
}

fn walk_recursive(dir: &Path, opts: &RewriteOptions, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("read dir {}", dir.display()))))?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("read dir {}", dir.display())))
        })?;
        let path = entry.path();

        if path.is_dir() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if should_skip_dir(&name, opts) {
                continue;
            }
            walk_recursive(&path, opts, files)?;
        } else if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            // The tool's own config file is never a rewrite target, even
            // though its extension is on the allow-list
            if path.file_name().and_then(|n| n.to_str()) == Some(CONFIG_FILE) {
                continue;
            }
            if opts.extensions.iter().any(|e| e == ext) {
                files.push(path);
            }
        }
    }

    Ok(())
}

fn walk_tree(root: &Path, opts: &RewriteOptions) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::path_not_found(root.to_string_lossy()));
    }

    let mut files = Vec::new();
    walk_recursive(root, opts, &mut files)?;
    Ok(files)
}

// ============================================================================
// Scan and apply
// ============================================================================

/// Walk the tree under `root` and produce pending edits for every recognized
/// file whose content the table changes. Nothing is written to disk.
pub fn scan_tree(
    root: &Path,
    table: &ReplacementTable,
    opts: &RewriteOptions,
) -> Result<RewriteResult> {
    let files = walk_tree(root, opts)?;
    let mut edits = Vec::new();

    for path in &files {
        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        if let Some(edit) = scan_file(path, &relative, table)? {
            edits.push(edit);
        }
    }

    let total_replacements = edits.iter().map(|e| e.replacements).sum();

    Ok(RewriteResult {
        files_scanned: files.len(),
        total_replacements,
        edits,
        applied: false,
    })
}

/// Write pending edits to disk and mark the result applied.
///
/// Each file's full new content was generated before any write, so a failed
/// write leaves that file untouched. A failure aborts the remaining edits;
/// earlier files stay rewritten (partial completion is accepted for a
/// one-shot maintenance run).
pub fn apply_edits(result: &mut RewriteResult, root: &Path) -> Result<()> {
    for edit in &result.edits {
        let path = root.join(&edit.file);
        io::write_file(&path, &edit.new_content, &format!("write {}", path.display()))?;
        crate::log_status!("rewrite", "Updated {}", edit.file);
    }

    result.applied = true;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Replacement;
    use std::fs;
    use tempfile::tempdir;

    fn table(pairs: &[(&str, &str)]) -> ReplacementTable {
        ReplacementTable::new(
            pairs
                .iter()
                .map(|(from, to)| Replacement {
                    from: from.to_string(),
                    to: to.to_string(),
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn rewrite_content_replaces_all_occurrences() {
        let t = table(&[("old", "new")]);
        let (out, count) = rewrite_content("old old old", &t);
        assert_eq!(out, "new new new");
        assert_eq!(count, 3);
    }

    #[test]
    fn rewrite_content_applies_entries_in_table_order() {
        // The second key matches text introduced by the first value —
        // sequential application over the accumulating buffer cascades.
        let t = table(&[("a", "b"), ("b", "c")]);
        let (out, count) = rewrite_content("a", &t);
        assert_eq!(out, "c");
        assert_eq!(count, 2);
    }

    #[test]
    fn self_mapping_entries_are_inert() {
        let t = table(&[("same", "same")]);
        let (out, count) = rewrite_content("same same", &t);
        assert_eq!(out, "same same");
        assert_eq!(count, 0);
    }

    #[test]
    fn builtin_table_bumps_single_quoted_gpt_id() {
        let t = ReplacementTable::builtin();
        let (out, _) = rewrite_content("model: 'gpt-4o'", &t);
        assert_eq!(out, "model: 'gpt-5.2'");
    }

    #[test]
    fn builtin_table_bumps_double_quoted_claude_id() {
        let t = ReplacementTable::builtin();
        let (out, _) = rewrite_content("\"claude-3-sonnet\"", &t);
        assert_eq!(out, "\"claude-4.6-sonnet\"");
    }

    #[test]
    fn builtin_table_leaves_unquoted_ids_alone() {
        // Identifier entries include the quotes; bare text is not an ID match.
        let t = ReplacementTable::builtin();
        let (out, _) = rewrite_content("gemini-1.5-pro", &t);
        assert_eq!(out, "gemini-1.5-pro");
    }

    #[test]
    fn scan_tree_collects_edits_without_writing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("config.ts"), "model: 'gpt-4o'\n").unwrap();

        let t = ReplacementTable::builtin();
        let result = scan_tree(dir.path(), &t, &RewriteOptions::default()).unwrap();

        assert_eq!(result.edits.len(), 1);
        assert_eq!(result.edits[0].file, "config.ts");
        assert_eq!(result.edits[0].new_content, "model: 'gpt-5.2'\n");
        assert!(!result.applied);

        // Dry run — disk is untouched
        let on_disk = fs::read_to_string(dir.path().join("config.ts")).unwrap();
        assert_eq!(on_disk, "model: 'gpt-4o'\n");
    }

    #[test]
    fn unrecognized_extensions_are_never_inspected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.py"), "'gpt-4o'\n").unwrap();

        let t = ReplacementTable::builtin();
        let result = scan_tree(dir.path(), &t, &RewriteOptions::default()).unwrap();

        assert_eq!(result.files_scanned, 0);
        assert!(result.edits.is_empty());

        let on_disk = fs::read_to_string(dir.path().join("notes.py")).unwrap();
        assert_eq!(on_disk, "'gpt-4o'\n");
    }

    #[test]
    fn files_without_matches_are_not_reported() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("clean.css"), ".btn { color: red; }\n").unwrap();
        fs::write(dir.path().join("empty.json"), "").unwrap();

        let t = ReplacementTable::builtin();
        let result = scan_tree(dir.path(), &t, &RewriteOptions::default()).unwrap();

        assert_eq!(result.files_scanned, 2);
        assert!(result.edits.is_empty());
        assert_eq!(result.total_replacements, 0);
    }

    #[test]
    fn node_modules_is_skipped() {
        let dir = tempdir().unwrap();
        let nm = dir.path().join("node_modules").join("pkg");
        fs::create_dir_all(&nm).unwrap();
        fs::write(nm.join("index.ts"), "'gpt-4o'\n").unwrap();

        let t = ReplacementTable::builtin();
        let result = scan_tree(dir.path(), &t, &RewriteOptions::default()).unwrap();

        assert_eq!(result.files_scanned, 0);
        assert!(result.edits.is_empty());
    }

    #[test]
    fn extra_skip_dirs_are_honored() {
        let dir = tempdir().unwrap();
        let gen = dir.path().join("generated");
        fs::create_dir_all(&gen).unwrap();
        fs::write(gen.join("models.json"), "\"gpt-4o\"\n").unwrap();

        let t = ReplacementTable::builtin();
        let opts = RewriteOptions {
            skip_dirs: vec!["generated".to_string()],
            ..RewriteOptions::default()
        };
        let result = scan_tree(dir.path(), &t, &opts).unwrap();

        assert!(result.edits.is_empty());
    }

    #[test]
    fn own_config_file_is_never_rewritten() {
        let dir = tempdir().unwrap();
        // The config file mentions a replacement key; it must not be
        // inspected even though .json is on the allow-list
        fs::write(
            dir.path().join(CONFIG_FILE),
            "{\"table\": [{\"from\": \"'gpt-4o'\", \"to\": \"'gpt-5.2'\"}]}",
        )
        .unwrap();
        fs::write(dir.path().join("app.ts"), "'gpt-4o'\n").unwrap();

        let t = ReplacementTable::builtin();
        let result = scan_tree(dir.path(), &t, &RewriteOptions::default()).unwrap();

        assert_eq!(result.files_scanned, 1);
        assert_eq!(result.edits.len(), 1);
        assert_eq!(result.edits[0].file, "app.ts");
    }

    #[test]
    fn nested_files_report_relative_paths() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("components").join("chat");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("picker.tsx"), "label: \"Claude 3 Sonnet\"\n").unwrap();

        let t = ReplacementTable::builtin();
        let result = scan_tree(dir.path(), &t, &RewriteOptions::default()).unwrap();

        assert_eq!(result.edits.len(), 1);
        let expected: PathBuf = ["components", "chat", "picker.tsx"].iter().collect();
        assert_eq!(result.edits[0].file, expected.to_string_lossy());
    }

    #[test]
    fn apply_edits_writes_to_disk() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("app.html"), "<span>GPT-4o</span>\n").unwrap();

        let t = ReplacementTable::builtin();
        let mut result = scan_tree(dir.path(), &t, &RewriteOptions::default()).unwrap();
        apply_edits(&mut result, dir.path()).unwrap();

        assert!(result.applied);
        let on_disk = fs::read_to_string(dir.path().join("app.html")).unwrap();
        assert_eq!(on_disk, "<span>GPT-5.2</span>\n");
    }

    #[test]
    fn second_run_is_a_no_op() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("models.less"),
            "@name: 'gpt-4o'; // GPT-4o\n",
        )
        .unwrap();

        let t = ReplacementTable::builtin();
        let mut first = scan_tree(dir.path(), &t, &RewriteOptions::default()).unwrap();
        apply_edits(&mut first, dir.path()).unwrap();
        assert_eq!(first.edits.len(), 1);

        let second = scan_tree(dir.path(), &t, &RewriteOptions::default()).unwrap();
        assert!(second.edits.is_empty());
        assert_eq!(second.total_replacements, 0);
    }

    #[test]
    fn rewrite_file_updates_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("single.json");
        fs::write(&path, "{\"model\": \"qwen-max\"}\n").unwrap();

        let t = ReplacementTable::builtin();
        let edit = rewrite_file(&path, &t).unwrap();
        assert!(edit.is_some());

        let on_disk = fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, "{\"model\": \"qwen3.5-max\"}\n");

        // Already up to date — no further edit
        assert!(rewrite_file(&path, &t).unwrap().is_none());
    }

    #[test]
    fn missing_root_is_an_error() {
        let t = ReplacementTable::builtin();
        let err = scan_tree(
            Path::new("/nonexistent/tree"),
            &t,
            &RewriteOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.code.as_str(), "path.not_found");
    }

    #[test]
    fn non_utf8_file_aborts_the_run() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let t = ReplacementTable::builtin();
        let err = scan_tree(dir.path(), &t, &RewriteOptions::default()).unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
    }
}
