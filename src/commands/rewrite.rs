use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use modelbump::log_status;
use modelbump::rewrite::{self, RewriteOptions};
use modelbump::table::ReplacementTable;
use modelbump::{config, Result};

use crate::commands::CmdResult;

#[derive(Args)]
pub struct RewriteArgs {
    #[command(subcommand)]
    command: RewriteCommand,
}

#[derive(Subcommand)]
enum RewriteCommand {
    /// Rewrite model names and identifiers under a directory tree
    Run {
        /// Root directory to rewrite
        path: String,
        /// Extension allow-list override (comma separated, e.g. ts,tsx,css)
        #[arg(long, value_delimiter = ',')]
        ext: Vec<String>,
        /// JSON file with a custom replacement table
        #[arg(long)]
        table: Option<String>,
        /// Apply changes to disk (default is dry-run)
        #[arg(long)]
        write: bool,
    },
}

pub fn run(args: RewriteArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<RewriteOutput> {
    match args.command {
        RewriteCommand::Run {
            path,
            ext,
            table,
            write,
        } => run_rewrite(&path, &ext, table.as_deref(), write),
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "command")]
pub enum RewriteOutput {
    #[serde(rename = "rewrite.run")]
    Run {
        root: String,
        dry_run: bool,
        extensions: Vec<String>,
        table_entries: usize,
        files_scanned: usize,
        total_replacements: usize,
        updated: Vec<EditSummary>,
        applied: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct EditSummary {
    pub file: String,
    pub replacements: usize,
}

/// Resolve the active replacement table: --table file > config table > builtin.
pub(crate) fn resolve_table(
    table_path: Option<&str>,
    config: &config::ModelbumpConfig,
) -> Result<ReplacementTable> {
    if let Some(path) = table_path {
        return ReplacementTable::load(Path::new(path));
    }
    if let Some(entries) = &config.table {
        return ReplacementTable::new(entries.clone());
    }
    Ok(ReplacementTable::builtin())
}

fn run_rewrite(
    path: &str,
    ext: &[String],
    table_path: Option<&str>,
    write: bool,
) -> CmdResult<RewriteOutput> {
    let root = PathBuf::from(path);
    let config = config::load(&root)?;
    let table = resolve_table(table_path, &config)?;

    let extensions = if ext.is_empty() {
        config.extensions.clone()
    } else {
        ext.to_vec()
    };

    let opts = RewriteOptions {
        extensions: extensions.clone(),
        skip_dirs: config.skip_dirs.clone(),
    };

    let mut result = rewrite::scan_tree(&root, &table, &opts)?;

    if write {
        rewrite::apply_edits(&mut result, &root)?;
        log_status!(
            "rewrite",
            "Done — {} file(s) updated under {}",
            result.edits.len(),
            root.display()
        );
    } else {
        log_status!(
            "rewrite",
            "Dry run — {} file(s) would change under {}",
            result.edits.len(),
            root.display()
        );
    }

    Ok((
        RewriteOutput::Run {
            root: root.display().to_string(),
            dry_run: !write,
            extensions,
            table_entries: table.len(),
            files_scanned: result.files_scanned,
            total_replacements: result.total_replacements,
            updated: result
                .edits
                .iter()
                .map(|e| EditSummary {
                    file: e.file.clone(),
                    replacements: e.replacements,
                })
                .collect(),
            applied: result.applied,
        },
        0,
    ))
}
