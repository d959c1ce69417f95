use clap::{Args, Subcommand};
use serde::Serialize;

use modelbump::config;
use modelbump::table::Replacement;

use crate::commands::CmdResult;

#[derive(Args)]
pub struct TableArgs {
    #[command(subcommand)]
    command: TableCommand,
}

#[derive(Subcommand)]
enum TableCommand {
    /// Show the active replacement table
    Show {
        /// JSON file with a custom replacement table
        #[arg(long)]
        table: Option<String>,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "command")]
pub enum TableOutput {
    #[serde(rename = "table.show")]
    Show {
        source: String,
        entries: Vec<Replacement>,
    },
}

pub fn run(args: TableArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<TableOutput> {
    match args.command {
        TableCommand::Show { table } => run_show(table.as_deref()),
    }
}

fn run_show(table_path: Option<&str>) -> CmdResult<TableOutput> {
    let config = config::ModelbumpConfig::default();
    let table = crate::commands::rewrite::resolve_table(table_path, &config)?;

    let source = match table_path {
        Some(path) => path.to_string(),
        None => "builtin".to_string(),
    };

    Ok((
        TableOutput::Show {
            source,
            entries: table.entries().to_vec(),
        },
        0,
    ))
}
