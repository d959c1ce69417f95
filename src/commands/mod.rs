pub type CmdResult<T> = modelbump::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

pub mod rewrite;
pub mod table;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (modelbump::Result<serde_json::Value>, i32) {
    crate::tty::status("modelbump is working...");

    match command {
        crate::Commands::Rewrite(args) => dispatch!(args, global, rewrite),
        crate::Commands::Table(args) => dispatch!(args, global, table),

        // Special case: List uses raw output mode
        crate::Commands::List => {
            let err = modelbump::Error::validation_invalid_argument(
                "output_mode",
                "List command uses raw output mode",
            );
            crate::output::map_cmd_result_to_json::<serde_json::Value>(Err(err))
        }
    }
}
