mod contour;
mod outline;
mod trace;
mod utils;

use crate::cli::{Cli, Commands, GlobalOptions};
use coloringbook::OutlineResult;

/// The main function to run the command based on CLI input.
pub fn run(cli: Cli) -> OutlineResult<()> {
    let Cli { global, command } = cli;
    dispatch(&global, command)
}

/// Dispatch the command to the appropriate handler.
fn dispatch(global: &GlobalOptions, command: Commands) -> OutlineResult<()> {
    match command {
        Commands::Outline(cmd) => outline::run(global, cmd),
        Commands::Contour(cmd) => contour::run(cmd),
        Commands::Trace(cmd) => trace::run(cmd),
    }
}
