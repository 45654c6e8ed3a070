use coloringbook::vectorizer::vectorizer_for;
use coloringbook::{CancelToken, OutlineResult};

use crate::cli::TraceCommand;

use super::utils::{build_trace_options, derive_svg_path};

/// The main function to run the trace command.
pub fn run(cmd: TraceCommand) -> OutlineResult<()> {
    let options = build_trace_options(&cmd.trace)?;
    let output_path = cmd
        .output
        .clone()
        .unwrap_or_else(|| derive_svg_path(&cmd.input));

    vectorizer_for(&options).vectorize(&cmd.input, &output_path, &options, &CancelToken::new())?;
    println!("SVG saved to {}", output_path.display());

    Ok(())
}
