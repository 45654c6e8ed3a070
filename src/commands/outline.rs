use coloringbook::{OutlinePipeline, OutlineResult};

use crate::cli::{GlobalOptions, OutlineCommand};

use super::utils::{build_pipeline_options, derive_variant_path, load_image};

/// The main function to run the outline command.
pub fn run(global: &GlobalOptions, cmd: OutlineCommand) -> OutlineResult<()> {
    let options = build_pipeline_options(global, &cmd.contour, &cmd.trace, &cmd.rasterize)?;
    let image = load_image(&cmd.input)?;

    let artifact = OutlinePipeline::new(options).generate(&image)?;
    let output_path = cmd
        .output
        .clone()
        .unwrap_or_else(|| derive_variant_path(&cmd.input, "outline", artifact.extension()));

    artifact.save(&output_path)?;
    println!("Outline saved to {}", output_path.display());

    Ok(())
}
