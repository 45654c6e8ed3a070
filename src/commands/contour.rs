use coloringbook::{OutlineResult, contour};

use crate::cli::ContourCommand;

use super::utils::{build_contour_options, derive_variant_path, load_image};

/// The main function to run the contour command.
pub fn run(cmd: ContourCommand) -> OutlineResult<()> {
    let options = build_contour_options(&cmd.contour)?;
    let image = load_image(&cmd.input)?;

    let artifact = contour(&image, &options)?;
    let output_path = cmd
        .output
        .clone()
        .unwrap_or_else(|| derive_variant_path(&cmd.input, "contour", artifact.extension()));

    artifact.save(&output_path)?;
    println!("Contours saved to {}", output_path.display());

    Ok(())
}
