use std::path::{Path, PathBuf};

use coloringbook::{
    ContourFormat, ContourOptions, OutlineResult, PipelineOptions, RasterizeOptions, TraceOptions,
};
use image::DynamicImage;

use crate::cli::{ContourArgs, GlobalOptions, RasterizeArgs, TraceArgs};

/// Parse and validate the contour flags.
pub fn build_contour_options(args: &ContourArgs) -> OutlineResult<ContourOptions> {
    let format: ContourFormat = args.format.parse()?;
    let options = ContourOptions::default()
        .with_iterations(args.iterations)
        .with_scale(args.scale)
        .with_format(format);
    options.validate()?;
    Ok(options)
}

/// Parse and validate the trace flags.
pub fn build_trace_options(args: &TraceArgs) -> OutlineResult<TraceOptions> {
    let options = TraceOptions::default()
        .with_engine(args.engine.into())
        .with_program(args.program.clone())
        .with_color_precision(args.precision)
        .with_filter_speckle(args.speckle);
    options.validate()?;
    Ok(options)
}

/// Translate the rasterize flags; the jar path only matters for Batik.
pub fn build_rasterize_options(args: &RasterizeArgs) -> RasterizeOptions {
    RasterizeOptions {
        engine: args.engine.into(),
        java: args.java.clone(),
        tool_path: Some(args.batik_path.clone()),
    }
}

/// The convenience function to build validated pipeline options from the CLI flags.
pub fn build_pipeline_options(
    global: &GlobalOptions,
    contour: &ContourArgs,
    trace: &TraceArgs,
    rasterize: &RasterizeArgs,
) -> OutlineResult<PipelineOptions> {
    let options = PipelineOptions::new(
        build_contour_options(contour)?,
        build_trace_options(trace)?,
        build_rasterize_options(rasterize),
    )?;
    Ok(match &global.temp_dir {
        Some(dir) => options.with_temp_dir(dir.clone()),
        None => options,
    })
}

/// Open and decode the input image.
pub fn load_image(path: &Path) -> OutlineResult<DynamicImage> {
    let image = image::open(path)?;
    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "loaded input image"
    );
    Ok(image)
}

/// Derive a variant file path by appending a suffix before the extension.
pub fn derive_variant_path(input: &Path, suffix: &str, extension: &str) -> PathBuf {
    let mut derived = input.to_path_buf();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| suffix.to_string());
    let filename = format!("{}-{}.{}", stem, suffix, extension);
    derived.set_file_name(filename);
    derived
}

/// Derive an SVG file path by changing the extension to "svg".
pub fn derive_svg_path(input: &Path) -> PathBuf {
    let mut path = input.to_path_buf();
    path.set_extension("svg");
    path
}
