use std::fs;
use std::path::Path;

use image::RgbaImage;
use vtracer::{ColorImage, ColorMode, Config, SvgFile, convert};

use crate::config::TraceOptions;
use crate::process::CancelToken;
use crate::{OutlineError, OutlineResult};

use super::Vectorizer;

/// VTracer-based SVG vectorizer running in-process.
#[derive(Debug, Clone, Copy, Default)]
pub struct VtracerSvgVectorizer;

impl Vectorizer for VtracerSvgVectorizer {
    fn vectorize(
        &self,
        input: &Path,
        output: &Path,
        options: &TraceOptions,
        cancel: &CancelToken,
    ) -> OutlineResult<()> {
        cancel.check()?;
        let rgba = image::open(input)?.to_rgba8();
        let svg = trace_to_svg_string(&rgba, options)?;
        cancel.check()?;
        fs::write(output, svg).map_err(|e| OutlineError::file(output, e))
    }
}

/// The helper function that uses VTracer to trace an RGBA image to an SVG string.
pub fn trace_to_svg_string(image: &RgbaImage, options: &TraceOptions) -> OutlineResult<String> {
    let (w, h) = image.dimensions();
    let color_img = ColorImage {
        pixels: image.as_raw().clone(),
        width: w as usize,
        height: h as usize,
    };
    let svg_file = trace(color_img, options)?;
    Ok(svg_file.to_string())
}

/// Trace a ColorImage into an SVG using VTracer with the given options.
pub fn trace(img: ColorImage, options: &TraceOptions) -> OutlineResult<SvgFile> {
    let cfg = Config {
        color_mode: ColorMode::Color,
        color_precision: options.color_precision,
        filter_speckle: options.filter_speckle,
        ..Config::default()
    };

    let svg_file = convert(img, cfg).map_err(OutlineError::Trace)?;
    Ok(svg_file)
}
