pub mod artifact;
pub mod config;
pub mod contour;
pub mod error;
pub mod process;
pub mod rasterizer;
pub mod render;
pub mod temp;
pub mod vectorizer;

pub use artifact::OutlineArtifact;
pub use config::{
    ContourFormat, ContourOptions, DEFAULT_BATIK_PATH, PipelineOptions, RasterizeEngine,
    RasterizeOptions, TraceEngine, TraceOptions,
};
pub use contour::{ContourLevel, Point, Polyline, contour, extract_levels};
pub use error::{OutlineError, OutlineResult, Stage};
pub use process::CancelToken;
pub use rasterizer::{BatikRasterizer, NativeRasterizer, Rasterizer};
pub use vectorizer::{Vectorizer, VtracerCommand};
#[cfg(feature = "vectorizer-vtracer")]
pub use vectorizer::vtracer::{VtracerSvgVectorizer, trace_to_svg_string};

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{DynamicImage, RgbaImage};

use crate::rasterizer::rasterizer_for;
use crate::temp::scratch_file;
use crate::vectorizer::vectorizer_for;

/// Environment variable consulted for the vtracer executable.
pub const ENV_VTRACER_PATH: &str = "COLORINGBOOK_VTRACER";
/// Environment variable consulted for the Batik rasterizer jar.
pub const ENV_BATIK_PATH: &str = "COLORINGBOOK_BATIK";

/// Entry point for turning photographs into coloring book outlines.
///
/// Runs encode, trace, rasterize and contour in sequence. The trace and
/// rasterize adapters are chosen from the options but can be swapped out.
/// A pipeline holds no mutable state and can serve several threads at once.
pub struct OutlinePipeline {
    options: PipelineOptions,
    vectorizer: Box<dyn Vectorizer + Send + Sync>,
    rasterizer: Box<dyn Rasterizer + Send + Sync>,
}

impl OutlinePipeline {
    pub fn new(options: PipelineOptions) -> Self {
        let vectorizer = vectorizer_for(options.trace());
        let rasterizer = rasterizer_for(options.rasterize());
        Self {
            options,
            vectorizer,
            rasterizer,
        }
    }

    /// Replace the vectorizer used for the trace stage.
    pub fn with_vectorizer(
        mut self,
        vectorizer: impl Vectorizer + Send + Sync + 'static,
    ) -> Self {
        self.vectorizer = Box::new(vectorizer);
        self
    }

    /// Replace the rasterizer used for the rasterize stage.
    pub fn with_rasterizer(
        mut self,
        rasterizer: impl Rasterizer + Send + Sync + 'static,
    ) -> Self {
        self.rasterizer = Box::new(rasterizer);
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Generate an outline for a decoded image.
    pub fn generate(&self, image: &DynamicImage) -> OutlineResult<OutlineArtifact> {
        self.generate_with_cancel(image, &CancelToken::new())
    }

    /// Generate an outline, abandoning the run when `cancel` fires.
    ///
    /// Every temporary file is removed before this returns, whatever the outcome.
    pub fn generate_with_cancel(
        &self,
        image: &DynamicImage,
        cancel: &CancelToken,
    ) -> OutlineResult<OutlineArtifact> {
        let _span = tracing::info_span!(
            "generate_outline",
            width = image.width(),
            height = image.height()
        )
        .entered();
        let temp_dir = self.options.temp_dir();

        tracing::info!(stage = %Stage::Encode, "writing trace input");
        let input =
            scratch_file(temp_dir, "vtrace-in.", ".png").map_err(|e| e.within(Stage::Encode))?;
        encode_png(image, &input).map_err(|e| e.within(Stage::Encode))?;

        tracing::info!(stage = %Stage::Trace, "vectorizing");
        let traced =
            scratch_file(temp_dir, "vtrace-out.", ".svg").map_err(|e| e.within(Stage::Trace))?;
        cancel.check().map_err(|e| e.within(Stage::Trace))?;
        self.vectorizer
            .vectorize(&input, &traced, self.options.trace(), cancel)
            .map_err(|e| e.within(Stage::Trace))?;

        tracing::info!(stage = %Stage::Rasterize, "rasterizing traced SVG");
        cancel.check().map_err(|e| e.within(Stage::Rasterize))?;
        let raster: RgbaImage = self
            .rasterizer
            .rasterize(&traced, cancel)
            .map_err(|e| e.within(Stage::Rasterize))?;

        tracing::info!(stage = %Stage::Contour, "extracting contours");
        cancel.check().map_err(|e| e.within(Stage::Contour))?;
        let artifact = contour(&DynamicImage::ImageRgba8(raster), self.options.contour())
            .map_err(|e| e.within(Stage::Contour))?;

        tracing::info!(format = %artifact.format(), "outline generated");
        Ok(artifact)
    }
}

/// Generate an outline with the adapters selected by `options`.
pub fn generate_outline(
    image: &DynamicImage,
    options: &PipelineOptions,
) -> OutlineResult<OutlineArtifact> {
    OutlinePipeline::new(options.clone()).generate(image)
}

/// Write `image` as PNG, converting float buffers the encoder cannot take.
fn encode_png(image: &DynamicImage, path: &Path) -> OutlineResult<()> {
    let file = File::create(path).map_err(|e| OutlineError::file(path, e))?;
    let mut writer = BufWriter::new(file);
    let encoder = PngEncoder::new(&mut writer);
    match image {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            DynamicImage::ImageRgba16(image.to_rgba16()).write_with_encoder(encoder)?
        }
        _ => image.write_with_encoder(encoder)?,
    }
    writer.flush().map_err(|e| OutlineError::file(path, e))
}
