use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::{OutlineError, OutlineResult};

/// Default location of the Batik rasterizer jar.
pub const DEFAULT_BATIK_PATH: &str = "/usr/local/src/batik-1.17/batik-rasterizer-1.17.jar";

/// Output representation produced by the contour stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContourFormat {
    /// Stroked contours flattened into a PNG bitmap.
    #[default]
    Raster,
    /// One SVG path per contour polyline.
    Vector,
}

impl ContourFormat {
    /// File extension used when the artifact is written to disk.
    pub fn extension(&self) -> &'static str {
        match self {
            ContourFormat::Raster => "png",
            ContourFormat::Vector => "svg",
        }
    }
}

impl FromStr for ContourFormat {
    type Err = OutlineError;

    /// Accepts `png`/`raster` and `svg`/`vector`, case-insensitively.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" | "raster" => Ok(ContourFormat::Raster),
            "svg" | "vector" => Ok(ContourFormat::Vector),
            _ => Err(OutlineError::Config(format!(
                "invalid contour format `{value}`; expected png, raster, svg or vector"
            ))),
        }
    }
}

impl fmt::Display for ContourFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContourFormat::Raster => f.write_str("raster"),
            ContourFormat::Vector => f.write_str("vector"),
        }
    }
}

/// Options for the contour stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourOptions {
    /// Number of luminance levels sampled between the darkest and brightest pixel.
    pub iterations: usize,
    /// Uniform scale applied to the output dimensions and geometry.
    pub scale: f64,
    pub format: ContourFormat,
}

impl Default for ContourOptions {
    fn default() -> Self {
        Self {
            iterations: 8,
            scale: 1.0,
            format: ContourFormat::Raster,
        }
    }
}

impl ContourOptions {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_format(mut self, format: ContourFormat) -> Self {
        self.format = format;
        self
    }

    /// Check the options without touching any image data.
    pub fn validate(&self) -> OutlineResult<()> {
        if self.iterations == 0 {
            return Err(OutlineError::Config(
                "contour iterations must be at least 1".into(),
            ));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(OutlineError::Config(format!(
                "contour scale must be a positive number, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// Which implementation vectorizes the source photograph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceEngine {
    /// Run the `vtracer` command-line tool.
    #[default]
    Command,
    /// Run vtracer in-process (requires the `vectorizer-vtracer` feature).
    Embedded,
}

/// Options for the trace stage.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceOptions {
    pub engine: TraceEngine,
    /// Program invoked by [`TraceEngine::Command`].
    pub program: PathBuf,
    /// Significant bits kept per RGB channel (1-8). Higher keeps more flat-color regions.
    pub color_precision: i32,
    /// Minimum contiguous region size kept; smaller patches are discarded as noise.
    pub filter_speckle: usize,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            engine: TraceEngine::Command,
            program: PathBuf::from("vtracer"),
            color_precision: 6,
            filter_speckle: 8,
        }
    }
}

impl TraceOptions {
    pub fn with_engine(mut self, engine: TraceEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_color_precision(mut self, color_precision: i32) -> Self {
        self.color_precision = color_precision;
        self
    }

    pub fn with_filter_speckle(mut self, filter_speckle: usize) -> Self {
        self.filter_speckle = filter_speckle;
        self
    }

    pub fn validate(&self) -> OutlineResult<()> {
        if !(1..=8).contains(&self.color_precision) {
            return Err(OutlineError::Config(format!(
                "trace color precision must be within 1-8, got {}",
                self.color_precision
            )));
        }
        match self.engine {
            TraceEngine::Command if self.program.as_os_str().is_empty() => Err(
                OutlineError::Config("trace program path must not be empty".into()),
            ),
            #[cfg(not(feature = "vectorizer-vtracer"))]
            TraceEngine::Embedded => Err(OutlineError::Config(
                "embedded tracing requires the `vectorizer-vtracer` feature".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// Which implementation turns the traced SVG back into pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RasterizeEngine {
    /// In-process rendering with resvg.
    #[default]
    Native,
    /// The Batik rasterizer jar, run through `java -jar`.
    External,
}

/// Options for the rasterize stage.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterizeOptions {
    pub engine: RasterizeEngine,
    /// Java launcher used by [`RasterizeEngine::External`].
    pub java: PathBuf,
    /// Path to the rasterizer jar, required by [`RasterizeEngine::External`].
    pub tool_path: Option<PathBuf>,
}

impl Default for RasterizeOptions {
    fn default() -> Self {
        Self {
            engine: RasterizeEngine::Native,
            java: PathBuf::from("java"),
            tool_path: None,
        }
    }
}

impl RasterizeOptions {
    /// Options for the external rasterizer at the given jar path.
    pub fn external(tool_path: impl Into<PathBuf>) -> Self {
        Self {
            engine: RasterizeEngine::External,
            tool_path: Some(tool_path.into()),
            ..Self::default()
        }
    }

    pub fn with_java(mut self, java: impl Into<PathBuf>) -> Self {
        self.java = java.into();
        self
    }

    pub fn validate(&self) -> OutlineResult<()> {
        if self.engine != RasterizeEngine::External {
            return Ok(());
        }
        match &self.tool_path {
            Some(path) if !path.as_os_str().is_empty() => {}
            _ => {
                return Err(OutlineError::Config(
                    "external rasterizer requires a tool path".into(),
                ));
            }
        }
        if self.java.as_os_str().is_empty() {
            return Err(OutlineError::Config(
                "java launcher path must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Validated configuration for a full outline run.
///
/// Built once at the pipeline boundary; every invalid combination is rejected
/// by [`PipelineOptions::new`] so later stages can trust the values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineOptions {
    contour: ContourOptions,
    trace: TraceOptions,
    rasterize: RasterizeOptions,
    temp_dir: Option<PathBuf>,
}

impl PipelineOptions {
    pub fn new(
        contour: ContourOptions,
        trace: TraceOptions,
        rasterize: RasterizeOptions,
    ) -> OutlineResult<Self> {
        contour.validate()?;
        trace.validate()?;
        rasterize.validate()?;
        Ok(Self {
            contour,
            trace,
            rasterize,
            temp_dir: None,
        })
    }

    /// Place temporary files in `dir` instead of the system temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn contour(&self) -> &ContourOptions {
        &self.contour
    }

    pub fn trace(&self) -> &TraceOptions {
        &self.trace
    }

    pub fn rasterize(&self) -> &RasterizeOptions {
        &self.rasterize
    }

    pub fn temp_dir(&self) -> Option<&Path> {
        self.temp_dir.as_deref()
    }
}
