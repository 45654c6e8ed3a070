use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use coloringbook::{DEFAULT_BATIK_PATH, ENV_BATIK_PATH, ENV_VTRACER_PATH, RasterizeEngine, TraceEngine};

/// Command line interface definition.
#[derive(Parser, Debug)]
#[command(author, version, about, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalOptions {
    /// Increase log verbosity (-v for debug, -vv for trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Directory for intermediate files (defaults to the system temp directory)
    #[arg(long = "temp-dir", global = true)]
    pub temp_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trace, rasterize and contour an image into a coloring book outline
    Outline(OutlineCommand),
    /// Contour an image directly, skipping the trace and rasterize stages
    Contour(ContourCommand),
    /// Vectorize an image into a flat-color SVG
    Trace(TraceCommand),
}

#[derive(Args, Debug)]
pub struct OutlineCommand {
    /// Input image path
    pub input: PathBuf,
    /// Output path (defaults to `<name>-outline.png` or `<name>-outline.svg`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub contour: ContourArgs,
    #[command(flatten)]
    pub trace: TraceArgs,
    #[command(flatten)]
    pub rasterize: RasterizeArgs,
}

#[derive(Args, Debug)]
pub struct ContourCommand {
    /// Input image path
    pub input: PathBuf,
    /// Output path (defaults to `<name>-contour.png` or `<name>-contour.svg`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub contour: ContourArgs,
}

#[derive(Args, Debug)]
pub struct TraceCommand {
    /// Input image path
    pub input: PathBuf,
    /// Output SVG path (defaults to input name with `.svg`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub trace: TraceArgs,
}

#[derive(Args, Debug)]
pub struct ContourArgs {
    /// Number of luminance levels to contour
    #[arg(long = "contour-iterations", alias = "contour-iteration", default_value_t = 8)]
    pub iterations: usize,
    /// Scale factor applied to the output size
    #[arg(long = "contour-scale", default_value_t = 1.0)]
    pub scale: f64,
    /// Output format: png (raster) or svg (vector)
    #[arg(long = "contour-format", default_value = "png")]
    pub format: String,
}

/// Vectorizer implementations.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TraceEngineArg {
    /// External vtracer executable
    Command,
    /// Built-in vtracer (requires the `vectorizer-vtracer` feature)
    Embedded,
}

impl From<TraceEngineArg> for TraceEngine {
    fn from(value: TraceEngineArg) -> Self {
        match value {
            TraceEngineArg::Command => TraceEngine::Command,
            TraceEngineArg::Embedded => TraceEngine::Embedded,
        }
    }
}

#[derive(Args, Debug)]
pub struct TraceArgs {
    /// Which vectorizer to run
    #[arg(long = "trace-engine", value_enum, default_value_t = TraceEngineArg::Command)]
    pub engine: TraceEngineArg,
    /// vtracer executable
    #[arg(long = "vtracer-path", env = ENV_VTRACER_PATH, default_value = "vtracer")]
    pub program: PathBuf,
    /// Color precision (significant bits per RGB channel, 1-8)
    #[arg(long = "vtracer-precision", default_value_t = 6)]
    pub precision: i32,
    /// Speckle filter size; smaller regions are discarded
    #[arg(long = "vtracer-speckle", default_value_t = 8)]
    pub speckle: usize,
}

/// Rasterizer implementations.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RasterizerArg {
    /// Built-in resvg renderer
    Native,
    /// Batik rasterizer jar
    Batik,
}

impl From<RasterizerArg> for RasterizeEngine {
    fn from(value: RasterizerArg) -> Self {
        match value {
            RasterizerArg::Native => RasterizeEngine::Native,
            RasterizerArg::Batik => RasterizeEngine::External,
        }
    }
}

#[derive(Args, Debug)]
pub struct RasterizeArgs {
    /// Which rasterizer turns the traced SVG back into pixels
    #[arg(long = "rasterizer", value_enum, default_value_t = RasterizerArg::Native)]
    pub engine: RasterizerArg,
    /// Batik rasterizer jar
    #[arg(long = "batik-path", env = ENV_BATIK_PATH, default_value = DEFAULT_BATIK_PATH)]
    pub batik_path: PathBuf,
    /// Java launcher used to run Batik
    #[arg(long = "java", default_value = "java")]
    pub java: PathBuf,
}
