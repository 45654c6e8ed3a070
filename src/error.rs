use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Result type alias for operations that may fail with [`OutlineError`].
pub type OutlineResult<T> = std::result::Result<T, OutlineError>;

/// A step of the outline pipeline, used to give errors context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Writing the source image to a temporary PNG.
    Encode,
    /// Vectorizing the temporary PNG into an SVG.
    Trace,
    /// Turning the traced SVG back into a bitmap.
    Rasterize,
    /// Extracting and stroking iso-luminance contours.
    Contour,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Encode => "encode",
            Stage::Trace => "trace",
            Stage::Rasterize => "rasterize",
            Stage::Contour => "contour",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types that can occur while generating an outline.
///
/// This enum covers configuration problems, image and SVG decoding, file
/// system I/O and failures of the external trace and rasterize tools.
#[derive(Debug, Error)]
pub enum OutlineError {
    /// Invalid or missing configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// Image loading, decoding, or encoding error.
    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),
    /// File system I/O error tied to a specific path.
    #[error("I/O error on {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// File system or sink I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// An external tool could not be started.
    #[error("Failed to launch `{program}`: {source}")]
    ToolSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// An external tool exited unsuccessfully.
    #[error("`{program}` exited with {status}{}", format_stderr(stderr))]
    ToolFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    /// An external tool succeeded but did not produce the expected file.
    #[error("Expected output file was not produced: {}", path.display())]
    MissingOutput { path: PathBuf },
    /// An intermediate artifact could not be parsed.
    #[error("Failed to decode {artifact}: {message}")]
    Decode { artifact: String, message: String },
    /// Vectorization failed inside the embedded tracer.
    #[error("Tracing failed: {0}")]
    Trace(String),
    /// The operation was cancelled before it completed.
    #[error("Operation cancelled")]
    Cancelled,
    /// A pipeline stage failed.
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<OutlineError>,
    },
}

impl OutlineError {
    /// Wrap the error with the pipeline stage it occurred in.
    pub fn within(self, stage: Stage) -> Self {
        OutlineError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The pipeline stage that failed, if the error carries one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            OutlineError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The innermost error, with stage context stripped.
    pub fn root(&self) -> &OutlineError {
        match self {
            OutlineError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OutlineError::File {
            path: path.into(),
            source,
        }
    }
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}
