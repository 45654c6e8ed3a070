use std::path::Path;

use crate::config::{TraceEngine, TraceOptions};
use crate::OutlineResult;
use crate::process::CancelToken;

mod command;
pub use command::VtracerCommand;

/// A trait representing an algorithm that turns a raster file into a flat-color SVG file.
///
/// Implementations read `input` (a PNG) and must leave a complete SVG at `output`.
pub trait Vectorizer {
    fn vectorize(
        &self,
        input: &Path,
        output: &Path,
        options: &TraceOptions,
        cancel: &CancelToken,
    ) -> OutlineResult<()>;
}

/// Pick the vectorizer configured by `options`.
pub fn vectorizer_for(options: &TraceOptions) -> Box<dyn Vectorizer + Send + Sync> {
    match options.engine {
        TraceEngine::Command => Box::new(VtracerCommand::new(options.program.clone())),
        #[cfg(feature = "vectorizer-vtracer")]
        TraceEngine::Embedded => Box::new(self::vtracer::VtracerSvgVectorizer),
        // Rejected by `TraceOptions::validate` when the feature is off.
        #[cfg(not(feature = "vectorizer-vtracer"))]
        TraceEngine::Embedded => Box::new(VtracerCommand::new(options.program.clone())),
    }
}

#[cfg(feature = "vectorizer-vtracer")]
pub mod vtracer;
