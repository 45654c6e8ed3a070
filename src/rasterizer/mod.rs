use std::path::Path;

use image::RgbaImage;

use crate::OutlineResult;
use crate::config::{RasterizeEngine, RasterizeOptions};
use crate::process::CancelToken;

mod batik;
mod native;

pub use batik::BatikRasterizer;
pub use native::{NativeRasterizer, rasterize_svg};

/// A trait representing a renderer that turns an SVG file back into pixels.
pub trait Rasterizer {
    fn rasterize(&self, svg: &Path, cancel: &CancelToken) -> OutlineResult<RgbaImage>;
}

/// Pick the rasterizer configured by `options`.
pub fn rasterizer_for(options: &RasterizeOptions) -> Box<dyn Rasterizer + Send + Sync> {
    match (options.engine, &options.tool_path) {
        (RasterizeEngine::External, Some(jar)) => {
            Box::new(BatikRasterizer::new(jar.clone()).with_java(options.java.clone()))
        }
        // An external engine without a jar is rejected by `RasterizeOptions::validate`.
        _ => Box::new(NativeRasterizer),
    }
}
