use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::DynamicImage;
use image::codecs::png::PngEncoder;

use crate::config::ContourFormat;
use crate::{OutlineError, OutlineResult};

/// Final output of the outline pipeline.
///
/// The caller owns the artifact and decides where it ends up; the only thing
/// it knows how to do is serialize itself.
#[derive(Debug, Clone)]
pub enum OutlineArtifact {
    /// Stroked contours flattened into a bitmap, written as PNG.
    Raster(DynamicImage),
    /// SVG document bytes, written verbatim.
    Vector(Vec<u8>),
}

impl OutlineArtifact {
    /// Serialize the artifact into `sink`.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> OutlineResult<()> {
        match self {
            OutlineArtifact::Raster(image) => {
                image.write_with_encoder(PngEncoder::new(&mut *sink))?;
            }
            OutlineArtifact::Vector(svg) => sink.write_all(svg)?,
        }
        sink.flush()?;
        Ok(())
    }

    /// Write the artifact to a file, replacing any existing content.
    pub fn save(&self, path: impl AsRef<Path>) -> OutlineResult<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| OutlineError::file(path, e))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
    }

    /// The format this artifact was rendered in.
    pub fn format(&self) -> ContourFormat {
        match self {
            OutlineArtifact::Raster(_) => ContourFormat::Raster,
            OutlineArtifact::Vector(_) => ContourFormat::Vector,
        }
    }

    /// File extension matching the serialized form.
    pub fn extension(&self) -> &'static str {
        self.format().extension()
    }

    /// Serialize into a new buffer.
    pub fn to_bytes(&self) -> OutlineResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }
}
