use std::fs;
use std::path::Path;

use image::RgbaImage;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::process::CancelToken;
use crate::render::pixmap_to_rgba;
use crate::{OutlineError, OutlineResult};

use super::Rasterizer;

/// Renders SVG in-process with resvg onto a transparent canvas.
///
/// The canvas takes the document's intrinsic size.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRasterizer;

impl Rasterizer for NativeRasterizer {
    fn rasterize(&self, svg: &Path, cancel: &CancelToken) -> OutlineResult<RgbaImage> {
        cancel.check()?;
        let data = fs::read(svg).map_err(|e| OutlineError::file(svg, e))?;
        rasterize_svg(&data)
    }
}

/// Parse and render SVG bytes.
pub fn rasterize_svg(data: &[u8]) -> OutlineResult<RgbaImage> {
    let tree = Tree::from_data(data, &Options::default()).map_err(|e| OutlineError::Decode {
        artifact: "traced SVG".into(),
        message: e.to_string(),
    })?;

    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        OutlineError::Decode {
            artifact: "traced SVG".into(),
            message: format!("unusable canvas size {}x{}", size.width(), size.height()),
        }
    })?;

    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());
    Ok(pixmap_to_rgba(&pixmap))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="6" viewBox="0 0 10 6">
<rect x="0" y="0" width="5" height="6" fill="#ff0000"/>
</svg>"##;

    #[test]
    fn renders_at_intrinsic_size() {
        let image = rasterize_svg(SQUARE.as_bytes()).unwrap();
        assert_eq!(image.dimensions(), (10, 6));
        assert_eq!(image.get_pixel(1, 1).0, [255, 0, 0, 255]);
        // Uncovered area stays transparent.
        assert_eq!(image.get_pixel(8, 3).0[3], 0);
    }

    #[test]
    fn malformed_svg_is_decode_error() {
        let err = rasterize_svg(b"<svg").unwrap_err();
        assert!(matches!(err, OutlineError::Decode { .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.svg");
        let err = NativeRasterizer
            .rasterize(&path, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, OutlineError::File { path: p, .. } if p == path));
    }

    #[test]
    fn reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("square.svg");
        fs::write(&path, SQUARE).unwrap();
        let image = NativeRasterizer
            .rasterize(&path, &CancelToken::new())
            .unwrap();
        assert_eq!(image.dimensions(), (10, 6));
    }
}
