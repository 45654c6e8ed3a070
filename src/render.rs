//! Rendering of contour levels as SVG markup or a stroked bitmap.

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{Color, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::contour::{ContourLevel, Polyline};
use crate::{OutlineError, OutlineResult};

const STROKE_COLOR: &str = "#000000";

/// Write one `<g>` per level and one `<path>` per polyline.
pub fn render_svg(levels: &[ContourLevel], width: u32, height: u32, scale: f64) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    svg.push('\n');

    for level in levels {
        svg.push_str(&format!(
            "<g id=\"level-{}\" data-level=\"{}\" data-z=\"{:.6}\">\n",
            level.index, level.index, level.z
        ));
        for polyline in &level.polylines {
            if polyline.is_empty() {
                continue;
            }
            svg.push_str(&format!(
                "<path stroke=\"{STROKE_COLOR}\" stroke-width=\"{:.6}\" stroke-opacity=\"1\" fill=\"none\" d=\"{}\"/>\n",
                level.stroke_width,
                path_data(polyline, scale)
            ));
        }
        svg.push_str("</g>\n");
    }

    svg.push_str("</svg>\n");
    svg
}

fn path_data(polyline: &Polyline, scale: f64) -> String {
    let mut d = String::new();
    for (i, p) in polyline.points.iter().enumerate() {
        d.push(if i == 0 { 'M' } else { 'L' });
        d.push_str(&format_coord(p.x * scale));
        d.push(',');
        d.push_str(&format_coord(p.y * scale));
    }
    if polyline.closed {
        d.push('Z');
    }
    d
}

/// Two decimal places, without trailing zeros.
fn format_coord(value: f64) -> String {
    let mut s = format!("{value:.2}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// Stroke every level onto a white canvas, black lines, no fill.
///
/// Levels whose stroke width is zero draw nothing.
pub fn render_raster(
    levels: &[ContourLevel],
    width: u32,
    height: u32,
    scale: f64,
) -> OutlineResult<RgbaImage> {
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        OutlineError::Config(format!("cannot draw on an empty {width}x{height} canvas"))
    })?;
    pixmap.fill(Color::WHITE);

    let mut paint = Paint::default();
    paint.set_color_rgba8(0, 0, 0, 255);
    paint.anti_alias = true;

    for level in levels {
        let width = level.stroke_width as f32;
        if !(width.is_finite() && width > 0.0) {
            continue;
        }

        let mut builder = PathBuilder::new();
        for polyline in &level.polylines {
            let mut points = polyline.points.iter();
            let Some(first) = points.next() else {
                continue;
            };
            builder.move_to((first.x * scale) as f32, (first.y * scale) as f32);
            for p in points {
                builder.line_to((p.x * scale) as f32, (p.y * scale) as f32);
            }
            if polyline.closed {
                builder.close();
            }
        }
        let Some(path) = builder.finish() else {
            continue;
        };

        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    Ok(pixmap_to_rgba(&pixmap))
}

/// Convert a premultiplied pixmap into a straight-alpha image.
pub(crate) fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (out, px) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = px.demultiply();
        *out = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::{Point, extract_levels};
    use image::{DynamicImage, GrayImage, Luma};

    fn square_loop(x0: f64, y0: f64, size: f64) -> Polyline {
        Polyline {
            points: vec![
                Point::new(x0, y0),
                Point::new(x0 + size, y0),
                Point::new(x0 + size, y0 + size),
                Point::new(x0, y0 + size),
            ],
            closed: true,
        }
    }

    fn level(index: usize, z: f64, polylines: Vec<Polyline>) -> ContourLevel {
        ContourLevel {
            index,
            z,
            stroke_width: z * index as f64,
            polylines,
        }
    }

    fn is_white(px: &Rgba<u8>) -> bool {
        px.0 == [255, 255, 255, 255]
    }

    mod svg {
        use super::*;

        #[test]
        fn one_group_per_level_one_path_per_polyline() {
            let levels = vec![
                level(0, 0.0, vec![square_loop(1.0, 1.0, 2.0)]),
                level(1, 0.5, vec![square_loop(1.0, 1.0, 2.0), square_loop(5.0, 5.0, 1.0)]),
            ];
            let svg = render_svg(&levels, 10, 10, 1.0);
            let doc = roxmltree::Document::parse(&svg).unwrap();

            let groups: Vec<_> = doc.descendants().filter(|n| n.has_tag_name("g")).collect();
            assert_eq!(groups.len(), 2);
            let counts: Vec<usize> = groups
                .iter()
                .map(|g| g.children().filter(|n| n.has_tag_name("path")).count())
                .collect();
            assert_eq!(counts, vec![1, 2]);
        }

        #[test]
        fn first_level_has_zero_width() {
            let levels = vec![level(0, 0.7, vec![square_loop(0.0, 0.0, 3.0)])];
            let svg = render_svg(&levels, 4, 4, 1.0);
            assert!(svg.contains(r#"stroke-width="0.000000""#));
        }

        #[test]
        fn path_is_black_unfilled_and_closed() {
            let levels = vec![level(2, 0.25, vec![square_loop(1.0, 2.0, 3.0)])];
            let svg = render_svg(&levels, 8, 8, 1.0);
            let doc = roxmltree::Document::parse(&svg).unwrap();
            let path = doc.descendants().find(|n| n.has_tag_name("path")).unwrap();
            assert_eq!(path.attribute("stroke"), Some("#000000"));
            assert_eq!(path.attribute("fill"), Some("none"));
            assert_eq!(path.attribute("stroke-width"), Some("0.500000"));
            assert_eq!(path.attribute("d"), Some("M1,2L4,2L4,5L1,5Z"));
        }

        #[test]
        fn scale_applies_to_geometry_and_size() {
            let levels = vec![level(1, 1.0, vec![square_loop(1.0, 1.0, 1.5)])];
            let svg = render_svg(&levels, 20, 10, 2.0);
            let doc = roxmltree::Document::parse(&svg).unwrap();
            let root = doc.root_element();
            assert_eq!(root.attribute("width"), Some("20"));
            assert_eq!(root.attribute("height"), Some("10"));
            assert_eq!(root.attribute("viewBox"), Some("0 0 20 10"));
            let path = doc.descendants().find(|n| n.has_tag_name("path")).unwrap();
            assert_eq!(path.attribute("d"), Some("M2,2L5,2L5,5L2,5Z"));
            // Stroke width is not scaled.
            assert_eq!(path.attribute("stroke-width"), Some("1.000000"));
        }

        #[test]
        fn coordinates_trim_trailing_zeros() {
            assert_eq!(format_coord(1.0), "1");
            assert_eq!(format_coord(1.5), "1.5");
            assert_eq!(format_coord(1.256), "1.26");
            assert_eq!(format_coord(-0.001), "0");
            assert_eq!(format_coord(-0.5), "-0.5");
        }

        #[test]
        fn empty_levels_give_bare_document() {
            let svg = render_svg(&[], 3, 3, 1.0);
            let doc = roxmltree::Document::parse(&svg).unwrap();
            assert_eq!(doc.root_element().children().filter(|n| n.is_element()).count(), 0);
        }
    }

    mod raster {
        use super::*;

        #[test]
        fn zero_width_level_draws_nothing() {
            let levels = vec![level(0, 0.9, vec![square_loop(2.0, 2.0, 5.0)])];
            let image = render_raster(&levels, 10, 10, 1.0).unwrap();
            assert!(image.pixels().all(is_white));
        }

        #[test]
        fn stroked_level_darkens_pixels_on_the_path() {
            let levels = vec![level(2, 1.0, vec![square_loop(2.0, 2.0, 6.0)])];
            let image = render_raster(&levels, 12, 12, 1.0).unwrap();
            assert_eq!(image.get_pixel(5, 2).0, [0, 0, 0, 255]);
            // Interior stays unfilled.
            assert!(is_white(image.get_pixel(5, 5)));
            // Far corner untouched.
            assert!(is_white(image.get_pixel(11, 11)));
        }

        #[test]
        fn output_is_opaque_and_sized() {
            let levels = vec![level(1, 0.5, vec![square_loop(1.0, 1.0, 2.0)])];
            let image = render_raster(&levels, 7, 5, 1.0).unwrap();
            assert_eq!(image.dimensions(), (7, 5));
            assert!(image.pixels().all(|px| px.0[3] == 255));
        }

        #[test]
        fn scale_moves_geometry() {
            let levels = vec![level(2, 1.0, vec![square_loop(1.0, 1.0, 3.0)])];
            let image = render_raster(&levels, 20, 20, 2.0).unwrap();
            // Edge at y = 2 after scaling, spanning x 2..8.
            assert_eq!(image.get_pixel(5, 2).0, [0, 0, 0, 255]);
            assert!(is_white(image.get_pixel(5, 5)));
        }

        #[test]
        fn empty_canvas_is_config_error() {
            let err = render_raster(&[], 0, 10, 1.0).unwrap_err();
            assert!(matches!(err, OutlineError::Config(_)));
        }

        #[test]
        fn ramp_renders_deterministically() {
            let img = DynamicImage::ImageLuma8(GrayImage::from_fn(40, 20, |x, _| {
                Luma([(x * 255 / 39) as u8])
            }));
            let levels = extract_levels(&img, 4);
            let a = render_raster(&levels, 40, 20, 1.0).unwrap();
            let b = render_raster(&levels, 40, 20, 1.0).unwrap();
            assert_eq!(a.as_raw(), b.as_raw());
            assert!(a.pixels().any(|px| !is_white(px)));
        }
    }

    mod agreement {
        use super::*;
        use crate::rasterizer::rasterize_svg;

        /// Bright ring on a dark background, so every level is a closed loop.
        fn rings() -> DynamicImage {
            DynamicImage::ImageLuma8(GrayImage::from_fn(48, 48, |x, y| {
                let dx = f64::from(x) - 23.5;
                let dy = f64::from(y) - 23.5;
                let d = (dx * dx + dy * dy).sqrt();
                Luma([(255.0 * (1.0 - (d - 12.0).abs() / 12.0).max(0.0)) as u8])
            }))
        }

        fn dark(image: &RgbaImage) -> Vec<bool> {
            image.pixels().map(|px| px.0[3] > 127 && px.0[0] < 128).collect()
        }

        #[test]
        fn svg_and_raster_draw_the_same_lines() {
            let levels = extract_levels(&rings(), 4);
            assert!(levels[1..].iter().any(|l| l.stroke_width > 0.0 && !l.polylines.is_empty()));

            let raster = render_raster(&levels, 96, 96, 2.0).unwrap();
            let svg = render_svg(&levels, 96, 96, 2.0);
            let from_svg = rasterize_svg(svg.as_bytes()).unwrap();
            assert_eq!(from_svg.dimensions(), raster.dimensions());

            let a = dark(&raster);
            let b = dark(&from_svg);
            let inked = a.iter().filter(|&&d| d).count();
            let differing = a.iter().zip(&b).filter(|(x, y)| x != y).count();
            assert!(inked > 0);
            assert!(
                differing * 20 <= inked,
                "{differing} of {inked} inked pixels disagree"
            );
        }

        #[test]
        fn every_svg_path_is_stroked_in_raster() {
            let levels = extract_levels(&rings(), 4);
            let svg = render_svg(&levels, 48, 48, 1.0);
            let doc = roxmltree::Document::parse(&svg).unwrap();
            let groups: Vec<_> = doc
                .root_element()
                .children()
                .filter(|n| n.has_tag_name("g"))
                .collect();
            assert_eq!(groups.len(), levels.len());

            for (group, level) in groups.iter().zip(&levels) {
                let paths = group.children().filter(|n| n.has_tag_name("path")).count();
                assert_eq!(paths, level.polylines.len());
                if level.stroke_width <= 0.0 {
                    continue;
                }
                // Rendering this level alone marks a pixel on each of its polylines.
                let alone = render_raster(std::slice::from_ref(level), 48, 48, 1.0).unwrap();
                for polyline in &level.polylines {
                    let touched = polyline.points.iter().any(|p| {
                        let (x, y) = (p.x.floor(), p.y.floor());
                        (0.0..48.0).contains(&x)
                            && (0.0..48.0).contains(&y)
                            && !is_white(alone.get_pixel(x as u32, y as u32))
                    });
                    assert!(touched, "level {} polyline not drawn", level.index);
                }
            }
        }
    }
}
