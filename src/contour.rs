//! Iso-luminance contour extraction.
//!
//! The image is treated as a height field of luminance samples, one per
//! pixel, surrounded by a one-sample border at the minimum value. Marching
//! squares over that closed field yields polylines that always form loops,
//! including those touching the image frame.

use std::collections::HashMap;

use image::DynamicImage;

use crate::config::{ContourFormat, ContourOptions};
use crate::render::{render_raster, render_svg};
use crate::{OutlineArtifact, OutlineError, OutlineResult};

/// Offset added to each level so contours never pass exactly through samples.
pub const LEVEL_EPSILON: f64 = 1e-9;

/// A point in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A sequence of points along which the luminance equals a level.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point>,
    /// Whether the last point connects back to the first.
    pub closed: bool,
}

impl Polyline {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// The contours found at one sampled luminance level.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLevel {
    /// Position of the level in the sampling sequence.
    pub index: usize,
    /// Luminance value of the level, in `0.0..=1.0`.
    pub z: f64,
    /// Stroke width used when rendering this level: `z * index`.
    pub stroke_width: f64,
    pub polylines: Vec<Polyline>,
}

/// Luminance samples of an image, normalized to `0.0..=1.0`.
#[derive(Debug, Clone)]
pub struct HeightField {
    width: usize,
    height: usize,
    min: f64,
    max: f64,
    data: Vec<f64>,
    /// Shift applied to grid coordinates to map them back onto the source image.
    origin: f64,
}

impl HeightField {
    /// Build a field from the luminance of every pixel.
    ///
    /// Colors are premultiplied by alpha before weighting, so transparent
    /// pixels read as black.
    pub fn from_image(image: &DynamicImage) -> Self {
        let rgba = image.to_rgba16();
        let (w, h) = rgba.dimensions();
        let data: Vec<f64> = rgba
            .pixels()
            .map(|px| {
                let [r, g, b, a] = px.0;
                luminance16(premultiply(r, a), premultiply(g, a), premultiply(b, a))
            })
            .collect();
        Self::from_samples(w as usize, h as usize, data)
    }

    fn from_samples(width: usize, height: usize, data: Vec<f64>) -> Self {
        let (min, max) = if data.is_empty() {
            (0.0, 0.0)
        } else {
            data.iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                })
        };
        Self {
            width,
            height,
            min,
            max,
            data,
            origin: 0.0,
        }
    }

    /// Surround the field with a border at the minimum value.
    pub fn closed(&self) -> Self {
        let width = self.width + 2;
        let height = self.height + 2;
        let mut data = vec![self.min; width * height];
        for y in 0..self.height {
            let dst = (y + 1) * width + 1;
            let src = y * self.width;
            data[dst..dst + self.width].copy_from_slice(&self.data[src..src + self.width]);
        }
        Self {
            width,
            height,
            min: self.min,
            max: self.max,
            data,
            origin: self.origin + 1.0,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    fn at(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }

    /// Extract every polyline where the field crosses `z`.
    pub fn contours(&self, z: f64) -> Vec<Polyline> {
        if self.width < 2 || self.height < 2 {
            return Vec::new();
        }

        let mut segments: Vec<[Crossing; 2]> = Vec::new();
        for y in 0..self.height - 1 {
            for x in 0..self.width - 1 {
                self.march_cell(x, y, z, &mut segments);
            }
        }
        link_segments(&segments)
    }

    fn march_cell(&self, x: usize, y: usize, z: f64, out: &mut Vec<[Crossing; 2]>) {
        let tl = self.at(x, y);
        let tr = self.at(x + 1, y);
        let br = self.at(x + 1, y + 1);
        let bl = self.at(x, y + 1);

        let case = (usize::from(tl > z) << 3)
            | (usize::from(tr > z) << 2)
            | (usize::from(br > z) << 1)
            | usize::from(bl > z);
        if case == 0 || case == 15 {
            return;
        }

        let top = || self.crossing(EdgeKey::Horizontal(x, y), tl, tr, z);
        let bottom = || self.crossing(EdgeKey::Horizontal(x, y + 1), bl, br, z);
        let left = || self.crossing(EdgeKey::Vertical(x, y), tl, bl, z);
        let right = || self.crossing(EdgeKey::Vertical(x + 1, y), tr, br, z);
        let center_above = (tl + tr + br + bl) / 4.0 > z;

        match case {
            1 | 14 => out.push([left(), bottom()]),
            2 | 13 => out.push([bottom(), right()]),
            3 | 12 => out.push([left(), right()]),
            4 | 11 => out.push([top(), right()]),
            6 | 9 => out.push([top(), bottom()]),
            7 | 8 => out.push([top(), left()]),
            // Saddles: the center sample decides which diagonal stays connected.
            5 if center_above => {
                out.push([top(), left()]);
                out.push([bottom(), right()]);
            }
            5 => {
                out.push([top(), right()]);
                out.push([left(), bottom()]);
            }
            10 if center_above => {
                out.push([top(), right()]);
                out.push([left(), bottom()]);
            }
            10 => {
                out.push([top(), left()]);
                out.push([bottom(), right()]);
            }
            _ => {}
        }
    }

    fn crossing(&self, key: EdgeKey, v0: f64, v1: f64, z: f64) -> Crossing {
        let t = ((z - v0) / (v1 - v0)).clamp(0.0, 1.0);
        let (x, y) = match key {
            EdgeKey::Horizontal(x, y) => (x as f64 + t, y as f64),
            EdgeKey::Vertical(x, y) => (x as f64, y as f64 + t),
        };
        Crossing {
            key,
            point: Point::new(x - self.origin, y - self.origin),
        }
    }
}

/// Identifies a grid edge so neighbouring cells agree on shared crossings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EdgeKey {
    /// Edge from `(x, y)` to `(x + 1, y)`.
    Horizontal(usize, usize),
    /// Edge from `(x, y)` to `(x, y + 1)`.
    Vertical(usize, usize),
}

#[derive(Debug, Clone, Copy)]
struct Crossing {
    key: EdgeKey,
    point: Point,
}

/// Chain cell segments sharing an edge crossing into polylines.
///
/// Chains start from segments in scan order, so the output is deterministic.
fn link_segments(segments: &[[Crossing; 2]]) -> Vec<Polyline> {
    let mut by_edge: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
    for (i, segment) in segments.iter().enumerate() {
        for end in segment {
            by_edge.entry(end.key).or_default().push(i);
        }
    }

    let mut used = vec![false; segments.len()];
    let mut polylines = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let [first, second] = segments[start];

        let mut points = vec![first.point, second.point];
        let closed = follow(segments, &by_edge, &mut used, second.key, first.key, &mut points);
        if !closed {
            let mut backward = Vec::new();
            follow(segments, &by_edge, &mut used, first.key, second.key, &mut backward);
            backward.reverse();
            backward.extend(points);
            points = backward;
        }

        polylines.push(Polyline { points, closed });
    }

    polylines
}

/// Walk from `from` through unused segments, appending crossings to `points`.
///
/// Returns true when the walk arrives back at `stop`.
fn follow(
    segments: &[[Crossing; 2]],
    by_edge: &HashMap<EdgeKey, Vec<usize>>,
    used: &mut [bool],
    mut from: EdgeKey,
    stop: EdgeKey,
    points: &mut Vec<Point>,
) -> bool {
    loop {
        let next = by_edge
            .get(&from)
            .and_then(|ids| ids.iter().copied().find(|&id| !used[id]));
        let Some(id) = next else {
            return false;
        };
        used[id] = true;
        let [a, b] = segments[id];
        let far = if a.key == from { b } else { a };
        if far.key == stop {
            return true;
        }
        points.push(far.point);
        from = far.key;
    }
}

/// Sample `iterations` evenly spaced levels and extract the contours of each.
pub fn extract_levels(image: &DynamicImage, iterations: usize) -> Vec<ContourLevel> {
    let field = HeightField::from_image(image).closed();
    let (z0, z1) = (field.min(), field.max());

    (0..iterations)
        .map(|index| {
            let t = if iterations > 1 {
                index as f64 / (iterations - 1) as f64
            } else {
                0.0
            };
            let z = z0 + (z1 - z0) * t;
            let polylines = field.contours(z + LEVEL_EPSILON);
            ContourLevel {
                index,
                z,
                stroke_width: z * index as f64,
                polylines,
            }
        })
        .collect()
}

/// Turn an image into stroked iso-luminance contours.
///
/// The options are validated before any pixel is read.
pub fn contour(image: &DynamicImage, options: &ContourOptions) -> OutlineResult<OutlineArtifact> {
    options.validate()?;
    let (out_w, out_h) = output_size(image, options.scale)?;

    let levels = extract_levels(image, options.iterations);
    tracing::debug!(
        levels = levels.len(),
        polylines = levels.iter().map(|l| l.polylines.len()).sum::<usize>(),
        "extracted contour levels"
    );

    match options.format {
        ContourFormat::Vector => {
            let svg = render_svg(&levels, out_w, out_h, options.scale);
            Ok(OutlineArtifact::Vector(svg.into_bytes()))
        }
        ContourFormat::Raster => {
            let raster = render_raster(&levels, out_w, out_h, options.scale)?;
            Ok(OutlineArtifact::Raster(DynamicImage::ImageRgba8(raster)))
        }
    }
}

/// Scaled output dimensions, rounded down. An empty result is a configuration error.
fn output_size(image: &DynamicImage, scale: f64) -> OutlineResult<(u32, u32)> {
    let (w, h) = (image.width(), image.height());
    let out_w = (f64::from(w) * scale) as u32;
    let out_h = (f64::from(h) * scale) as u32;
    if out_w == 0 || out_h == 0 {
        return Err(OutlineError::Config(format!(
            "contour scale {scale} shrinks {w}x{h} to an empty {out_w}x{out_h} output"
        )));
    }
    Ok((out_w, out_h))
}

fn premultiply(channel: u16, alpha: u16) -> u32 {
    u32::from(channel) * u32::from(alpha) / 0xffff
}

/// 16-bit luma with the ITU-R 601 weights, scaled to `0.0..=1.0`.
fn luminance16(r: u32, g: u32, b: u32) -> f64 {
    let y = (19595 * u64::from(r) + 38470 * u64::from(g) + 7471 * u64::from(b) + (1 << 15)) >> 16;
    y as f64 / f64::from(u16::MAX)
}
