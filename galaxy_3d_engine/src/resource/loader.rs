//! Asset decoding — turns encoded bytes on disk into the plain data
//! `ResourceManager::*_or_load` feeds into `Texture`/font resources.
//!
//! Image decoding (BMP/PNG/JPEG/TGA) goes through the `image` crate; font
//! parsing goes through `ttf-parser`. Neither crate is GPU-aware — they
//! only produce CPU-side pixels/outlines, which the resource layer then
//! wraps into `TextureDesc`/`FontAsset`.

use std::path::Path;
use ttf_parser::{Face, GlyphId, OutlineBuilder};
use crate::engine_err;
use crate::error::Result;

/// Decoded RGBA8 pixel data for a single 2D image.
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8, row-major, no padding.
    pub rgba: Vec<u8>,
}

/// Decode an image file from disk. Format is sniffed from the file's
/// contents, not its extension.
pub fn decode_image_file(path: &Path) -> Result<DecodedImage> {
    let img = image::open(path).map_err(|e| {
        engine_err!("galaxy3d::resource::loader", "failed to decode image '{}': {}", path.display(), e)
    })?;
    Ok(to_decoded_image(img))
}

/// Decode an image already loaded into memory (format sniffed from bytes).
pub fn decode_image_bytes(bytes: &[u8]) -> Result<DecodedImage> {
    let img = image::load_from_memory(bytes).map_err(|e| {
        engine_err!("galaxy3d::resource::loader", "failed to decode image: {}", e)
    })?;
    Ok(to_decoded_image(img))
}

fn to_decoded_image(img: image::DynamicImage) -> DecodedImage {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    DecodedImage { width, height, rgba: rgba.into_raw() }
}

/// A parsed TrueType/OpenType font, kept as owned bytes so `Face` can
/// be re-borrowed on demand without the resource manager pinning a
/// self-referential struct.
pub struct FontAsset {
    data: Vec<u8>,
}

impl FontAsset {
    /// Parse and validate a font file's bytes. Fails fast if the data
    /// is not a font `ttf-parser` understands, rather than deferring
    /// the error to first use.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Face::parse(&data, 0).map_err(|e| {
            engine_err!("galaxy3d::resource::loader", "failed to parse font: {:?}", e)
        })?;
        Ok(Self { data })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| {
            engine_err!("galaxy3d::resource::loader", "failed to read font '{}': {}", path.display(), e)
        })?;
        Self::from_bytes(data)
    }

    /// Borrow the parsed face. Re-parses on each call (cheap: `ttf-parser`
    /// only walks table headers, it doesn't decode glyph outlines eagerly).
    pub fn face(&self) -> Face<'_> {
        Face::parse(&self.data, 0).expect("validated in from_bytes")
    }

    pub fn units_per_em(&self) -> u16 {
        self.face().units_per_em()
    }

    pub fn ascender(&self) -> i16 {
        self.face().ascender()
    }

    pub fn descender(&self) -> i16 {
        self.face().descender()
    }

    pub fn glyph_index(&self, c: char) -> Option<GlyphId> {
        self.face().glyph_index(c)
    }

    pub fn glyph_hor_advance(&self, id: GlyphId) -> Option<u16> {
        self.face().glyph_hor_advance(id)
    }

    /// Rasterize `id` to a coverage bitmap at `size_px`, with a subpixel
    /// `(x, y)` shift in pixels applied before scan conversion (lets text
    /// layout snap the bitmap's origin to a subpixel cursor position
    /// instead of always rounding to the nearest whole pixel).
    ///
    /// Returns `None` for glyphs with no outline (space, marks rendered
    /// as combining zero-width, bitmap-only glyphs `ttf-parser` can't
    /// trace).
    pub fn rasterize_glyph(&self, id: GlyphId, size_px: f32, shift: (f32, f32)) -> Option<GlyphBitmap> {
        let face = self.face();
        let mut outline = OutlinePath::default();
        let bbox = face.outline_glyph(id, &mut outline)?;
        if outline.contours.is_empty() {
            return None;
        }

        let scale = size_px / face.units_per_em() as f32;
        let (shift_x, shift_y) = shift;

        let x_min = bbox.x_min as f32 * scale + shift_x;
        let x_max = bbox.x_max as f32 * scale + shift_x;
        let y_min = bbox.y_min as f32 * scale + shift_y;
        let y_max = bbox.y_max as f32 * scale + shift_y;

        let left = x_min.floor() as i32;
        let top = y_max.ceil() as i32;
        let width = ((x_max.ceil() - x_min.floor()).max(1.0)) as u32;
        let height = ((y_max.ceil() - y_min.floor()).max(1.0)) as u32;

        // Font space is y-up with the origin at the baseline; bitmap space
        // is y-down with the origin at (left, top). Flatten each contour
        // straight into bitmap pixel coordinates so the rasterizer never
        // has to know about font units.
        let edges = outline.flatten_to_edges(|x, y| {
            (x * scale + shift_x - left as f32, top as f32 - (y * scale + shift_y))
        });

        let coverage = rasterize_edges(&edges, width, height);
        Some(GlyphBitmap { width, height, left, top, coverage })
    }
}

/// A rasterized glyph: `width x height` coverage bytes (0 = empty, 255 =
/// fully covered), anchored so pixel `(0, 0)` sits at `(left, top)` in the
/// same pixel space `rasterize_glyph`'s `shift` argument was given in.
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub top: i32,
    pub coverage: Vec<u8>,
}

/// Collects an `OutlineBuilder` walk into flattened polygons (quadratic and
/// cubic segments are subdivided into line segments), one `Vec` of points
/// per contour, each implicitly closed back to its first point.
#[derive(Default)]
struct OutlinePath {
    contours: Vec<Vec<(f32, f32)>>,
    current: Vec<(f32, f32)>,
    start: (f32, f32),
    last: (f32, f32),
}

impl OutlinePath {
    fn push_point(&mut self, p: (f32, f32)) {
        self.current.push(p);
        self.last = p;
    }

    fn flatten_quad(&mut self, ctrl: (f32, f32), end: (f32, f32)) {
        const STEPS: usize = 8;
        let p0 = self.last;
        for i in 1..=STEPS {
            let t = i as f32 / STEPS as f32;
            let mt = 1.0 - t;
            let x = mt * mt * p0.0 + 2.0 * mt * t * ctrl.0 + t * t * end.0;
            let y = mt * mt * p0.1 + 2.0 * mt * t * ctrl.1 + t * t * end.1;
            self.push_point((x, y));
        }
    }

    fn flatten_cubic(&mut self, c1: (f32, f32), c2: (f32, f32), end: (f32, f32)) {
        const STEPS: usize = 12;
        let p0 = self.last;
        for i in 1..=STEPS {
            let t = i as f32 / STEPS as f32;
            let mt = 1.0 - t;
            let x = mt * mt * mt * p0.0 + 3.0 * mt * mt * t * c1.0 + 3.0 * mt * t * t * c2.0 + t * t * t * end.0;
            let y = mt * mt * mt * p0.1 + 3.0 * mt * mt * t * c1.1 + 3.0 * mt * t * t * c2.1 + t * t * t * end.1;
            self.push_point((x, y));
        }
    }

    /// Transform every contour's points through `to_pixel` and emit the
    /// closed polygon edges the rasterizer sweeps over.
    fn flatten_to_edges(&self, to_pixel: impl Fn(f32, f32) -> (f32, f32)) -> Vec<((f32, f32), (f32, f32))> {
        let mut edges = Vec::new();
        for contour in &self.contours {
            if contour.len() < 2 {
                continue;
            }
            let points: Vec<(f32, f32)> = contour.iter().map(|&(x, y)| to_pixel(x, y)).collect();
            for i in 0..points.len() {
                edges.push((points[i], points[(i + 1) % points.len()]));
            }
        }
        edges
    }
}

impl OutlineBuilder for OutlinePath {
    fn move_to(&mut self, x: f32, y: f32) {
        if !self.current.is_empty() {
            self.contours.push(std::mem::take(&mut self.current));
        }
        self.start = (x, y);
        self.last = (x, y);
        self.current.push((x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push_point((x, y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.flatten_quad((x1, y1), (x, y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.flatten_cubic((x1, y1), (x2, y2), (x, y));
    }

    fn close(&mut self) {
        if !self.current.is_empty() {
            self.current.push(self.start);
            self.contours.push(std::mem::take(&mut self.current));
        }
    }
}

const SUPERSAMPLE: u32 = 4;

/// Scan-convert `edges` (closed polygons in pixel space) into a
/// `width x height` coverage buffer using the nonzero winding rule,
/// antialiased by a fixed `SUPERSAMPLE x SUPERSAMPLE` sample grid per pixel.
fn rasterize_edges(edges: &[((f32, f32), (f32, f32))], width: u32, height: u32) -> Vec<u8> {
    let mut coverage = vec![0u8; (width * height) as usize];
    if edges.is_empty() {
        return coverage;
    }

    let samples_per_pixel = (SUPERSAMPLE * SUPERSAMPLE) as f32;
    for py in 0..height {
        for px in 0..width {
            let mut inside = 0u32;
            for sy in 0..SUPERSAMPLE {
                let y = py as f32 + (sy as f32 + 0.5) / SUPERSAMPLE as f32;
                for sx in 0..SUPERSAMPLE {
                    let x = px as f32 + (sx as f32 + 0.5) / SUPERSAMPLE as f32;
                    if winding_number(edges, x, y) != 0 {
                        inside += 1;
                    }
                }
            }
            coverage[(py * width + px) as usize] = ((inside as f32 / samples_per_pixel) * 255.0).round() as u8;
        }
    }
    coverage
}

/// Nonzero winding number of `edges` around `(x, y)`, via a horizontal ray
/// cast toward `+x` counting signed crossings.
fn winding_number(edges: &[((f32, f32), (f32, f32))], x: f32, y: f32) -> i32 {
    let mut winding = 0;
    for &((x0, y0), (x1, y1)) in edges {
        if (y0 <= y) != (y1 <= y) {
            let t = (y - y0) / (y1 - y0);
            let cross_x = x0 + t * (x1 - x0);
            if cross_x > x {
                winding += if y1 > y0 { 1 } else { -1 };
            }
        }
    }
    winding
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
