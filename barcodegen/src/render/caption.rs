//! Caption layout and glyph drawing.
//!
//! Glyph outlines come from `ttf-parser` and are filled into a coverage
//! mask with `tiny-skia`, which is then blended onto the RGB raster.

use image::RgbImage;
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Transform};
use ttf_parser::{GlyphId, OutlineBuilder};

use crate::config::Color;
use crate::font::Font;

/// A single line of text as one filled path, origin at the top-left.
#[derive(Debug, Clone)]
pub struct CaptionLayout {
    path: Option<Path>,
    width: u32,
    height: u32,
}

impl CaptionLayout {
    /// Lay out `text` left to right on one baseline.
    ///
    /// Characters missing from the face use glyph 0. A font whose bytes do
    /// not parse gives an empty layout.
    pub fn new(font: &Font, text: &str) -> Self {
        let Some(face) = font.face() else {
            return Self {
                path: None,
                width: 0,
                height: 0,
            };
        };

        let scale = font.pixel_size() / f32::from(face.units_per_em().max(1));
        let ascent = f32::from(face.ascender()) * scale;
        let descent = f32::from(face.descender()) * scale;

        let mut outline = GlyphOutline {
            path: PathBuilder::new(),
            scale,
            pen_x: 0.0,
            baseline: ascent,
        };
        for c in text.chars() {
            let id = face.glyph_index(c).unwrap_or(GlyphId(0));
            face.outline_glyph(id, &mut outline);
            outline.pen_x += f32::from(face.glyph_hor_advance(id).unwrap_or(0)) * scale;
        }

        Self {
            width: outline.pen_x.ceil().max(0.0) as u32,
            height: (ascent - descent).ceil().max(0.0) as u32,
            path: outline.path.finish(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Draw at (`left`, `top`), blending `color` over existing pixels by
    /// coverage. Pixels outside the image are clipped.
    pub fn draw(&self, image: &mut RgbImage, left: i64, top: i64, color: Color) {
        let Some(path) = &self.path else {
            return;
        };
        let Some(mut mask) = Pixmap::new(self.width.max(1), self.height.max(1)) else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color_rgba8(0, 0, 0, 255);
        paint.anti_alias = true;
        mask.fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);

        let (width, height) = (i64::from(image.width()), i64::from(image.height()));
        let stride = mask.width();
        let ink = color.to_rgb();

        for (index, coverage) in mask.pixels().iter().enumerate() {
            let alpha = coverage.alpha();
            if alpha == 0 {
                continue;
            }
            let index = index as u32;
            let x = left + i64::from(index % stride);
            let y = top + i64::from(index / stride);
            if x < 0 || y < 0 || x >= width || y >= height {
                continue;
            }

            let pixel = image.get_pixel_mut(x as u32, y as u32);
            let coverage = f32::from(alpha) / 255.0;
            for (channel, &target) in pixel.0.iter_mut().zip(&ink) {
                let blended =
                    f32::from(*channel) + (f32::from(target) - f32::from(*channel)) * coverage;
                *channel = blended.round() as u8;
            }
        }
    }
}

/// Collects glyph outlines into one path, flipping font units (y up) into
/// pixels (y down).
struct GlyphOutline {
    path: PathBuilder,
    scale: f32,
    pen_x: f32,
    baseline: f32,
}

impl GlyphOutline {
    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.pen_x + x * self.scale, self.baseline - y * self.scale)
    }
}

impl OutlineBuilder for GlyphOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.path.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.path.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x, y) = self.point(x, y);
        self.path.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x2, y2) = self.point(x2, y2);
        let (x, y) = self.point(x, y);
        self.path.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.path.close();
    }
}
