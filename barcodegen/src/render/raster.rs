//! Rasterisation of encoded symbols.

use image::{imageops, Rgb, RgbImage};

use crate::config::Rotation;
use crate::render::caption::CaptionLayout;
use crate::symbology::{BarExtent, EncodedSymbol};

/// Gap between bars and caption, in modules.
const CAPTION_GAP: u32 = 2;

/// Draw `symbol` at its own scale, thickness and colours.
///
/// The canvas is the bars plus a quiet zone on both sides, plus the caption
/// when the symbol carries one and a font is set. A wider caption widens
/// the canvas and the bars stay centred.
pub fn rasterize(symbol: &EncodedSymbol) -> RgbImage {
    let style = symbol.style();
    let scale = style.scale.max(1);
    let bar_height = style.thickness * scale;
    let quiet_zone = symbol.quiet_zone() * scale;
    let bars_width = symbol.width_modules() * scale;

    let caption = match (style.font.as_ref(), symbol.caption()) {
        (Some(font), Some(text)) if !text.is_empty() => Some(CaptionLayout::new(font, text)),
        _ => None,
    };

    let content_width = caption
        .as_ref()
        .map_or(bars_width, |layout| bars_width.max(layout.width()));
    let width = (content_width + 2 * quiet_zone).max(1);
    let caption_gap = CAPTION_GAP * scale;
    let height = bar_height
        + caption
            .as_ref()
            .map_or(0, |layout| caption_gap + layout.height());

    let mut image = RgbImage::from_pixel(width, height.max(1), Rgb(style.background.to_rgb()));
    let ink = Rgb(style.foreground.to_rgb());

    let third = bar_height / 3;
    let mut x = (width - bars_width) / 2;
    for run in symbol.runs() {
        let run_width = run.width * scale;
        if run.dark {
            let rows = match run.extent {
                BarExtent::Full => 0..bar_height,
                BarExtent::Ascender => 0..bar_height - third,
                BarExtent::Descender => third..bar_height,
                BarExtent::Tracker => third..bar_height - third,
            };
            for y in rows {
                for dx in 0..run_width {
                    image.put_pixel(x + dx, y, ink);
                }
            }
        }
        x += run_width;
    }

    if let Some(layout) = caption {
        let left = (i64::from(width) - i64::from(layout.width())) / 2;
        let top = i64::from(bar_height + caption_gap);
        layout.draw(&mut image, left, top, style.foreground);
    }

    image
}

/// Rotate counter-clockwise by `rotation`.
pub fn rotate(image: RgbImage, rotation: Rotation) -> RgbImage {
    match rotation {
        Rotation::None => image,
        Rotation::Deg90 => imageops::rotate270(&image),
        Rotation::Deg180 => imageops::rotate180(&image),
        Rotation::Deg270 => imageops::rotate90(&image),
    }
}
