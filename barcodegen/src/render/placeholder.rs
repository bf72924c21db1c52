//! Diagnostic placeholder images.
//!
//! When a symbol cannot be encoded the caller still receives a valid image
//! in the requested format: a fixed-size canvas with a red frame, showing
//! the error message if a font is available and a red cross otherwise.
//!
//! # Static Error Image
//!
//! Failures that happen before an encoder exists (an invalid or unknown
//! symbology) are answered with one generic PNG, generated at first access
//! and cached for the lifetime of the process.

use std::sync::OnceLock;

use image::{Rgb, RgbImage};

use crate::config::Color;
use crate::font::Font;
use crate::render::caption::CaptionLayout;
use crate::render::output::{encode_image, OutputFormat};

pub const PLACEHOLDER_WIDTH: u32 = 240;
pub const PLACEHOLDER_HEIGHT: u32 = 60;

/// Frame thickness in pixels.
const FRAME: u32 = 2;

/// Left margin of the message text.
const TEXT_MARGIN: i64 = 8;

const ERROR_COLOR: Color = Color::RED;

static ERROR_IMAGE: OnceLock<Vec<u8>> = OnceLock::new();

/// Draw a placeholder for `message`.
///
/// The message is drawn, clipped to the canvas, only when `font` is given.
pub fn draw_placeholder(message: &str, font: Option<&Font>, background: Color) -> RgbImage {
    let mut image = RgbImage::from_pixel(
        PLACEHOLDER_WIDTH,
        PLACEHOLDER_HEIGHT,
        Rgb(background.to_rgb()),
    );
    let red = Rgb(ERROR_COLOR.to_rgb());

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let on_frame = x < FRAME
            || y < FRAME
            || x >= PLACEHOLDER_WIDTH - FRAME
            || y >= PLACEHOLDER_HEIGHT - FRAME;
        if on_frame {
            *pixel = red;
        }
    }

    match font {
        Some(font) => {
            let layout = CaptionLayout::new(font, message);
            let top = (i64::from(PLACEHOLDER_HEIGHT) - i64::from(layout.height())) / 2;
            layout.draw(&mut image, TEXT_MARGIN, top.max(0), ERROR_COLOR);
        }
        None => draw_cross(&mut image, red),
    }
    image
}

/// Both diagonals, two pixels thick.
fn draw_cross(image: &mut RgbImage, color: Rgb<u8>) {
    let (width, height) = (image.width(), image.height());
    for x in 0..width {
        let y = u64::from(x) * u64::from(height - 1) / u64::from(width - 1);
        let y = y as u32;
        for dy in 0..2 {
            let down = (y + dy).min(height - 1);
            let up = (height - 1 - y).saturating_sub(dy);
            image.put_pixel(x, down, color);
            image.put_pixel(x, up, color);
        }
    }
}

/// The generic error image as PNG bytes.
///
/// # Panics
///
/// Panics if the image cannot be generated on first access. It has fixed
/// content, so this can only happen through a programming error.
pub fn error_image_png() -> &'static [u8] {
    ERROR_IMAGE.get_or_init(|| {
        let image = draw_placeholder("", None, Color::WHITE);
        encode_image(&image, OutputFormat::Png, None)
            .expect("Failed to encode the static error image - this is a critical error")
    })
}
