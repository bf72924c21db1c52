//! Turning encoded symbols into image bytes.
//!
//! ```text
//! EncodedSymbol ──► rasterize() ──► rotate() ──► encode_image() ──► bytes
//!                                                      ▲
//! EncodeError ───► draw_placeholder() ─────────────────┘
//! ```
//!
//! Rasters are plain RGB buffers from the `image` crate. PNG is written with
//! the `png` crate directly so the DPI can be stored in a `pHYs` chunk; JPEG
//! stores it in the JFIF header; GIF has nowhere to put it.

mod caption;
mod output;
mod placeholder;
mod raster;

pub use caption::CaptionLayout;
pub use output::{encode_image, OutputError, OutputFormat, RenderedImage};
pub use placeholder::{draw_placeholder, error_image_png, PLACEHOLDER_HEIGHT, PLACEHOLDER_WIDTH};
pub use raster::{rasterize, rotate};
