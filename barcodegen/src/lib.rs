//! Barcodegen - configuration-driven barcode rendering.
//!
//! Takes a symbology identifier, the text to encode, an output format and
//! a bag of string options, and produces PNG, JPEG or GIF bytes.
//!
//! # Architecture
//!
//! - [`config`]: options bag, typed render configuration, config file
//! - [`symbology`]: encoder contract, the built-in encoders, the registry
//! - [`font`]: caption font loading and caching
//! - [`render`]: rasterisation, placeholders, image serialisation
//! - [`pipeline`]: the orchestrator tying the stages together
//!
//! # Example
//!
//! ```
//! use barcodegen::{BarcodeGenerator, BarcodeRequest, OutputFormat};
//!
//! let generator = BarcodeGenerator::default();
//! let request = BarcodeRequest::new("code39", "HELLO", OutputFormat::Png)
//!     .with_option("checksum", "1");
//! let image = generator.render(&request)?;
//! assert_eq!(image.content_type(), "image/png");
//! # Ok::<(), barcodegen::BarcodeError>(())
//! ```

pub mod config;
pub mod error;
pub mod font;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod symbology;

pub use config::RenderOptions;
pub use error::{BarcodeError, BarcodeResult};
pub use pipeline::{render, BarcodeGenerator, BarcodeRequest};
pub use render::{OutputFormat, RenderedImage};
