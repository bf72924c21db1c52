//! The render pipeline.
//!
//! ```text
//!  BarcodeRequest
//!       │
//!       ▼
//!  Configuring ── select encoder ─ resolve options ─ load font ─ configure
//!       │
//!       ▼
//!  Encoding ───── parse text (skipped for empty text)
//!       │
//!       ├── Ok ──► Rendering ── rasterise ─ rotate ──┐
//!       │                                            ▼
//!       └── Err ─► Faulted ──── placeholder ───► Emitting ──► RenderedImage
//! ```
//!
//! Selection, configuration and font failures abort the render with a
//! [`BarcodeError`](crate::BarcodeError). Encoding failures never do: the
//! caller still gets an image in the requested format.

mod generator;
mod request;
mod stage;

pub use generator::{render, BarcodeGenerator};
pub use request::{BarcodeRequest, CODE_KEY, DEFAULT_SYMBOLOGY, FILETYPE_KEY, TEXT_KEY};
pub use stage::RenderStage;
