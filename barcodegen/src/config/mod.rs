//! Configuration resolution.
//!
//! Turns a loosely typed options bag into the validated, clamped
//! [`RenderConfig`] consumed by encoders and the renderer.
//!
//! ```text
//! query string / CLI flags / config file
//!                  │
//!                  ▼
//!          ┌───────────────┐
//!          │ RenderOptions │  (string → string, unknown keys kept)
//!          └───────┬───────┘
//!                  │ resolve()
//!                  ▼
//!          ┌───────────────┐
//!          │ RenderConfig  │  (typed, clamped)
//!          └───────────────┘
//! ```

mod error;
mod file;
mod options;
mod render;
mod text;

pub use error::ConfigError;
pub use file::{config_file_path, ConfigFile};
pub use options::{keys, RenderOptions};
pub use render::{
    resolve, Color, FontSpec, RenderConfig, Rotation, TrackingCode, TrackingFields,
    DEFAULT_DPI, DEFAULT_FONT_SIZE, DEFAULT_SCALE, DEFAULT_THICKNESS, MAX_DPI, MAX_FONT_SIZE,
    MAX_SCALE, MAX_THICKNESS, MIN_DPI, MIN_SCALE, MIN_THICKNESS,
};
pub use text::{convert_text, unescape, Latin1Text};
