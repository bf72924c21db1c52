//! Applying a resolved configuration to an encoder.

use tracing::{debug, warn};

use crate::config::{ConfigError, RenderConfig};
use crate::font::Font;
use crate::symbology::encoder::{BarcodeEncoder, Variant};

/// Configure `encoder` for one render.
///
/// Thickness and font go first, then the family-specific attributes, then
/// scale and colours.
///
/// # Errors
///
/// [`ConfigError::InvalidAttribute`] when a family-specific value is
/// rejected by the encoder (an unknown start set, an out-of-range
/// tracking field).
pub fn configure_encoder(
    encoder: &mut dyn BarcodeEncoder,
    config: &RenderConfig,
    font: Option<Font>,
) -> Result<(), ConfigError> {
    encoder.set_thickness(config.thickness);
    encoder.set_font(font);

    apply_variant(encoder, config)?;

    encoder.set_scale(config.scale);
    encoder.set_background_color(config.background);
    encoder.set_foreground_color(config.foreground);
    Ok(())
}

fn apply_variant(encoder: &mut dyn BarcodeEncoder, config: &RenderConfig) -> Result<(), ConfigError> {
    let name = encoder.name();
    match encoder.variant() {
        Variant::Sequential(sequential) => {
            sequential.set_start(config.start.as_deref())?;
        }
        Variant::Checksummed(checksummed) => {
            checksummed.set_checksum(config.checksum);
        }
        Variant::Tracking(tracking) => match config.tracking.complete() {
            Some(code) => tracking.set_tracking_code(code)?,
            None => {
                let supplied = config.tracking.supplied();
                if supplied > 0 {
                    // Only a complete code is applied; the encoder will
                    // report the missing code when it parses.
                    warn!(
                        symbology = name,
                        supplied,
                        "partial tracking code ignored; all four fields are required"
                    );
                }
            }
        },
        Variant::Labelled(labelled) => {
            if let Some(label) = config.label.as_deref() {
                labelled.set_label(label);
            }
        }
        Variant::Plain => {
            debug!(symbology = name, "no family-specific attributes");
        }
    }
    Ok(())
}
