//! Symbology encoders.
//!
//! Every symbology implements [`BarcodeEncoder`]. Encoders are looked up by
//! identifier in an [`EncoderRegistry`] and configured through
//! [`configure_encoder`], which dispatches on the encoder's [`Variant`]
//! for the settings only some families understand.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  BarcodeGenerator   │
//! └──────────┬──────────┘
//!            │ select(id)
//!            ▼
//! ┌─────────────────────┐
//! │  EncoderRegistry    │  id ──► factory
//! └──────────┬──────────┘
//!            │ factory()
//!            ▼
//! ┌─────────────────────┐       ┌───────────────────────────────┐
//! │ Box<dyn             │       │ Variant                       │
//! │   BarcodeEncoder>   │──────►│  Sequential   (start)         │
//! └──────────┬──────────┘       │  Checksummed  (checksum)      │
//!            │ parse(text)      │  Tracking     (tracking code) │
//!            ▼                  │  Labelled     (label)         │
//! ┌─────────────────────┐       │  Plain                        │
//! │   EncodedSymbol     │       └───────────────────────────────┘
//! └─────────────────────┘
//! ```
//!
//! # Available Encoders
//!
//! | id | family |
//! |---|---|
//! | `code128`, `gs1128` | sequential |
//! | `code39`, `code39extended`, `i25`, `s25`, `msi` | checksummed |
//! | `intelligentmail` | tracking |
//! | `othercode` | labelled |

mod checksum;
mod code128;
mod code39;
mod encoder;
mod error;
mod intelligent_mail;
mod msi;
mod othercode;
mod registry;
mod setup;
mod symbol;
mod two_of_five;

pub use code128::{Code128, CodeSet, Gs1128};
pub use code39::{Code39, Code39Extended};
pub use encoder::{
    BarcodeEncoder, ChecksumSelect, Family, LabelSetup, StartSelect, TrackingSetup, Variant,
};
pub use error::EncodeError;
pub use intelligent_mail::IntelligentMail;
pub use msi::Msi;
pub use othercode::OtherCode;
pub use registry::{validate_identifier, EncoderFactory, EncoderRegistry};
pub use setup::configure_encoder;
pub use symbol::{BarExtent, EncodedSymbol, Run, SymbolStyle, DEFAULT_QUIET_ZONE};
pub use two_of_five::{Interleaved2of5, Standard2of5};
