//! Round-trip-preserving editor model for Deluge synth and kit patches.
//!
//! A patch file is parsed into a lossless [`deluge_xml::Document`] and
//! never rebuilt from a model: the typed overlay reads fields through paths
//! into the tree and writes single scalars back. Everything the editor does
//! not understand stays exactly as it was, so saving an untouched file
//! reproduces it byte for byte.
//!
//! Layers, bottom-up:
//! - [`patch`]: synth or kit, format generation, where sounds live
//! - [`variant`]: which engine a sound uses
//! - [`catalogue`]: the fields the editor knows, per variant
//! - [`overlay`]: typed get/set of catalogue fields
//! - [`routing`]: the patch cable list
//! - [`params`]: `defaultParams` as ordered raw slots
//! - [`samples`]: sample file references, listed and remapped
//! - [`session`]: load, edit, save

pub mod catalogue;
pub mod cli;
pub mod config;
pub mod error;
pub mod overlay;
pub mod params;
pub mod patch;
pub mod routing;
pub mod samples;
pub mod session;
pub mod variant;

pub use catalogue::{field_table, Access, Availability, FieldDescriptor};
pub use config::EditorConfig;
pub use error::{ConfigError, OverlayError, RoutingError, SessionError};
pub use overlay::{read_field, write_field, Overlay};
pub use params::{ParamSlot, SlotStorage};
pub use patch::{FormatVersion, KitRow, PatchType, SoundRef, VersionInfo};
pub use routing::PatchCable;
pub use samples::SampleRemap;
pub use session::{Session, SoundHandle};
pub use variant::{classify, Engine, SoundVariant};

pub use deluge_values::{Phase, TypedValue};
