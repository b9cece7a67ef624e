//! Value codecs for patch fields.
//!
//! Every scalar in a patch file is a string. A [`FieldKind`] turns that
//! string into a [`TypedValue`] and back: the decoder accepts every shape
//! the firmware has written over the years, the encoder always produces one
//! canonical form. Tokens outside a known vocabulary decode to
//! [`TypedValue::Unknown`] so they can be written back untouched.

mod error;
mod hex;
mod kind;
mod tokens;
mod value;

pub use error::{DecodeError, EncodeError};
pub use hex::{HexScale, StepRule, HEX_U50, PAN, SIGNED_50};
pub use kind::{
    FieldKind, IntRange, ValueTable, PHASE_STEP, SIDECHAIN_ATTACK, SIDECHAIN_RELEASE,
};
pub use tokens::{
    ArpeggiatorMode, EnumTable, LfoShape, LpfMode, ModFxType, OscType, Polyphony,
    SamplePlayMode, SyncLevel, SynthMode, VoicePriority,
};
pub use value::{Phase, TypedValue};
