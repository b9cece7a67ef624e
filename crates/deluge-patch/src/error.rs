use std::path::PathBuf;

use deluge_values::{DecodeError, EncodeError};
use deluge_xml::{ParseError, PathError};
use thiserror::Error;

use crate::variant::SoundVariant;

/// Failures of the typed overlay. Nothing is written to the tree when one
/// of these is returned from a setter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayError {
    #[error("document has no sound or kit element")]
    NotAPatch,
    #[error("sound {0} does not exist")]
    NoSuchSound(usize),
    #[error("unsupported sound mode {0:?}")]
    UnsupportedSoundMode(String),
    #[error("unknown field {0:?}")]
    UnknownField(String),
    #[error("field {field} is not available on a {variant} sound")]
    FieldUnsupported { field: String, variant: SoundVariant },
    #[error("field {0} is read-only")]
    FieldReadOnly(String),
    #[error("field {field}: {source}")]
    Decode { field: String, source: DecodeError },
    #[error("field {field}: {source}")]
    Encode { field: String, source: EncodeError },
    #[error("defaultParams has {expected} slots, got {got} values")]
    SlotCountMismatch { expected: usize, got: usize },
    #[error(transparent)]
    Path(#[from] PathError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    #[error("patch cable {index} does not exist ({len} cables)")]
    NoSuchCable { index: usize, len: usize },
    #[error("cable amount: {0}")]
    Amount(EncodeError),
    #[error("cable amount {raw:?}: {source}")]
    InvalidAmount { raw: String, source: DecodeError },
    #[error(transparent)]
    Overlay(#[from] OverlayError),
    #[error(transparent)]
    Path(#[from] PathError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("hex scale override for unknown field {0:?}")]
    UnknownField(String),
    #[error("field {0} is not a scaled field")]
    NotScaled(String),
    #[error("empty hex scale {min}..={max} for {field}")]
    EmptyScale { field: String, min: i32, max: i32 },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session is closed")]
    Closed,
    #[error("{path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("{path}: {source}")]
    ParseFile { path: PathBuf, source: ParseError },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("session has no file path; use save_as")]
    NoPath,
    #[error(transparent)]
    Overlay(#[from] OverlayError),
    #[error(transparent)]
    Routing(#[from] RoutingError),
}
