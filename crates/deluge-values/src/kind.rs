//! Field kinds: the decode/encode pair for one family of raw values.

use crate::error::{DecodeError, EncodeError};
use crate::hex::HexScale;
use crate::tokens::EnumTable;
use crate::value::{Phase, TypedValue};

/// Raw units per degree of retrigger phase.
pub const PHASE_STEP: u32 = 11_930_464;

/// A knob position 0..N stored as the firmware's time constant for it.
#[derive(Debug, PartialEq, Eq)]
pub struct ValueTable {
    pub name: &'static str,
    pub values: &'static [u32],
}

impl ValueTable {
    pub fn position(&self, raw: u32) -> Option<usize> {
        self.values.iter().position(|v| *v == raw)
    }
}

pub const SIDECHAIN_ATTACK: ValueTable = ValueTable {
    name: "sidechain attack",
    values: &[
        1048576, 887876, 751804, 636588, 539028, 456420, 386472, 327244, 277092, 234624, 198668,
        168220, 142440, 120612, 102128, 86476, 73224, 62000, 52500, 44452, 37640, 31872, 26988,
        22852, 19348, 16384, 13876, 11748, 9948, 8428, 7132, 6040, 5112, 4328, 3668, 3104, 2628,
        2224, 1884, 1596, 1352, 1144, 968, 820, 696, 558, 496, 420, 356, 304, 256,
    ],
};

pub const SIDECHAIN_RELEASE: ValueTable = ValueTable {
    name: "sidechain release",
    values: &[
        261528, 38632, 19552, 13184, 9872, 7840, 6472, 5480, 4736, 4152, 3680, 3296, 2976, 2704,
        2472, 2264, 2088, 1928, 1792, 1664, 1552, 1448, 1352, 1272, 1192, 1120, 1056, 992, 936,
        880, 832, 784, 744, 704, 664, 624, 592, 560, 528, 496, 472, 448, 424, 400, 376, 352, 328,
        312, 288, 272, 256,
    ],
};

/// Inclusive bounds of a decimal integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
}

impl IntRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// `"0"` / `"1"`.
    Boolean,
    Hex(HexScale),
    /// The same i32 mapping as [`FieldKind::Hex`], written in decimal.
    DecimalScaled(HexScale),
    /// Decimal value looked up in a fixed table; the position is the value.
    Lookup(&'static ValueTable),
    Enumeration(&'static EnumTable),
    FreeString,
    /// Decimal integer, e.g. transpose or sample positions.
    Integer(IntRange),
    /// Decimal i32 where `-1` is off and anything else a phase in degrees.
    RetrigPhase,
}

impl FieldKind {
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Boolean => "boolean",
            FieldKind::Hex(_) => "hex range",
            FieldKind::DecimalScaled(_) => "decimal range",
            FieldKind::Lookup(table) => table.name,
            FieldKind::Enumeration(table) => table.name,
            FieldKind::FreeString => "string",
            FieldKind::Integer(_) => "integer",
            FieldKind::RetrigPhase => "retrigger phase",
        }
    }

    pub fn decode(&self, raw: &str) -> Result<TypedValue, DecodeError> {
        match self {
            FieldKind::Boolean => Ok(match raw {
                "0" => TypedValue::Bool(false),
                "1" => TypedValue::Bool(true),
                _ => TypedValue::Unknown(raw.to_string()),
            }),
            FieldKind::Hex(scale) => scale.decode(raw).map(|v| TypedValue::Int(v as i64)),
            FieldKind::DecimalScaled(scale) => raw
                .parse::<i32>()
                .map(|r| TypedValue::Int(scale.from_raw(r) as i64))
                .map_err(|_| DecodeError::InvalidInteger(raw.to_string())),
            FieldKind::Lookup(table) => {
                let v = raw
                    .parse::<u32>()
                    .map_err(|_| DecodeError::InvalidInteger(raw.to_string()))?;
                Ok(match table.position(v) {
                    Some(pos) => TypedValue::Int(pos as i64),
                    None => TypedValue::Unknown(raw.to_string()),
                })
            }
            FieldKind::Enumeration(table) => Ok(match table.canonical(raw) {
                Some(token) => TypedValue::Token(token.to_string()),
                None => TypedValue::Unknown(raw.to_string()),
            }),
            FieldKind::FreeString => Ok(TypedValue::Text(raw.to_string())),
            FieldKind::Integer(range) => {
                let v = raw
                    .parse::<i64>()
                    .map_err(|_| DecodeError::InvalidInteger(raw.to_string()))?;
                Ok(if range.contains(v) {
                    TypedValue::Int(v)
                } else {
                    TypedValue::Unknown(raw.to_string())
                })
            }
            FieldKind::RetrigPhase => {
                let v = raw
                    .parse::<i32>()
                    .map_err(|_| DecodeError::InvalidInteger(raw.to_string()))?;
                if v == -1 {
                    return Ok(TypedValue::Phase(Phase::Off));
                }
                let degrees = (v as u32 / PHASE_STEP) as u16;
                Ok(TypedValue::Phase(Phase::Degrees(degrees)))
            }
        }
    }

    pub fn encode(&self, value: &TypedValue) -> Result<String, EncodeError> {
        match (self, value) {
            (_, TypedValue::Unknown(raw)) => Ok(raw.clone()),
            (FieldKind::Boolean, TypedValue::Bool(b)) => Ok(if *b { "1" } else { "0" }.to_string()),
            (FieldKind::Hex(scale), TypedValue::Int(v)) => scale.encode(*v),
            (FieldKind::DecimalScaled(scale), TypedValue::Int(v)) => {
                scale.to_raw(*v).map(|r| r.to_string())
            }
            (FieldKind::Lookup(table), TypedValue::Int(v)) => usize::try_from(*v)
                .ok()
                .and_then(|pos| table.values.get(pos))
                .map(|raw| raw.to_string())
                .ok_or(EncodeError::OutOfRange {
                    value: *v,
                    min: 0,
                    max: table.values.len() as i64 - 1,
                }),
            (FieldKind::Enumeration(table), TypedValue::Token(token)) => table
                .canonical(token)
                .map(str::to_string)
                .ok_or_else(|| EncodeError::InvalidToken {
                    table: table.name,
                    token: token.clone(),
                }),
            (FieldKind::FreeString, TypedValue::Text(s)) => Ok(s.clone()),
            (FieldKind::Integer(range), TypedValue::Int(v)) => {
                if range.contains(*v) {
                    Ok(v.to_string())
                } else {
                    Err(EncodeError::OutOfRange {
                        value: *v,
                        min: range.min,
                        max: range.max,
                    })
                }
            }
            (FieldKind::RetrigPhase, TypedValue::Phase(Phase::Off)) => Ok("-1".to_string()),
            (FieldKind::RetrigPhase, TypedValue::Phase(Phase::Degrees(d))) => {
                if *d > 360 {
                    return Err(EncodeError::OutOfRange {
                        value: *d as i64,
                        min: 0,
                        max: 360,
                    });
                }
                Ok(((*d as u32).wrapping_mul(PHASE_STEP) as i32).to_string())
            }
            (kind, value) => Err(EncodeError::TypeMismatch {
                kind: kind.label(),
                value: format!("{} {value}", value.type_name()),
            }),
        }
    }

    /// Read a value typed by a person (command line, config) for this kind.
    pub fn parse_input(&self, input: &str) -> Result<TypedValue, EncodeError> {
        let invalid = || EncodeError::InvalidInput {
            kind: self.label(),
            input: input.to_string(),
        };
        match self {
            FieldKind::Boolean => match input.to_ascii_lowercase().as_str() {
                "1" | "on" | "true" | "yes" => Ok(TypedValue::Bool(true)),
                "0" | "off" | "false" | "no" => Ok(TypedValue::Bool(false)),
                _ => Err(invalid()),
            },
            FieldKind::Hex(_)
            | FieldKind::DecimalScaled(_)
            | FieldKind::Lookup(_)
            | FieldKind::Integer(_) => input
                .trim()
                .parse::<i64>()
                .map(TypedValue::Int)
                .map_err(|_| invalid()),
            FieldKind::Enumeration(table) => table
                .canonical(input)
                .map(|t| TypedValue::Token(t.to_string()))
                .ok_or_else(|| EncodeError::InvalidToken {
                    table: table.name,
                    token: input.to_string(),
                }),
            FieldKind::FreeString => Ok(TypedValue::Text(input.to_string())),
            FieldKind::RetrigPhase => {
                if input.eq_ignore_ascii_case("off") {
                    return Ok(TypedValue::Phase(Phase::Off));
                }
                input
                    .trim()
                    .parse::<u16>()
                    .map(|d| TypedValue::Phase(Phase::Degrees(d)))
                    .map_err(|_| invalid())
            }
        }
    }
}
