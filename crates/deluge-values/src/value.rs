use std::fmt;

use serde::Serialize;

/// Oscillator retrigger phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Free-running, written as `-1`.
    Off,
    Degrees(u16),
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TypedValue {
    Bool(bool),
    Int(i64),
    Token(String),
    Text(String),
    Phase(Phase),
    /// A raw value outside the known vocabulary or range. Writing it back
    /// reproduces the raw string exactly.
    Unknown(String),
}

impl TypedValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            TypedValue::Bool(_) => "bool",
            TypedValue::Int(_) => "int",
            TypedValue::Token(_) => "token",
            TypedValue::Text(_) => "text",
            TypedValue::Phase(_) => "phase",
            TypedValue::Unknown(_) => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TypedValue::Unknown(_))
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Bool(b) => write!(f, "{}", if *b { "on" } else { "off" }),
            TypedValue::Int(v) => write!(f, "{v}"),
            TypedValue::Token(s) | TypedValue::Text(s) => f.write_str(s),
            TypedValue::Phase(Phase::Off) => f.write_str("off"),
            TypedValue::Phase(Phase::Degrees(d)) => write!(f, "{d}"),
            TypedValue::Unknown(raw) => write!(f, "{raw} (unrecognized)"),
        }
    }
}
