//! Hex-scaled ranges.
//!
//! The firmware stores most continuous parameters as a signed 32-bit
//! integer written in hex. The full i32 span is mapped linearly onto a small
//! integer range such as `0..=50`: `0x80000000` is the minimum and
//! `0x7FFFFFFF` the maximum.

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, EncodeError};

/// How the raw distance between two neighbouring values is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepRule {
    /// `u32::MAX / span`, truncated. The midpoint is pinned to `0`.
    #[default]
    Truncated,
    /// `2^32 / span`. Exact for power-of-two spans.
    PowerOfTwo,
}

/// A linear mapping between the i32 span and `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexScale {
    pub min: i32,
    pub max: i32,
    #[serde(default)]
    pub step: StepRule,
}

/// Unsigned 0..=50 parameters (volumes, rates, envelope stages).
pub const HEX_U50: HexScale = HexScale::new(0, 50, StepRule::Truncated);
/// Bipolar -50..=50 amounts (patch cable depth).
pub const SIGNED_50: HexScale = HexScale::new(-50, 50, StepRule::Truncated);
/// Stereo pan, -32 (left) ..= 32 (right).
pub const PAN: HexScale = HexScale::new(-32, 32, StepRule::PowerOfTwo);

impl HexScale {
    pub const fn new(min: i32, max: i32, step: StepRule) -> Self {
        Self { min, max, step }
    }

    pub fn is_valid(&self) -> bool {
        self.min < self.max
    }

    fn span(&self) -> i64 {
        self.max as i64 - self.min as i64
    }

    fn step_size(&self) -> i64 {
        match self.step {
            StepRule::Truncated => u32::MAX as i64 / self.span(),
            StepRule::PowerOfTwo => (1i64 << 32) / self.span(),
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.min as i64 && value <= self.max as i64
    }

    /// The raw i32 written for `value`.
    pub fn to_raw(&self, value: i64) -> Result<i32, EncodeError> {
        if !self.contains(value) {
            return Err(EncodeError::OutOfRange {
                value,
                min: self.min as i64,
                max: self.max as i64,
            });
        }
        let offset = value - self.min as i64;
        if value == self.max as i64 {
            return Ok(i32::MAX);
        }
        if offset * 2 == self.span() {
            return Ok(0);
        }
        Ok((i32::MIN as i64 + offset * self.step_size()) as i32)
    }

    /// The nearest value of the range for a raw i32.
    pub fn from_raw(&self, raw: i32) -> i32 {
        let offset = raw as i64 - i32::MIN as i64;
        let scaled = (offset as f64 * self.span() as f64 / u32::MAX as f64).round() as i64;
        (self.min as i64 + scaled).clamp(self.min as i64, self.max as i64) as i32
    }

    pub fn encode(&self, value: i64) -> Result<String, EncodeError> {
        self.to_raw(value).map(format_hex)
    }

    pub fn decode(&self, raw: &str) -> Result<i32, DecodeError> {
        parse_hex(raw).map(|r| self.from_raw(r))
    }
}

/// `0x` followed by eight upper-case digits.
pub fn format_hex(raw: i32) -> String {
    format!("{:#010X}", raw as u32)
}

/// Accepts an optional `0x`/`0X` prefix and one to eight hex digits.
pub fn parse_hex(raw: &str) -> Result<i32, DecodeError> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if digits.is_empty() || digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DecodeError::InvalidHex(raw.to_string()));
    }
    u32::from_str_radix(digits, 16)
        .map(|v| v as i32)
        .map_err(|_| DecodeError::InvalidHex(raw.to_string()))
}
