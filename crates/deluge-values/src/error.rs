use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("not a 32-bit hex value: {0:?}")]
    InvalidHex(String),
    #[error("not a decimal integer: {0:?}")]
    InvalidInteger(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("{value} is outside {min}..={max}")]
    OutOfRange { value: i64, min: i64, max: i64 },
    #[error("a {kind} field cannot hold {value}")]
    TypeMismatch { kind: &'static str, value: String },
    #[error("{token:?} is not a valid {table} token")]
    InvalidToken { table: &'static str, token: String },
    #[error("cannot read {input:?} as a {kind} value")]
    InvalidInput { kind: &'static str, input: String },
}
