//! Error types for parsing and path resolution.

use thiserror::Error;

/// What went wrong while parsing, without the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedEof,
    InvalidName,
    ExpectedEquals,
    ExpectedQuote,
    UnterminatedAttribute,
    UnterminatedComment,
    UnterminatedCData,
    UnterminatedInstruction,
    UnterminatedDeclaration,
    MismatchedClose,
    StrayClose,
    MissingRoot,
    InvalidUtf8,
    TooDeep,
}

impl ParseErrorKind {
    fn describe(&self) -> &'static str {
        match self {
            ParseErrorKind::UnexpectedEof => "unexpected end of input",
            ParseErrorKind::InvalidName => "invalid name",
            ParseErrorKind::ExpectedEquals => "expected '=' after attribute name",
            ParseErrorKind::ExpectedQuote => "expected quoted attribute value",
            ParseErrorKind::UnterminatedAttribute => "unterminated attribute value",
            ParseErrorKind::UnterminatedComment => "unterminated comment",
            ParseErrorKind::UnterminatedCData => "unterminated CDATA section",
            ParseErrorKind::UnterminatedInstruction => "unterminated processing instruction",
            ParseErrorKind::UnterminatedDeclaration => "unterminated declaration",
            ParseErrorKind::MismatchedClose => "closing tag does not match open element",
            ParseErrorKind::StrayClose => "closing tag without open element",
            ParseErrorKind::MissingRoot => "document has no element",
            ParseErrorKind::InvalidUtf8 => "input is not valid UTF-8",
            ParseErrorKind::TooDeep => "elements nested too deeply",
        }
    }
}

/// A parse failure at a byte offset of the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} at byte {offset}", kind.describe())]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub offset: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
    #[error("NOT_TEXT: {0} has element children")]
    NotText(String),
    #[error("INVALID_PATH: {0}")]
    Syntax(String),
    #[error("INVALID_NAME: {0}")]
    InvalidName(String),
}
