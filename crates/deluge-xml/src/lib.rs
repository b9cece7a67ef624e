//! Lossless XML document tree.
//!
//! Parses a document into a tree that keeps every byte the input carried
//! (attribute order, quote style, whitespace inside tags, comments,
//! declarations) so that `serialize(parse(b)) == b` holds for every
//! well-formed input. Scalar values are addressed with [`FieldPath`] and
//! edited in place without disturbing anything around them.

mod decoder;
mod edit;
mod encoder;
mod error;
mod escape;
mod find;
mod path;
mod types;

pub use decoder::{parse, XmlDecoder, MAX_DEPTH};
pub use encoder::{serialize, serialize_element};
pub use error::{ParseError, ParseErrorKind, PathError};
pub use escape::{escape_attr, escape_text, unescape};
pub use path::{format_path, parse_path, FieldPath, Leaf, Step};
pub use types::{Attribute, Document, Element, Node, TagTrivia};
