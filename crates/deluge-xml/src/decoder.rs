//! `XmlDecoder`: byte-level reader producing a lossless [`Document`].
//!
//! The decoder never normalizes. Whatever it skips over (whitespace inside
//! tags, the spelling of `=`, the quote character) is captured into the
//! tree so the encoder can write it back unchanged.

use crate::error::{ParseError, ParseErrorKind};
use crate::types::{Attribute, Document, Element, Node, TagTrivia};

/// Deepest element nesting the decoder accepts.
pub const MAX_DEPTH: usize = 256;

pub struct XmlDecoder {
    pub data: Vec<u8>,
    pub x: usize,
    depth: usize,
}

impl Default for XmlDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `input` into a document.
pub fn parse(input: &[u8]) -> Result<Document, ParseError> {
    let doc = XmlDecoder::new().decode(input)?;
    tracing::debug!(bytes = input.len(), nodes = doc.nodes.len(), "parsed document");
    Ok(doc)
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':' || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || b.is_ascii_digit() || b == b'-' || b == b'.'
}

impl XmlDecoder {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            x: 0,
            depth: 0,
        }
    }

    pub fn decode(&mut self, input: &[u8]) -> Result<Document, ParseError> {
        if let Err(e) = std::str::from_utf8(input) {
            return Err(self.err_at(ParseErrorKind::InvalidUtf8, e.valid_up_to()));
        }
        self.data = input.to_vec();
        self.x = 0;
        self.depth = 0;

        let mut nodes = Vec::new();
        while self.x < self.data.len() {
            if self.starts_with(b"</") {
                return Err(self.err(ParseErrorKind::StrayClose));
            }
            nodes.push(self.read_node()?);
        }
        if !nodes.iter().any(|n| matches!(n, Node::Element(_))) {
            return Err(self.err_at(ParseErrorKind::MissingRoot, 0));
        }
        Ok(Document { nodes })
    }

    // ── Helpers ────────────────────────────────────────────────────────────

    fn err(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.x)
    }

    fn err_at(&self, kind: ParseErrorKind, offset: usize) -> ParseError {
        ParseError::new(kind, offset)
    }

    fn starts_with(&self, prefix: &[u8]) -> bool {
        self.data[self.x..].starts_with(prefix)
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.x).copied()
    }

    fn text(&self, start: usize, end: usize) -> Result<String, ParseError> {
        String::from_utf8(self.data[start..end].to_vec())
            .map_err(|_| self.err_at(ParseErrorKind::InvalidUtf8, start))
    }

    fn find_from(&self, from: usize, needle: &[u8]) -> Option<usize> {
        self.data[from..]
            .windows(needle.len())
            .position(|w| w == needle)
            .map(|p| p + from)
    }

    fn read_space(&mut self) -> Result<String, ParseError> {
        let start = self.x;
        while self.peek().is_some_and(is_space) {
            self.x += 1;
        }
        self.text(start, self.x)
    }

    // ── Nodes ──────────────────────────────────────────────────────────────

    pub fn read_node(&mut self) -> Result<Node, ParseError> {
        if self.peek() != Some(b'<') {
            return self.read_text();
        }
        if self.starts_with(b"<!--") {
            self.read_delimited(4, b"-->", ParseErrorKind::UnterminatedComment)
                .map(Node::Comment)
        } else if self.starts_with(b"<![CDATA[") {
            self.read_delimited(9, b"]]>", ParseErrorKind::UnterminatedCData)
                .map(Node::CData)
        } else if self.starts_with(b"<?") {
            self.read_delimited(2, b"?>", ParseErrorKind::UnterminatedInstruction)
                .map(Node::Instruction)
        } else if self.starts_with(b"<!") {
            self.read_declaration()
        } else {
            self.read_element().map(Node::Element)
        }
    }

    pub fn read_text(&mut self) -> Result<Node, ParseError> {
        let start = self.x;
        while self.peek().is_some_and(|b| b != b'<') {
            self.x += 1;
        }
        Ok(Node::Text(self.text(start, self.x)?))
    }

    /// Read `open`-length prefix, then everything up to `close`.
    fn read_delimited(
        &mut self,
        open: usize,
        close: &[u8],
        kind: ParseErrorKind,
    ) -> Result<String, ParseError> {
        let start = self.x;
        let inner = start + open;
        let end = self
            .find_from(inner, close)
            .ok_or_else(|| self.err_at(kind, start))?;
        self.x = end + close.len();
        self.text(inner, end)
    }

    /// `<!DOCTYPE ...>` and similar. Brackets of an internal subset and
    /// quoted literals may contain `>`.
    fn read_declaration(&mut self) -> Result<Node, ParseError> {
        let start = self.x;
        let inner = start + 2;
        let mut depth = 0usize;
        let mut quote: Option<u8> = None;
        let mut x = inner;
        while x < self.data.len() {
            let b = self.data[x];
            match quote {
                Some(q) if b == q => quote = None,
                Some(_) => {}
                None => match b {
                    b'"' | b'\'' => quote = Some(b),
                    b'[' => depth += 1,
                    b']' => depth = depth.saturating_sub(1),
                    b'>' if depth == 0 => {
                        self.x = x + 1;
                        return Ok(Node::Declaration(self.text(inner, x)?));
                    }
                    _ => {}
                },
            }
            x += 1;
        }
        Err(self.err_at(ParseErrorKind::UnterminatedDeclaration, start))
    }

    // ── Elements ───────────────────────────────────────────────────────────

    pub fn read_name(&mut self) -> Result<String, ParseError> {
        let start = self.x;
        match self.peek() {
            Some(b) if is_name_start(b) => self.x += 1,
            Some(_) => return Err(self.err(ParseErrorKind::InvalidName)),
            None => return Err(self.err(ParseErrorKind::UnexpectedEof)),
        }
        while self.peek().is_some_and(is_name_char) {
            self.x += 1;
        }
        self.text(start, self.x)
    }

    pub fn read_element(&mut self) -> Result<Element, ParseError> {
        let open_at = self.x;
        self.x += 1; // <
        let name = self.read_name()?;
        let mut attributes = Vec::new();
        let mut trivia = TagTrivia::default();

        loop {
            let ws = self.read_space()?;
            match self.peek() {
                None => return Err(self.err(ParseErrorKind::UnexpectedEof)),
                Some(b'>') => {
                    self.x += 1;
                    trivia.open_tail = ws;
                    break;
                }
                Some(b'/') => {
                    if self.data.get(self.x + 1) != Some(&b'>') {
                        return Err(self.err(ParseErrorKind::InvalidName));
                    }
                    self.x += 2;
                    trivia.open_tail = ws;
                    trivia.self_closing = true;
                    return Ok(Element {
                        name,
                        attributes,
                        children: Vec::new(),
                        trivia,
                    });
                }
                Some(_) => attributes.push(self.read_attribute(ws)?),
            }
        }

        if self.depth >= MAX_DEPTH {
            return Err(self.err_at(ParseErrorKind::TooDeep, open_at));
        }
        self.depth += 1;
        let children = self.read_content(&name, &mut trivia)?;
        self.depth -= 1;

        Ok(Element {
            name,
            attributes,
            children,
            trivia,
        })
    }

    /// Children of an open element, through its closing tag.
    fn read_content(
        &mut self,
        name: &str,
        trivia: &mut TagTrivia,
    ) -> Result<Vec<Node>, ParseError> {
        let mut children = Vec::new();
        loop {
            if self.x >= self.data.len() {
                return Err(self.err(ParseErrorKind::UnexpectedEof));
            }
            if self.starts_with(b"</") {
                let close_at = self.x;
                self.x += 2;
                let close = self.read_name()?;
                if close != name {
                    return Err(self.err_at(ParseErrorKind::MismatchedClose, close_at));
                }
                trivia.close_tail = self.read_space()?;
                match self.peek() {
                    Some(b'>') => self.x += 1,
                    Some(_) => return Err(self.err(ParseErrorKind::InvalidName)),
                    None => return Err(self.err(ParseErrorKind::UnexpectedEof)),
                }
                break;
            }
            children.push(self.read_node()?);
        }
        Ok(children)
    }

    pub fn read_attribute(&mut self, leading: String) -> Result<Attribute, ParseError> {
        let name = self.read_name()?;
        let eq_start = self.x;
        self.read_space()?;
        if self.peek() != Some(b'=') {
            return Err(self.err(ParseErrorKind::ExpectedEquals));
        }
        self.x += 1;
        self.read_space()?;
        let equals = self.text(eq_start, self.x)?;
        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            Some(_) => return Err(self.err(ParseErrorKind::ExpectedQuote)),
            None => return Err(self.err(ParseErrorKind::UnexpectedEof)),
        };
        let value_start = self.x + 1;
        let end = self.data[value_start..]
            .iter()
            .position(|&b| b == quote)
            .map(|p| p + value_start)
            .ok_or_else(|| self.err_at(ParseErrorKind::UnterminatedAttribute, self.x))?;
        self.x = end + 1;
        Ok(Attribute {
            leading,
            name,
            equals,
            quote,
            raw: self.text(value_start, end)?,
        })
    }
}
