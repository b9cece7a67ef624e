//! Tree types.
//!
//! Every string held here is the raw source text: attribute values and text
//! nodes keep their entity references, comments keep their inner bytes. The
//! decoded view is produced on demand by [`crate::unescape`].

// ── Nodes ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data between markup, escaped as written.
    Text(String),
    /// Contents between `<!--` and `-->`.
    Comment(String),
    /// Contents between `<![CDATA[` and `]]>`.
    CData(String),
    /// Contents between `<?` and `?>`, including the target name.
    Instruction(String),
    /// Contents between `<!` and `>` for anything that is not a comment or
    /// CDATA section (doctype and friends).
    Declaration(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// True for a text node made only of XML whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Node::Text(t) => t.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r')),
            _ => false,
        }
    }
}

// ── Attributes ─────────────────────────────────────────────────────────────

/// One attribute with the formatting it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Whitespace between the previous token and the name.
    pub leading: String,
    pub name: String,
    /// Everything between the name and the opening quote, `=` included.
    pub equals: String,
    /// `b'"'` or `b'\''`.
    pub quote: u8,
    /// Escaped value as written between the quotes.
    pub raw: String,
}

impl Attribute {
    /// A new attribute written as ` name="value"`.
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            leading: " ".to_string(),
            name: name.to_string(),
            equals: "=".to_string(),
            quote: b'"',
            raw: crate::escape_attr(value, b'"'),
        }
    }

    pub fn value(&self) -> String {
        crate::unescape(&self.raw)
    }
}

// ── Elements ───────────────────────────────────────────────────────────────

/// Formatting of an element's tags that is not attribute-specific.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTrivia {
    /// Whitespace after the last attribute, before `>` or `/>`.
    pub open_tail: String,
    /// Written as `<name/>`; such an element has no children.
    pub self_closing: bool,
    /// Whitespace between the closing tag name and `>`.
    pub close_tail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    pub trivia: TagTrivia,
}

impl Element {
    /// An empty element written as `<name/>`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
            trivia: TagTrivia {
                self_closing: true,
                ..TagTrivia::default()
            },
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn with_text(mut self, value: &str) -> Self {
        self.trivia.self_closing = false;
        self.children.push(Node::Text(crate::escape_text(value)));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|a| a.name == name)
    }

    /// Decoded value of attribute `name`.
    pub fn attr(&self, name: &str) -> Option<String> {
        self.attribute(name).map(Attribute::value)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.name == name)
    }

    /// The `index`-th child element called `name`.
    pub fn child(&self, name: &str, index: usize) -> Option<&Element> {
        self.elements().filter(|e| e.name == name).nth(index)
    }

    pub fn child_mut(&mut self, name: &str, index: usize) -> Option<&mut Element> {
        self.children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .filter(|e| e.name == name)
            .nth(index)
    }

    pub fn has_element_children(&self) -> bool {
        self.elements().next().is_some()
    }

    /// Decoded character content, if the element holds no child elements.
    pub fn text(&self) -> Option<String> {
        if self.has_element_children() {
            return None;
        }
        let mut out = String::new();
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(&crate::unescape(t)),
                Node::CData(c) => out.push_str(c),
                _ => {}
            }
        }
        Some(out)
    }
}

// ── Document ───────────────────────────────────────────────────────────────

/// A parsed document: every top-level node in source order.
///
/// Files written by older firmware carry several top-level elements (a
/// version element next to the patch element), so the root is a node list
/// rather than a single element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub nodes: Vec<Node>,
}

impl Document {
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(Node::as_element)
    }

    /// The `index`-th top-level element called `name`.
    pub fn root(&self, name: &str, index: usize) -> Option<&Element> {
        self.elements().filter(|e| e.name == name).nth(index)
    }

    pub fn root_mut(&mut self, name: &str, index: usize) -> Option<&mut Element> {
        self.nodes
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .filter(|e| e.name == name)
            .nth(index)
    }
}
