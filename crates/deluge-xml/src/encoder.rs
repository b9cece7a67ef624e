//! Serializer writing a [`Document`] back to bytes.

use crate::types::{Document, Element, Node};

/// Serialize a document. For a tree produced by [`crate::parse`] and not
/// edited since, the output equals the parsed input byte for byte.
pub fn serialize(doc: &Document) -> Vec<u8> {
    let mut out = String::new();
    for node in &doc.nodes {
        write_node(&mut out, node);
    }
    tracing::debug!(bytes = out.len(), "serialized document");
    out.into_bytes()
}

/// Serialize a single element subtree.
pub fn serialize_element(el: &Element) -> String {
    let mut out = String::new();
    write_element(&mut out, el);
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(el) => write_element(out, el),
        Node::Text(raw) => out.push_str(raw),
        Node::Comment(raw) => {
            out.push_str("<!--");
            out.push_str(raw);
            out.push_str("-->");
        }
        Node::CData(raw) => {
            out.push_str("<![CDATA[");
            out.push_str(raw);
            out.push_str("]]>");
        }
        Node::Instruction(raw) => {
            out.push_str("<?");
            out.push_str(raw);
            out.push_str("?>");
        }
        Node::Declaration(raw) => {
            out.push_str("<!");
            out.push_str(raw);
            out.push('>');
        }
    }
}

fn write_element(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.name);
    for attr in &el.attributes {
        let quote = attr.quote as char;
        out.push_str(&attr.leading);
        out.push_str(&attr.name);
        out.push_str(&attr.equals);
        out.push(quote);
        out.push_str(&attr.raw);
        out.push(quote);
    }
    out.push_str(&el.trivia.open_tail);
    if el.trivia.self_closing && el.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &el.children {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(&el.name);
    out.push_str(&el.trivia.close_tail);
    out.push('>');
}
