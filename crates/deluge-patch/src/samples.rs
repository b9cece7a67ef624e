//! Sample file references anywhere in a patch.
//!
//! Newer files carry a sample path as a `fileName` attribute of an
//! oscillator or sample range, older ones as a `fileName` child element.
//! Both are found and rewritten in place; nothing else in the tree moves.

use std::collections::BTreeMap;

use deluge_xml::{Document, Element, Leaf, Node, PathError};

pub const FILE_NAME: &str = "fileName";

/// Every non-empty sample path in document order.
pub fn sample_paths(doc: &Document) -> Vec<String> {
    let mut paths = Vec::new();
    for el in doc.elements() {
        collect(el, &mut paths);
    }
    paths
}

fn collect(el: &Element, paths: &mut Vec<String>) {
    if let Some(path) = el.attr(FILE_NAME).filter(|p| !p.is_empty()) {
        paths.push(path);
    }
    if el.name == FILE_NAME {
        if let Some(path) = el.text().filter(|p| !p.is_empty()) {
            paths.push(path);
        }
    }
    for child in el.elements() {
        collect(child, paths);
    }
}

/// A set of `from → to` sample path replacements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleRemap {
    paths: BTreeMap<String, String>,
}

impl SampleRemap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the mapping for `from`. Returns the previous target.
    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) -> Option<String> {
        self.paths.insert(from.into(), to.into())
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn target(&self, from: &str) -> Option<&str> {
        self.paths.get(from).map(String::as_str)
    }

    /// Rewrite every matching path. Returns how many references changed.
    pub fn apply(&self, doc: &mut Document) -> Result<usize, PathError> {
        let mut changed = 0;
        for el in doc.nodes.iter_mut().filter_map(Node::as_element_mut) {
            changed += self.rewrite(el)?;
        }
        Ok(changed)
    }

    fn rewrite(&self, el: &mut Element) -> Result<usize, PathError> {
        let mut changed = 0;
        if let Some(to) = el.attr(FILE_NAME).and_then(|from| self.paths.get(&from)) {
            changed += usize::from(el.set_leaf(&Leaf::Attribute(FILE_NAME.to_string()), to)?);
        }
        if el.name == FILE_NAME && !el.has_element_children() {
            if let Some(to) = el.text().and_then(|from| self.paths.get(&from)) {
                changed += usize::from(el.set_text(to)?);
            }
        }
        for child in el.children.iter_mut().filter_map(Node::as_element_mut) {
            changed += self.rewrite(child)?;
        }
        Ok(changed)
    }
}
