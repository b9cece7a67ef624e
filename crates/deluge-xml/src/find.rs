//! Resolving paths and reading or replacing scalars in place.

use crate::error::PathError;
use crate::escape::{escape_attr, escape_text};
use crate::path::{FieldPath, Leaf, Step};
use crate::types::{Attribute, Document, Element, Node};

impl Element {
    /// The element reached by following `steps` from this element.
    pub fn descend(&self, steps: &[Step]) -> Option<&Element> {
        steps
            .iter()
            .try_fold(self, |el, step| el.child(&step.name, step.index))
    }

    pub fn descend_mut(&mut self, steps: &[Step]) -> Option<&mut Element> {
        let mut el = self;
        for step in steps {
            el = el.child_mut(&step.name, step.index)?;
        }
        Some(el)
    }

    /// Decoded scalar at `leaf`, or `None` if it is absent.
    pub fn get_leaf(&self, leaf: &Leaf) -> Option<String> {
        match leaf {
            Leaf::Attribute(name) => self.attr(name),
            Leaf::Text => self.text(),
            Leaf::Value(name) => self
                .attr(name)
                .or_else(|| self.child(name, 0).and_then(Element::text)),
        }
    }

    /// Replace the scalar at `leaf`. Returns `Ok(false)` when the decoded
    /// value already equals `value`, in which case nothing is touched.
    pub fn set_leaf(&mut self, leaf: &Leaf, value: &str) -> Result<bool, PathError> {
        match leaf {
            Leaf::Attribute(name) => match self.attribute_mut(name) {
                Some(attr) => Ok(set_attribute(attr, value)),
                None => Err(PathError::NotFound(format!("@{name}"))),
            },
            Leaf::Text => self.set_text(value),
            Leaf::Value(name) => {
                if let Some(attr) = self.attribute_mut(name) {
                    return Ok(set_attribute(attr, value));
                }
                match self.child_mut(name, 0) {
                    Some(child) => child.set_text(value),
                    None => Err(PathError::NotFound(name.clone())),
                }
            }
        }
    }

    /// Replace the character content, keeping comments and instructions.
    pub fn set_text(&mut self, value: &str) -> Result<bool, PathError> {
        if self.has_element_children() {
            return Err(PathError::NotText(self.name.clone()));
        }
        if self.text().as_deref() == Some(value) {
            return Ok(false);
        }
        let replaced = match self.children.as_mut_slice() {
            [Node::Text(raw)] => {
                *raw = escape_text(value);
                true
            }
            [Node::CData(raw)] if !value.contains("]]>") => {
                *raw = value.to_string();
                true
            }
            _ => false,
        };
        if !replaced {
            let at = self
                .children
                .iter()
                .position(|n| matches!(n, Node::Text(_) | Node::CData(_)))
                .unwrap_or(0);
            self.children
                .retain(|n| !matches!(n, Node::Text(_) | Node::CData(_)));
            self.children.insert(at, Node::Text(escape_text(value)));
        }
        if self.trivia.self_closing {
            self.trivia.open_tail.clear();
            self.trivia.self_closing = false;
        }
        Ok(true)
    }

    /// Add attribute `name`, formatted like the element's last attribute.
    pub fn push_attribute(&mut self, name: &str, value: &str) {
        let attr = match self.attributes.last() {
            Some(prev) => Attribute {
                leading: if prev.leading.is_empty() {
                    " ".to_string()
                } else {
                    prev.leading.clone()
                },
                name: name.to_string(),
                equals: prev.equals.clone(),
                quote: prev.quote,
                raw: escape_attr(value, prev.quote),
            },
            None => Attribute::new(name, value),
        };
        self.attributes.push(attr);
    }
}

fn set_attribute(attr: &mut Attribute, value: &str) -> bool {
    if attr.value() == value {
        return false;
    }
    attr.raw = escape_attr(value, attr.quote);
    true
}

fn with_path(err: PathError, path: &FieldPath) -> PathError {
    match err {
        PathError::NotFound(_) => PathError::NotFound(path.to_string()),
        PathError::NotText(_) => PathError::NotText(path.to_string()),
        other => other,
    }
}

impl Document {
    /// The element addressed by `steps`; the first step selects among the
    /// top-level elements.
    pub fn element(&self, steps: &[Step]) -> Option<&Element> {
        let (first, rest) = steps.split_first()?;
        self.root(&first.name, first.index)?.descend(rest)
    }

    pub fn element_mut(&mut self, steps: &[Step]) -> Option<&mut Element> {
        let (first, rest) = steps.split_first()?;
        self.root_mut(&first.name, first.index)?.descend_mut(rest)
    }

    pub fn get_scalar(&self, path: &FieldPath) -> Result<String, PathError> {
        self.element(&path.steps)
            .and_then(|el| el.get_leaf(&path.leaf))
            .ok_or_else(|| PathError::NotFound(path.to_string()))
    }

    /// Replace the scalar at `path` and nothing else. Returns whether the
    /// tree changed.
    pub fn set_scalar(&mut self, path: &FieldPath, value: &str) -> Result<bool, PathError> {
        let el = self
            .element_mut(&path.steps)
            .ok_or_else(|| PathError::NotFound(path.to_string()))?;
        el.set_leaf(&path.leaf, value).map_err(|e| with_path(e, path))
    }

    /// Like [`Document::set_scalar`], but a missing attribute or value leaf
    /// is created on the addressed element. Value leaves become attributes
    /// unless the element already stores its scalars as child elements.
    pub fn upsert_scalar(&mut self, path: &FieldPath, value: &str) -> Result<bool, PathError> {
        let exists = self
            .element(&path.steps)
            .ok_or_else(|| PathError::NotFound(path.to_string()))?
            .get_leaf(&path.leaf)
            .is_some();
        if exists || path.leaf == Leaf::Text {
            return self.set_scalar(path, value);
        }
        let as_child = match (&path.leaf, self.element(&path.steps)) {
            (Leaf::Value(_), Some(el)) => el.attributes.is_empty() && el.has_element_children(),
            _ => false,
        };
        match &path.leaf {
            Leaf::Value(name) if as_child => {
                self.append_element(&path.steps, Element::new(name).with_text(value))?;
            }
            Leaf::Attribute(name) | Leaf::Value(name) => {
                let el = self
                    .element_mut(&path.steps)
                    .ok_or_else(|| PathError::NotFound(path.to_string()))?;
                el.push_attribute(name, value);
            }
            Leaf::Text => {}
        }
        Ok(true)
    }
}
