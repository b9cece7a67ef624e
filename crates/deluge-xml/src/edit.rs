//! Structural edits: inserting and removing whole elements.
//!
//! Only used for edits that change the shape of the tree (adding or
//! removing a list entry). New elements pick up the indentation of their
//! neighbours so the file keeps its layout.

use crate::error::PathError;
use crate::path::Step;
use crate::types::{Document, Element, Node};

fn step_label(steps: &[Step]) -> String {
    steps
        .iter()
        .map(|s| format!("{}[{}]", s.name, s.index))
        .collect::<Vec<_>>()
        .join(".")
}

/// Node position of the `step.index`-th element called `step.name`.
fn position_of(nodes: &[Node], step: &Step) -> Option<usize> {
    nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| matches!(n, Node::Element(e) if e.name == step.name))
        .nth(step.index)
        .map(|(i, _)| i)
}

/// The blank text right before node `pos`, if any.
fn separator_before(nodes: &[Node], pos: usize) -> Option<&str> {
    match pos.checked_sub(1).map(|p| &nodes[p]) {
        Some(node @ Node::Text(t)) if node.is_blank() => Some(t.as_str()),
        _ => None,
    }
}

/// Indentation of the last line of a separator.
fn indent_of(separator: &str) -> &str {
    match separator.rfind('\n') {
        Some(nl) => &separator[nl + 1..],
        None => "",
    }
}

impl Document {
    fn nodes_of(&self, parent: &[Step]) -> Option<&Vec<Node>> {
        if parent.is_empty() {
            Some(&self.nodes)
        } else {
            self.element(parent).map(|e| &e.children)
        }
    }

    fn nodes_of_mut(&mut self, parent: &[Step]) -> Option<&mut Vec<Node>> {
        if parent.is_empty() {
            Some(&mut self.nodes)
        } else {
            self.element_mut(parent).map(|e| &mut e.children)
        }
    }

    /// Number of child elements called `name` under `parent`.
    pub fn element_count(&self, parent: &[Step], name: &str) -> usize {
        self.nodes_of(parent)
            .map(|nodes| {
                nodes
                    .iter()
                    .filter(|n| matches!(n, Node::Element(e) if e.name == name))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Indentation of the line the element at `at` starts on.
    fn line_indent(&self, at: &[Step]) -> String {
        let Some((last, parent)) = at.split_last() else {
            return String::new();
        };
        self.nodes_of(parent)
            .and_then(|nodes| {
                let pos = position_of(nodes, last)?;
                separator_before(nodes, pos).map(|sep| indent_of(sep).to_string())
            })
            .unwrap_or_default()
    }

    /// Insert `child` as the next sibling of the element at `at`, on its own
    /// line with the same indentation.
    pub fn insert_element_after(&mut self, at: &[Step], child: Element) -> Result<(), PathError> {
        let (last, parent) = at
            .split_last()
            .ok_or_else(|| PathError::NotFound(String::new()))?;
        let nodes = self
            .nodes_of_mut(parent)
            .ok_or_else(|| PathError::NotFound(step_label(at)))?;
        let pos = position_of(nodes, last).ok_or_else(|| PathError::NotFound(step_label(at)))?;
        let separator = separator_before(nodes, pos).map(str::to_string);
        let mut insert_at = pos + 1;
        if let Some(sep) = separator {
            nodes.insert(insert_at, Node::Text(sep));
            insert_at += 1;
        }
        nodes.insert(insert_at, Node::Element(child));
        Ok(())
    }

    /// Append `child` after the last child element of `parent`. Returns the
    /// new element's index among its same-named siblings.
    pub fn append_element(&mut self, parent: &[Step], child: Element) -> Result<usize, PathError> {
        let name = child.name.clone();
        let index = self.element_count(parent, &name);
        let parent_el = self
            .element(parent)
            .ok_or_else(|| PathError::NotFound(step_label(parent)))?;

        let last_child = parent_el.elements().last().map(|e| e.name.clone());

        if let Some(last_name) = last_child {
            let last_index = self.element_count(parent, &last_name) - 1;
            let mut at = parent.to_vec();
            at.push(Step::new(&last_name, last_index));
            self.insert_element_after(&at, child)?;
            return Ok(index);
        }

        let outer = self.line_indent(parent);
        let unit = if outer.contains(' ') && !outer.contains('\t') {
            "  "
        } else {
            "\t"
        };
        let el = self
            .element_mut(parent)
            .ok_or_else(|| PathError::NotFound(step_label(parent)))?;
        if el.trivia.self_closing {
            el.trivia.open_tail.clear();
            el.trivia.self_closing = false;
        }
        if el.children.iter().all(Node::is_blank) {
            el.children = vec![
                Node::Text(format!("\n{outer}{unit}")),
                Node::Element(child),
                Node::Text(format!("\n{outer}")),
            ];
        } else {
            el.children.push(Node::Element(child));
        }
        Ok(index)
    }

    /// Remove the element at `at` together with the indentation before it.
    pub fn remove_element(&mut self, at: &[Step]) -> Result<Element, PathError> {
        let (last, parent) = at
            .split_last()
            .ok_or_else(|| PathError::NotFound(String::new()))?;
        let nodes = self
            .nodes_of_mut(parent)
            .ok_or_else(|| PathError::NotFound(step_label(at)))?;
        let pos = position_of(nodes, last).ok_or_else(|| PathError::NotFound(step_label(at)))?;
        let removed = match nodes.remove(pos) {
            Node::Element(el) => el,
            _ => return Err(PathError::NotFound(step_label(at))),
        };
        if separator_before(nodes, pos).is_some() {
            nodes.remove(pos - 1);
        }
        Ok(removed)
    }
}
