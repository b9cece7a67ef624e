//! Field paths: `name[index]` steps down the element tree plus a leaf.
//!
//! Text syntax is dotted: `sound.osc1.retrigPhase`,
//! `kit.soundSources.sound[2].@name`, `oscillator[1].#text`. An index
//! counts same-named siblings only and defaults to 0.

use std::fmt;
use std::str::FromStr;

use crate::error::PathError;

/// One element step: the `index`-th child called `name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Step {
    pub name: String,
    pub index: usize,
}

impl Step {
    pub fn new(name: &str, index: usize) -> Self {
        Self {
            name: name.to_string(),
            index,
        }
    }
}

/// Where the scalar lives once the element is reached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Leaf {
    /// `@name`: only the attribute.
    Attribute(String),
    /// `#text`: the element's own character content.
    Text,
    /// Bare `name`: attribute `name`, otherwise the text of the first child
    /// element `name`. Newer files store scalars as attributes, older ones
    /// as child elements.
    Value(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    pub steps: Vec<Step>,
    pub leaf: Leaf,
}

impl FieldPath {
    pub fn new(steps: Vec<Step>, leaf: Leaf) -> Self {
        Self { steps, leaf }
    }

    /// This path re-rooted below `base`.
    pub fn under(&self, base: &[Step]) -> FieldPath {
        let mut steps = base.to_vec();
        steps.extend(self.steps.iter().cloned());
        FieldPath {
            steps,
            leaf: self.leaf.clone(),
        }
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_path(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_path(self))
    }
}

pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' || b == b':' || b >= 0x80 => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b':' | b'-' | b'.') || b >= 0x80)
}

fn parse_step(segment: &str, full: &str) -> Result<Step, PathError> {
    let (name, index) = match segment.find('[') {
        Some(open) => {
            let rest = &segment[open + 1..];
            let digits = rest
                .strip_suffix(']')
                .ok_or_else(|| PathError::Syntax(full.to_string()))?;
            let index = digits
                .parse::<usize>()
                .map_err(|_| PathError::Syntax(full.to_string()))?;
            (&segment[..open], index)
        }
        None => (segment, 0),
    };
    if !is_valid_name(name) {
        return Err(PathError::InvalidName(name.to_string()));
    }
    Ok(Step::new(name, index))
}

/// Parse the dotted text form of a path.
///
/// A final segment with an explicit index (`osc[1]`) addresses that
/// element's text.
pub fn parse_path(s: &str) -> Result<FieldPath, PathError> {
    if s.is_empty() {
        return Err(PathError::Syntax(s.to_string()));
    }
    let segments: Vec<&str> = s.split('.').collect();
    let (last, init) = match segments.split_last() {
        Some(split) => split,
        None => return Err(PathError::Syntax(s.to_string())),
    };
    let mut steps = Vec::with_capacity(segments.len());
    for segment in init {
        if segment.is_empty() {
            return Err(PathError::Syntax(s.to_string()));
        }
        steps.push(parse_step(segment, s)?);
    }
    let leaf = if *last == "#text" {
        Leaf::Text
    } else if let Some(attr) = last.strip_prefix('@') {
        if !is_valid_name(attr) {
            return Err(PathError::InvalidName(attr.to_string()));
        }
        Leaf::Attribute(attr.to_string())
    } else if last.contains('[') {
        steps.push(parse_step(last, s)?);
        Leaf::Text
    } else {
        if !is_valid_name(last) {
            return Err(PathError::InvalidName(last.to_string()));
        }
        Leaf::Value(last.to_string())
    };
    Ok(FieldPath { steps, leaf })
}

pub fn format_path(path: &FieldPath) -> String {
    let mut parts: Vec<String> = path
        .steps
        .iter()
        .map(|step| {
            if step.index == 0 {
                step.name.clone()
            } else {
                format!("{}[{}]", step.name, step.index)
            }
        })
        .collect();
    parts.push(match &path.leaf {
        Leaf::Attribute(name) => format!("@{name}"),
        Leaf::Text => "#text".to_string(),
        Leaf::Value(name) => name.clone(),
    });
    parts.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_value_leaf() {
        let p = parse_path("sound.osc1.retrigPhase").expect("parse must succeed");
        assert_eq!(p.steps, vec![Step::new("sound", 0), Step::new("osc1", 0)]);
        assert_eq!(p.leaf, Leaf::Value("retrigPhase".into()));
    }

    #[test]
    fn parses_indexed_attribute_leaf() {
        let p = parse_path("kit.soundSources.sound[2].@name").expect("parse must succeed");
        assert_eq!(p.steps[2], Step::new("sound", 2));
        assert_eq!(p.leaf, Leaf::Attribute("name".into()));
    }

    #[test]
    fn indexed_final_segment_is_text() {
        let p = parse_path("sound.oscillator[1]").expect("parse must succeed");
        assert_eq!(p.steps.last(), Some(&Step::new("oscillator", 1)));
        assert_eq!(p.leaf, Leaf::Text);
    }

    #[test]
    fn format_omits_zero_index() {
        let p = parse_path("sound[0].osc1[1].@type").expect("parse must succeed");
        assert_eq!(format_path(&p), "sound.osc1[1].@type");
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in ["", "a..b", "a[x].b", "a[1.b", "1abc", "a.@", "a.b[2"] {
            assert!(parse_path(bad).is_err(), "{bad:?} must be rejected");
        }
    }

    #[test]
    fn under_prefixes_steps() {
        let rel = parse_path("osc1.type").expect("parse must succeed");
        let abs = rel.under(&[Step::new("kit", 0), Step::new("sound", 3)]);
        assert_eq!(abs.to_string(), "kit.sound[3].osc1.type");
    }
}
