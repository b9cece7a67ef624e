//! The modulation routing table: the `patchCable` list of a sound's
//! `defaultParams`.
//!
//! Cables are addressed by position. Duplicates are legal and endpoints are
//! opaque strings; only the amount is decoded, as a -50..=50 value. New
//! cables are written in the style of the cables already there (attributes
//! or child elements).

use deluge_values::{FieldKind, TypedValue, SIGNED_50};
use deluge_xml::{Document, Element, Leaf, Node, Step};
use serde::Serialize;

use crate::error::RoutingError;
use crate::params::DEFAULT_PARAMS;
use crate::patch::SoundRef;

pub const PATCH_CABLES: &str = "patchCables";
pub const PATCH_CABLE: &str = "patchCable";
const SOURCE: &str = "source";
const DESTINATION: &str = "destination";
const AMOUNT: &str = "amount";
const CABLE_FIELDS: [&str; 3] = [SOURCE, DESTINATION, AMOUNT];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchCable {
    pub source: String,
    pub destination: String,
    /// Depth, -50..=50.
    pub amount: i32,
}

impl PatchCable {
    pub fn new(source: impl Into<String>, destination: impl Into<String>, amount: i32) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            amount,
        }
    }
}

fn value_leaf(name: &str) -> Leaf {
    Leaf::Value(name.to_string())
}

fn params_steps(sound: &SoundRef) -> Vec<Step> {
    let mut steps = sound.steps.clone();
    steps.push(Step::new(DEFAULT_PARAMS, 0));
    steps
}

fn cables_steps(sound: &SoundRef) -> Vec<Step> {
    let mut steps = params_steps(sound);
    steps.push(Step::new(PATCH_CABLES, 0));
    steps
}

fn cable_steps(sound: &SoundRef, index: usize) -> Vec<Step> {
    let mut steps = cables_steps(sound);
    steps.push(Step::new(PATCH_CABLE, index));
    steps
}

fn encode_amount(amount: i32) -> Result<String, RoutingError> {
    FieldKind::Hex(SIGNED_50)
        .encode(&TypedValue::Int(amount as i64))
        .map_err(RoutingError::Amount)
}

fn read_cable(el: &Element) -> Result<PatchCable, RoutingError> {
    let field = |name: &str| {
        el.get_leaf(&value_leaf(name))
            .ok_or_else(|| deluge_xml::PathError::NotFound(format!("{PATCH_CABLE}.{name}")))
    };
    let raw_amount = field(AMOUNT)?;
    let amount = SIGNED_50
        .decode(&raw_amount)
        .map_err(|source| RoutingError::InvalidAmount {
            raw: raw_amount.clone(),
            source,
        })?;
    Ok(PatchCable {
        source: field(SOURCE)?,
        destination: field(DESTINATION)?,
        amount,
    })
}

/// Number of cables of `sound`; zero when there is no `patchCables` element.
pub fn route_count(doc: &Document, sound: &SoundRef) -> usize {
    doc.element_count(&cables_steps(sound), PATCH_CABLE)
}

pub fn list_routes(doc: &Document, sound: &SoundRef) -> Result<Vec<PatchCable>, RoutingError> {
    match doc.element(&cables_steps(sound)) {
        Some(cables) => cables.children_named(PATCH_CABLE).map(read_cable).collect(),
        None => Ok(Vec::new()),
    }
}

fn check_index(doc: &Document, sound: &SoundRef, index: usize) -> Result<(), RoutingError> {
    let len = route_count(doc, sound);
    if index >= len {
        return Err(RoutingError::NoSuchCable { index, len });
    }
    Ok(())
}

/// Keep only the cable fields of `template`, with the whitespace that
/// precedes each kept child.
fn strip_to_cable_fields(template: &mut Element) {
    template
        .attributes
        .retain(|a| CABLE_FIELDS.contains(&a.name.as_str()));
    let mut kept = Vec::new();
    let mut pending: Option<Node> = None;
    for node in template.children.drain(..) {
        match node {
            Node::Element(e) if CABLE_FIELDS.contains(&e.name.as_str()) => {
                kept.extend(pending.take());
                kept.push(Node::Element(e));
            }
            n if n.is_blank() => pending = Some(n),
            _ => pending = None,
        }
    }
    if kept.iter().any(|n| matches!(n, Node::Element(_))) {
        kept.extend(pending);
        template.children = kept;
    } else {
        template.children.clear();
        template.trivia.self_closing = true;
    }
}

/// Append a cable. Returns its position.
pub fn add_route(
    doc: &mut Document,
    sound: &SoundRef,
    cable: &PatchCable,
) -> Result<usize, RoutingError> {
    let amount = encode_amount(cable.amount)?;
    let params = params_steps(sound);
    let params_el = doc.element(&params).ok_or_else(|| {
        deluge_xml::PathError::NotFound(format!("{DEFAULT_PARAMS} of sound {}", sound.index))
    })?;
    let attribute_style = !params_el.attributes.is_empty() || !params_el.has_element_children();

    let cables = cables_steps(sound);
    if doc.element(&cables).is_none() {
        doc.append_element(&params, Element::new(PATCH_CABLES))?;
    }

    let values = [
        (SOURCE, cable.source.as_str()),
        (DESTINATION, cable.destination.as_str()),
        (AMOUNT, amount.as_str()),
    ];
    let template = doc
        .element(&cables)
        .and_then(|el| el.child(PATCH_CABLE, 0))
        .cloned();

    let index = match template {
        Some(mut el) => {
            strip_to_cable_fields(&mut el);
            for (name, value) in values {
                if el.set_leaf(&value_leaf(name), value).is_err() {
                    el.push_attribute(name, value);
                }
            }
            doc.append_element(&cables, el)?
        }
        None if attribute_style => {
            let el = values.iter().fold(Element::new(PATCH_CABLE), |el, (name, value)| {
                el.with_attribute(name, value)
            });
            doc.append_element(&cables, el)?
        }
        None => {
            let index = doc.append_element(&cables, Element::new(PATCH_CABLE))?;
            let at = cable_steps(sound, index);
            for (name, value) in values {
                doc.append_element(&at, Element::new(name).with_text(value))?;
            }
            index
        }
    };
    tracing::debug!(
        sound = sound.index,
        index,
        source = %cable.source,
        destination = %cable.destination,
        "added patch cable"
    );
    Ok(index)
}

/// Remove the cable at `index`, returning what it held.
pub fn remove_route(
    doc: &mut Document,
    sound: &SoundRef,
    index: usize,
) -> Result<PatchCable, RoutingError> {
    let cable = cable_at(doc, sound, index)?;
    doc.remove_element(&cable_steps(sound, index))?;
    tracing::debug!(sound = sound.index, index, "removed patch cable");
    Ok(cable)
}

pub fn cable_at(
    doc: &Document,
    sound: &SoundRef,
    index: usize,
) -> Result<PatchCable, RoutingError> {
    check_index(doc, sound, index)?;
    let el = doc
        .element(&cable_steps(sound, index))
        .ok_or(RoutingError::NoSuchCable { index, len: 0 })?;
    read_cable(el)
}

fn set_cable_field(
    doc: &mut Document,
    sound: &SoundRef,
    index: usize,
    name: &str,
    value: &str,
) -> Result<bool, RoutingError> {
    check_index(doc, sound, index)?;
    let path = deluge_xml::FieldPath::new(cable_steps(sound, index), value_leaf(name));
    Ok(doc.set_scalar(&path, value)?)
}

/// Change the depth of the cable at `index`. Setting the depth the cable
/// already decodes to leaves it untouched.
pub fn set_amount(
    doc: &mut Document,
    sound: &SoundRef,
    index: usize,
    amount: i32,
) -> Result<bool, RoutingError> {
    let raw = encode_amount(amount)?;
    if cable_at(doc, sound, index)?.amount == amount {
        return Ok(false);
    }
    set_cable_field(doc, sound, index, AMOUNT, &raw)
}

pub fn set_source(
    doc: &mut Document,
    sound: &SoundRef,
    index: usize,
    source: &str,
) -> Result<bool, RoutingError> {
    set_cable_field(doc, sound, index, SOURCE, source)
}

pub fn set_destination(
    doc: &mut Document,
    sound: &SoundRef,
    index: usize,
    destination: &str,
) -> Result<bool, RoutingError> {
    set_cable_field(doc, sound, index, DESTINATION, destination)
}
