//! The `defaultParams` block as an ordered list of raw slots.
//!
//! A slot is an attribute of `defaultParams` or a child element holding
//! only text. Grouping children (`envelope1`, `equalizer`, `patchCables`)
//! are not slots. The list is never reordered or resized; bulk writes must
//! supply exactly one value per slot.

use deluge_xml::{Document, Element, Leaf, Step};
use serde::Serialize;

use crate::catalogue::{self, FieldDescriptor};
use crate::error::OverlayError;
use crate::patch::SoundRef;

pub const DEFAULT_PARAMS: &str = "defaultParams";

/// Children of `defaultParams` that group further parameters.
const GROUPS: &[&str] = &["envelope1", "envelope2", "equalizer", "patchCables"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStorage {
    Attribute,
    Element,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamSlot {
    pub name: String,
    pub raw: String,
    pub storage: SlotStorage,
}

impl ParamSlot {
    fn leaf(&self) -> Leaf {
        match self.storage {
            SlotStorage::Attribute => Leaf::Attribute(self.name.clone()),
            SlotStorage::Element => Leaf::Value(self.name.clone()),
        }
    }
}

fn params_steps(sound: &SoundRef) -> Vec<Step> {
    let mut steps = sound.steps.clone();
    steps.push(Step::new(DEFAULT_PARAMS, 0));
    steps
}

fn params_element<'a>(doc: &'a Document, sound: &SoundRef) -> Result<&'a Element, OverlayError> {
    let steps = params_steps(sound);
    doc.element(&steps).ok_or_else(|| {
        OverlayError::Path(deluge_xml::PathError::NotFound(format!(
            "{}.{DEFAULT_PARAMS}",
            sound
                .steps
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(".")
        )))
    })
}

/// All slots in document order: attributes first, then text-only children.
pub fn slots(doc: &Document, sound: &SoundRef) -> Result<Vec<ParamSlot>, OverlayError> {
    let el = params_element(doc, sound)?;
    let mut out: Vec<ParamSlot> = el
        .attributes
        .iter()
        .map(|a| ParamSlot {
            name: a.name.clone(),
            raw: a.value(),
            storage: SlotStorage::Attribute,
        })
        .collect();
    for child in el.elements() {
        if GROUPS.contains(&child.name.as_str()) || !child.attributes.is_empty() {
            continue;
        }
        if let Some(raw) = child.text() {
            out.push(ParamSlot {
                name: child.name.clone(),
                raw,
                storage: SlotStorage::Element,
            });
        }
    }
    Ok(out)
}

/// Replace every slot's raw value, in order. Returns the number of slots
/// whose value changed.
pub fn write_slots(
    doc: &mut Document,
    sound: &SoundRef,
    values: &[String],
) -> Result<usize, OverlayError> {
    let current = slots(doc, sound)?;
    if current.len() != values.len() {
        return Err(OverlayError::SlotCountMismatch {
            expected: current.len(),
            got: values.len(),
        });
    }
    let steps = params_steps(sound);
    let el = doc
        .element_mut(&steps)
        .ok_or(OverlayError::NoSuchSound(sound.index))?;
    let mut changed = 0;
    for (slot, value) in current.iter().zip(values) {
        if el.set_leaf(&slot.leaf(), value)? {
            changed += 1;
        }
    }
    tracing::debug!(sound = sound.index, changed, "wrote defaultParams slots");
    Ok(changed)
}

/// Slots paired with the catalogue field that names them, if any.
pub fn mapped_slots(
    doc: &Document,
    sound: &SoundRef,
) -> Result<Vec<(ParamSlot, Option<&'static FieldDescriptor>)>, OverlayError> {
    Ok(slots(doc, sound)?
        .into_iter()
        .map(|slot| {
            let template = format!("{DEFAULT_PARAMS}.{}", slot.name);
            let field = catalogue::catalogue().iter().find(|d| d.template == template);
            (slot, field)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch;
    use deluge_xml::{parse, serialize};

    const SRC: &str = "<sound>\n\t<defaultParams\n\t\tvolume=\"0x4CCCCCA8\"\n\
                       \t\tvendorKnob=\"7\">\n\t\t<envelope1 attack=\"0x80000000\"/>\n\
                       \t\t<stutterRate>0x00000000</stutterRate>\n\t</defaultParams>\n</sound>";

    #[test]
    fn slots_keep_document_order() {
        let doc = parse(SRC.as_bytes()).expect("parse");
        let sound = patch::sound(&doc, 0).expect("sound");
        let names: Vec<_> = slots(&doc, &sound)
            .expect("slots")
            .into_iter()
            .map(|s| (s.name, s.storage))
            .collect();
        assert_eq!(
            names,
            vec![
                ("volume".to_string(), SlotStorage::Attribute),
                ("vendorKnob".to_string(), SlotStorage::Attribute),
                ("stutterRate".to_string(), SlotStorage::Element),
            ]
        );
    }

    #[test]
    fn unmapped_slots_have_no_field() {
        let doc = parse(SRC.as_bytes()).expect("parse");
        let sound = patch::sound(&doc, 0).expect("sound");
        let mapped = mapped_slots(&doc, &sound).expect("mapped");
        assert_eq!(mapped[0].1.map(|d| d.name.as_str()), Some("volume"));
        assert!(mapped[1].1.is_none());
        assert_eq!(mapped[2].1.map(|d| d.name.as_str()), Some("stutterRate"));
    }

    #[test]
    fn bulk_write_requires_every_slot() {
        let mut doc = parse(SRC.as_bytes()).expect("parse");
        let sound = patch::sound(&doc, 0).expect("sound");
        let err = write_slots(&mut doc, &sound, &["1".to_string()]).expect_err("must fail");
        assert_eq!(err, OverlayError::SlotCountMismatch { expected: 3, got: 1 });
        assert_eq!(serialize(&doc), SRC.as_bytes());
    }

    #[test]
    fn bulk_write_replaces_in_place() {
        let mut doc = parse(SRC.as_bytes()).expect("parse");
        let sound = patch::sound(&doc, 0).expect("sound");
        let values: Vec<String> = ["0x4CCCCCA8", "8", "0x7FFFFFFF"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let changed = write_slots(&mut doc, &sound, &values).expect("write");
        assert_eq!(changed, 2);
        let expected = SRC
            .replace("vendorKnob=\"7\"", "vendorKnob=\"8\"")
            .replace("<stutterRate>0x00000000<", "<stutterRate>0x7FFFFFFF<");
        assert_eq!(String::from_utf8(serialize(&doc)).expect("utf8"), expected);
    }
}
