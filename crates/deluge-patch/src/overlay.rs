//! The typed overlay: reads and writes catalogue fields of a sound through
//! the document tree.
//!
//! A write validates availability, access, and the value before it touches
//! the tree, then replaces exactly one scalar. Fields the catalogue does not
//! know are never looked at and survive untouched.

use std::collections::HashMap;

use deluge_values::{FieldKind, TypedValue};
use deluge_xml::{Document, FieldPath};

use crate::catalogue::{self, Access, FieldDescriptor};
use crate::config::EditorConfig;
use crate::error::{ConfigError, OverlayError};
use crate::patch::SoundRef;
use crate::variant::{classify, SoundVariant};

#[derive(Debug, Clone, Default)]
pub struct Overlay {
    scales: HashMap<String, deluge_values::HexScale>,
}

/// A field resolved against one sound.
struct Target {
    descriptor: &'static FieldDescriptor,
    kind: FieldKind,
    path: FieldPath,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// An overlay using the range overrides of `config`.
    pub fn with_config(config: &EditorConfig) -> Result<Self, ConfigError> {
        let mut scales = HashMap::new();
        for (field, scale) in &config.hex_scales {
            let descriptor = catalogue::catalogue()
                .iter()
                .find(|d| d.name == *field)
                .ok_or_else(|| ConfigError::UnknownField(field.clone()))?;
            if !matches!(descriptor.kind, FieldKind::Hex(_) | FieldKind::DecimalScaled(_)) {
                return Err(ConfigError::NotScaled(field.clone()));
            }
            if !scale.is_valid() {
                return Err(ConfigError::EmptyScale {
                    field: field.clone(),
                    min: scale.min,
                    max: scale.max,
                });
            }
            scales.insert(field.clone(), *scale);
        }
        Ok(Self { scales })
    }

    /// The codec for `descriptor`, with any configured range applied.
    pub fn kind_of(&self, descriptor: &FieldDescriptor) -> FieldKind {
        match (self.scales.get(&descriptor.name), descriptor.kind) {
            (Some(scale), FieldKind::Hex(_)) => FieldKind::Hex(*scale),
            (Some(scale), FieldKind::DecimalScaled(_)) => FieldKind::DecimalScaled(*scale),
            (_, kind) => kind,
        }
    }

    fn target(
        &self,
        doc: &Document,
        sound: &SoundRef,
        field: &str,
    ) -> Result<Target, OverlayError> {
        let (descriptor, indices) = catalogue::lookup(field)?;
        let variant = classify(doc, sound)?;
        if !descriptor.available_for(variant) {
            return Err(OverlayError::FieldUnsupported {
                field: field.to_string(),
                variant,
            });
        }
        Ok(Target {
            descriptor,
            kind: self.kind_of(descriptor),
            path: descriptor.path(&indices)?.under(&sound.steps),
        })
    }

    /// The raw string of `field`, undecoded.
    pub fn get_raw(
        &self,
        doc: &Document,
        sound: &SoundRef,
        field: &str,
    ) -> Result<String, OverlayError> {
        let target = self.target(doc, sound, field)?;
        Ok(doc.get_scalar(&target.path)?)
    }

    pub fn get(
        &self,
        doc: &Document,
        sound: &SoundRef,
        field: &str,
    ) -> Result<TypedValue, OverlayError> {
        let target = self.target(doc, sound, field)?;
        let raw = doc.get_scalar(&target.path)?;
        let value = target.kind.decode(&raw).map_err(|source| OverlayError::Decode {
            field: field.to_string(),
            source,
        })?;
        if value.is_unknown() {
            tracing::warn!(field, sound = sound.index, raw = %raw, "unrecognized value kept as-is");
        }
        Ok(value)
    }

    /// Write `value` to `field`. Returns whether the tree changed; writing
    /// the value a field already decodes to is a no-op.
    pub fn set(
        &self,
        doc: &mut Document,
        sound: &SoundRef,
        field: &str,
        value: &TypedValue,
    ) -> Result<bool, OverlayError> {
        let target = self.target(doc, sound, field)?;
        if target.descriptor.access == Access::ReadOnly {
            return Err(OverlayError::FieldReadOnly(field.to_string()));
        }
        let raw = target.kind.encode(value).map_err(|source| OverlayError::Encode {
            field: field.to_string(),
            source,
        })?;
        if let Ok(current) = doc.get_scalar(&target.path) {
            let same = match value {
                TypedValue::Unknown(_) => current == raw,
                _ => target.kind.decode(&current).as_ref() == Ok(value),
            };
            if same {
                return Ok(false);
            }
        }
        let changed = doc.upsert_scalar(&target.path, &raw)?;
        tracing::debug!(field, sound = sound.index, raw = %raw, "set field");
        Ok(changed)
    }

    /// Parse `input` the way a person would type it, then [`Overlay::set`].
    pub fn set_input(
        &self,
        doc: &mut Document,
        sound: &SoundRef,
        field: &str,
        input: &str,
    ) -> Result<bool, OverlayError> {
        let (descriptor, _) = catalogue::lookup(field)?;
        let value = self
            .kind_of(descriptor)
            .parse_input(input)
            .map_err(|source| OverlayError::Encode {
                field: field.to_string(),
                source,
            })?;
        self.set(doc, sound, field, &value)
    }

    /// Every non-list field of the sound's variant that is present in the
    /// document, decoded.
    pub fn read_all(
        &self,
        doc: &Document,
        sound: &SoundRef,
    ) -> Result<Vec<(String, TypedValue)>, OverlayError> {
        let variant = classify(doc, sound)?;
        let mut out = Vec::new();
        for descriptor in catalogue::field_table(variant) {
            if descriptor.slot_count() > 0 {
                continue;
            }
            match self.get(doc, sound, &descriptor.name) {
                Ok(value) => out.push((descriptor.name.clone(), value)),
                Err(OverlayError::Path(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }

    pub fn variant(&self, doc: &Document, sound: &SoundRef) -> Result<SoundVariant, OverlayError> {
        classify(doc, sound)
    }
}

/// Read `field` with the default codecs.
pub fn read_field(
    doc: &Document,
    sound: &SoundRef,
    field: &str,
) -> Result<TypedValue, OverlayError> {
    Overlay::new().get(doc, sound, field)
}

/// Write `field` with the default codecs.
pub fn write_field(
    doc: &mut Document,
    sound: &SoundRef,
    field: &str,
    value: &TypedValue,
) -> Result<bool, OverlayError> {
    Overlay::new().set(doc, sound, field, value)
}
