//! Sound variants.
//!
//! A sound's engine decides which parameters exist. The variant is derived
//! from the document every time it is needed, so editing `osc1.type` or
//! the mode is reflected immediately.

use std::fmt;

use deluge_values::{OscType, SynthMode};
use deluge_xml::{Document, Element, Leaf};
use serde::Serialize;

use crate::error::OverlayError;
use crate::patch::SoundRef;

/// Synthesis engine of a sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    Subtractive,
    Fm,
    RingMod,
    /// Subtractive with a single sample on oscillator 1.
    SampleBased,
    /// Subtractive with note-ranged samples on oscillator 1.
    MultiSampleRange,
}

impl Engine {
    pub fn label(&self) -> &'static str {
        match self {
            Engine::Subtractive => "subtractive",
            Engine::Fm => "fm",
            Engine::RingMod => "ringmod",
            Engine::SampleBased => "sample",
            Engine::MultiSampleRange => "multisample",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundVariant {
    Subtractive,
    Fm,
    RingMod,
    SampleBased,
    MultiSampleRange,
    /// A `sound` row inside a kit, with the engine it uses.
    KitRow(Engine),
}

impl SoundVariant {
    pub fn engine(&self) -> Engine {
        match self {
            SoundVariant::Subtractive => Engine::Subtractive,
            SoundVariant::Fm => Engine::Fm,
            SoundVariant::RingMod => Engine::RingMod,
            SoundVariant::SampleBased => Engine::SampleBased,
            SoundVariant::MultiSampleRange => Engine::MultiSampleRange,
            SoundVariant::KitRow(engine) => *engine,
        }
    }

    pub fn is_kit_row(&self) -> bool {
        matches!(self, SoundVariant::KitRow(_))
    }

    fn from_engine(engine: Engine, in_kit: bool) -> Self {
        if in_kit {
            return SoundVariant::KitRow(engine);
        }
        match engine {
            Engine::Subtractive => SoundVariant::Subtractive,
            Engine::Fm => SoundVariant::Fm,
            Engine::RingMod => SoundVariant::RingMod,
            Engine::SampleBased => SoundVariant::SampleBased,
            Engine::MultiSampleRange => SoundVariant::MultiSampleRange,
        }
    }
}

impl fmt::Display for SoundVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundVariant::KitRow(engine) => write!(f, "kit row ({})", engine.label()),
            other => f.write_str(other.engine().label()),
        }
    }
}

fn value(el: &Element, name: &str) -> Option<String> {
    el.get_leaf(&Leaf::Value(name.to_string()))
}

fn engine_of(sound: &Element) -> Result<Engine, OverlayError> {
    let mode = match value(sound, "mode") {
        None => SynthMode::Subtractive,
        Some(raw) => {
            SynthMode::from_token(&raw).ok_or(OverlayError::UnsupportedSoundMode(raw))?
        }
    };
    Ok(match mode {
        SynthMode::Fm => Engine::Fm,
        SynthMode::RingMod => Engine::RingMod,
        SynthMode::Subtractive => {
            let osc1 = sound.child("osc1", 0);
            let is_sample = osc1
                .and_then(|osc| value(osc, "type"))
                .is_some_and(|t| t == OscType::Sample.as_token());
            let has_ranges = osc1
                .and_then(|osc| osc.child("sampleRanges", 0))
                .is_some_and(|ranges| ranges.child("sampleRange", 0).is_some());
            match (is_sample, has_ranges) {
                (false, _) => Engine::Subtractive,
                (true, false) => Engine::SampleBased,
                (true, true) => Engine::MultiSampleRange,
            }
        }
    })
}

/// Determine the variant of the sound at `sound`.
pub fn classify(doc: &Document, sound: &SoundRef) -> Result<SoundVariant, OverlayError> {
    let el = doc
        .element(&sound.steps)
        .ok_or(OverlayError::NoSuchSound(sound.index))?;
    Ok(SoundVariant::from_engine(engine_of(el)?, sound.in_kit))
}
