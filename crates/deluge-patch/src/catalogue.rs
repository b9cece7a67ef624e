//! The field catalogue: every parameter the editor understands, declared
//! once with its location, codec, and the variants that have it.
//!
//! Paths are relative to the `sound` element. A `[]` in a field name marks
//! a list position; callers write the concrete index
//! (`osc1.sampleRange[2].topNote`) and the same positions are substituted
//! into the `[]` slots of the path template.

use std::sync::OnceLock;

use deluge_values::{
    ArpeggiatorMode, FieldKind, IntRange, LfoShape, LpfMode, ModFxType, OscType, Polyphony,
    SamplePlayMode, SyncLevel, SynthMode, VoicePriority, HEX_U50, PAN, SIDECHAIN_ATTACK,
    SIDECHAIN_RELEASE,
};
use deluge_xml::{parse_path, FieldPath};
use regex::Regex;

use crate::error::OverlayError;
use crate::variant::{Engine, SoundVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Every variant.
    Shared,
    /// Only sounds using one of these engines.
    Engines(&'static [Engine]),
    /// Only kit rows.
    KitRow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadWrite,
    ReadOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Dotted path relative to the sound element, `[]` for list positions.
    pub template: String,
    pub kind: FieldKind,
    pub availability: Availability,
    pub access: Access,
}

impl FieldDescriptor {
    fn new(name: impl Into<String>, template: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            kind,
            availability: Availability::Shared,
            access: Access::ReadWrite,
        }
    }

    fn only(mut self, engines: &'static [Engine]) -> Self {
        self.availability = Availability::Engines(engines);
        self
    }

    fn kit_row(mut self) -> Self {
        self.availability = Availability::KitRow;
        self
    }

    fn read_only(mut self) -> Self {
        self.access = Access::ReadOnly;
        self
    }

    pub fn available_for(&self, variant: SoundVariant) -> bool {
        match self.availability {
            Availability::Shared => true,
            Availability::Engines(engines) => engines.contains(&variant.engine()),
            Availability::KitRow => variant.is_kit_row(),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.template.matches("[]").count()
    }

    /// Stored inside the sound's `defaultParams` element.
    pub fn is_default_param(&self) -> bool {
        self.template.starts_with("defaultParams.")
    }

    /// The relative path for concrete list positions.
    pub fn path(&self, indices: &[usize]) -> Result<FieldPath, OverlayError> {
        if indices.len() != self.slot_count() {
            return Err(OverlayError::UnknownField(self.name.clone()));
        }
        let mut parts = self.template.split("[]");
        let mut out = parts.next().unwrap_or_default().to_string();
        for (part, index) in parts.zip(indices) {
            out.push_str(&format!("[{index}]"));
            out.push_str(part);
        }
        Ok(parse_path(&out)?)
    }
}

// ── Catalogue ──────────────────────────────────────────────────────────────

const SUBTRACTIVE_LIKE: &[Engine] = &[Engine::Subtractive, Engine::RingMod];
const WAVEFORM_OSCILLATORS: &[Engine] = &[
    Engine::Subtractive,
    Engine::RingMod,
    Engine::SampleBased,
    Engine::MultiSampleRange,
];
const FM: &[Engine] = &[Engine::Fm];
const SAMPLES: &[Engine] = &[Engine::SampleBased, Engine::MultiSampleRange];
const SINGLE_SAMPLE: &[Engine] = &[Engine::SampleBased];
const MULTI_SAMPLE: &[Engine] = &[Engine::MultiSampleRange];

const TRANSPOSE: FieldKind = FieldKind::Integer(IntRange::new(-96, 96));
const CENTS: FieldKind = FieldKind::Integer(IntRange::new(-100, 100));
const SAMPLE_POSITION: FieldKind = FieldKind::Integer(IntRange::new(0, u32::MAX as i64));
const U50: FieldKind = FieldKind::Hex(HEX_U50);
const BOOL: FieldKind = FieldKind::Boolean;
const TEXT: FieldKind = FieldKind::FreeString;
const PHASE: FieldKind = FieldKind::RetrigPhase;
const SYNC: FieldKind = FieldKind::Enumeration(&SyncLevel::TABLE);

fn zone_fields(
    out: &mut Vec<FieldDescriptor>,
    name: &str,
    template: &str,
    engines: &'static [Engine],
) {
    for (field, attr) in [
        ("start", "startSamplePos"),
        ("end", "endSamplePos"),
        ("loopStart", "startLoopPos"),
        ("loopEnd", "endLoopPos"),
    ] {
        out.push(
            FieldDescriptor::new(
                format!("{name}.{field}"),
                format!("{template}.{attr}"),
                SAMPLE_POSITION,
            )
            .only(engines),
        );
    }
}

fn oscillator_fields(out: &mut Vec<FieldDescriptor>, n: u8) {
    let osc = format!("osc{n}");
    let letter = if n == 1 { 'A' } else { 'B' };
    let same = |field: &str, kind: FieldKind| {
        FieldDescriptor::new(format!("{osc}.{field}"), format!("{osc}.{field}"), kind)
    };
    out.extend([
        same("type", FieldKind::Enumeration(&OscType::TABLE)).only(WAVEFORM_OSCILLATORS),
        same("transpose", TRANSPOSE),
        same("cents", CENTS),
        same("retrigPhase", PHASE),
        FieldDescriptor::new(
            format!("{osc}.volume"),
            format!("defaultParams.osc{letter}Volume"),
            U50,
        ),
        FieldDescriptor::new(
            format!("{osc}.pulseWidth"),
            format!("defaultParams.osc{letter}PulseWidth"),
            U50,
        )
        .only(SUBTRACTIVE_LIKE),
        same("loopMode", FieldKind::Enumeration(&SamplePlayMode::TABLE)).only(SAMPLES),
        same("reversed", BOOL).only(SAMPLES),
        FieldDescriptor::new(
            format!("{osc}.timeStretch"),
            format!("{osc}.timeStretchEnable"),
            BOOL,
        )
        .only(SAMPLES),
        same("timeStretchAmount", FieldKind::Integer(IntRange::new(-48, 48))).only(SAMPLES),
        same("linearInterpolation", BOOL).only(SAMPLES),
        same("fileName", TEXT).only(SINGLE_SAMPLE),
    ]);
    zone_fields(out, &format!("{osc}.zone"), &format!("{osc}.zone"), SINGLE_SAMPLE);

    let range = format!("{osc}.sampleRange[]");
    let range_path = format!("{osc}.sampleRanges.sampleRange[]");
    let in_range = |field: &str, attr: &str, kind: FieldKind| {
        FieldDescriptor::new(format!("{range}.{field}"), format!("{range_path}.{attr}"), kind)
            .only(MULTI_SAMPLE)
    };
    out.extend([
        in_range("topNote", "rangeTopNote", FieldKind::Integer(IntRange::new(0, 127))),
        in_range("fileName", "fileName", TEXT),
        in_range("transpose", "transpose", TRANSPOSE),
        in_range("cents", "cents", CENTS),
    ]);
    zone_fields(out, &format!("{range}.zone"), &format!("{range_path}.zone"), MULTI_SAMPLE);
}

fn modulator_fields(out: &mut Vec<FieldDescriptor>, n: u8) {
    let fm = |name: String, template: String, kind: FieldKind| {
        FieldDescriptor::new(name, template, kind).only(FM)
    };
    let m = format!("mod{n}");
    let el = format!("modulator{n}");
    out.extend([
        fm(format!("{m}.transpose"), format!("{el}.transpose"), TRANSPOSE),
        fm(format!("{m}.cents"), format!("{el}.cents"), CENTS),
        fm(format!("{m}.retrigPhase"), format!("{el}.retrigPhase"), PHASE),
        fm(format!("{m}.amount"), format!("defaultParams.modulator{n}Amount"), U50),
        fm(format!("{m}.feedback"), format!("defaultParams.modulator{n}Feedback"), U50),
        fm(format!("carrier{n}.feedback"), format!("defaultParams.carrier{n}Feedback"), U50),
    ]);
}

fn build() -> Vec<FieldDescriptor> {
    let mut out = vec![
        FieldDescriptor::new("mode", "mode", FieldKind::Enumeration(&SynthMode::TABLE)).read_only(),
        FieldDescriptor::new("name", "@name", TEXT).kit_row(),
        FieldDescriptor::new("polyphony", "polyphonic", FieldKind::Enumeration(&Polyphony::TABLE)),
        FieldDescriptor::new(
            "voicePriority",
            "voicePriority",
            FieldKind::Enumeration(&VoicePriority::TABLE),
        ),
        FieldDescriptor::new("sideChainSend", "sideChainSend", FieldKind::DecimalScaled(HEX_U50)),
        FieldDescriptor::new("lpfMode", "lpfMode", FieldKind::Enumeration(&LpfMode::TABLE)),
        FieldDescriptor::new(
            "clippingAmount",
            "clippingAmount",
            FieldKind::Integer(IntRange::new(0, 16)),
        ),
    ];
    oscillator_fields(&mut out, 1);
    oscillator_fields(&mut out, 2);
    out.push(FieldDescriptor::new("osc2.sync", "osc2.oscillatorSync", BOOL).only(SUBTRACTIVE_LIKE));
    modulator_fields(&mut out, 1);
    modulator_fields(&mut out, 2);
    out.push(FieldDescriptor::new("mod2.toMod1", "modulator2.toModulator1", BOOL).only(FM));

    for (name, attr, kind) in [
        ("volume", "volume", U50),
        ("pan", "pan", FieldKind::Hex(PAN)),
        ("portamento", "portamento", U50),
        ("reverbAmount", "reverbAmount", U50),
        ("stutterRate", "stutterRate", U50),
        ("noiseVolume", "noiseVolume", U50),
        ("lpf.frequency", "lpfFrequency", U50),
        ("lpf.resonance", "lpfResonance", U50),
        ("hpf.frequency", "hpfFrequency", U50),
        ("hpf.resonance", "hpfResonance", U50),
        ("lfo1.rate", "lfo1Rate", U50),
        ("lfo2.rate", "lfo2Rate", U50),
        ("delay.feedback", "delayFeedback", U50),
        ("delay.rate", "delayRate", U50),
        ("arp.rate", "arpeggiatorRate", U50),
        ("arp.gate", "arpeggiatorGate", U50),
        ("bitCrush", "bitCrush", U50),
        ("sampleRateReduction", "sampleRateReduction", U50),
        ("modFx.rate", "modFXRate", U50),
        ("modFx.depth", "modFXDepth", U50),
        ("modFx.feedback", "modFXFeedback", U50),
        ("modFx.offset", "modFXOffset", U50),
        ("compressor.shape", "compressorShape", U50),
    ] {
        out.push(FieldDescriptor::new(name, format!("defaultParams.{attr}"), kind));
    }
    for n in 1..=2 {
        for stage in ["attack", "decay", "sustain", "release"] {
            out.push(FieldDescriptor::new(
                format!("env{n}.{stage}"),
                format!("defaultParams.envelope{n}.{stage}"),
                U50,
            ));
        }
    }
    for band in ["bass", "treble", "bassFrequency", "trebleFrequency"] {
        out.push(FieldDescriptor::new(
            format!("eq.{band}"),
            format!("defaultParams.equalizer.{band}"),
            U50,
        ));
    }

    let voices = FieldKind::Integer(IntRange::new(1, 8));
    out.extend([
        FieldDescriptor::new("modFx.type", "modFXType", FieldKind::Enumeration(&ModFxType::TABLE)),
        FieldDescriptor::new("lfo1.shape", "lfo1.type", FieldKind::Enumeration(&LfoShape::TABLE)),
        FieldDescriptor::new("lfo1.sync", "lfo1.syncLevel", SYNC),
        FieldDescriptor::new("lfo2.shape", "lfo2.type", FieldKind::Enumeration(&LfoShape::TABLE)),
        FieldDescriptor::new("unison.voices", "unison.num", voices),
        FieldDescriptor::new(
            "unison.detune",
            "unison.detune",
            FieldKind::Integer(IntRange::new(0, 50)),
        ),
        FieldDescriptor::new(
            "arp.mode",
            "arpeggiator.mode",
            FieldKind::Enumeration(&ArpeggiatorMode::TABLE),
        ),
        FieldDescriptor::new("arp.octaves", "arpeggiator.numOctaves", voices),
        FieldDescriptor::new("arp.sync", "arpeggiator.syncLevel", SYNC),
        FieldDescriptor::new("delay.pingPong", "delay.pingPong", BOOL),
        FieldDescriptor::new("delay.analog", "delay.analog", BOOL),
        FieldDescriptor::new("delay.sync", "delay.syncLevel", SYNC),
        FieldDescriptor::new(
            "compressor.attack",
            "compressor.attack",
            FieldKind::Lookup(&SIDECHAIN_ATTACK),
        ),
        FieldDescriptor::new(
            "compressor.release",
            "compressor.release",
            FieldKind::Lookup(&SIDECHAIN_RELEASE),
        ),
        FieldDescriptor::new("compressor.sync", "compressor.syncLevel", SYNC),
        FieldDescriptor::new("modKnob[].param", "modKnobs.modKnob[].controlsParam", TEXT),
        FieldDescriptor::new(
            "modKnob[].patchAmountFromSource",
            "modKnobs.modKnob[].patchAmountFromSource",
            TEXT,
        ),
    ]);
    out
}

/// Every known field, in declaration order.
pub fn catalogue() -> &'static [FieldDescriptor] {
    static CATALOGUE: OnceLock<Vec<FieldDescriptor>> = OnceLock::new();
    CATALOGUE.get_or_init(build)
}

/// The fields a sound of `variant` has.
pub fn field_table(variant: SoundVariant) -> Vec<&'static FieldDescriptor> {
    catalogue()
        .iter()
        .filter(|d| d.available_for(variant))
        .collect()
}

fn index_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(\d+)\]").expect("index pattern is valid"))
}

/// Find the descriptor for a concrete field name and the list positions it
/// names.
pub fn lookup(name: &str) -> Result<(&'static FieldDescriptor, Vec<usize>), OverlayError> {
    let unknown = || OverlayError::UnknownField(name.to_string());
    let re = index_pattern();
    let indices = re
        .captures_iter(name)
        .map(|c| c[1].parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| unknown())?;
    let key = re.replace_all(name, "[]");
    let descriptor = catalogue()
        .iter()
        .find(|d| d.name == key)
        .ok_or_else(unknown)?;
    if descriptor.slot_count() != indices.len() {
        return Err(unknown());
    }
    Ok((descriptor, indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let mut seen = HashSet::new();
        for d in catalogue() {
            assert!(seen.insert(d.name.as_str()), "duplicate field {}", d.name);
        }
    }

    #[test]
    fn templates_parse() {
        for d in catalogue() {
            let indices = vec![0; d.slot_count()];
            assert!(d.path(&indices).is_ok(), "template of {} must parse", d.name);
        }
    }

    #[test]
    fn lookup_substitutes_indices() {
        let (d, idx) = lookup("osc1.sampleRange[2].topNote").expect("lookup");
        assert_eq!(idx, vec![2]);
        assert_eq!(
            d.path(&idx).expect("path").to_string(),
            "osc1.sampleRanges.sampleRange[2].rangeTopNote"
        );
    }

    #[test]
    fn lookup_rejects_missing_or_extra_indices() {
        assert!(lookup("osc1.sampleRange[].topNote").is_err());
        assert!(lookup("osc1[1].type").is_err());
        assert!(lookup("env3.attack").is_err());
    }

    #[test]
    fn pulse_width_is_not_an_fm_field() {
        let fm: Vec<_> = field_table(SoundVariant::Fm).iter().map(|d| d.name.as_str()).collect();
        assert!(!fm.contains(&"osc1.pulseWidth"));
        assert!(fm.contains(&"mod1.amount"));
        assert!(fm.contains(&"volume"));
        let sub: Vec<_> = field_table(SoundVariant::Subtractive)
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert!(sub.contains(&"osc1.pulseWidth"));
        assert!(!sub.contains(&"mod1.amount"));
        assert!(!sub.contains(&"name"));
    }

    #[test]
    fn kit_rows_inherit_engine_fields() {
        let names: Vec<_> = field_table(SoundVariant::KitRow(Engine::SampleBased))
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert!(names.contains(&"name"));
        assert!(names.contains(&"osc1.fileName"));
        assert!(!names.contains(&"osc1.sampleRange[].fileName"));
    }
}
