//! Patch-level facts: synth or kit, file format generation, and where the
//! sounds of a document live.

use std::fmt;

use deluge_values::DecodeError;
use deluge_xml::{Document, Element, Leaf, PathError, Step};
use serde::Serialize;

use crate::error::OverlayError;

pub const SOUND: &str = "sound";
pub const KIT: &str = "kit";
pub const SOUND_SOURCES: &str = "soundSources";
pub const FIRMWARE_VERSION: &str = "firmwareVersion";
pub const EARLIEST_COMPATIBLE_FIRMWARE: &str = "earliestCompatibleFirmware";
pub const MIDI_OUTPUT: &str = "midiOutput";
pub const GATE_OUTPUT: &str = "gateOutput";
pub const CHANNEL: &str = "channel";
pub const NOTE: &str = "note";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchType {
    /// A `SYNTHS/*.XML` file with a single `sound` root.
    Synth,
    /// A `KITS/*.XML` file: `kit > soundSources > sound*`.
    Kit,
}

impl PatchType {
    pub fn root_name(&self) -> &'static str {
        match self {
            PatchType::Synth => SOUND,
            PatchType::Kit => KIT,
        }
    }

    /// The first top-level `sound` or `kit` element decides.
    pub fn detect(doc: &Document) -> Result<Self, OverlayError> {
        doc.elements()
            .find_map(|el| match el.name.as_str() {
                SOUND => Some(PatchType::Synth),
                KIT => Some(PatchType::Kit),
                _ => None,
            })
            .ok_or(OverlayError::NotAPatch)
    }
}

impl fmt::Display for PatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root_name())
    }
}

/// Generations of the file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatVersion {
    /// No version information; scalars are child elements.
    V1,
    /// `firmwareVersion` as a top-level element next to the patch root.
    V2,
    /// `firmwareVersion` as an attribute of the root; scalars are mostly
    /// attributes.
    V3,
    /// A firmware version whose major number is not 1, 2 or 3, or that does
    /// not start with a number.
    Unsupported,
}

impl FormatVersion {
    /// Layout generation from a firmware version string, by major number.
    pub fn from_firmware(version: &str) -> Self {
        let major = version.trim().split(|c: char| !c.is_ascii_digit()).next();
        match major.and_then(|m| m.parse::<u32>().ok()) {
            Some(1) => FormatVersion::V1,
            Some(2) => FormatVersion::V2,
            Some(3) => FormatVersion::V3,
            _ => FormatVersion::Unsupported,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub patch_type: PatchType,
    pub format: FormatVersion,
    pub firmware_version: Option<String>,
    pub earliest_compatible_firmware: Option<String>,
}

fn root_element(doc: &Document) -> Result<(PatchType, &Element), OverlayError> {
    let patch_type = PatchType::detect(doc)?;
    doc.root(patch_type.root_name(), 0)
        .map(|el| (patch_type, el))
        .ok_or(OverlayError::NotAPatch)
}

pub fn version_info(doc: &Document) -> Result<VersionInfo, OverlayError> {
    let (patch_type, root) = root_element(doc)?;
    if let Some(firmware) = root.attr(FIRMWARE_VERSION) {
        return Ok(VersionInfo {
            patch_type,
            format: FormatVersion::from_firmware(&firmware),
            firmware_version: Some(firmware),
            earliest_compatible_firmware: root.attr(EARLIEST_COMPATIBLE_FIRMWARE),
        });
    }
    let top_text = |name: &str| doc.root(name, 0).and_then(|el| el.get_leaf(&Leaf::Text));
    let firmware = top_text(FIRMWARE_VERSION);
    let format = firmware
        .as_deref()
        .map_or(FormatVersion::V1, FormatVersion::from_firmware);
    Ok(VersionInfo {
        patch_type,
        format,
        firmware_version: firmware,
        earliest_compatible_firmware: top_text(EARLIEST_COMPATIBLE_FIRMWARE),
    })
}

/// Location of one sound in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundRef {
    /// Position in the document's sound list.
    pub index: usize,
    /// Element path of the `sound` element.
    pub steps: Vec<Step>,
    /// The sound is a row of a kit.
    pub in_kit: bool,
}

/// All sounds of a document: the root of a synth, or the `sound` rows of a
/// kit. MIDI and gate rows of a kit are not sounds.
pub fn sounds(doc: &Document) -> Result<Vec<SoundRef>, OverlayError> {
    match PatchType::detect(doc)? {
        PatchType::Synth => Ok(vec![SoundRef {
            index: 0,
            steps: vec![Step::new(SOUND, 0)],
            in_kit: false,
        }]),
        PatchType::Kit => {
            let parent = [Step::new(KIT, 0), Step::new(SOUND_SOURCES, 0)];
            let count = doc.element_count(&parent, SOUND);
            Ok((0..count)
                .map(|index| {
                    let mut steps = parent.to_vec();
                    steps.push(Step::new(SOUND, index));
                    SoundRef {
                        index,
                        steps,
                        in_kit: true,
                    }
                })
                .collect())
        }
    }
}

pub fn sound(doc: &Document, index: usize) -> Result<SoundRef, OverlayError> {
    sounds(doc)?
        .into_iter()
        .nth(index)
        .ok_or(OverlayError::NoSuchSound(index))
}

// ── Kit rows ─────────────────────────────────────────────────────────────

/// One row of a kit, in `soundSources` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KitRow {
    /// A sound row; `index` is its position in [`sounds`].
    Sound { index: usize },
    /// A row that plays `note` on MIDI `channel`.
    Midi { channel: u8, note: u8 },
    /// A CV/gate output row.
    Gate { channel: u8 },
}

fn row_number(row: &Element, position: usize, name: &str) -> Result<u8, OverlayError> {
    let field = format!("{}[{position}].{name}", row.name);
    let raw = row
        .get_leaf(&Leaf::Value(name.to_string()))
        .ok_or_else(|| PathError::NotFound(field.clone()))?;
    raw.trim().parse().map_err(|_| OverlayError::Decode {
        field,
        source: DecodeError::InvalidInteger(raw),
    })
}

/// The rows of a kit. A synth has none.
pub fn kit_rows(doc: &Document) -> Result<Vec<KitRow>, OverlayError> {
    if PatchType::detect(doc)? == PatchType::Synth {
        return Ok(Vec::new());
    }
    let Some(sources) = doc.root(KIT, 0).and_then(|kit| kit.child(SOUND_SOURCES, 0)) else {
        return Ok(Vec::new());
    };
    let (mut sounds, mut midi, mut gates) = (0, 0, 0);
    let mut rows = Vec::new();
    for row in sources.elements() {
        match row.name.as_str() {
            SOUND => {
                rows.push(KitRow::Sound { index: sounds });
                sounds += 1;
            }
            MIDI_OUTPUT => {
                rows.push(KitRow::Midi {
                    channel: row_number(row, midi, CHANNEL)?,
                    note: row_number(row, midi, NOTE)?,
                });
                midi += 1;
            }
            GATE_OUTPUT => {
                rows.push(KitRow::Gate {
                    channel: row_number(row, gates, CHANNEL)?,
                });
                gates += 1;
            }
            _ => {}
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deluge_xml::parse;

    #[test]
    fn detects_v3_from_root_attribute() {
        let doc = parse(b"<sound firmwareVersion=\"3.1.5\" earliestCompatibleFirmware=\"3.1.0\"/>")
            .expect("parse");
        let info = version_info(&doc).expect("info");
        assert_eq!(info.format, FormatVersion::V3);
        assert_eq!(info.patch_type, PatchType::Synth);
        assert_eq!(info.firmware_version.as_deref(), Some("3.1.5"));
        assert_eq!(info.earliest_compatible_firmware.as_deref(), Some("3.1.0"));
    }

    #[test]
    fn detects_v2_from_top_level_element() {
        let doc = parse(b"<firmwareVersion>2.1.0</firmwareVersion>\n<kit/>").expect("parse");
        let info = version_info(&doc).expect("info");
        assert_eq!(info.format, FormatVersion::V2);
        assert_eq!(info.patch_type, PatchType::Kit);
    }

    #[test]
    fn format_follows_the_major_version() {
        let cases = [
            ("1", FormatVersion::V1),
            ("1.4.0", FormatVersion::V1),
            ("2.1.4", FormatVersion::V2),
            ("3", FormatVersion::V3),
            ("3.0.0-beta", FormatVersion::V3),
            ("4.0.0", FormatVersion::Unsupported),
            ("0", FormatVersion::Unsupported),
            ("10.2", FormatVersion::Unsupported),
            ("HEU!", FormatVersion::Unsupported),
            ("", FormatVersion::Unsupported),
        ];
        for (version, expected) in cases {
            assert_eq!(FormatVersion::from_firmware(version), expected, "{version}");
        }
    }

    #[test]
    fn unsupported_versions_are_reported_in_both_layouts() {
        let doc = parse(b"<sound firmwareVersion=\"4.0.0\"/>").expect("parse");
        let info = version_info(&doc).expect("info");
        assert_eq!(info.format, FormatVersion::Unsupported);
        assert_eq!(info.firmware_version.as_deref(), Some("4.0.0"));

        let doc = parse(b"<firmwareVersion>5.0</firmwareVersion>\n<kit/>").expect("parse");
        assert_eq!(version_info(&doc).expect("info").format, FormatVersion::Unsupported);
    }

    #[test]
    fn no_version_is_v1() {
        let doc = parse(b"<sound><mode>fm</mode></sound>").expect("parse");
        assert_eq!(version_info(&doc).expect("info").format, FormatVersion::V1);
    }

    #[test]
    fn kit_rows_skip_midi_and_gate_outputs() {
        let doc = parse(
            b"<kit><soundSources><sound/><midiOutput/><sound/><gateOutput/></soundSources></kit>",
        )
        .expect("parse");
        let refs = sounds(&doc).expect("sounds");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].steps.last(), Some(&Step::new(SOUND, 1)));
        assert!(refs.iter().all(|s| s.in_kit));
    }

    #[test]
    fn kit_rows_in_both_layouts() {
        let doc = parse(
            b"<kit><soundSources><sound/><midiOutput channel=\"9\" note=\"36\"/>\
              <gateOutput><channel>1</channel></gateOutput>\
              <midiOutput><channel>0</channel><note>60</note></midiOutput></soundSources></kit>",
        )
        .expect("parse");
        assert_eq!(
            kit_rows(&doc).expect("rows"),
            [
                KitRow::Sound { index: 0 },
                KitRow::Midi { channel: 9, note: 36 },
                KitRow::Gate { channel: 1 },
                KitRow::Midi { channel: 0, note: 60 },
            ]
        );
    }

    #[test]
    fn malformed_kit_rows_are_reported() {
        let src = b"<kit><soundSources><midiOutput channel=\"x\" note=\"1\"/></soundSources></kit>";
        let doc = parse(src).expect("parse");
        assert!(matches!(
            kit_rows(&doc),
            Err(OverlayError::Decode { ref field, .. }) if field == "midiOutput[0].channel"
        ));

        let src = b"<kit><soundSources><sound/><gateOutput/></soundSources></kit>";
        let doc = parse(src).expect("parse");
        assert_eq!(
            kit_rows(&doc),
            Err(OverlayError::Path(PathError::NotFound("gateOutput[0].channel".into())))
        );

        let doc = parse(b"<sound/>").expect("parse");
        assert_eq!(kit_rows(&doc), Ok(Vec::new()));
    }

    #[test]
    fn not_a_patch() {
        let doc = parse(b"<song/>").expect("parse");
        assert_eq!(PatchType::detect(&doc), Err(OverlayError::NotAPatch));
        assert_eq!(sound(&doc, 0), Err(OverlayError::NotAPatch));
    }
}
