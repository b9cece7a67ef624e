use std::path::{Path, PathBuf};

use deluge_patch::{OverlayError, Session, SessionError, SlotStorage, TypedValue};
use pretty_assertions::assert_eq;

const SYNTH_V3: &[u8] = include_bytes!("fixtures/synth_v3.XML");
const SYNTH_V2: &[u8] = include_bytes!("fixtures/synth_v2.XML");
const KIT: &[u8] = include_bytes!("fixtures/kit.XML");

fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("fixture write must succeed");
    path
}

fn read(path: &Path) -> String {
    String::from_utf8(std::fs::read(path).expect("read must succeed")).expect("utf8")
}

fn source(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

#[test]
fn open_edit_save_writes_only_the_edit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(dir.path(), "LEAD.XML", SYNTH_V3);

    let mut s = Session::open(&path).expect("open must succeed");
    assert_eq!(s.path(), Some(path.as_path()));
    assert!(!s.is_modified());
    s.set(0, "arp.mode", &TypedValue::Token("up".into())).expect("set");
    assert!(s.is_modified());
    s.save().expect("save must succeed");
    assert!(!s.is_modified());

    assert_eq!(
        read(&path),
        source(SYNTH_V3).replacen("mode=\"off\"", "mode=\"up\"", 1)
    );
}

#[test]
fn saving_an_untouched_session_reproduces_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    for (name, bytes) in [("V3.XML", SYNTH_V3), ("V2.XML", SYNTH_V2), ("KIT.XML", KIT)] {
        let path = write_fixture(dir.path(), name, bytes);
        let mut s = Session::open(&path).expect("open must succeed");
        s.save().expect("save must succeed");
        assert_eq!(std::fs::read(&path).expect("read"), bytes, "{name}");
    }
}

#[test]
fn save_as_moves_the_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let original = write_fixture(dir.path(), "IN.XML", SYNTH_V2);
    let copy = dir.path().join("OUT.XML");

    let mut s = Session::open(&original).expect("open");
    s.set_input(0, "unison.voices", "4").expect("set_input");
    s.save_as(&copy).expect("save_as must succeed");

    assert_eq!(s.path(), Some(copy.as_path()));
    assert_eq!(read(&original), source(SYNTH_V2));
    assert_eq!(
        read(&copy),
        source(SYNTH_V2).replacen("<num>2</num>", "<num>4</num>", 1)
    );
}

#[test]
fn failed_write_keeps_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(dir.path(), "A.XML", SYNTH_V3);
    let mut s = Session::open(&path).expect("open");
    s.set(0, "volume", &TypedValue::Int(10)).expect("set");

    let missing = dir.path().join("no-such-dir").join("B.XML");
    assert!(matches!(s.save_as(&missing), Err(SessionError::Io { .. })));
    assert!(s.is_modified());
    assert_eq!(s.path(), Some(path.as_path()));
    assert_eq!(s.get(0, "volume").expect("get"), TypedValue::Int(10));
}

#[test]
fn in_memory_session_needs_save_as() {
    let mut s = Session::from_bytes(KIT).expect("parse");
    assert_eq!(s.path(), None);
    assert!(matches!(s.save(), Err(SessionError::NoPath)));

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("KIT.XML");
    s.save_as(&path).expect("save_as must succeed");
    assert_eq!(std::fs::read(&path).expect("read"), KIT);
}

#[test]
fn open_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(matches!(
        Session::open(dir.path().join("MISSING.XML")),
        Err(SessionError::Io { .. })
    ));

    let broken = write_fixture(dir.path(), "BROKEN.XML", b"<sound><osc1></sound>");
    assert!(matches!(
        Session::open(&broken),
        Err(SessionError::ParseFile { .. })
    ));

    let not_a_patch = write_fixture(dir.path(), "SONG.XML", b"<song/>");
    let s = Session::open(&not_a_patch).expect("well-formed XML opens");
    assert!(matches!(
        s.sounds(),
        Err(SessionError::Overlay(OverlayError::NotAPatch))
    ));
}

#[test]
fn closed_session_rejects_everything() {
    let mut s = Session::from_bytes(SYNTH_V3).expect("parse");
    s.set(0, "volume", &TypedValue::Int(0)).expect("set");
    s.close();
    assert!(s.is_closed());
    assert!(!s.is_modified());
    assert!(matches!(s.get(0, "volume"), Err(SessionError::Closed)));
    assert!(matches!(
        s.set(0, "volume", &TypedValue::Int(1)),
        Err(SessionError::Closed)
    ));
    assert!(matches!(s.serialize(), Err(SessionError::Closed)));
    assert!(matches!(s.sound(0), Err(SessionError::Closed)));
    assert!(matches!(s.version_info(), Err(SessionError::Closed)));
    assert!(matches!(s.save(), Err(SessionError::Closed)));

    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("CLOSED.XML");
    assert!(matches!(s.save_as(&target), Err(SessionError::Closed)));
    assert!(!target.exists());
}

#[test]
fn closed_file_session_reports_closed_on_save() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(dir.path(), "LEAD.XML", SYNTH_V3);
    let mut s = Session::open(&path).expect("open must succeed");
    s.close();
    assert!(matches!(s.save(), Err(SessionError::Closed)));
    assert_eq!(std::fs::read(&path).expect("read"), SYNTH_V3);
}

#[test]
fn version_and_patch_type() {
    use deluge_patch::{FormatVersion, PatchType};

    let cases: &[(&str, &[u8], PatchType, FormatVersion, Option<&str>)] = &[
        ("v3_synth", SYNTH_V3, PatchType::Synth, FormatVersion::V3, Some("3.1.5")),
        ("v2_synth", SYNTH_V2, PatchType::Synth, FormatVersion::V2, Some("2.1.4")),
        ("v3_kit", KIT, PatchType::Kit, FormatVersion::V3, Some("3.1.5")),
        (
            "v1_synth",
            b"<sound>\n\t<mode>subtractive</mode>\n</sound>\n",
            PatchType::Synth,
            FormatVersion::V1,
            None,
        ),
        (
            "v1_with_version",
            b"<firmwareVersion>1.4.0</firmwareVersion>\n<sound/>\n",
            PatchType::Synth,
            FormatVersion::V1,
            Some("1.4.0"),
        ),
    ];
    for (name, bytes, patch_type, format, firmware) in cases {
        let s = Session::from_bytes(bytes).expect("parse");
        let info = s.version_info().expect("version info");
        assert_eq!(s.patch_type().expect("patch type"), *patch_type, "{name}");
        assert_eq!(info.patch_type, *patch_type, "{name}");
        assert_eq!(info.format, *format, "{name}");
        assert_eq!(info.firmware_version.as_deref(), *firmware, "{name}");
    }
}

#[test]
fn default_params_slots_round_trip() {
    let mut s = Session::from_bytes(SYNTH_V2).expect("parse");
    let mut sound = s.sound(0).expect("sound");
    let slots = sound.default_params().expect("slots");
    let names: Vec<&str> = slots.iter().map(|slot| slot.name.as_str()).collect();
    assert_eq!(
        names,
        ["oscAVolume", "oscAPulseWidth", "oscBVolume", "volume", "pan", "lpfFrequency"]
    );
    assert!(slots.iter().all(|slot| slot.storage == SlotStorage::Element));

    let mut values: Vec<String> = slots.iter().map(|slot| slot.raw.clone()).collect();
    assert_eq!(sound.write_default_params(&values).expect("write"), 0);

    values[4] = "0x40000000".into();
    assert_eq!(sound.write_default_params(&values).expect("write"), 1);
    assert!(matches!(
        sound.write_default_params(&values[..3]),
        Err(SessionError::Overlay(OverlayError::SlotCountMismatch {
            expected: 6,
            got: 3
        }))
    ));
    drop(sound);

    assert!(s.is_modified());
    assert_eq!(
        String::from_utf8(s.serialize().expect("serialize")).expect("utf8"),
        source(SYNTH_V2).replacen("<pan>0x00000000</pan>", "<pan>0x40000000</pan>", 1)
    );
}

#[test]
fn attribute_slots_follow_document_order() {
    let mut s = Session::from_bytes(SYNTH_V3).expect("parse");
    let slots = s.sound(0).expect("sound").default_params().expect("slots");
    assert_eq!(slots.len(), 33);
    assert_eq!(slots[0].name, "arpeggiatorGate");
    assert_eq!(slots[32].name, "modFXFeedback");
    assert!(slots.iter().all(|slot| slot.storage == SlotStorage::Attribute));
}

#[test]
fn sessions_can_move_between_threads() {
    fn assert_send<T: Send>() {}
    assert_send::<Session>();

    let s = Session::from_bytes(SYNTH_V3).expect("parse");
    let bytes = std::thread::spawn(move || s.serialize().expect("serialize"))
        .join()
        .expect("thread must not panic");
    assert_eq!(bytes, SYNTH_V3);
}
