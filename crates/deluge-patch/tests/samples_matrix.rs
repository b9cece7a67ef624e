use deluge_patch::{KitRow, SampleRemap, Session};
use pretty_assertions::assert_eq;

const SYNTH_V3: &[u8] = include_bytes!("fixtures/synth_v3.XML");
const MULTISAMPLE: &[u8] = include_bytes!("fixtures/multisample.XML");
const KIT: &[u8] = include_bytes!("fixtures/kit.XML");

fn session(bytes: &[u8]) -> Session {
    Session::from_bytes(bytes).expect("fixture must parse")
}

fn text(session: &Session) -> String {
    String::from_utf8(session.serialize().expect("serialize must succeed")).expect("utf8")
}

fn source(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

#[test]
fn sample_path_matrix() {
    let cases: &[(&str, &[u8], &[&str])] = &[
        ("synth_without_samples", SYNTH_V3, &[]),
        (
            "multisample_ranges",
            MULTISAMPLE,
            &["SAMPLES/PIANO/C3.wav", "SAMPLES/PIANO/C4.wav"],
        ),
        ("kit_rows", KIT, &["SAMPLES/DRUMS/Kick/BD 808.wav"]),
    ];
    for (name, bytes, expected) in cases {
        let paths = session(bytes).sample_paths().expect("sample paths");
        assert_eq!(&paths, expected, "{name}");
    }
}

#[test]
fn remap_rewrites_only_matching_references() {
    let mut s = session(MULTISAMPLE);
    let mut remap = SampleRemap::new();
    remap.insert("SAMPLES/PIANO/C3.wav", "SAMPLES/KEYS/C3.wav");
    remap.insert("SAMPLES/PIANO/C9.wav", "SAMPLES/KEYS/C9.wav");

    assert_eq!(s.remap_samples(&remap).expect("remap must succeed"), 1);
    assert!(s.is_modified());
    assert_eq!(
        text(&s),
        source(MULTISAMPLE).replacen("SAMPLES/PIANO/C3.wav", "SAMPLES/KEYS/C3.wav", 1)
    );

    // Applying the same remap again finds nothing left to change.
    assert_eq!(s.remap_samples(&remap).expect("remap must succeed"), 0);
}

#[test]
fn remap_escapes_and_reaches_every_reference() {
    let doubled = source(KIT).replacen(
        "\t\t\t<osc2 type=\"saw\"",
        "\t\t\t<osc2 fileName=\"SAMPLES/DRUMS/Kick/BD 808.wav\" type=\"saw\"",
        1,
    );
    let mut s = session(doubled.as_bytes());
    let mut remap = SampleRemap::new();
    remap.insert("SAMPLES/DRUMS/Kick/BD 808.wav", "SAMPLES/DRUMS/Kick/BD <808>.wav");

    assert_eq!(s.remap_samples(&remap).expect("remap must succeed"), 2);
    assert_eq!(text(&s), doubled.replace("BD 808.wav", "BD &lt;808>.wav"));
    assert_eq!(
        s.sample_paths().expect("sample paths"),
        ["SAMPLES/DRUMS/Kick/BD <808>.wav", "SAMPLES/DRUMS/Kick/BD <808>.wav"]
    );
}

#[test]
fn unmatched_remap_leaves_session_clean() {
    let mut s = session(KIT);
    let mut remap = SampleRemap::new();
    remap.insert("SAMPLES/NOPE.wav", "SAMPLES/X.wav");
    assert_eq!(s.remap_samples(&remap).expect("remap must succeed"), 0);
    assert!(!s.is_modified());
    assert_eq!(text(&s), source(KIT));
}

#[test]
fn kit_rows_include_midi_and_gate_outputs() {
    assert_eq!(
        session(KIT).kit_rows().expect("kit rows"),
        [
            KitRow::Sound { index: 0 },
            KitRow::Midi {
                channel: 0,
                note: 60
            },
            KitRow::Sound { index: 1 },
            KitRow::Gate { channel: 2 },
        ]
    );
    assert_eq!(session(SYNTH_V3).kit_rows().expect("kit rows"), Vec::<KitRow>::new());
}
