use std::path::{Path, PathBuf};

use deluge_patch::cli::{self, CliArgs, CliError, Command};
use deluge_patch::{Overlay, SessionError};
use pretty_assertions::assert_eq;

const SYNTH_V3: &[u8] = include_bytes!("fixtures/synth_v3.XML");
const KIT: &[u8] = include_bytes!("fixtures/kit.XML");
const MULTISAMPLE: &[u8] = include_bytes!("fixtures/multisample.XML");

fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("fixture write must succeed");
    path
}

fn args(command: Command) -> CliArgs {
    CliArgs {
        command,
        config: None,
        verbose: 0,
        quiet: false,
    }
}

#[test]
fn check_reports_each_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let good = write_fixture(dir.path(), "GOOD.XML", SYNTH_V3);
    let bad = write_fixture(dir.path(), "BAD.XML", b"<sound>");

    assert!(cli::check_file(&good).expect("check must succeed"));
    let (out, ok) = cli::run(&args(Command::Check {
        files: vec![good.clone(), bad.clone()],
    }))
        .expect("run must succeed");
    assert!(!ok);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("ok"));
    assert!(lines[1].starts_with("ERROR"));
}

#[test]
fn info_describes_kit_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let kit = write_fixture(dir.path(), "KIT.XML", KIT);
    let json: serde_json::Value =
        serde_json::from_str(&cli::info_json(&kit).expect("info must succeed")).expect("json");
    assert_eq!(json["version"]["patch_type"], "kit");
    assert_eq!(json["version"]["format"], "v3");
    assert_eq!(json["version"]["firmware_version"], "3.1.5");
    let sounds = json["sounds"].as_array().expect("sounds array");
    assert_eq!(sounds.len(), 2);
    assert_eq!(sounds[0]["cables"], 1);
    assert_eq!(sounds[1]["name"]["value"], "HAT & SHAKER");
    assert_eq!(
        json["rows"],
        serde_json::json!([
            {"kind": "sound", "index": 0},
            {"kind": "midi", "channel": 0, "note": 60},
            {"kind": "sound", "index": 1},
            {"kind": "gate", "channel": 2},
        ])
    );
}

#[test]
fn get_prints_value_and_raw() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(dir.path(), "LEAD.XML", SYNTH_V3);
    let json: serde_json::Value = serde_json::from_str(
        &cli::get_field(&path, 0, "volume", Overlay::new()).expect("get must succeed"),
    )
    .expect("json");
    assert_eq!(json["value"]["type"], "int");
    assert_eq!(json["value"]["value"], 40);
    assert_eq!(json["raw"], "0x4CCCCCA8");
}

#[test]
fn set_with_output_leaves_input_alone() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_fixture(dir.path(), "IN.XML", SYNTH_V3);
    let output = dir.path().join("OUT.XML");

    let (msg, ok) = cli::run(&args(Command::Set {
        file: input.clone(),
        sound: 0,
        field: "delay.analog".into(),
        value: "on".into(),
        out: Some(output.clone()),
    }))
    .expect("run must succeed");
    assert!(ok);
    assert_eq!(msg, "delay.analog: updated");
    assert_eq!(std::fs::read(&input).expect("read"), SYNTH_V3);
    let expected = String::from_utf8(SYNTH_V3.to_vec())
        .expect("utf8")
        .replacen("analog=\"0\"", "analog=\"1\"", 1);
    assert_eq!(
        String::from_utf8(std::fs::read(&output).expect("read")).expect("utf8"),
        expected
    );
}

#[test]
fn set_in_place_without_change_does_not_rewrite() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_fixture(dir.path(), "IN.XML", SYNTH_V3);
    let changed = cli::set_field(&input, 0, "pan", "0", None, Overlay::new()).expect("set");
    assert!(!changed);
    assert_eq!(std::fs::read(&input).expect("read"), SYNTH_V3);
}

#[test]
fn cables_lists_routes_as_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(dir.path(), "LEAD.XML", SYNTH_V3);
    let json: serde_json::Value =
        serde_json::from_str(&cli::cables_json(&path, 0).expect("cables must succeed"))
            .expect("json");
    assert_eq!(
        json,
        serde_json::json!([
            {"source": "velocity", "destination": "volume", "amount": 25},
            {"source": "lfo1", "destination": "pitch", "amount": 2},
        ])
    );
}

#[test]
fn errors_surface_from_the_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(dir.path(), "LEAD.XML", SYNTH_V3);
    assert!(matches!(
        cli::get_field(&path, 0, "mod1.amount", Overlay::new()),
        Err(CliError::Session(SessionError::Overlay(_)))
    ));
    assert!(matches!(
        cli::info_json(&dir.path().join("MISSING.XML")),
        Err(CliError::Session(SessionError::Io { .. }))
    ));

    let bad_scale = b"{\"hex_scales\":{\"nope\":{\"min\":0,\"max\":1}}}";
    let config = write_fixture(dir.path(), "config.json", bad_scale);
    let mut with_config = args(Command::Info { file: path });
    with_config.config = Some(config);
    assert!(matches!(cli::run(&with_config), Err(CliError::Config(_))));
}

#[test]
fn samples_and_relink() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_fixture(dir.path(), "PIANO.XML", MULTISAMPLE);
    let json: serde_json::Value =
        serde_json::from_str(&cli::samples_json(&input).expect("samples must succeed"))
            .expect("json");
    assert_eq!(json, serde_json::json!(["SAMPLES/PIANO/C3.wav", "SAMPLES/PIANO/C4.wav"]));

    let output = dir.path().join("OUT.XML");
    let (msg, ok) = cli::run(&args(Command::Relink {
        file: input.clone(),
        from: "SAMPLES/PIANO/C4.wav".into(),
        to: "SAMPLES/PIANO/C5.wav".into(),
        out: Some(output.clone()),
    }))
    .expect("run must succeed");
    assert!(ok);
    assert_eq!(msg, "SAMPLES/PIANO/C4.wav: 1 reference(s) relinked");
    assert_eq!(std::fs::read(&input).expect("read"), MULTISAMPLE);
    let expected = String::from_utf8(MULTISAMPLE.to_vec())
        .expect("utf8")
        .replacen("C4.wav", "C5.wav", 1);
    assert_eq!(
        String::from_utf8(std::fs::read(&output).expect("read")).expect("utf8"),
        expected
    );

    let unchanged = cli::relink_sample(&input, "SAMPLES/NOPE.wav", "SAMPLES/X.wav", None)
        .expect("relink must succeed");
    assert_eq!(unchanged, 0);
    assert_eq!(std::fs::read(&input).expect("read"), MULTISAMPLE);
}
