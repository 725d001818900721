use std::{fs, process::Command};

fn fixture() -> tempfile::TempDir {
    fixture_with_script(
        r#"[
            { "cursor": [2, 2], "hotkey": "Z" },
            { "cursor": [2, 2], "confirm": true, "dt": 0.02 }
        ]"#,
    )
}

fn fixture_with_script(script: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let props = dir.path().join("props");
    fs::create_dir(&props).expect("props dir");
    fs::write(
        props.join("house.json"),
        r#"{ "id": "HOUSE", "size": { "x": 2, "z": 2 }, "type": "Residential" }"#,
    )
    .expect("house fixture");
    fs::write(dir.path().join("script.json"), script).expect("script fixture");
    dir
}

fn replay(dir: &tempfile::TempDir, log_filter: &str) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_gaius"))
        .arg("--props")
        .arg(dir.path().join("props"))
        .arg("--script")
        .arg(dir.path().join("script.json"))
        .args(["--width", "4", "--height", "4"])
        .env("RUST_LOG", log_filter)
        .output()
        .expect("run gaius");

    assert!(output.status.success(), "replay should succeed");
    String::from_utf8(output.stdout).expect("utf8 stdout")
}

#[test]
fn replay_places_house_and_prints_overlay() {
    let dir = fixture();
    let stdout = replay(&dir, "off");
    let mut lines = stdout.lines();

    let overlay = lines.next().expect("overlay line");
    assert!(overlay.starts_with("fps=50"), "unexpected overlay: {overlay}");
    assert!(overlay.contains("selected=<none>"), "unexpected overlay: {overlay}");
    assert!(overlay.contains("hit=Slot (2, 2)"), "unexpected overlay: {overlay}");

    let summary: serde_json::Value =
        serde_json::from_str(lines.next().expect("summary line")).expect("json summary");
    assert_eq!(summary["frame_ms"], 20);
    assert_eq!(summary["fps_band"], "yellow");
}

#[test]
fn call_log_panels_follow_world_spans() {
    let dir = fixture();
    let stdout = replay(&dir, "info");

    let stack = stdout
        .split("Call stack:\n")
        .nth(1)
        .expect("call stack panel");
    assert!(
        stack.starts_with("apply   | 1\ninteract   | 2\nplace   | 3\n"),
        "unexpected panels: {stack}"
    );
    assert!(stdout.contains("Call log:\n"), "unexpected output: {stdout}");
}

#[test]
fn toggled_overlay_prints_nothing() {
    let dir = fixture_with_script(r#"[{ "toggle_overlay": true }, { "dt": 0.02 }]"#);
    let stdout = replay(&dir, "off");
    assert!(stdout.is_empty(), "hidden overlay printed: {stdout}");
}

#[test]
fn negative_frame_duration_is_rejected() {
    let dir = fixture_with_script(r#"[{ "pan": [1.0, 0.0], "dt": -0.1 }]"#);
    let output = Command::new(env!("CARGO_BIN_EXE_gaius"))
        .arg("--props")
        .arg(dir.path().join("props"))
        .arg("--script")
        .arg(dir.path().join("script.json"))
        .env("RUST_LOG", "off")
        .output()
        .expect("run gaius");

    assert!(!output.status.success(), "negative duration must be reported");
}

#[test]
fn missing_props_directory_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = Command::new(env!("CARGO_BIN_EXE_gaius"))
        .arg("--props")
        .arg(dir.path().join("absent"))
        .env("RUST_LOG", "off")
        .output()
        .expect("run gaius");

    assert!(!output.status.success(), "missing catalog must be reported");
}
