//! CLI and load/save integration tests.

use fow_mission::mission::{MissionDocument, MissionError};
use fow_mission::parser::FormatError;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn mission_fixture() -> PathBuf {
    fixtures_dir().join("missions").join("fighter_sweep.mis")
}

/// Copy the mission fixture into `dir` so outputs land in a temp directory.
fn staged_mission(dir: &Path) -> PathBuf {
    let dst = dir.join("fighter_sweep.mis");
    fs::copy(mission_fixture(), &dst).expect("copy fixture");
    dst
}

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_fow-mission"))
}

#[test]
fn fixture_loads_with_wings_and_waypoints() {
    let doc = MissionDocument::load(&mission_fixture()).expect("load fixture");
    assert_eq!(doc.map(), Some("Kuban/load.ini"));
    assert_eq!(doc.time(), Some(11.75));
    assert_eq!(doc.date(), (Some(1943), Some(5), Some(14)));
    assert_eq!(doc.wind(), (Some(270.0), Some(4.5)));
    let names: Vec<&str> = doc.wings().iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, ["r0100", "g0101"]);
    let r = doc.wing("r0100").unwrap();
    assert_eq!(r.skills, [3, 2, 2, 2]);
    assert_eq!(r.waypoints.len(), 4);
    assert_eq!(r.waypoints[2].target.as_deref(), Some("&1"));
    let g = doc.wing("g0101").unwrap();
    assert_eq!(g.waypoints.len(), 2);
    assert_eq!(g.waypoints[1].target.as_deref(), Some("0_Chief 0"));
}

#[test]
fn serialization_drops_only_comments_and_blank_lines() {
    let raw = fs::read_to_string(mission_fixture()).unwrap();
    let expected: String = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with(';'))
        .map(|l| format!("{}\n", l))
        .collect();
    let mut doc = MissionDocument::load(&mission_fixture()).unwrap();
    let first = doc.to_text();
    assert_eq!(first, expected);
    let mut again = MissionDocument::parse(&first).unwrap();
    assert_eq!(again.to_text(), first);
}

#[test]
fn bad_literal_reports_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.mis");
    let raw = fs::read_to_string(mission_fixture()).unwrap();
    fs::write(&path, raw.replace("CloudHeight 1500.0", "CloudHeight abc")).unwrap();
    match MissionDocument::load(&path) {
        Err(MissionError::Format(FormatError::InvalidFloat { key, value })) => {
            assert_eq!(key, "CloudHeight");
            assert_eq!(value, "abc");
        }
        other => panic!("expected format error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn randomize_writes_fow_variant() {
    let dir = tempfile::tempdir().expect("tempdir");
    let src = staged_mission(dir.path());
    let before = fs::read_to_string(&src).unwrap();
    let output = bin()
        .args([
            "randomize",
            "--mission",
            src.to_str().unwrap(),
            "--settings",
            fixtures_dir().join("settings/weights.fow").to_str().unwrap(),
            "--seed",
            "7",
        ])
        .output()
        .expect("run randomize");
    assert!(
        output.status.success(),
        "randomize should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let out = dir.path().join("fighter_sweep-fow.mis");
    assert!(out.exists(), "fighter_sweep-fow.mis should exist");
    assert_eq!(fs::read_to_string(&src).unwrap(), before, "source must be untouched");

    let expected = MissionDocument::load(&src)
        .unwrap()
        .to_text()
        .replace("CloudType 1\n", "CloudType 3\n")
        .replace("CloudHeight 1500.0\n", "CloudHeight 2500.0\n");
    assert_eq!(fs::read_to_string(&out).unwrap(), expected);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Cloud Type: 3"), "stdout: {}", stdout);
}

#[test]
fn randomize_falls_back_to_builtin_weights() {
    let dir = tempfile::tempdir().expect("tempdir");
    let src = staged_mission(dir.path());
    let status = bin()
        .args([
            "randomize",
            "--mission",
            src.to_str().unwrap(),
            "--settings",
            dir.path().join("missing.fow").to_str().unwrap(),
        ])
        .status()
        .expect("run randomize");
    assert!(status.success());
    let doc = MissionDocument::load(&dir.path().join("fighter_sweep-fow.mis")).unwrap();
    // weight-0 entries of the built-in table are never drawn
    assert!(matches!(doc.cloud_type(), Some(1..=3)));
    assert!([1000.0, 2000.0, 3000.0].contains(&doc.cloud_height().unwrap()));
}

#[test]
fn randomize_with_toml_settings_and_explicit_out() {
    let dir = tempfile::tempdir().expect("tempdir");
    let src = staged_mission(dir.path());
    let out = dir.path().join("custom.mis");
    let status = bin()
        .args([
            "randomize",
            "--mission",
            src.to_str().unwrap(),
            "--settings",
            fixtures_dir().join("settings/weights.toml").to_str().unwrap(),
            "--seed",
            "1",
            "--out",
            out.to_str().unwrap(),
        ])
        .status()
        .expect("run randomize");
    assert!(status.success());
    assert!(out.exists());
    assert!(!dir.path().join("fighter_sweep-fow.mis").exists());
}

#[test]
fn randomize_fails_on_missing_mission() {
    let dir = tempfile::tempdir().expect("tempdir");
    let status = bin()
        .args([
            "randomize",
            "--mission",
            dir.path().join("nope.mis").to_str().unwrap(),
        ])
        .status()
        .expect("run randomize");
    assert!(!status.success());
    assert!(!dir.path().join("nope-fow.mis").exists());
}

#[test]
fn inspect_prints_wings_and_writes_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let json = dir.path().join("summary.json");
    let output = bin()
        .args([
            "inspect",
            "--mission",
            mission_fixture().to_str().unwrap(),
            "--json",
            json.to_str().unwrap(),
        ])
        .output()
        .expect("run inspect");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Map: Kuban/load.ini"));
    assert!(stdout.contains("r0100"));
    assert!(stdout.contains("g0101"));
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(v["date"], "1943-05-14");
    assert_eq!(v["wings"].as_array().map(Vec::len), Some(2));
}

#[test]
fn plot_from_mission_and_route_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let from_mission = dir.path().join("mission.png");
    let status = bin()
        .args([
            "plot",
            "--mission",
            mission_fixture().to_str().unwrap(),
            "--out",
            from_mission.to_str().unwrap(),
        ])
        .status()
        .expect("run plot");
    assert!(status.success());
    assert!(fs::metadata(&from_mission).unwrap().len() > 0);

    let from_routes = dir.path().join("routes.png");
    let status = bin()
        .args([
            "plot",
            "--routes",
            fixtures_dir().join("routes/two_flights.txt").to_str().unwrap(),
            "--out",
            from_routes.to_str().unwrap(),
            "--width",
            "400",
            "--height",
            "300",
        ])
        .status()
        .expect("run plot");
    assert!(status.success());
    assert!(fs::metadata(&from_routes).unwrap().len() > 0);
}
