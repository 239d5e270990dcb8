/* CLI Tests - run the tag-gen binary against the fixture schemas */

use std::path::PathBuf;
use std::process::Command;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

fn tag_gen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tag-gen"))
}

#[test]
fn test_single_target_writes_file() {
    let out = tempfile::tempdir().unwrap();
    let path = out.path().join("nested").join("definitions.rs");
    let status = tag_gen()
        .arg("definitions")
        .arg(fixture("basic"))
        .arg("-o")
        .arg(&path)
        .status()
        .unwrap();
    assert!(status.success());
    let text = std::fs::read_to_string(path).unwrap();
    assert!(text.contains("pub struct UnitSeat {"));
}

#[test]
fn test_generate_writes_include() {
    let out = tempfile::tempdir().unwrap();
    let status = tag_gen()
        .args(["generate", "--runtime-crate", "crate::runtime"])
        .arg(fixture("basic"))
        .arg("--output")
        .arg(out.path())
        .status()
        .unwrap();
    assert!(status.success());
    assert!(out.path().join("include.rs").is_file());
    let packed = std::fs::read_to_string(out.path().join("packed_codec.rs")).unwrap();
    assert!(packed.contains("use crate::runtime::prelude::*;"));
}

#[test]
fn test_analyze_json() {
    let output = tag_gen().arg("analyze").arg(fixture("basic")).arg("--json").output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["emission_order"], serde_json::json!(["Object", "UnitSeat", "Unit"]));
    assert_eq!(report["classified"]["structs"][2]["name"], "Unit");
}

#[test]
fn test_analyze_report() {
    let output = tag_gen().arg("analyze").arg(fixture("basic")).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Emission order"));
    assert!(stdout.contains("UnitFlags"));
}

#[test]
fn test_missing_schema_dir_fails() {
    let out = tempfile::tempdir().unwrap();
    let output = tag_gen()
        .arg("validators")
        .arg(fixture("does_not_exist"))
        .arg("-o")
        .arg(out.path().join("validators.rs"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!out.path().join("validators.rs").exists());
}
