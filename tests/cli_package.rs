// CLI integration tests for the packager binary.
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_timelapse-package");
    Command::new(exe)
}

fn parse_json(output: &[u8]) -> Value {
    let text = std::str::from_utf8(output).expect("utf8");
    serde_json::from_str(text.trim()).expect("valid json")
}

fn make_bundle(root: &Path, version: &str) {
    fs::create_dir_all(root.join("icons")).expect("mkdir");
    fs::write(root.join("__init__.py"), "# init").expect("write");
    fs::write(
        root.join("metadata.txt"),
        format!("[general]\nname=Timelapse\nversion={version}\n"),
    )
    .expect("write");
    fs::write(root.join("timelapse_plugin.py"), "PLUGIN = 1\n").expect("write");
    fs::write(root.join("icons/icon.svg"), "<svg/>").expect("write");
    fs::create_dir_all(root.join("icons/__pycache__")).expect("mkdir");
    fs::write(root.join("icons/__pycache__/x.pyc"), "").expect("write");
    fs::write(root.join("icons/.DS_Store"), "").expect("write");
}

fn archive_file_names(archive: &Path) -> BTreeSet<String> {
    let file = fs::File::open(archive).expect("open archive");
    let mut zip = zip::ZipArchive::new(file).expect("read archive");
    let mut names = BTreeSet::new();
    for index in 0..zip.len() {
        let entry = zip.by_index(index).expect("entry");
        if !entry.is_dir() {
            names.insert(entry.name().to_string());
        }
    }
    names
}

#[test]
fn packages_exactly_the_manifest_under_the_plugin_root() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("plugin");
    make_bundle(&source, "1.2.3");
    let dist = temp.path().join("dist");

    let output = cmd()
        .args([
            "--source",
            source.to_str().unwrap(),
            "--output",
            dist.to_str().unwrap(),
        ])
        .output()
        .expect("package");
    assert!(output.status.success());

    let value = parse_json(&output.stdout);
    let report = value.get("package").expect("package envelope");
    assert_eq!(report.get("version").unwrap().as_str().unwrap(), "1.2.3");
    let archive = dist.join("timelapse-1.2.3.zip");
    assert_eq!(
        report.get("archive").unwrap().as_str().unwrap(),
        archive.to_str().unwrap()
    );

    let expected: BTreeSet<String> = [
        "timelapse/__init__.py",
        "timelapse/metadata.txt",
        "timelapse/timelapse_plugin.py",
        "timelapse/icons/icon.svg",
    ]
    .into_iter()
    .map(str::to_string)
    .collect();
    assert_eq!(archive_file_names(&archive), expected);
}

#[test]
fn default_output_is_dist_under_the_source() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("plugin");
    make_bundle(&source, "0.9.0");

    let output = cmd()
        .args(["--source", source.to_str().unwrap()])
        .output()
        .expect("package");
    assert!(output.status.success());
    assert!(source.join("dist/timelapse-0.9.0.zip").is_file());
}

#[test]
fn missing_version_line_exits_nonzero_and_writes_no_archive() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("plugin");
    make_bundle(&source, "1.0.0");
    fs::write(source.join("metadata.txt"), "name=Timelapse\n").expect("write");
    let dist = temp.path().join("dist");

    let output = cmd()
        .args([
            "--source",
            source.to_str().unwrap(),
            "--output",
            dist.to_str().unwrap(),
        ])
        .output()
        .expect("package");
    assert_eq!(output.status.code().unwrap(), 5);

    let stderr = parse_json(&output.stderr);
    assert_eq!(
        stderr["error"].get("kind").unwrap().as_str().unwrap(),
        "Metadata"
    );
    assert!(!dist.exists() || fs::read_dir(&dist).expect("read dist").next().is_none());
}

#[test]
fn repackaging_an_unchanged_version_overwrites() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("plugin");
    make_bundle(&source, "2.0.0");
    let dist = temp.path().join("dist");
    let args = [
        "--source",
        source.to_str().unwrap(),
        "--output",
        dist.to_str().unwrap(),
    ];

    assert!(cmd().args(args).output().expect("first").status.success());
    fs::write(source.join("timelapse_plugin.py"), "PLUGIN = 2\n").expect("write");
    assert!(cmd().args(args).output().expect("second").status.success());

    let archives: Vec<_> = fs::read_dir(&dist)
        .expect("read dist")
        .map(|entry| entry.expect("entry").file_name())
        .collect();
    assert_eq!(archives, vec![std::ffi::OsString::from("timelapse-2.0.0.zip")]);
}

#[test]
fn missing_source_bundle_is_fatal() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = cmd()
        .args(["--source", temp.path().join("nope").to_str().unwrap()])
        .output()
        .expect("package");
    assert_eq!(output.status.code().unwrap(), 3);
}
