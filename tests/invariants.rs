//! Bundle Invariant Tests
//!
//! These tests verify the packaging and rendering guarantees end-to-end.

use std::fs;
use std::io::Read;

use serde_json::{json, Value};
use tempfile::TempDir;
use zip::ZipArchive;

use cardpack_core::hashing::sha256_hex;
use cardpack_core::pipeline::OUTPUT_FILE;
use cardpack_core::{BuildError, BuildPipeline, MANIFEST_ENTRY};

fn scaffold(template: &Value) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("template.json"),
        serde_json::to_string_pretty(template).unwrap(),
    )
    .unwrap();
    fs::create_dir(dir.path().join("images")).unwrap();
    dir
}

fn scaffold_rules(dir: &TempDir, rules: &str) {
    fs::write(dir.path().join("rules.md"), rules).unwrap();
    let fonts = dir.path().join("fonts");
    fs::create_dir(&fonts).unwrap();
    fs::write(fonts.join("verdana.woff"), b"wOFF-regular").unwrap();
    fs::write(fonts.join("verdana-bold.woff"), b"wOFF-bold").unwrap();
}

fn open_bundle(dir: &TempDir) -> ZipArchive<fs::File> {
    let file = fs::File::open(dir.path().join(OUTPUT_FILE)).unwrap();
    ZipArchive::new(file).unwrap()
}

fn entry_names(archive: &ZipArchive<fs::File>) -> Vec<String> {
    archive.file_names().map(|n| n.to_string()).collect()
}

#[test]
fn invariant_manifest_round_trips() {
    let template = json!({
        "widgets": [
            {"id": "deck", "x": 12, "y": 34.5, "faces": ["front.png", "back.png"]},
            {"id": "score", "value": null, "locked": true}
        ]
    });
    let dir = scaffold(&template);
    BuildPipeline::new(dir.path()).pack().unwrap();

    let mut archive = open_bundle(&dir);
    let mut text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    let reparsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(reparsed, template);
}

#[test]
fn invariant_every_regular_file_ships_once() {
    let dir = scaffold(&json!({"widgets": []}));
    let images = dir.path().join("images");
    fs::write(images.join("a"), b"aa").unwrap();
    fs::write(images.join("b"), b"bb").unwrap();
    fs::write(images.join("c"), b"cc").unwrap();

    BuildPipeline::new(dir.path()).pack().unwrap();

    let archive = open_bundle(&dir);
    let mut names = entry_names(&archive);
    names.sort();
    assert_eq!(
        names,
        vec!["userassets/a", "userassets/b", "userassets/c", "widgets.json"]
    );
    assert_eq!(archive.len(), 4);
}

#[test]
fn invariant_subdirectories_are_skipped() {
    let dir = scaffold(&json!({"widgets": []}));
    let images = dir.path().join("images");
    fs::write(images.join("card.png"), b"png").unwrap();
    fs::write(images.join("token.png"), b"png").unwrap();
    fs::create_dir(images.join("drafts")).unwrap();
    fs::write(images.join("drafts").join("wip.png"), b"png").unwrap();

    BuildPipeline::new(dir.path()).pack().unwrap();

    let archive = open_bundle(&dir);
    let mut names = entry_names(&archive);
    names.sort();
    assert_eq!(
        names,
        vec!["userassets/card.png", "userassets/token.png", "widgets.json"]
    );
}

#[test]
fn invariant_empty_image_dir_gives_manifest_only() {
    let dir = scaffold(&json!({"widgets": []}));
    let report = BuildPipeline::new(dir.path()).pack().unwrap();

    let archive = open_bundle(&dir);
    assert_eq!(archive.len(), 1);
    assert_eq!(entry_names(&archive), vec!["widgets.json"]);
    // Zero assets is a warning, never a failure.
    assert!(report.validation.valid);
    assert_eq!(report.validation.warnings().count(), 1);
}

#[test]
fn invariant_two_page_render() {
    let dir = scaffold(&json!({"widgets": []}));
    scaffold_rules(&dir, "# Title\n---\nBody text");

    let report = BuildPipeline::new(dir.path()).build(true).unwrap();
    assert_eq!(report.pages_rendered, 2);

    let images = dir.path().join("images");
    let page1 = fs::read_to_string(images.join("rules_1.svg")).unwrap();
    let page2 = fs::read_to_string(images.join("rules_2.svg")).unwrap();
    assert!(page1.contains("Page 1 of 2"));
    assert!(page2.contains("Page 2 of 2"));
    assert!(page1.contains("Title"));
    assert!(page2.contains("Body text"));

    let archive = open_bundle(&dir);
    let mut names = entry_names(&archive);
    names.sort();
    assert_eq!(
        names,
        vec![
            "userassets/rules_1.svg",
            "userassets/rules_2.svg",
            "widgets.json"
        ]
    );
}

#[test]
fn invariant_rebuild_is_byte_identical() {
    let template = json!({"widgets": [{"id": "deck"}]});
    let dir = scaffold(&template);
    scaffold_rules(&dir, "# Setup\n\nShuffle the deck.\n---\nPlay.");
    fs::write(dir.path().join("images").join("board.png"), b"board").unwrap();

    let pipeline = BuildPipeline::new(dir.path());
    pipeline.build(true).unwrap();
    let first = fs::read(dir.path().join(OUTPUT_FILE)).unwrap();
    pipeline.build(true).unwrap();
    let second = fs::read(dir.path().join(OUTPUT_FILE)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn invariant_report_matches_archive() {
    let dir = scaffold(&json!({"widgets": []}));
    let images = dir.path().join("images");
    fs::write(images.join("card.png"), b"card-bytes").unwrap();

    let report = BuildPipeline::new(dir.path()).pack().unwrap();

    let mut archive = open_bundle(&dir);
    assert_eq!(report.entries.len(), archive.len());
    for entry in &report.entries {
        let mut bytes = Vec::new();
        archive
            .by_name(&entry.path)
            .unwrap()
            .read_to_end(&mut bytes)
            .unwrap();
        assert_eq!(entry.size, bytes.len() as u64, "size mismatch: {}", entry.path);
        assert_eq!(
            entry.sha256,
            sha256_hex(&bytes),
            "hash mismatch: {}",
            entry.path
        );
    }
    assert!(!report.manifest_hash.is_empty());
    assert!(!report.bundle_digest.is_empty());
}

#[test]
fn invariant_malformed_template_aborts() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("template.json"), "{not json").unwrap();
    fs::create_dir(dir.path().join("images")).unwrap();

    let result = BuildPipeline::new(dir.path()).pack();
    assert!(matches!(result, Err(BuildError::ManifestJson(_))));
}

#[test]
fn invariant_missing_template_aborts() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("images")).unwrap();

    let result = BuildPipeline::new(dir.path()).pack();
    assert!(matches!(result, Err(BuildError::ManifestRead { .. })));
}

#[test]
fn invariant_missing_image_dir_aborts() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("template.json"), "{}").unwrap();

    let result = BuildPipeline::new(dir.path()).pack();
    assert!(matches!(result, Err(BuildError::AssetDirRead { .. })));
}

#[test]
fn invariant_missing_font_aborts_render() {
    let dir = scaffold(&json!({"widgets": []}));
    fs::write(dir.path().join("rules.md"), "# Title").unwrap();
    fs::create_dir(dir.path().join("fonts")).unwrap();
    fs::write(dir.path().join("fonts").join("verdana.woff"), b"wOFF").unwrap();
    // bold face missing

    let result = BuildPipeline::new(dir.path()).build(true);
    assert!(matches!(result, Err(BuildError::FontRead { .. })));
    // The packer never ran, so no partial bundle exists.
    assert!(!dir.path().join(OUTPUT_FILE).exists());
}

#[test]
fn invariant_non_object_template_still_packs() {
    let dir = scaffold(&json!(["not", "an", "object"]));
    let report = BuildPipeline::new(dir.path()).pack().unwrap();
    assert!(report.validation.valid);
    assert!(report
        .validation
        .violations
        .iter()
        .any(|v| v.rule == "manifest_shape"));

    let mut archive = open_bundle(&dir);
    let mut text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    let reparsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(reparsed, json!(["not", "an", "object"]));
}
