//! Integration tests for the output bundle writer.
//!
//! Exercises real filesystem I/O under the system temp directory: artifact
//! layout, archive contents and in-place overwrite on re-run.

use std::io::Read;
use std::path::PathBuf;

use bluebox::core::document::{CategorisedEvents, ReportDocument, RunMetadata};
use bluebox::core::hardware::HardwareProfile;
use bluebox::export::bundle::write_bundle;
use chrono::TimeZone;

const STUB_HTML: &str = "<!DOCTYPE html><html><body>stub</body></html>";

fn minimal_document() -> ReportDocument {
    let metadata = RunMetadata {
        generated_at: chrono::Utc.with_ymd_and_hms(2026, 8, 21, 9, 0, 0).unwrap(),
        machine_name: None,
        user_name: None,
        start_time: None,
        end_time: None,
        event_ids: None,
        max_events: 2000,
        include_warnings: false,
        errors: Vec::new(),
    };
    ReportDocument::assemble(
        metadata,
        CategorisedEvents::default(),
        HardwareProfile::default(),
        Vec::new(),
    )
}

/// A per-test scratch root under the system temp directory.
fn scratch_root(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bluebox_test_{tag}_{}", std::process::id()))
}

fn archive_names(zip_path: &std::path::Path) -> Vec<String> {
    let file = std::fs::File::open(zip_path).unwrap();
    let mut archive = zip::read::ZipArchive::new(file).unwrap();
    let mut names = Vec::new();
    for i in 0..archive.len() {
        names.push(archive.by_index(i).unwrap().name().to_string());
    }
    names.sort();
    names
}

#[test]
fn bundle_writes_all_three_artifacts() {
    let root = scratch_root("artifacts");
    let dir = root.join("BlueBox_20260821_090000");

    let paths = write_bundle(&dir, "20260821_090000", &minimal_document(), STUB_HTML).unwrap();

    assert!(paths.json_path.is_file(), "JSON document missing");
    assert!(paths.html_path.is_file(), "HTML report missing");
    assert!(paths.zip_path.is_file(), "Zip archive missing");
    assert_eq!(paths.directory, dir);
    assert_eq!(
        paths.zip_path.file_name().and_then(|n| n.to_str()),
        Some("BlueBox_20260821_090000.zip")
    );

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn archive_holds_both_artifacts_and_not_itself() {
    let root = scratch_root("contents");
    let dir = root.join("BlueBox_20260821_091500");

    let paths = write_bundle(&dir, "20260821_091500", &minimal_document(), STUB_HTML).unwrap();

    let names = archive_names(&paths.zip_path);
    assert_eq!(
        names,
        vec![
            "BlueBox_Report.html".to_string(),
            "BlueBox_Report.json".to_string()
        ],
        "Archive must hold exactly the two artifacts"
    );

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn archived_json_parses_back_to_the_document() {
    let root = scratch_root("roundtrip");
    let dir = root.join("BlueBox_20260821_092200");
    let document = minimal_document();

    let paths = write_bundle(&dir, "20260821_092200", &document, STUB_HTML).unwrap();

    let file = std::fs::File::open(&paths.zip_path).unwrap();
    let mut archive = zip::read::ZipArchive::new(file).unwrap();
    let mut content = String::new();
    archive
        .by_name("BlueBox_Report.json")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    let back: ReportDocument = serde_json::from_str(&content).unwrap();
    assert_eq!(back, document);

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn rerun_overwrites_the_previous_bundle() {
    let root = scratch_root("overwrite");
    let dir = root.join("BlueBox_20260821_093000");
    let document = minimal_document();

    write_bundle(&dir, "20260821_093000", &document, STUB_HTML).unwrap();
    let second_html = "<!DOCTYPE html><html><body>second run</body></html>";
    let paths = write_bundle(&dir, "20260821_093000", &document, second_html).unwrap();

    let html = std::fs::read_to_string(&paths.html_path).unwrap();
    assert_eq!(html, second_html, "HTML must reflect the latest run");

    let names = archive_names(&paths.zip_path);
    assert_eq!(names.len(), 2, "Re-archiving must not accumulate entries");

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn missing_parents_are_created() {
    let root = scratch_root("parents");
    let dir = root.join("deep").join("nested").join("BlueBox_20260821_094500");

    let paths = write_bundle(&dir, "20260821_094500", &minimal_document(), STUB_HTML).unwrap();
    assert!(paths.json_path.is_file());

    let _ = std::fs::remove_dir_all(&root);
}
