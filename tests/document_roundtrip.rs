//! Integration tests for the report document's JSON contract.
//!
//! The same serialization feeds the JSON artifact and the HTML page's
//! embedded data block, so the wire shape is load-bearing: PascalCase
//! names, `null` for unavailable values, and lossless round-trips.

use bluebox::core::document::{CategorisedEvents, ReportDocument, RunMetadata};
use bluebox::core::event_record::{Category, EventRecord};
use bluebox::core::hardware::{DiskInfo, HardwareProfile};
use bluebox::core::software::InstalledApplication;
use chrono::TimeZone;

fn sample_document() -> ReportDocument {
    let generated = chrono::Utc.with_ymd_and_hms(2026, 8, 21, 9, 0, 0).unwrap();
    let metadata = RunMetadata {
        generated_at: generated,
        machine_name: Some("WS-0042".into()),
        user_name: None,
        start_time: Some(chrono::Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap()),
        end_time: None,
        event_ids: Some(vec![41, 6008]),
        max_events: 2000,
        include_warnings: true,
        errors: vec!["Hardware events: no configured provider is registered on this host".into()],
    };

    let mut events = CategorisedEvents::default();
    events.system.push(EventRecord {
        category: Category::System,
        log_name: "System".into(),
        time_created: chrono::Utc.with_ymd_and_hms(2026, 8, 20, 17, 3, 44).unwrap(),
        level: "Critical".into(),
        event_id: 41,
        provider: "Microsoft-Windows-Kernel-Power".into(),
        task: None,
        record_id: Some(1_204_991),
        message: "The system has rebooted without cleanly shutting down first.".into(),
    });

    let mut hardware = HardwareProfile::default();
    hardware.system.manufacturer = Some("Fabrikam".into());
    hardware.disks.push(DiskInfo {
        model: Some("FK NVMe 1TB".into()),
        interface_type: None,
        size_gb: Some(953.87),
        serial_number: Some("FK123456".into()),
    });

    let applications = vec![InstalledApplication {
        name: "7-Zip".into(),
        version: Some("24.08".into()),
        publisher: Some("Igor Pavlov".into()),
        install_date: None,
        install_location: None,
        uninstall_command: None,
    }];

    ReportDocument::assemble(metadata, events, hardware, applications)
}

#[test]
fn document_round_trips_losslessly() {
    let document = sample_document();
    let json = serde_json::to_string_pretty(&document).unwrap();
    let back: ReportDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(back, document);
}

#[test]
fn wire_names_are_pascal_case() {
    let document = sample_document();
    let value = serde_json::to_value(&document).unwrap();

    assert!(value["Metadata"]["GeneratedAt"].is_string());
    assert!(value["Metadata"]["MaxEvents"].is_number());
    assert!(value["Events"]["System"].is_array());
    assert!(value["Events"]["Application"].is_array());
    assert!(value["Events"]["Hardware"].is_array());
    assert!(value["Hardware"]["Disks"].is_array());
    assert!(value["Applications"].is_array());

    let record = &value["Events"]["System"][0];
    assert_eq!(record["EventId"], 41);
    assert_eq!(record["Category"], "System");
    assert!(record["TimeCreated"].is_string());
    assert_eq!(record["Provider"], "Microsoft-Windows-Kernel-Power");
}

#[test]
fn unavailable_values_stay_null() {
    let document = sample_document();
    let value = serde_json::to_value(&document).unwrap();

    assert!(value["Metadata"]["UserName"].is_null());
    assert!(value["Metadata"]["EndTime"].is_null());
    assert!(value["Events"]["System"][0]["Task"].is_null());
    assert!(value["Hardware"]["Disks"][0]["InterfaceType"].is_null());
    assert!(value["Hardware"]["System"]["Model"].is_null());
    assert!(value["Applications"][0]["InstallDate"].is_null());
}

#[test]
fn collection_errors_survive_the_trip() {
    let document = sample_document();
    let json = serde_json::to_string(&document).unwrap();
    let back: ReportDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(back.metadata.errors.len(), 1);
    assert!(back.metadata.errors[0].contains("no configured provider"));
}

#[test]
fn categorised_totals_count_every_category() {
    let document = sample_document();
    assert_eq!(document.events.total(), 1);
    assert_eq!(document.events.system.len(), 1);
    assert!(document.events.application.is_empty());
    assert!(document.events.hardware.is_empty());
}
