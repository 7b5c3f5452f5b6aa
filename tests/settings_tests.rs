//! Tests for settings persistence

use ardicee::ar_dice::{AppSettings, ColorSetting, SurfaceSetting, DEFAULT_SETTINGS_FILE};
use std::fs;

#[test]
fn test_save_then_load_keeps_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_SETTINGS_FILE);

    let mut settings = AppSettings::default();
    settings.roll.duration_seconds = 0.75;
    settings.die.bounding_radius = 0.1;
    settings.die.scene = Some("models/die.glb#Scene0".to_string());
    settings.plane_indicator.texture = Some("textures/grid.png".to_string());
    settings.die.color = ColorSetting::rgba(0.2, 0.4, 0.6, 1.0);
    settings.simulation.world_tracking_supported = false;
    settings.simulation.surfaces = vec![SurfaceSetting {
        center: [0.5, 0.9, -1.0],
        extent: [0.6, 0.6],
    }];

    settings.save_to_file(&path).unwrap();
    assert!(path.exists());

    let loaded = AppSettings::load_from_file(&path);
    assert_eq!(loaded, settings);
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = AppSettings::load_from_file(&dir.path().join("nope.json"));
    assert_eq!(loaded, AppSettings::default());
}

#[test]
fn test_malformed_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ \"roll\": { \"duration_seconds\": ").unwrap();

    assert_eq!(AppSettings::load_from_file(&path), AppSettings::default());
    assert!(AppSettings::from_json("{ not json")
        .unwrap_err()
        .starts_with("Invalid settings JSON"));
}

#[test]
fn test_saved_file_is_readable_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    AppSettings::default().save_to_file(&path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["roll"]["spin_multiplier"], 10.0);
    assert_eq!(value["die"]["bounding_radius"], 0.05);
    assert!(value["plane_indicator"]["texture"].is_null());
    assert_eq!(value["simulation"]["surfaces"].as_array().map(Vec::len), Some(3));
}

#[test]
fn test_save_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("settings.json");
    let err = AppSettings::default().save_to_file(&path).unwrap_err();
    assert!(err.starts_with("Failed to write settings file"));
}
