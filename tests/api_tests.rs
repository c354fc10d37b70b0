use std::fs;

use serde_json::Value;
use sweep_dups::{Cancellation, Config, Request, handle, handle_json};
use tempfile::tempdir;

fn config_with_trash(trash: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.trash.dir = trash.to_path_buf();
    config
}

#[test]
fn test_scan_then_clean_round_trip() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("downloads");
    let trash = dir.path().join("trash");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("movie.mp4"), vec![4u8; 5000]).unwrap();
    fs::write(root.join("movie (1).mp4"), vec![4u8; 5000]).unwrap();
    fs::write(root.join("notes.txt"), vec![1u8; 5000]).unwrap();

    let mut config = config_with_trash(&trash);
    config.scan.default_root = root.clone();
    let cancel = Cancellation::new();

    let response = handle_json(r#"{"action":"scan"}"#, &config, &cancel);
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["skipped"], 0);
    let groups = json["duplicates"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["id"], "group-1");
    assert_eq!(groups[0]["size"], 5000);

    let selected: Vec<String> = groups[0]["files"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|f| f["selected"] == Value::Bool(true))
        .map(|f| f["path"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(selected.len(), 1);

    let clean = serde_json::json!({"action": "clean", "filesToDelete": selected});
    let response = handle_json(&clean.to_string(), &config, &cancel);
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Moved 1 files to Trash");
    assert!(json.get("failed").is_none());
    assert_eq!(fs::read_dir(&trash).unwrap().count(), 1);
    assert_eq!(fs::read_dir(&root).unwrap().count(), 2);
}

#[test]
fn test_scan_of_missing_root_fails() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");
    let response = handle(
        Request::Scan {
            root_path: Some(missing),
        },
        &Config::default(),
        &Cancellation::new(),
    );
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("missing"));
}

#[test]
fn test_clean_reports_failed_paths() {
    let dir = tempdir().unwrap();
    let trash = dir.path().join("trash");
    let present = dir.path().join("present");
    fs::write(&present, b"x").unwrap();
    let absent = dir.path().join("absent");

    let response = handle(
        Request::Clean {
            files_to_delete: vec![present, absent.clone()],
        },
        &config_with_trash(&trash),
        &Cancellation::new(),
    );
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Moved 1 files to Trash");
    assert_eq!(json["failed"][0], absent.to_string_lossy().as_ref());
}

#[test]
fn test_malformed_body() {
    let response = handle_json("not json", &Config::default(), &Cancellation::new());
    assert!(!response.is_success());
    let response = handle_json(r#"{"action":"clean"}"#, &Config::default(), &Cancellation::new());
    assert!(!response.is_success());
}
