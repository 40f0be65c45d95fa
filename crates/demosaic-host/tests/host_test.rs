use demosaic_core::{AppliedMutation, EntityId};
use demosaic_host::*;
use std::process::Command;
use std::time::Duration;
use tempfile::tempdir;

const SCENE: &str = r#"{
    "entities": [
        { "id": 1, "name": "Root", "children": [
            { "id": 2, "name": "mosaic_quad", "mesh": "Quad",
              "materials": [ { "name": "quad_mat", "shader_name": "Unlit/Texture" } ] }
        ] },
        { "id": 3, "name": "Player",
          "materials": [ { "name": "skin", "shader_name": "Standard" } ] },
        { "id": 4, "name": "CensorBar", "active": false, "components": [ "CensorEffect" ] }
    ],
    "methods": [
        { "id": "game::Censor::ApplyCensor", "assembly": "Assembly-CSharp",
          "type_name": "Censor", "method_name": "ApplyCensor" },
        { "id": "game::Player::Jump", "assembly": "Assembly-CSharp",
          "type_name": "Player", "method_name": "Jump" }
    ],
    "events": [
        { "at_ms": 3000, "action": "set_mode", "mode": "destroy" },
        { "at_ms": 500, "action": "instantiate", "parent": "Root",
          "entity": { "id": 5, "name": "Pixel_Overlay",
                      "materials": [ { "name": "overlay", "shader_name": "Custom/Pixelate" } ] } },
        { "at_ms": 2000, "action": "activate", "target": "CensorBar" },
        { "at_ms": 3500, "action": "scene_loaded", "entities": [ { "id": 6, "name": "h-mosaic_plane" } ] }
    ]
}"#;

fn fast(ticks: u64) -> RunOptions {
    RunOptions {
        tick: Duration::from_millis(100),
        max_ticks: ticks,
        pace: None,
    }
}

// ── Scene replay ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_scene_replay() {
    let scene = Scene::from_json(SCENE).unwrap();
    let report = run(&HostConfig::default(), scene, &fast(60)).await.unwrap();

    assert!(report.enabled);
    assert_eq!(report.ticks, 60);
    assert_eq!(report.clock_ms, 6000);
    assert_eq!(
        report.mutations,
        vec![
            AppliedMutation::Deactivated { entity: EntityId(5) },
            AppliedMutation::Deactivated { entity: EntityId(2) },
            AppliedMutation::Deactivated { entity: EntityId(4) },
            AppliedMutation::EntityDestroyed { entity: EntityId(6) },
        ]
    );
    assert_eq!(report.remaining_entities, 5);

    // Startup sweep plus the first post-load sweep; the late one is still pending.
    assert_eq!(report.metrics.sweeps_completed, 2);
    assert_eq!(report.metrics.immediate_triggers, 2);
    assert_eq!(report.suppression.disable, vec!["game::Censor::ApplyCensor"]);
}

#[tokio::test]
async fn test_disabled_host_does_nothing() {
    let mut config = HostConfig::default();
    config.general.enabled = false;

    let scene = Scene::from_json(SCENE).unwrap();
    let report = run(&config, scene, &fast(60)).await.unwrap();

    assert!(!report.enabled);
    assert!(report.mutations.is_empty());
    assert_eq!(report.remaining_entities, 4);
}

#[tokio::test]
async fn test_invalid_config_fails_before_running() {
    let mut config = HostConfig::default();
    config.general.remove_mode = "vaporize".into();

    let scene = Scene::from_json(SCENE).unwrap();
    let err = run(&config, scene, &fast(10)).await.unwrap_err();
    assert!(err.to_string().contains("remove_mode"));
}

#[tokio::test]
async fn test_manual_scan_key_must_match() {
    let scene = Scene::from_json(
        r#"{
            "entities": [ { "id": 1, "name": "mosaic" } ],
            "events": [
                { "at_ms": 0, "action": "manual_scan", "key": "F9" },
                { "at_ms": 100, "action": "manual_scan", "key": "f10" }
            ]
        }"#,
    )
    .unwrap();

    let mut config = HostConfig::default();
    config.scan.run_on_startup = false;

    let report = run(&config, scene, &fast(3)).await.unwrap();
    assert_eq!(report.metrics.sweeps_started, 1);
    assert_eq!(report.mutations.len(), 1);
}

#[tokio::test]
async fn test_out_of_range_interval_is_ignored() {
    let scene = Scene::from_json(
        r#"{
            "entities": [ { "id": 1, "name": "mosaic" } ],
            "events": [
                { "at_ms": 0, "action": "set_interval", "seconds": 1e20 },
                { "at_ms": 100, "action": "set_interval", "seconds": 0.5 }
            ]
        }"#,
    )
    .unwrap();

    let mut config = HostConfig::default();
    config.scan.run_on_startup = false;
    config.scan.periodic_interval = Duration::ZERO;

    let report = run(&config, scene, &fast(15)).await.unwrap();
    assert_eq!(report.ticks, 15);
    assert_eq!(report.mutations, vec![AppliedMutation::Deactivated { entity: EntityId(1) }]);
}

// ── Config files ─────────────────────────────────────────────────────────────

#[test]
fn test_config_file_loading() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("demosaic.toml");
    std::fs::write(
        &path,
        "[general]\nremove_mode = \"destroy\"\n\n[scan]\nbatch_size = 50\n",
    )
    .unwrap();

    let config = HostConfig::load(&path).unwrap();
    assert_eq!(config.scan.batch_size, 50);
    assert!(config.validate().is_empty());

    let missing = HostConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(missing, HostConfig::default());

    std::fs::write(&path, "[scan\nbatch_size = ").unwrap();
    assert!(HostConfig::load(&path).is_err());

    std::fs::write(&path, "[scan]\nperiodic_interval = 1e20\n").unwrap();
    assert!(HostConfig::load(&path).is_err());
}

// ── Binary ───────────────────────────────────────────────────────────────────

#[test]
fn test_binary_prints_report() {
    let dir = tempdir().unwrap();
    let scene_path = dir.path().join("scene.json");
    std::fs::write(&scene_path, SCENE).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_demosaic"))
        .arg("--config")
        .arg(dir.path().join("demosaic.toml"))
        .arg("run")
        .arg("--scene")
        .arg(&scene_path)
        .arg("--max-ticks")
        .arg("20")
        .arg("--fast")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["ticks"], 20);
    assert_eq!(report["mutations"][0]["kind"], "deactivated");
    assert_eq!(report["mutations"][0]["entity"], 5);
}

#[test]
fn test_binary_rejects_invalid_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("demosaic.toml");
    std::fs::write(&config_path, "[general]\nremove_mode = \"vaporize\"\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_demosaic"))
        .arg("--config")
        .arg(&config_path)
        .arg("config")
        .arg("validate")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("remove_mode"));
}
