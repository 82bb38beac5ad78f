//! File IO round trips through a temporary directory.

use std::fs;

use skirmish_core::config::EngineConfig;
use skirmish_core::engine::BattleEngine;
use skirmish_core::error::BattleError;
use skirmish_core::replay::BattleRecord;
use skirmish_headless::loader::{
    load_config, load_record, load_roster, load_roster_dir, load_roster_path, save_record,
};
use skirmish_headless::{run_batch, BatchConfig, BatchProgress, BatchResults, HeadlessError, Scenario};
use skirmish_test_utils::fixtures::{standard_blue, standard_red, STANDARD_ROSTER_RON};
use tempfile::tempdir;

const BROKEN_HERO: &str = r#"[
    (
        id: "hollow",
        name: "Hollow",
        role: tank,
        stats: (health: 0, attack_damage: 10, attack_range: 1),
    ),
]"#;

#[test]
fn roster_file_loads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("heroes.ron");
    fs::write(&path, STANDARD_ROSTER_RON).unwrap();

    let roster = load_roster(&path).unwrap();
    assert_eq!(roster.len(), 10);
    assert!(roster.contains("medic"));
}

#[test]
fn missing_roster_is_reported() {
    let dir = tempdir().unwrap();
    let err = load_roster(&dir.path().join("nope.ron")).unwrap_err();
    assert!(matches!(err, HeadlessError::FileNotFound(_)));
}

#[test]
fn malformed_roster_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.ron");
    fs::write(&path, "[ (id: ").unwrap();

    let err = load_roster(&path).unwrap_err();
    assert!(matches!(
        err,
        HeadlessError::Battle(BattleError::DataParse { .. })
    ));
}

#[test]
fn roster_dir_skips_broken_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a_heroes.ron"), STANDARD_ROSTER_RON).unwrap();
    fs::write(dir.path().join("b_broken.ron"), BROKEN_HERO).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a roster").unwrap();

    let roster = load_roster_dir(dir.path()).unwrap();
    assert_eq!(roster.len(), 10);
    assert!(!roster.contains("hollow"));

    let same = load_roster_path(dir.path()).unwrap();
    assert_eq!(same.len(), 10);
}

#[test]
fn config_file_loads_and_validates() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("fast.ron");
    fs::write(&good, "(tick_ms: 50, max_duration_ms: 60000, ultimate_charge_per_tick: 1.5)").unwrap();
    let config = load_config(&good).unwrap();
    assert_eq!(config.tick_ms, 50);
    assert_eq!(config.max_duration_ms, 60_000);
    assert_eq!(config.critical_chance_percent, EngineConfig::default().critical_chance_percent);

    let bad = dir.path().join("bad.ron");
    fs::write(&bad, "(tick_ms: 70, max_duration_ms: 1000)").unwrap();
    assert!(matches!(
        load_config(&bad),
        Err(HeadlessError::Battle(BattleError::InvalidConfig(_)))
    ));
}

#[test]
fn replay_record_survives_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("replays").join("run.bin");
    let roster = skirmish_test_utils::fixtures::standard_roster();
    let config = EngineConfig::default();
    let (blue, red) = (standard_blue(), standard_red());

    let result = BattleEngine::new(config.clone())
        .unwrap()
        .simulate_battle_seeded(&blue, &red, &roster, 31)
        .unwrap();
    let record = BattleRecord::new("disk", &blue, &red, &config, &result);
    save_record(&record, &path).unwrap();

    let loaded = load_record(&path).unwrap();
    assert_eq!(loaded, record);
    assert_eq!(loaded.verify(&roster).unwrap().digest, result.digest);
}

#[test]
fn corrupt_record_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("junk.bin");
    fs::write(&path, [1u8, 2, 3]).unwrap();
    assert!(matches!(
        load_record(&path),
        Err(HeadlessError::Battle(BattleError::Serialization(_)))
    ));
}

#[test]
fn scenario_and_batch_results_round_trip() {
    let dir = tempdir().unwrap();
    let scenario_path = dir.path().join("mini.ron");
    fs::write(
        &scenario_path,
        r#"Scenario(
            name: "mini",
            seed: 5,
            blue: [
                (hero_id: "vanguard", position: (row: 0, col: 0)),
                (hero_id: "deadeye", position: (row: 2, col: 0)),
                (hero_id: "medic", position: (row: 3, col: 0), level: 2),
            ],
            red: [
                (hero_id: "warden", position: (row: 0, col: 0)),
                (hero_id: "raider", position: (row: 0, col: 1)),
                (hero_id: "oracle", position: (row: 3, col: 3)),
            ],
        )"#,
    )
    .unwrap();
    let scenario = Scenario::load(&scenario_path).unwrap();
    assert_eq!(scenario.blue[2].level, 2);

    let roster = skirmish_test_utils::fixtures::standard_roster();
    let results = run_batch(
        &BattleEngine::default(),
        &scenario,
        &roster,
        &BatchConfig::new(&scenario.name, 3).with_seed(scenario.seed),
        &BatchProgress::new(),
    )
    .unwrap();

    let out = dir.path().join("out").join("batch.json");
    results.save(&out).unwrap();
    let loaded = BatchResults::load(&out).unwrap();
    assert_eq!(loaded.games, results.games);
    assert_eq!(loaded.summary.total, 3);
    assert_eq!(loaded.config, results.config);
}
