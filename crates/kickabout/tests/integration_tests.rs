// Integration tests for the kickabout app.
//
// These drive the command handlers against an in-memory SQLite database and
// check that roster administration, simulation, result recording and the
// dashboard work together.

use std::path::PathBuf;

use kickabout::app::App;
use kickabout::cli::{Command, Score};
use kickabout::config::{Config, PlayerDefaults};
use kickabout::db::Database;
use kickabout_core::{EngineConfig, Repository};

// ===========================================================================
// Test helpers
// ===========================================================================

fn inline_config() -> Config {
    Config {
        engine: EngineConfig::default(),
        new_player: PlayerDefaults::default(),
        db_path: ":memory:".into(),
    }
}

fn test_app() -> App {
    let db = Database::open(":memory:").expect("in-memory database should open");
    App::new(db, &inline_config())
}

/// App with `n` players named "Player 1".."Player n" (ids 1..=n).
fn app_with_players(n: usize) -> App {
    let app = test_app();
    for i in 1..=n {
        app.run(&Command::AddPlayer {
            name: format!("Player {i}"),
        })
        .unwrap();
    }
    app
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{}_{name}", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

// ===========================================================================
// Roster
// ===========================================================================

#[test]
fn add_player_then_list() {
    let app = test_app();
    let out = app
        .run(&Command::AddPlayer {
            name: "Ada".into(),
        })
        .unwrap();
    assert_eq!(out, "Added Ada (id 1)");

    let listing = app.run(&Command::Players).unwrap();
    assert!(listing.contains("Ada"));
    assert!(listing.contains("1000.0"));
}

#[test]
fn empty_roster_listing() {
    let app = test_app();
    assert_eq!(app.run(&Command::Players).unwrap(), "No players yet.");
}

// ===========================================================================
// Simulation and recording
// ===========================================================================

#[test]
fn seeded_simulation_is_reproducible() {
    let app = app_with_players(6);
    let cmd = Command::Simulate {
        players: vec![1, 2, 3, 4, 5, 6],
        avoid_repeat: false,
        seed: Some(99),
        json: false,
    };
    let first = app.run(&cmd).unwrap();
    let second = app.run(&cmd).unwrap();
    assert_eq!(first, second);
    assert!(first.contains("Fairness: 100.0/100"));
    assert!(first.contains("Teams balanced on ratings and chemistry."));
}

#[test]
fn simulation_json_has_teams_and_score() {
    let app = app_with_players(5);
    let out = app
        .run(&Command::Simulate {
            players: vec![1, 2, 3, 4, 5],
            avoid_repeat: false,
            seed: Some(1),
            json: true,
        })
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["split"]["team1"].as_array().unwrap().len(), 2);
    assert_eq!(value["split"]["team2"].as_array().unwrap().len(), 3);
    assert_eq!(value["fairness"]["score"].as_f64().unwrap(), 80.0);
}

#[test]
fn simulation_with_unknown_player_fails() {
    let app = app_with_players(2);
    let err = app
        .run(&Command::Simulate {
            players: vec![1, 2, 77],
            avoid_repeat: false,
            seed: Some(1),
            json: false,
        })
        .unwrap_err();
    assert!(err.to_string().contains("77"));
}

#[test]
fn record_updates_ratings_and_dashboard() {
    let app = app_with_players(4);
    app.run(&Command::Chemistry {
        player_a: 2,
        player_b: 1,
        value: 10.0,
    })
    .unwrap();

    let out = app
        .run(&Command::Record {
            team1: vec![1, 2],
            team2: vec![3, 4],
            score: Score { team1: 2, team2: 1 },
        })
        .unwrap();
    assert!(out.starts_with("Recorded game 1 (2-1)"));
    assert!(out.contains("(+10.7)"));
    assert!(out.contains("(-10.7)"));

    let p1 = app.db().player(1).unwrap().unwrap();
    assert!((p1.rating - (1000.0 + 64.0 / 6.0)).abs() < 1e-9);
    assert!((p1.uncertainty - 95.0).abs() < 1e-9);

    let json = app.run(&Command::Dashboard { json: true }).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["chemistry_over_time"][0].as_f64().unwrap(), 10.0);
    assert_eq!(value["fairness_over_time"].as_array().unwrap().len(), 1);
}

#[test]
fn zero_zero_result_is_rejected_and_nothing_persists() {
    let app = app_with_players(2);
    let err = app
        .run(&Command::Record {
            team1: vec![1],
            team2: vec![2],
            score: Score { team1: 0, team2: 0 },
        })
        .unwrap_err();
    assert!(err.to_string().contains("zero"));
    assert!(app.db().games_ordered().unwrap().is_empty());
    assert_eq!(app.db().player(1).unwrap().unwrap().rating, 1000.0);
}

#[test]
fn dashboard_without_games() {
    let app = app_with_players(2);
    assert_eq!(
        app.run(&Command::Dashboard { json: false }).unwrap(),
        "No games with recorded lineups yet."
    );
}

#[test]
fn standings_reflect_results() {
    let app = app_with_players(2);
    app.run(&Command::Record {
        team1: vec![2],
        team2: vec![1],
        score: Score { team1: 5, team2: 0 },
    })
    .unwrap();

    let listing = app.run(&Command::Players).unwrap();
    let pos1 = listing.find("Player 1").unwrap();
    let pos2 = listing.find("Player 2").unwrap();
    assert!(pos2 < pos1, "winner should be listed first:\n{listing}");
}

// ===========================================================================
// CSV import
// ===========================================================================

#[test]
fn import_roster_and_signals() {
    let app = test_app();
    let roster = temp_file(
        "kickabout_it_roster.csv",
        "name,rating,uncertainty\nAda,1100,80\nBo,,\nCy,900,\n",
    );
    let out = app.run(&Command::ImportRoster { path: roster }).unwrap();
    assert_eq!(out, "Imported 3 players");

    let signals = temp_file(
        "kickabout_it_signals.csv",
        "kind,player_a,player_b,value\nchemistry,1,2,4\npreference,3,1,0.5\npreference,1,3,-0.5\n",
    );
    let out = app.run(&Command::ImportSignals { path: signals }).unwrap();
    assert_eq!(out, "Imported 1 chemistry and 2 preference records");

    let ada = app.db().player(1).unwrap().unwrap();
    assert_eq!((ada.rating, ada.uncertainty), (1100.0, 80.0));
    assert_eq!(app.db().chemistry_records().unwrap().len(), 1);
    assert_eq!(app.db().preference_records().unwrap().len(), 2);
}
