use std::path::PathBuf;

use league_sim::DataError;
use league_sim::fixtures::{Fixture, load_fixtures};
use league_sim::team_profile::load_team_profiles;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn data_error(err: &anyhow::Error) -> &DataError {
    err.downcast_ref::<DataError>()
        .or_else(|| err.chain().find_map(|e| e.downcast_ref::<DataError>()))
        .expect("error chain should carry a DataError")
}

#[test]
fn loads_team_table_with_padded_headers() {
    let profiles = load_team_profiles(&fixture_path("teams.csv")).expect("teams should load");
    assert_eq!(profiles.len(), 6);
    let names: Vec<&str> = profiles.names().collect();
    assert_eq!(names[0], "Arsenal");
    assert_eq!(names[2], "Manchester City");

    let arsenal = profiles.get("Arsenal").expect("Arsenal present");
    assert!((arsenal.offensive_strength() - 69.0 / 38.0).abs() < 1e-12);
    assert!((arsenal.defensive_strength() - 34.0 / 38.0).abs() < 1e-12);
    assert!((arsenal.adjusted_possession() - 56.1 * 86.4 / 100.0).abs() < 1e-9);
    assert!((arsenal.discipline_risk() - (22.0 / 38.0 + 2.0 / 38.0)).abs() < 1e-12);
}

#[test]
fn zero_games_played_is_a_data_error() {
    let err = load_team_profiles(&fixture_path("teams_zero_games.csv")).unwrap_err();
    match data_error(&err) {
        DataError::ZeroGamesPlayed { team } => assert_eq!(team, "Ipswich"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_column_is_named() {
    let err = load_team_profiles(&fixture_path("teams_missing_column.csv")).unwrap_err();
    match data_error(&err) {
        DataError::MissingColumn { column, .. } => assert_eq!(*column, "xG"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn loads_fixture_list_in_file_order() {
    let profiles = load_team_profiles(&fixture_path("teams.csv")).unwrap();
    let fixtures = load_fixtures(&fixture_path("fixtures.csv"), &profiles).unwrap();
    assert_eq!(fixtures.len(), 8);
    assert_eq!(fixtures[0], Fixture::new("Arsenal", "Liverpool"));
    assert_eq!(fixtures[7], Fixture::new("Liverpool", "Southampton"));
}

#[test]
fn fixture_with_unknown_team_is_rejected() {
    let profiles = load_team_profiles(&fixture_path("teams.csv")).unwrap();
    let err = load_fixtures(&fixture_path("fixtures_unknown_team.csv"), &profiles).unwrap_err();
    match data_error(&err) {
        DataError::UnknownTeam { team } => assert_eq!(team, "Leicester"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_file_reports_path() {
    let err = load_team_profiles(&fixture_path("no_such_file.csv")).unwrap_err();
    assert!(format!("{err:#}").contains("no_such_file.csv"));
}
