use std::collections::VecDeque;

use league_sim::DataError;
use league_sim::aggregate::{self, MonteCarloConfig};
use league_sim::fixtures::{Fixture, double_round_robin};
use league_sim::match_model::{MatchResult, MatchSampler};
use league_sim::season::{SeasonRun, simulate_season};
use league_sim::team_profile::{TeamProfile, TeamProfiles, TeamSeasonStats};

fn team(name: &str, scored: u32, conceded: u32) -> TeamProfile {
    TeamProfile::new(TeamSeasonStats {
        team: name.to_string(),
        games_played: 38,
        goals_scored: scored,
        goals_conceded: conceded,
        possession_pct: 52.0,
        passing_accuracy_pct: 84.0,
        yellow_cards: 19,
        red_cards: 1,
        xg: 1.6,
        shots_on_target: 4.8,
    })
    .expect("valid stats")
}

fn league() -> TeamProfiles {
    TeamProfiles::from_profiles([
        team("Arsenal", 69, 34),
        team("Brentford", 56, 57),
        team("Chelsea", 64, 43),
        team("Fulham", 54, 54),
    ])
    .expect("unique names")
}

/// Replays a fixed list of scores in fixture order.
struct Scripted(VecDeque<(u32, u32)>);

impl MatchSampler for Scripted {
    fn sample(&mut self, _: &TeamProfile, _: &TeamProfile) -> Result<MatchResult, DataError> {
        let (home, away) = self.0.pop_front().unwrap_or((0, 0));
        Ok(MatchResult::from_score(home, away))
    }
}

/// Score depends only on who plays whom, so fixture order cannot matter.
struct ByName;

impl MatchSampler for ByName {
    fn sample(&mut self, home: &TeamProfile, away: &TeamProfile) -> Result<MatchResult, DataError> {
        let h = home.name().len() as u32 % 4;
        let a = away.name().len() as u32 % 3;
        Ok(MatchResult::from_score(h, a))
    }
}

#[test]
fn home_win_then_draw_updates_both_rows() {
    let teams = league();
    let fixtures = vec![
        Fixture::new("Arsenal", "Chelsea"),
        Fixture::new("Chelsea", "Arsenal"),
    ];
    let mut sampler = Scripted(VecDeque::from([(2, 1), (1, 1)]));
    let run = simulate_season(1, &teams, &fixtures, &mut sampler).unwrap();

    let arsenal = run.row("Arsenal").unwrap();
    assert_eq!(arsenal.points, 4);
    assert_eq!((arsenal.won, arsenal.drawn, arsenal.lost), (1, 1, 0));
    assert_eq!((arsenal.goals_scored, arsenal.goals_conceded), (3, 2));
    assert_eq!(arsenal.goal_difference, 1);
    assert_eq!(arsenal.clean_sheets, 0);

    let chelsea = run.row("Chelsea").unwrap();
    assert_eq!(chelsea.points, 1);
    assert_eq!((chelsea.won, chelsea.drawn, chelsea.lost), (0, 1, 1));
    assert_eq!(chelsea.goal_difference, -1);

    let idle = run.row("Fulham").unwrap();
    assert_eq!(idle.played(), 0);
    assert_eq!(idle.points, 0);
}

#[test]
fn goalless_draw_is_a_clean_sheet_for_both() {
    let teams = league();
    let fixtures = vec![Fixture::new("Brentford", "Fulham")];
    let run = simulate_season(1, &teams, &fixtures, &mut Scripted(VecDeque::from([(0, 0)])))
        .unwrap();
    assert_eq!(run.row("Brentford").unwrap().clean_sheets, 1);
    assert_eq!(run.row("Fulham").unwrap().clean_sheets, 1);
    assert_eq!(run.row("Fulham").unwrap().points, 1);
}

#[test]
fn season_totals_balance() {
    let teams = league();
    let names: Vec<&str> = teams.names().collect();
    let fixtures = double_round_robin(&names);
    let scores = [(3, 0), (1, 1), (0, 2), (2, 2), (4, 1), (0, 0)];
    let mut sampler = Scripted(scores.iter().copied().cycle().take(fixtures.len()).collect());
    let run = simulate_season(1, &teams, &fixtures, &mut sampler).unwrap();

    let scored: u32 = run.rows.iter().map(|r| r.goals_scored).sum();
    let conceded: u32 = run.rows.iter().map(|r| r.goals_conceded).sum();
    assert_eq!(scored, conceded);
    assert_eq!(run.rows.iter().map(|r| r.goal_difference).sum::<i64>(), 0);

    let draws: u32 = run.rows.iter().map(|r| r.drawn).sum::<u32>() / 2;
    let decided = fixtures.len() as u32 - draws;
    let points: u32 = run.rows.iter().map(|r| r.points).sum();
    assert_eq!(points, 3 * decided + 2 * draws);

    for row in &run.rows {
        assert_eq!(row.played(), 6);
        assert_eq!(row.points, 3 * row.won + row.drawn);
        assert_eq!(
            row.goal_difference,
            row.goals_scored as i64 - row.goals_conceded as i64
        );
    }
}

#[test]
fn fixture_order_does_not_change_standings() {
    let teams = league();
    let names: Vec<&str> = teams.names().collect();
    let fixtures = double_round_robin(&names);
    let mut reversed = fixtures.clone();
    reversed.reverse();

    let a = simulate_season(1, &teams, &fixtures, &mut ByName).unwrap();
    let b = simulate_season(1, &teams, &reversed, &mut ByName).unwrap();
    assert_eq!(a, b);
}

#[test]
fn self_fixture_aborts_the_season() {
    let teams = league();
    let fixtures = vec![Fixture::new("Arsenal", "Arsenal")];
    let err = simulate_season(1, &teams, &fixtures, &mut ByName).unwrap_err();
    assert!(matches!(err, DataError::SelfFixture { .. }));
}

#[test]
fn averages_scripted_runs() {
    let teams = league();
    let fixtures = vec![Fixture::new("Arsenal", "Brentford")];
    // Run 1: home win, run 2: away win, run 3: draw.
    let runs = aggregate::run_with_samplers(&teams, &fixtures, 3, |run_id| {
        let score = match run_id {
            1 => (2, 0),
            2 => (0, 1),
            _ => (1, 1),
        };
        Scripted(VecDeque::from([score]))
    })
    .unwrap();
    let standings = aggregate::aggregate(&runs).unwrap();

    let arsenal = standings.iter().find(|r| r.team == "Arsenal").unwrap();
    assert!((arsenal.points - 4.0 / 3.0).abs() < 1e-12);
    assert!((arsenal.won - 1.0 / 3.0).abs() < 1e-12);
    assert!((arsenal.goals_scored - 1.0).abs() < 1e-12);
    assert!((arsenal.clean_sheets - 1.0 / 3.0).abs() < 1e-12);

    let brentford = standings.iter().find(|r| r.team == "Brentford").unwrap();
    assert!((brentford.points - 4.0 / 3.0).abs() < 1e-12);
    // Level on points and results; Arsenal scored more.
    assert!(arsenal.position < brentford.position);
}

#[test]
fn positions_form_a_permutation() {
    let teams = league();
    let names: Vec<&str> = teams.names().collect();
    let fixtures = double_round_robin(&names);
    let report = aggregate::run_simulations(
        &teams,
        &fixtures,
        MonteCarloConfig {
            runs: 8,
            seed: Some(2024),
            parallel: true,
        },
    )
    .unwrap();

    let mut positions: Vec<u32> = report.standings.iter().map(|r| r.position).collect();
    positions.sort_unstable();
    assert_eq!(positions, vec![1, 2, 3, 4]);
    for pair in report.standings.windows(2) {
        assert!(pair[0].points >= pair[1].points);
    }
    assert_eq!(report.runs.len(), 8);
}

#[test]
fn seeded_runs_match_across_schedulers() {
    let teams = league();
    let names: Vec<&str> = teams.names().collect();
    let fixtures = double_round_robin(&names);
    let simulate = |parallel| {
        aggregate::run_simulations(
            &teams,
            &fixtures,
            MonteCarloConfig {
                runs: 12,
                seed: Some(7),
                parallel,
            },
        )
        .unwrap()
    };
    let parallel = simulate(true);
    let sequential = simulate(false);
    let again = simulate(true);

    assert_eq!(parallel.seed, 7);
    assert_eq!(parallel.runs, sequential.runs);
    assert_eq!(parallel.standings, sequential.standings);
    assert_eq!(parallel.standings, again.standings);
    let ids: Vec<u32> = parallel.runs.iter().map(|r: &SeasonRun| r.run_id).collect();
    assert_eq!(ids, (1..=12).collect::<Vec<_>>());
}

#[test]
fn zero_runs_is_rejected() {
    let teams = league();
    let cfg = MonteCarloConfig {
        runs: 0,
        seed: Some(1),
        parallel: false,
    };
    let err = aggregate::run_simulations(&teams, &[], cfg).unwrap_err();
    assert!(matches!(err, DataError::NoRuns));
}
