use std::collections::HashMap;

use crate::error::DataError;
use crate::fixtures::Fixture;
use crate::match_model::{MatchResult, MatchSampler, Outcome, classify_outcome};
use crate::team_profile::TeamProfiles;

pub const POINTS_WIN: u32 = 3;
pub const POINTS_DRAW: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandingsRow {
    pub team: String,
    pub points: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_scored: u32,
    pub goals_conceded: u32,
    pub clean_sheets: u32,
    pub goal_difference: i64,
}

impl StandingsRow {
    pub fn new(team: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            ..Self::default()
        }
    }

    pub fn played(&self) -> u32 {
        self.won + self.drawn + self.lost
    }

    fn record(&mut self, scored: u32, conceded: u32, points: u32) {
        self.goals_scored += scored;
        self.goals_conceded += conceded;
        if conceded == 0 {
            self.clean_sheets += 1;
        }
        match points {
            POINTS_WIN => self.won += 1,
            POINTS_DRAW => self.drawn += 1,
            _ => self.lost += 1,
        }
        self.points += points;
    }

    fn finalize(&mut self) {
        self.goal_difference = self.goals_scored as i64 - self.goals_conceded as i64;
    }
}

/// Lifecycle of a [`SeasonSimulator`]. The finalized state is the [`SeasonRun`]
/// returned by [`SeasonSimulator::finalize`], which consumes the simulator, so no
/// further results can be booked once a season is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonPhase {
    Initialized,
    InProgress,
}

/// Immutable standings of one simulated season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonRun {
    pub run_id: u32,
    pub rows: Vec<StandingsRow>,
}

impl SeasonRun {
    pub fn row(&self, team: &str) -> Option<&StandingsRow> {
        self.rows.iter().find(|r| r.team == team)
    }

    /// League table of this run: points, goal difference, goals scored, then name.
    pub fn table(&self) -> Vec<(u32, &StandingsRow)> {
        let mut rows: Vec<&StandingsRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then(b.goal_difference.cmp(&a.goal_difference))
                .then(b.goals_scored.cmp(&a.goals_scored))
                .then_with(|| a.team.cmp(&b.team))
        });
        rows.into_iter()
            .enumerate()
            .map(|(idx, row)| (idx as u32 + 1, row))
            .collect()
    }

    pub fn position_of(&self, team: &str) -> Option<u32> {
        self.table()
            .into_iter()
            .find(|(_, row)| row.team == team)
            .map(|(pos, _)| pos)
    }
}

/// Accumulates one season. Rows are keyed by team name and updated by direct lookup.
pub struct SeasonSimulator<'a> {
    profiles: &'a TeamProfiles,
    rows: HashMap<String, StandingsRow>,
    phase: SeasonPhase,
    played: usize,
}

impl<'a> SeasonSimulator<'a> {
    pub fn new(profiles: &'a TeamProfiles) -> Self {
        let rows = profiles
            .names()
            .map(|name| (name.to_string(), StandingsRow::new(name)))
            .collect();
        Self {
            profiles,
            rows,
            phase: SeasonPhase::Initialized,
            played: 0,
        }
    }

    pub fn phase(&self) -> SeasonPhase {
        self.phase
    }

    pub fn matches_played(&self) -> usize {
        self.played
    }

    pub fn play<S: MatchSampler + ?Sized>(
        &mut self,
        fixture: &Fixture,
        sampler: &mut S,
    ) -> Result<MatchResult, DataError> {
        let home = self.profiles.require(&fixture.home)?;
        let away = self.profiles.require(&fixture.away)?;
        let result = sampler.sample(home, away)?;
        self.apply(fixture, &result)?;
        Ok(result)
    }

    /// Books a result against both teams. Nothing is mutated unless both rows exist
    /// and the outcome tag agrees with the score.
    pub fn apply(&mut self, fixture: &Fixture, result: &MatchResult) -> Result<(), DataError> {
        for team in [&fixture.home, &fixture.away] {
            if !self.rows.contains_key(team) {
                return Err(DataError::UnknownTeam { team: team.clone() });
            }
        }
        if fixture.home == fixture.away {
            return Err(DataError::SelfFixture {
                team: fixture.home.clone(),
            });
        }
        if result.outcome != classify_outcome(result.home_goals, result.away_goals) {
            return Err(DataError::InconsistentResult {
                home: fixture.home.clone(),
                away: fixture.away.clone(),
                home_goals: result.home_goals,
                away_goals: result.away_goals,
            });
        }

        let (home_points, away_points) = outcome_points(result.outcome);
        if let Some(home) = self.rows.get_mut(&fixture.home) {
            home.record(result.home_goals, result.away_goals, home_points);
        }
        if let Some(away) = self.rows.get_mut(&fixture.away) {
            away.record(result.away_goals, result.home_goals, away_points);
        }
        self.phase = SeasonPhase::InProgress;
        self.played += 1;
        Ok(())
    }

    pub fn finalize(mut self, run_id: u32) -> SeasonRun {
        let mut rows = Vec::with_capacity(self.profiles.len());
        for name in self.profiles.names() {
            if let Some(mut row) = self.rows.remove(name) {
                row.finalize();
                rows.push(row);
            }
        }
        SeasonRun { run_id, rows }
    }
}

pub fn simulate_season<S: MatchSampler + ?Sized>(
    run_id: u32,
    profiles: &TeamProfiles,
    fixtures: &[Fixture],
    sampler: &mut S,
) -> Result<SeasonRun, DataError> {
    let mut season = SeasonSimulator::new(profiles);
    for fixture in fixtures {
        season.play(fixture, sampler)?;
    }
    log::debug!("run {run_id}: {} fixtures played", season.matches_played());
    Ok(season.finalize(run_id))
}

pub fn outcome_points(outcome: Outcome) -> (u32, u32) {
    match outcome {
        Outcome::HomeWin => (POINTS_WIN, 0),
        Outcome::Draw => (POINTS_DRAW, POINTS_DRAW),
        Outcome::AwayWin => (0, POINTS_WIN),
    }
}
