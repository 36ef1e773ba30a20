use std::cmp::Ordering;
use std::collections::HashMap;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::charts::{self, ChartRenderer};
use crate::error::DataError;
use crate::export::StandingsExporter;
use crate::fixtures::Fixture;
use crate::match_model::{MatchSampler, PoissonSampler};
use crate::season::{SeasonRun, simulate_season};
use crate::team_profile::TeamProfiles;

#[derive(Debug, Clone, Copy)]
pub struct MonteCarloConfig {
    pub runs: u32,
    pub seed: Option<u64>,
    pub parallel: bool,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            runs: 11,
            seed: None,
            parallel: true,
        }
    }
}

/// Mean standings of one team across all runs.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateStandingsRow {
    pub position: u32,
    pub team: String,
    pub points: f64,
    pub won: f64,
    pub drawn: f64,
    pub lost: f64,
    pub goals_scored: f64,
    pub goals_conceded: f64,
    pub clean_sheets: f64,
    pub goal_difference: f64,
}

#[derive(Debug, Clone)]
pub struct AggregateReport {
    pub seed: u64,
    pub runs: Vec<SeasonRun>,
    pub standings: Vec<AggregateStandingsRow>,
}

impl AggregateReport {
    pub fn team(&self, name: &str) -> Option<&AggregateStandingsRow> {
        self.standings.iter().find(|r| r.team == name)
    }

    /// Hands the ranked table to the exporter, then the average-points chart to the renderer.
    pub fn publish(
        &self,
        exporter: &mut dyn StandingsExporter,
        renderer: &mut dyn ChartRenderer,
    ) -> Result<()> {
        exporter
            .export(&self.standings, &self.runs)
            .context("export standings")?;
        renderer
            .render(&charts::average_points_chart(&self.standings))
            .context("render average points chart")?;
        Ok(())
    }
}

pub fn run_seed(base_seed: u64, run_id: u32) -> u64 {
    base_seed.wrapping_add(run_id as u64)
}

pub fn run_simulations(
    profiles: &TeamProfiles,
    fixtures: &[Fixture],
    cfg: MonteCarloConfig,
) -> Result<AggregateReport, DataError> {
    if cfg.runs == 0 {
        return Err(DataError::NoRuns);
    }
    let seed = cfg.seed.unwrap_or_else(rand::random);
    log::info!(
        "simulating {} seasons ({} fixtures, seed {seed}, {})",
        cfg.runs,
        fixtures.len(),
        if cfg.parallel { "parallel" } else { "sequential" }
    );

    let simulate = |run_id: u32| {
        let mut sampler = PoissonSampler::new(StdRng::seed_from_u64(run_seed(seed, run_id)));
        simulate_season(run_id, profiles, fixtures, &mut sampler)
    };
    let runs = if cfg.parallel {
        (1..=cfg.runs)
            .into_par_iter()
            .map(simulate)
            .collect::<Result<Vec<_>, _>>()?
    } else {
        (1..=cfg.runs).map(simulate).collect::<Result<Vec<_>, _>>()?
    };

    let standings = aggregate(&runs)?;
    Ok(AggregateReport {
        seed,
        runs,
        standings,
    })
}

/// Sequential runs with caller-supplied samplers, one per run.
pub fn run_with_samplers<S, F>(
    profiles: &TeamProfiles,
    fixtures: &[Fixture],
    runs: u32,
    mut make_sampler: F,
) -> Result<Vec<SeasonRun>, DataError>
where
    S: MatchSampler,
    F: FnMut(u32) -> S,
{
    if runs == 0 {
        return Err(DataError::NoRuns);
    }
    (1..=runs)
        .map(|run_id| {
            let mut sampler = make_sampler(run_id);
            simulate_season(run_id, profiles, fixtures, &mut sampler)
        })
        .collect()
}

#[derive(Default)]
struct Totals {
    runs: u32,
    points: u64,
    won: u64,
    drawn: u64,
    lost: u64,
    goals_scored: u64,
    goals_conceded: u64,
    clean_sheets: u64,
    goal_difference: i64,
}

pub fn aggregate(runs: &[SeasonRun]) -> Result<Vec<AggregateStandingsRow>, DataError> {
    if runs.is_empty() {
        return Err(DataError::NoRuns);
    }

    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, Totals> = HashMap::new();
    for run in runs {
        for row in &run.rows {
            let t = totals.entry(row.team.as_str()).or_insert_with(|| {
                order.push(row.team.as_str());
                Totals::default()
            });
            t.runs += 1;
            t.points += row.points as u64;
            t.won += row.won as u64;
            t.drawn += row.drawn as u64;
            t.lost += row.lost as u64;
            t.goals_scored += row.goals_scored as u64;
            t.goals_conceded += row.goals_conceded as u64;
            t.clean_sheets += row.clean_sheets as u64;
            t.goal_difference += row.goal_difference;
        }
    }

    let mut rows: Vec<AggregateStandingsRow> = order
        .into_iter()
        .filter_map(|team| {
            let t = totals.get(team)?;
            let n = t.runs as f64;
            Some(AggregateStandingsRow {
                position: 0,
                team: team.to_string(),
                points: t.points as f64 / n,
                won: t.won as f64 / n,
                drawn: t.drawn as f64 / n,
                lost: t.lost as f64 / n,
                goals_scored: t.goals_scored as f64 / n,
                goals_conceded: t.goals_conceded as f64 / n,
                clean_sheets: t.clean_sheets as f64 / n,
                goal_difference: t.goal_difference as f64 / n,
            })
        })
        .collect();

    rank(&mut rows);
    Ok(rows)
}

/// Table order: points, wins, draws desc; losses asc; scored desc; conceded asc;
/// goal difference desc; team name asc.
pub fn compare_standings(a: &AggregateStandingsRow, b: &AggregateStandingsRow) -> Ordering {
    b.points
        .total_cmp(&a.points)
        .then(b.won.total_cmp(&a.won))
        .then(b.drawn.total_cmp(&a.drawn))
        .then(a.lost.total_cmp(&b.lost))
        .then(b.goals_scored.total_cmp(&a.goals_scored))
        .then(a.goals_conceded.total_cmp(&b.goals_conceded))
        .then(b.goal_difference.total_cmp(&a.goal_difference))
        .then_with(|| a.team.cmp(&b.team))
}

pub fn rank(rows: &mut [AggregateStandingsRow]) {
    rows.sort_by(compare_standings);
    for (idx, row) in rows.iter_mut().enumerate() {
        row.position = idx as u32 + 1;
    }
}
