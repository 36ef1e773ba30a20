//! Brownian-motion temperature paths on [0, 1].
//!
//! Each trial walks X from 0 with independent N(0, dt) increments and records the
//! share of grid points where X is positive and the time at which X peaks.

use anyhow::{Result, bail};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;

use crate::charts::{Chart, ChartBody, HistogramBin, HistogramSeries};

#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    pub delta_ts: Vec<f64>,
    pub trials: usize,
    pub bins: usize,
    pub seed: Option<u64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            delta_ts: vec![0.01, 0.001, 0.0001],
            trials: 10_000,
            bins: 50,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureTrial {
    /// Proportion of time the temperature is positive.
    pub p: f64,
    /// Time of maximum temperature.
    pub t_max: f64,
}

#[derive(Debug, Clone)]
pub struct TemperatureSeries {
    pub delta_t: f64,
    pub trials: Vec<TemperatureTrial>,
}

pub fn steps_for(delta_t: f64) -> Result<usize> {
    if !(delta_t > 0.0 && delta_t <= 1.0) {
        bail!("delta_t must lie in (0, 1], got {delta_t}");
    }
    Ok((1.0 / delta_t).round() as usize)
}

/// X_0 = 0 followed by `steps` cumulative N(0, sqrt(dt)) increments.
pub fn simulate_path<R: Rng + ?Sized>(rng: &mut R, delta_t: f64) -> Result<Vec<f64>> {
    let steps = steps_for(delta_t)?;
    let normal = Normal::new(0.0, delta_t.sqrt())?;
    let mut path = Vec::with_capacity(steps + 1);
    let mut x = 0.0;
    path.push(x);
    for _ in 0..steps {
        x += normal.sample(rng);
        path.push(x);
    }
    Ok(path)
}

pub fn summarize_path(path: &[f64]) -> TemperatureTrial {
    let steps = path.len().saturating_sub(1).max(1);
    let positive = path.iter().filter(|x| **x > 0.0).count();

    // First index of the maximum.
    let mut best = 0usize;
    for (idx, x) in path.iter().enumerate() {
        if *x > path[best] {
            best = idx;
        }
    }

    TemperatureTrial {
        p: positive as f64 / steps as f64,
        t_max: best as f64 / steps as f64,
    }
}

pub fn simulate_temperature<R: Rng + ?Sized>(
    rng: &mut R,
    delta_t: f64,
    trials: usize,
) -> Result<Vec<TemperatureTrial>> {
    let mut out = Vec::with_capacity(trials);
    for _ in 0..trials {
        let path = simulate_path(rng, delta_t)?;
        out.push(summarize_path(&path));
    }
    Ok(out)
}

pub fn run_experiment(cfg: &ExperimentConfig) -> Result<Vec<TemperatureSeries>> {
    if cfg.trials == 0 {
        bail!("temperature experiment needs at least one trial");
    }
    if cfg.delta_ts.is_empty() {
        bail!("temperature experiment needs at least one delta_t");
    }
    for dt in &cfg.delta_ts {
        steps_for(*dt)?;
    }

    let seed = cfg.seed.unwrap_or_else(rand::random);
    log::info!(
        "temperature experiment: {} trials for dt {:?} (seed {seed})",
        cfg.trials,
        cfg.delta_ts
    );

    cfg.delta_ts
        .par_iter()
        .enumerate()
        .map(|(idx, &delta_t)| -> Result<TemperatureSeries> {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(idx as u64));
            let trials = simulate_temperature(&mut rng, delta_t, cfg.trials)?;
            log::debug!("dt {delta_t}: {} trials done", trials.len());
            Ok(TemperatureSeries { delta_t, trials })
        })
        .collect()
}

/// Equal-width bins over [lo, hi]; each bin holds the share of values that fall in it.
/// `hi` itself lands in the last bin, values outside the range are dropped.
pub fn probability_histogram(values: &[f64], bins: usize, lo: f64, hi: f64) -> Vec<HistogramBin> {
    let bins = bins.max(1);
    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in values {
        if *v < lo || *v > hi || !v.is_finite() {
            continue;
        }
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    let n = values.len().max(1) as f64;
    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| HistogramBin {
            start: lo + idx as f64 * width,
            end: lo + (idx + 1) as f64 * width,
            value: count as f64 / n,
        })
        .collect()
}

pub fn p_distribution_chart(series: &[TemperatureSeries], bins: usize) -> Chart {
    distribution_chart(
        series,
        bins,
        "Adjusted Distribution of P",
        "P (Proportion of Time > 0)",
        |t| t.p,
    )
}

pub fn t_max_distribution_chart(series: &[TemperatureSeries], bins: usize) -> Chart {
    distribution_chart(
        series,
        bins,
        "Adjusted Distribution of Tmax",
        "Tmax (Time of Maximum Temperature)",
        |t| t.t_max,
    )
}

fn distribution_chart(
    series: &[TemperatureSeries],
    bins: usize,
    title: &str,
    x_label: &str,
    pick: impl Fn(&TemperatureTrial) -> f64,
) -> Chart {
    let body = series
        .iter()
        .map(|s| {
            let values: Vec<f64> = s.trials.iter().map(&pick).collect();
            HistogramSeries {
                name: format!("dt={}", s.delta_t),
                bins: probability_histogram(&values, bins, 0.0, 1.0),
            }
        })
        .collect();
    Chart {
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: "Probability".to_string(),
        body: ChartBody::Histogram(body),
    }
}
