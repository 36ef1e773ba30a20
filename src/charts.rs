use std::collections::HashMap;
use std::io;

use anyhow::Result;

use crate::aggregate::AggregateStandingsRow;
use crate::error::DataError;
use crate::season::SeasonRun;

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub body: ChartBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartBody {
    Bars(Vec<(String, f64)>),
    Boxes(Vec<BoxSummary>),
    Histogram(Vec<HistogramSeries>),
    Lines(Vec<Series>),
    Scatter(Vec<Series>),
    Heatmap {
        labels: Vec<String>,
        values: Vec<Vec<f64>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub label: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSeries {
    pub name: String,
    pub bins: Vec<HistogramBin>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// Displays a chart. Nothing flows back to the caller besides success or failure.
pub trait ChartRenderer {
    fn render(&mut self, chart: &Chart) -> Result<()>;
}

pub struct NullRenderer;

impl ChartRenderer for NullRenderer {
    fn render(&mut self, chart: &Chart) -> Result<()> {
        log::debug!("chart '{}' skipped", chart.title);
        Ok(())
    }
}

pub fn average_points_chart(standings: &[AggregateStandingsRow]) -> Chart {
    Chart {
        title: "Average Points Across Simulations".to_string(),
        x_label: "Teams".to_string(),
        y_label: "Average Points".to_string(),
        body: ChartBody::Bars(
            standings
                .iter()
                .map(|row| (row.team.clone(), row.points))
                .collect(),
        ),
    }
}

pub fn points_distribution_chart(runs: &[SeasonRun]) -> Chart {
    let boxes = per_team(runs, |row| row.points as f64)
        .into_iter()
        .filter_map(|(team, values)| box_summary(team, values))
        .collect();
    Chart {
        title: "Points Distribution Across Simulations".to_string(),
        x_label: "Teams".to_string(),
        y_label: "Points".to_string(),
        body: ChartBody::Boxes(boxes),
    }
}

/// How often each team finished in each league position.
pub fn positions_distribution_chart(runs: &[SeasonRun]) -> Chart {
    let max_pos = runs.iter().map(|r| r.rows.len()).max().unwrap_or(0);
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, Vec<f64>> = HashMap::new();
    for run in runs {
        for (pos, row) in run.table() {
            let slots = counts.entry(row.team.clone()).or_insert_with(|| {
                order.push(row.team.clone());
                vec![0.0; max_pos]
            });
            slots[pos as usize - 1] += 1.0;
        }
    }

    let series = order
        .into_iter()
        .filter_map(|team| {
            let slots = counts.remove(&team)?;
            Some(HistogramSeries {
                name: team,
                bins: slots
                    .into_iter()
                    .enumerate()
                    .map(|(idx, value)| HistogramBin {
                        start: idx as f64 + 0.5,
                        end: idx as f64 + 1.5,
                        value,
                    })
                    .collect(),
            })
        })
        .collect();

    Chart {
        title: "League Positions Distribution Across Simulations".to_string(),
        x_label: "League Position".to_string(),
        y_label: "Count".to_string(),
        body: ChartBody::Histogram(series),
    }
}

pub fn points_vs_goal_difference_chart(runs: &[SeasonRun]) -> Chart {
    let series = per_team(runs, |row| (row.goal_difference as f64, row.points as f64))
        .into_iter()
        .map(|(name, points)| Series { name, points })
        .collect();
    Chart {
        title: "Points vs. Goal Difference Across Simulations".to_string(),
        x_label: "Goal Difference".to_string(),
        y_label: "Points".to_string(),
        body: ChartBody::Scatter(series),
    }
}

pub const CORRELATION_METRICS: [&str; 5] = [
    "Points",
    "Goals Scored",
    "Goals Conceded",
    "Goal Difference",
    "Clean Sheets",
];

/// Pearson correlation between the standings metrics over every team-run row.
pub fn correlation_chart(runs: &[SeasonRun]) -> Chart {
    let columns: Vec<Vec<f64>> = {
        let rows = runs.iter().flat_map(|r| r.rows.iter());
        let mut cols = vec![Vec::new(); CORRELATION_METRICS.len()];
        for row in rows {
            cols[0].push(row.points as f64);
            cols[1].push(row.goals_scored as f64);
            cols[2].push(row.goals_conceded as f64);
            cols[3].push(row.goal_difference as f64);
            cols[4].push(row.clean_sheets as f64);
        }
        cols
    };
    let values = columns
        .iter()
        .map(|a| columns.iter().map(|b| pearson(a, b)).collect())
        .collect();
    Chart {
        title: "Correlation Heatmap of Metrics".to_string(),
        x_label: String::new(),
        y_label: String::new(),
        body: ChartBody::Heatmap {
            labels: CORRELATION_METRICS.iter().map(|s| s.to_string()).collect(),
            values,
        },
    }
}

pub fn team_evolution_chart(runs: &[SeasonRun], team: &str) -> Result<Chart, DataError> {
    let points: Vec<(f64, f64)> = runs
        .iter()
        .filter_map(|run| run.row(team).map(|row| (run.run_id as f64, row.points as f64)))
        .collect();
    if points.is_empty() {
        return Err(DataError::UnknownTeam {
            team: team.to_string(),
        });
    }
    Ok(Chart {
        title: format!("Points Evolution for {team} Across Simulations"),
        x_label: "Simulation Number".to_string(),
        y_label: "Points".to_string(),
        body: ChartBody::Lines(vec![Series {
            name: team.to_string(),
            points,
        }]),
    })
}

fn per_team<T>(
    runs: &[SeasonRun],
    value: impl Fn(&crate::season::StandingsRow) -> T,
) -> Vec<(String, Vec<T>)> {
    let mut out: Vec<(String, Vec<T>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for run in runs {
        for row in &run.rows {
            let idx = *index.entry(row.team.as_str()).or_insert_with(|| {
                out.push((row.team.clone(), Vec::new()));
                out.len() - 1
            });
            out[idx].1.push(value(row));
        }
    }
    out
}

fn box_summary(label: String, mut values: Vec<f64>) -> Option<BoxSummary> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    Some(BoxSummary {
        label,
        min: values[0],
        q1: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q3: quantile(&values, 0.75),
        max: values[values.len() - 1],
    })
}

/// Linear-interpolated quantile of an ascending slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// NaN when either side has no variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }
    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Plain-text rendering, for pipes, logs and headless runs.
pub struct TextRenderer<W> {
    out: W,
    width: usize,
}

impl<W: io::Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, width: 40 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: io::Write> ChartRenderer for TextRenderer<W> {
    fn render(&mut self, chart: &Chart) -> Result<()> {
        writeln!(self.out, "== {} ==", chart.title)?;
        if !chart.x_label.is_empty() || !chart.y_label.is_empty() {
            writeln!(self.out, "({} / {})", chart.x_label, chart.y_label)?;
        }
        match &chart.body {
            ChartBody::Bars(bars) => {
                let label_w = bars.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
                let max = bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
                for (label, value) in bars {
                    let bar = scaled_bar(*value, max, self.width);
                    writeln!(self.out, "{label:<label_w$} |{bar} {value:.1}")?;
                }
            }
            ChartBody::Boxes(boxes) => {
                let label_w = boxes.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
                writeln!(
                    self.out,
                    "{:<label_w$}   min    q1   med    q3   max",
                    ""
                )?;
                for b in boxes {
                    writeln!(
                        self.out,
                        "{:<label_w$} {:>5.1} {:>5.1} {:>5.1} {:>5.1} {:>5.1}",
                        b.label, b.min, b.q1, b.median, b.q3, b.max
                    )?;
                }
            }
            ChartBody::Histogram(series) => {
                for s in series {
                    writeln!(self.out, "-- {}", s.name)?;
                    let max = s.bins.iter().map(|b| b.value).fold(0.0_f64, f64::max);
                    for bin in &s.bins {
                        let bar = scaled_bar(bin.value, max, self.width);
                        writeln!(
                            self.out,
                            "[{:>8.4}, {:>8.4}) |{bar} {}",
                            bin.start,
                            bin.end,
                            bin.value
                        )?;
                    }
                }
            }
            ChartBody::Lines(series) | ChartBody::Scatter(series) => {
                for s in series {
                    writeln!(self.out, "-- {}", s.name)?;
                    for (x, y) in &s.points {
                        writeln!(self.out, "{x}\t{y}")?;
                    }
                }
            }
            ChartBody::Heatmap { labels, values } => {
                for line in heatmap_lines(labels, values) {
                    writeln!(self.out, "{line}")?;
                }
            }
        }
        writeln!(self.out)?;
        Ok(())
    }
}

pub(crate) fn heatmap_lines(labels: &[String], values: &[Vec<f64>]) -> Vec<String> {
    let label_w = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let mut lines = Vec::with_capacity(labels.len() + 1);
    let mut header = format!("{:<label_w$}", "");
    for label in labels {
        header.push_str(&format!(" {:>8}", abbreviate(label, 8)));
    }
    lines.push(header);
    for (label, row) in labels.iter().zip(values) {
        let mut line = format!("{label:<label_w$}");
        for v in row {
            if v.is_nan() {
                line.push_str(&format!(" {:>8}", "-"));
            } else {
                line.push_str(&format!(" {v:>8.2}"));
            }
        }
        lines.push(line);
    }
    lines
}

fn abbreviate(label: &str, max: usize) -> String {
    label.chars().take(max).collect()
}

fn scaled_bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let n = ((value / max) * width as f64).round() as usize;
    "#".repeat(n.min(width))
}
