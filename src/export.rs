use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rust_xlsxwriter::{Workbook, Worksheet};
use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateStandingsRow;
use crate::error::DataError;
use crate::season::{SeasonRun, StandingsRow};

pub const STANDINGS_COLUMNS: [&str; 10] = [
    "Position",
    "Teams",
    "Points",
    "Games Won",
    "Games Drawn",
    "Games Lost",
    "Goals Scored Simulated",
    "Goals Conceded Simulated",
    "Clean Sheets",
    "Goal Difference",
];

/// Receives the final table (and the runs behind it) once aggregation is done.
pub trait StandingsExporter {
    fn export(&mut self, standings: &[AggregateStandingsRow], runs: &[SeasonRun]) -> Result<()>;
}

#[derive(Serialize)]
struct StandingsRecord<'a> {
    #[serde(rename = "Position")]
    position: u32,
    #[serde(rename = "Teams")]
    team: &'a str,
    #[serde(rename = "Points")]
    points: f64,
    #[serde(rename = "Games Won")]
    won: f64,
    #[serde(rename = "Games Drawn")]
    drawn: f64,
    #[serde(rename = "Games Lost")]
    lost: f64,
    #[serde(rename = "Goals Scored Simulated")]
    goals_scored: f64,
    #[serde(rename = "Goals Conceded Simulated")]
    goals_conceded: f64,
    #[serde(rename = "Clean Sheets")]
    clean_sheets: f64,
    #[serde(rename = "Goal Difference")]
    goal_difference: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct SimulationRecord {
    #[serde(rename = "Simulation")]
    simulation: u32,
    // Recomputed on load.
    #[serde(rename = "Position", default)]
    position: Option<u32>,
    #[serde(rename = "Teams")]
    team: String,
    #[serde(rename = "Points")]
    points: u32,
    #[serde(rename = "Games Won")]
    won: u32,
    #[serde(rename = "Games Drawn")]
    drawn: u32,
    #[serde(rename = "Games Lost")]
    lost: u32,
    #[serde(rename = "Goals Scored Simulated")]
    goals_scored: u32,
    #[serde(rename = "Goals Conceded Simulated")]
    goals_conceded: u32,
    #[serde(rename = "Clean Sheets")]
    clean_sheets: u32,
    #[serde(rename = "Goal Difference")]
    goal_difference: i64,
}

pub fn write_standings_csv<W: io::Write>(
    writer: W,
    standings: &[AggregateStandingsRow],
) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in standings {
        wtr.serialize(StandingsRecord {
            position: row.position,
            team: &row.team,
            points: row.points,
            won: row.won,
            drawn: row.drawn,
            lost: row.lost,
            goals_scored: row.goals_scored,
            goals_conceded: row.goals_conceded,
            clean_sheets: row.clean_sheets,
            goal_difference: row.goal_difference,
        })?;
    }
    if standings.is_empty() {
        wtr.write_record(STANDINGS_COLUMNS)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_simulations_csv<W: io::Write>(writer: W, runs: &[SeasonRun]) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for run in runs {
        for (position, row) in run.table() {
            wtr.serialize(SimulationRecord {
                simulation: run.run_id,
                position: Some(position),
                team: row.team.clone(),
                points: row.points,
                won: row.won,
                drawn: row.drawn,
                lost: row.lost,
                goals_scored: row.goals_scored,
                goals_conceded: row.goals_conceded,
                clean_sheets: row.clean_sheets,
                goal_difference: row.goal_difference,
            })?;
        }
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Rebuilds runs from a simulations table, grouped by the Simulation column in
/// first-seen order.
pub fn read_simulations_csv<R: io::Read>(reader: R) -> Result<Vec<SeasonRun>, DataError> {
    let mut rdr = crate::table::csv_reader(reader);
    let headers = rdr.headers()?.clone();
    crate::table::require_columns(&headers, "simulations", &["Simulation", "Teams", "Points"])?;

    let mut runs: Vec<SeasonRun> = Vec::new();
    let mut index: HashMap<u32, usize> = HashMap::new();
    for record in rdr.deserialize::<SimulationRecord>() {
        let rec = record?;
        let idx = *index.entry(rec.simulation).or_insert_with(|| {
            runs.push(SeasonRun {
                run_id: rec.simulation,
                rows: Vec::new(),
            });
            runs.len() - 1
        });
        if runs[idx].row(&rec.team).is_some() {
            return Err(DataError::DuplicateTeam { team: rec.team });
        }
        runs[idx].rows.push(StandingsRow {
            team: rec.team,
            points: rec.points,
            won: rec.won,
            drawn: rec.drawn,
            lost: rec.lost,
            goals_scored: rec.goals_scored,
            goals_conceded: rec.goals_conceded,
            clean_sheets: rec.clean_sheets,
            goal_difference: rec.goal_difference,
        });
    }
    Ok(runs)
}

pub fn load_simulations(path: &Path) -> Result<Vec<SeasonRun>> {
    let file = File::open(path).with_context(|| format!("open simulations {}", path.display()))?;
    read_simulations_csv(file).with_context(|| format!("load simulations {}", path.display()))
}

pub struct CsvExporter {
    pub standings_path: PathBuf,
    pub simulations_path: Option<PathBuf>,
}

impl StandingsExporter for CsvExporter {
    fn export(&mut self, standings: &[AggregateStandingsRow], runs: &[SeasonRun]) -> Result<()> {
        let file = File::create(&self.standings_path)
            .with_context(|| format!("create {}", self.standings_path.display()))?;
        write_standings_csv(file, standings)
            .with_context(|| format!("write {}", self.standings_path.display()))?;
        log::info!("wrote standings to {}", self.standings_path.display());

        if let Some(path) = &self.simulations_path {
            let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
            write_simulations_csv(file, runs)
                .with_context(|| format!("write {}", path.display()))?;
            log::info!("wrote {} simulation runs to {}", runs.len(), path.display());
        }
        Ok(())
    }
}

pub struct XlsxExporter {
    pub path: PathBuf,
    pub seed: Option<u64>,
}

impl StandingsExporter for XlsxExporter {
    fn export(&mut self, standings: &[AggregateStandingsRow], runs: &[SeasonRun]) -> Result<()> {
        write_workbook(&self.path, standings, runs, self.seed)?;
        log::info!("wrote workbook to {}", self.path.display());
        Ok(())
    }
}

/// Fans one export out to several exporters, stopping at the first failure.
#[derive(Default)]
pub struct ExportSet {
    exporters: Vec<Box<dyn StandingsExporter>>,
}

impl ExportSet {
    pub fn push(&mut self, exporter: impl StandingsExporter + 'static) {
        self.exporters.push(Box::new(exporter));
    }

    pub fn len(&self) -> usize {
        self.exporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exporters.is_empty()
    }
}

impl StandingsExporter for ExportSet {
    fn export(&mut self, standings: &[AggregateStandingsRow], runs: &[SeasonRun]) -> Result<()> {
        for exporter in &mut self.exporters {
            exporter.export(standings, runs)?;
        }
        Ok(())
    }
}

enum Cell {
    Text(String),
    Number(f64),
}

pub fn write_workbook(
    path: &Path,
    standings: &[AggregateStandingsRow],
    runs: &[SeasonRun],
    seed: Option<u64>,
) -> Result<()> {
    let mut standings_rows = vec![header_row(&STANDINGS_COLUMNS)];
    for row in standings {
        standings_rows.push(vec![
            Cell::Number(row.position as f64),
            Cell::Text(row.team.clone()),
            Cell::Number(row.points),
            Cell::Number(row.won),
            Cell::Number(row.drawn),
            Cell::Number(row.lost),
            Cell::Number(row.goals_scored),
            Cell::Number(row.goals_conceded),
            Cell::Number(row.clean_sheets),
            Cell::Number(row.goal_difference),
        ]);
    }

    let mut simulation_rows = vec![header_row(&[
        "Simulation",
        "Position",
        "Teams",
        "Points",
        "Games Won",
        "Games Drawn",
        "Games Lost",
        "Goals Scored Simulated",
        "Goals Conceded Simulated",
        "Clean Sheets",
        "Goal Difference",
    ])];
    for run in runs {
        for (position, row) in run.table() {
            simulation_rows.push(vec![
                Cell::Number(run.run_id as f64),
                Cell::Number(position as f64),
                Cell::Text(row.team.clone()),
                Cell::Number(row.points as f64),
                Cell::Number(row.won as f64),
                Cell::Number(row.drawn as f64),
                Cell::Number(row.lost as f64),
                Cell::Number(row.goals_scored as f64),
                Cell::Number(row.goals_conceded as f64),
                Cell::Number(row.clean_sheets as f64),
                Cell::Number(row.goal_difference as f64),
            ]);
        }
    }

    let info_rows = vec![
        vec![Cell::Text("Generated".to_string()), Cell::Text(Utc::now().to_rfc3339())],
        vec![Cell::Text("Runs".to_string()), Cell::Number(runs.len() as f64)],
        vec![
            Cell::Text("Seed".to_string()),
            Cell::Text(seed.map(|s| s.to_string()).unwrap_or_default()),
        ],
    ];

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Standings")?;
        write_rows(sheet, &standings_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Simulations")?;
        write_rows(sheet, &simulation_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Info")?;
        write_rows(sheet, &info_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn header_row(columns: &[&str]) -> Vec<Cell> {
    columns.iter().map(|c| Cell::Text(c.to_string())).collect()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let written = match value {
                Cell::Text(text) => worksheet.write_string(row_idx as u32, col_idx as u16, text),
                Cell::Number(num) => worksheet.write_number(row_idx as u32, col_idx as u16, *num),
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
